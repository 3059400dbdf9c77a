//! Persistence of the authorization token to NSUserDefaults.

use crate::access::TokenStore;
use crate::error::AccessError;
use crate::model::constants::PREF_DIRECTORY_BOOKMARK;
use crate::platform::macos::ffi::bridge::{
    bytes_from_nsdata, get_class, id, msg_send, nsdata_from_bytes, nsstring_id,
};

/// Reads NSData from NSUserDefaults, `None` if not set.
///
/// # Safety
/// Must be called from main thread with valid autorelease pool.
pub unsafe fn prefs_get_data(key: &str) -> Option<Vec<u8>> {
    let ud: id = msg_send![get_class("NSUserDefaults"), standardUserDefaults];
    let k = nsstring_id(key);
    let data: id = msg_send![ud, dataForKey: k];
    bytes_from_nsdata(data)
}

/// Saves NSData to NSUserDefaults.
///
/// # Safety
/// Must be called from main thread with valid autorelease pool.
pub unsafe fn prefs_set_data(key: &str, bytes: &[u8]) {
    let ud: id = msg_send![get_class("NSUserDefaults"), standardUserDefaults];
    let k = nsstring_id(key);
    let data = nsdata_from_bytes(bytes);
    let _: () = msg_send![ud, setObject: data, forKey: k];
}

/// Token store keyed by [`PREF_DIRECTORY_BOOKMARK`].
///
/// Main thread only.
#[derive(Debug, Clone)]
pub struct UserDefaultsTokenStore {
    key: String,
}

impl Default for UserDefaultsTokenStore {
    fn default() -> Self {
        Self {
            key: PREF_DIRECTORY_BOOKMARK.to_string(),
        }
    }
}

impl TokenStore for UserDefaultsTokenStore {
    fn load_token(&self) -> Option<Vec<u8>> {
        unsafe { prefs_get_data(&self.key) }.filter(|t| !t.is_empty())
    }

    fn store_token(&self, token: &[u8]) -> Result<(), AccessError> {
        if token.is_empty() {
            return Err(AccessError::Store("refusing to store an empty token".to_string()));
        }
        unsafe { prefs_set_data(&self.key, token) };
        Ok(())
    }
}
