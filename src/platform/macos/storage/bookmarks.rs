//! Security-scoped bookmarks (NSURL bookmark data).
//!
//! Sessions are started on the URL resolved from the directory's token and
//! that same URL is kept until the session stops, since access is granted
//! per resolved URL.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::access::{AuthorizedDirectory, Bookmarks, ResolvedToken};
use crate::error::AccessError;
use crate::platform::macos::ffi::bridge::{
    bytes_from_nsdata, describe_nserror, directory_nsurl, get_class, id, msg_send,
    nsdata_from_bytes, nil, path_from_nsurl, Bool,
};

/// NSURLBookmarkCreationWithSecurityScope
const BOOKMARK_CREATION_WITH_SECURITY_SCOPE: usize = 1 << 11;

/// NSURLBookmarkResolutionWithSecurityScope
const BOOKMARK_RESOLUTION_WITH_SECURITY_SCOPE: usize = 1 << 10;

/// Bookmarks backed by NSURL. Main thread only.
#[derive(Default)]
pub struct SecurityScopedBookmarks {
    /// Retained URLs with an active session, by directory path.
    active: RefCell<HashMap<PathBuf, id>>,
}

impl SecurityScopedBookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `token` to a retained NSURL plus its staleness.
    unsafe fn resolve_url(token: &[u8]) -> Result<(id, bool), AccessError> {
        let data = nsdata_from_bytes(token);
        let mut stale = Bool::NO;
        let mut error: id = nil;
        let url: id = msg_send![
            get_class("NSURL"),
            URLByResolvingBookmarkData: data,
            options: BOOKMARK_RESOLUTION_WITH_SECURITY_SCOPE,
            relativeToURL: nil,
            bookmarkDataIsStale: &mut stale as *mut Bool,
            error: &mut error as *mut id
        ];
        if url.is_null() {
            return Err(AccessError::Resolve(describe_nserror(error)));
        }
        let _: id = msg_send![url, retain];
        Ok((url, stale.as_bool()))
    }
}

impl Bookmarks for SecurityScopedBookmarks {
    fn create_token(&self, dir: &Path) -> Result<Vec<u8>, AccessError> {
        unsafe {
            let url = directory_nsurl(dir);
            let mut error: id = nil;
            let data: id = msg_send![
                url,
                bookmarkDataWithOptions: BOOKMARK_CREATION_WITH_SECURITY_SCOPE,
                includingResourceValuesForKeys: nil,
                relativeToURL: nil,
                error: &mut error as *mut id
            ];
            match bytes_from_nsdata(data) {
                Some(bytes) if !bytes.is_empty() => Ok(bytes),
                _ => Err(AccessError::Bookmark {
                    path: dir.to_path_buf(),
                    message: describe_nserror(error),
                }),
            }
        }
    }

    fn resolve_token(&self, token: &[u8]) -> Result<ResolvedToken, AccessError> {
        unsafe {
            let (url, stale) = Self::resolve_url(token)?;
            let path = path_from_nsurl(url);
            let _: () = msg_send![url, release];
            let path = path.ok_or_else(|| AccessError::Resolve("bookmark has no path".into()))?;
            Ok(ResolvedToken { path, stale })
        }
    }

    fn start_access(&self, dir: &AuthorizedDirectory) -> bool {
        unsafe {
            let url = match Self::resolve_url(dir.token()) {
                Ok((url, _)) => url,
                Err(e) => {
                    debug!(error = %e, "Cannot resolve token to start access");
                    return false;
                }
            };
            let started: bool = msg_send![url, startAccessingSecurityScopedResource];
            if !started {
                let _: () = msg_send![url, release];
                return false;
            }
            let previous = self
                .active
                .borrow_mut()
                .insert(dir.path().to_path_buf(), url);
            if let Some(previous) = previous {
                let _: () = msg_send![previous, stopAccessingSecurityScopedResource];
                let _: () = msg_send![previous, release];
            }
            true
        }
    }

    fn stop_access(&self, dir: &AuthorizedDirectory) {
        let url = self.active.borrow_mut().remove(dir.path());
        if let Some(url) = url {
            unsafe {
                let _: () = msg_send![url, stopAccessingSecurityScopedResource];
                let _: () = msg_send![url, release];
            }
        }
    }
}
