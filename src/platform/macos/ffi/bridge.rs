//! Thin helpers over objc2 for untyped message sends.
//!
//! Most AppKit calls in this crate go through `msg_send!` on raw `id`
//! pointers. This module gathers the aliases, constants and conversions
//! those call sites share.

#![allow(non_upper_case_globals)]

use std::ffi::{c_char, c_void, CStr, CString};
use std::path::{Path, PathBuf};

pub use objc2::runtime::{AnyClass, AnyObject, Bool, Sel};
pub use objc2::{msg_send, sel};
pub use objc2_foundation::{NSPoint, NSRect, NSSize};

use objc2::encode::Encode;
use objc2::rc::Retained;
use objc2_app_kit::NSApplication;
use objc2_foundation::NSString;
use objc2::ClassType;

// ============================================================================
// Type aliases and constants
// ============================================================================

/// Objective-C object pointer.
pub type id = *mut AnyObject;

/// Null object pointer.
pub const nil: id = std::ptr::null_mut();

/// Objective-C BOOL YES.
pub const YES: Bool = Bool::YES;

/// Objective-C BOOL NO.
pub const NO: Bool = Bool::NO;

// ============================================================================
// Helper functions
// ============================================================================

/// Get the shared NSApplication instance.
#[inline]
#[allow(non_snake_case)]
pub fn NSApp() -> id {
    unsafe { msg_send![NSApplication::class(), sharedApplication] }
}

/// Create an NSString and return it as a raw, retained `id`.
#[inline]
pub fn nsstring_id(s: &str) -> id {
    let ns = NSString::from_str(s);
    Retained::into_raw(ns) as id
}

/// Copy an NSString into a Rust `String`.
///
/// # Safety
/// `ns` must be nil or a valid NSString.
pub unsafe fn string_from_nsstring(ns: id) -> Option<String> {
    if ns.is_null() {
        return None;
    }
    let utf8: *const c_char = msg_send![ns, UTF8String];
    if utf8.is_null() {
        return None;
    }
    Some(CStr::from_ptr(utf8).to_string_lossy().into_owned())
}

/// Path of a file NSURL.
///
/// # Safety
/// `url` must be nil or a valid NSURL.
pub unsafe fn path_from_nsurl(url: id) -> Option<PathBuf> {
    if url.is_null() {
        return None;
    }
    let path: id = msg_send![url, path];
    string_from_nsstring(path).map(PathBuf::from)
}

/// File NSURL for a directory path.
///
/// # Safety
/// Must be called with a valid autorelease pool.
pub unsafe fn directory_nsurl(path: &Path) -> id {
    let ns = nsstring_id(&path.to_string_lossy());
    msg_send![get_class("NSURL"), fileURLWithPath: ns, isDirectory: YES]
}

/// Copy the bytes of an NSData.
///
/// # Safety
/// `data` must be nil or a valid NSData.
pub unsafe fn bytes_from_nsdata(data: id) -> Option<Vec<u8>> {
    if data.is_null() {
        return None;
    }
    let len: usize = msg_send![data, length];
    let ptr: *const c_void = msg_send![data, bytes];
    if ptr.is_null() || len == 0 {
        return Some(Vec::new());
    }
    Some(std::slice::from_raw_parts(ptr as *const u8, len).to_vec())
}

/// Create an autoreleased NSData holding `bytes`.
///
/// # Safety
/// Must be called with a valid autorelease pool.
pub unsafe fn nsdata_from_bytes(bytes: &[u8]) -> id {
    msg_send![
        get_class("NSData"),
        dataWithBytes: bytes.as_ptr() as *const c_void,
        length: bytes.len()
    ]
}

/// `localizedDescription` of an NSError, or a placeholder.
///
/// # Safety
/// `error` must be nil or a valid NSError.
pub unsafe fn describe_nserror(error: id) -> String {
    if error.is_null() {
        return "unknown error".to_string();
    }
    let desc: id = msg_send![error, localizedDescription];
    string_from_nsstring(desc).unwrap_or_else(|| "unknown error".to_string())
}

/// Get a class by name, panicking if not found.
///
/// Only used for classes that ship with AppKit/Foundation.
#[inline]
pub fn get_class(name: &str) -> &'static AnyClass {
    let c_name = CString::new(name).expect("Invalid class name");
    AnyClass::get(&c_name).unwrap_or_else(|| panic!("Class '{}' not found", name))
}

// ============================================================================
// Object trait extensions for ivar access
// ============================================================================

/// Extension trait for accessing instance variables on AnyObject.
pub trait ObjectExt {
    /// Load a reference to an instance variable.
    ///
    /// # Safety
    /// The ivar must exist and be of type T.
    unsafe fn load_ivar<T: Encode>(&self, name: &str) -> &T;

    /// Store a value in an instance variable.
    ///
    /// # Safety
    /// The ivar must exist and be of type T.
    unsafe fn store_ivar<T: Encode>(&mut self, name: &str, value: T);
}

impl ObjectExt for AnyObject {
    unsafe fn load_ivar<T: Encode>(&self, name: &str) -> &T {
        let c_name = CString::new(name).expect("Invalid ivar name");
        let ivar = self
            .class()
            .instance_variable(&c_name)
            .unwrap_or_else(|| panic!("ivar '{}' not found", name));
        ivar.load::<T>(self)
    }

    unsafe fn store_ivar<T: Encode>(&mut self, name: &str, value: T) {
        let c_name = CString::new(name).expect("Invalid ivar name");
        let ivar = self
            .class()
            .instance_variable(&c_name)
            .unwrap_or_else(|| panic!("ivar '{}' not found", name));
        *ivar.load_mut::<T>(self) = value;
    }
}

// ============================================================================
// NSAutoreleasePool
// ============================================================================

/// Run a closure within an autorelease pool.
#[inline]
pub fn autoreleasepool<R, F: FnOnce() -> R>(f: F) -> R {
    unsafe {
        let pool: id = msg_send![get_class("NSAutoreleasePool"), new];
        let result = f();
        let _: () = msg_send![pool, drain];
        result
    }
}
