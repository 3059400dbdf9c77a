//! macOS-specific implementation using Cocoa/AppKit via objc2.
//!
//! This module contains all macOS-specific code:
//! - FFI bridge helpers
//! - UI components (widget window and view, NSOpenPanel prompt)
//! - Storage (NSUserDefaults, security-scoped bookmarks)
//! - Controller and event dispatcher tying the pipeline to AppKit

pub mod app;
pub mod ffi;
pub mod handlers;
pub mod storage;
pub mod ui;

pub use ffi::bridge;
