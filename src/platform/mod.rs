//! Platform-specific implementations.
//!
//! Only macOS has a host for the widget. The submodule provides:
//! - FFI bridge helpers for Cocoa/AppKit
//! - UI components (widget window, directory prompt)
//! - Storage (token persistence, security-scoped bookmarks)
//! - The main-thread event dispatcher

#[cfg(target_os = "macos")]
pub mod macos;
