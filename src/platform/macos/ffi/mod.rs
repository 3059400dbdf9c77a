//! FFI helpers for Cocoa/AppKit.

pub mod bridge;
