//! Application events for inter-module communication.
//!
//! These events are published by AppKit callbacks and worker threads and
//! handled by the dispatcher on the main thread.
//! This module is pure Rust with no FFI dependencies, making it fully testable.

use std::path::PathBuf;

/// Application-level events for decoupled communication between modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // === Input Events ===
    /// A file was dropped on the widget.
    FileDropped(PathBuf),

    // === Deferred Work ===
    /// A deferred editor batch is due.
    OpenBatch(Vec<PathBuf>),

    // === Pipeline Lifecycle ===
    /// The worker for a drop into this directory finished.
    DropFinished(PathBuf),
}

impl AppEvent {
    /// Returns a human-readable description of the event for debugging.
    pub fn description(&self) -> &'static str {
        match self {
            AppEvent::FileDropped(_) => "File dropped on widget",
            AppEvent::OpenBatch(_) => "Open deferred editor batch",
            AppEvent::DropFinished(_) => "Drop pipeline finished",
        }
    }
}
