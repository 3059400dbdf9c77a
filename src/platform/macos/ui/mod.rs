//! UI components for macOS.
//!
//! - `widget`: the floating drop target (window, NSView subclass, label)
//! - `prompt`: NSOpenPanel directory chooser

pub mod prompt;
pub mod widget;

pub use prompt::OpenPanelPrompt;
pub use widget::{apply_window_state, make_widget_window, start_dispatch_timer};
