//! Widget domain model.
//!
//! This module contains pure state logic (no FFI dependencies)
//! including the hover state machine, frame math and constants.
//!
//! Platform-specific persistence is in `platform::macos::storage`.

pub mod constants;
pub mod geometry;
pub mod window_state;

pub use constants::*;
pub use geometry::Frame;
pub use window_state::{HoverStateMachine, PendingCollapse, WindowState};
