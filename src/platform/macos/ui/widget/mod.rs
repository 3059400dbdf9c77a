//! The floating widget: a borderless window hosting `DuMemoWidgetView`.

pub mod view;
pub mod window;

pub use view::{register_and_create_view, start_dispatch_timer};
pub use window::{apply_window_state, make_widget_window};
