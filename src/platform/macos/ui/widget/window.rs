//! Widget window creation and hover-driven resizing.

use tracing::debug;

use crate::model::constants::WIDGET_MARGIN;
use crate::model::{Frame, WindowState};
use crate::platform::macos::ffi::bridge::{get_class, id, msg_send, NO, YES};
use crate::platform::macos::ui::widget::view::{
    layout_label, register_and_create_view, set_bool_ivar,
};

use objc2_foundation::{NSPoint, NSRect, NSSize};

/// NSFloatingWindowLevel
const FLOATING_WINDOW_LEVEL: isize = 3;

fn frame_from_rect(rect: NSRect) -> Frame {
    Frame::new(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height)
}

fn rect_from_frame(frame: Frame) -> NSRect {
    NSRect::new(
        NSPoint::new(frame.x, frame.y),
        NSSize::new(frame.width, frame.height),
    )
}

/// Create the borderless floating widget window and its view.
///
/// # Safety
/// Must be called from the main thread with a valid autorelease pool.
pub unsafe fn make_widget_window() -> (id, id) {
    let size = WindowState::Collapsed.size();
    let screen: id = msg_send![get_class("NSScreen"), mainScreen];
    let frame = if screen.is_null() {
        Frame::new(100.0, 100.0, size, size)
    } else {
        let visible: NSRect = msg_send![screen, visibleFrame];
        Frame::top_right_of(frame_from_rect(visible), size, WIDGET_MARGIN)
    };

    // NSBorderlessWindowMask = 0
    let style_mask: u64 = 0;
    // NSBackingStoreBuffered = 2
    let backing: u64 = 2;

    let window: id = msg_send![get_class("NSWindow"), alloc];
    let window: id = msg_send![
        window,
        initWithContentRect: rect_from_frame(frame),
        styleMask: style_mask,
        backing: backing,
        defer: NO
    ];

    let _: () = msg_send![window, setOpaque: NO];
    let clear_color: id = msg_send![get_class("NSColor"), clearColor];
    let _: () = msg_send![window, setBackgroundColor: clear_color];
    let _: () = msg_send![window, setHasShadow: YES];
    let _: () = msg_send![window, setLevel: FLOATING_WINDOW_LEVEL];
    let _: () = msg_send![window, setMovableByWindowBackground: YES];
    let _: () = msg_send![window, setReleasedWhenClosed: NO];

    // NSWindowCollectionBehaviorCanJoinAllSpaces = 1 << 0 = 1
    // NSWindowCollectionBehaviorFullScreenAuxiliary = 1 << 8 = 256
    let collection_behavior: u64 = 1 | 256;
    let _: () = msg_send![window, setCollectionBehavior: collection_behavior];

    let view = register_and_create_view(window, size);
    (window, view)
}

/// Show `state`: resize around the current center, relabel and redraw.
///
/// # Safety
/// Must be called from the main thread. `view` must be a `DuMemoWidgetView`.
pub unsafe fn apply_window_state(view: id, state: WindowState) {
    set_bool_ivar(view, "_expanded", state.is_expanded());

    let window: id = msg_send![view, window];
    if !window.is_null() {
        let current: NSRect = msg_send![window, frame];
        let target = frame_from_rect(current).recentered(state.size(), state.size());
        let rect = rect_from_frame(target);
        let _: () = msg_send![window, setFrame: rect, display: YES, animate: YES];
        let _: () = msg_send![window, invalidateShadow];
    }

    layout_label(view, state);
    let _: () = msg_send![view, setNeedsDisplay: YES];
    debug!(?state, size = state.size(), "Window state applied");
}
