//! `DuMemoWidgetView`, the NSView subclass behind the widget.
//!
//! The view handles:
//! - Drawing the rounded background in the state's color
//! - Hover tracking (expand on enter, debounced collapse on exit)
//! - File drops, published as [`AppEvent::FileDropped`]
//! - The periodic tick that drains the event bus

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use crate::events::{publish, AppEvent};
use crate::model::constants::*;
use crate::model::{PendingCollapse, WindowState};
use crate::platform::macos::app::with_hover;
use crate::platform::macos::ffi::bridge::{
    get_class, id, msg_send, nil, nsstring_id, path_from_nsurl, Bool, ObjectExt, NO, YES,
};
use crate::platform::macos::handlers::dispatch_events;
use crate::platform::macos::ui::widget::window::apply_window_state;

use objc2::runtime::{AnyClass, AnyObject, ClassBuilder, Sel};
use objc2::sel;
use objc2_app_kit::NSTextAlignment;
use objc2_foundation::{NSPoint, NSRect, NSSize};

/// Pasteboard type of dragged file URLs.
const FILE_URL_TYPE: &str = "public.file-url";

/// NSTrackingMouseEnteredAndExited | NSTrackingActiveAlways | NSTrackingInVisibleRect
const TRACKING_OPTIONS: usize = 0x01 | 0x80 | 0x200;

/// NSDragOperationCopy
const DRAG_OPERATION_COPY: usize = 1;

// ============================================================================
// Boolean ivars (stored as u8)
// ============================================================================

/// Load a boolean ivar stored as u8.
///
/// # Safety
/// The object must have an ivar with the given name of type u8.
pub unsafe fn get_bool_ivar(obj: id, name: &str) -> bool {
    *(*obj).load_ivar::<u8>(name) != 0
}

/// Store a boolean ivar as u8.
///
/// # Safety
/// The object must have an ivar with the given name of type u8.
pub unsafe fn set_bool_ivar(obj: id, name: &str, val: bool) {
    (*obj).store_ivar::<u8>(name, u8::from(val));
}

// ============================================================================
// Registration and creation
// ============================================================================

/// Register `DuMemoWidgetView` and install an instance as `window`'s content.
///
/// # Safety
/// Must be called from the main thread. The window must be a valid NSWindow.
pub unsafe fn register_and_create_view(window: id, size: f64) -> id {
    let class_name = c"DuMemoWidgetView";
    let view_class = if let Some(cls) = AnyClass::get(class_name) {
        cls
    } else {
        let superclass = AnyClass::get(c"NSView").unwrap();
        let mut builder = ClassBuilder::new(class_name, superclass).unwrap();
        register_ivars(&mut builder);
        register_methods(&mut builder);
        builder.register()
    };

    let view: id = msg_send![view_class, alloc];
    let frame = NSRect::new(NSPoint::new(0.0, 0.0), NSSize::new(size, size));
    let view: id = msg_send![view, initWithFrame: frame];
    initialize_view_ivars(view);

    // NSViewWidthSizable | NSViewHeightSizable
    let _: () = msg_send![view, setAutoresizingMask: 18usize];

    install_tracking_area(view);
    register_drag_types(view);
    install_label(view);
    layout_label(view, WindowState::Collapsed);

    let _: () = msg_send![window, setContentView: view];
    view
}

unsafe fn register_ivars(builder: &mut ClassBuilder) {
    builder.add_ivar::<u8>(c"_expanded"); // bool as u8
    builder.add_ivar::<id>(c"_label");

    // Debounced collapse
    builder.add_ivar::<id>(c"_collapseTimer");
    builder.add_ivar::<u64>(c"_collapseToken");

    // Event bus tick
    builder.add_ivar::<id>(c"_dispatchTimer");
}

unsafe fn register_methods(builder: &mut ClassBuilder) {
    builder.add_method(
        sel!(drawRect:),
        draw_rect as unsafe extern "C-unwind" fn(_, _, _),
    );

    // Hover
    builder.add_method(
        sel!(mouseEntered:),
        mouse_entered as unsafe extern "C-unwind" fn(_, _, _),
    );
    builder.add_method(
        sel!(mouseExited:),
        mouse_exited as unsafe extern "C-unwind" fn(_, _, _),
    );
    builder.add_method(
        sel!(collapseTimerFired:),
        collapse_timer_fired as unsafe extern "C-unwind" fn(_, _, _),
    );

    // Drag and drop
    builder.add_method(
        sel!(draggingEntered:),
        dragging_entered as unsafe extern "C-unwind" fn(_, _, _) -> _,
    );
    builder.add_method(
        sel!(draggingUpdated:),
        dragging_entered as unsafe extern "C-unwind" fn(_, _, _) -> _,
    );
    builder.add_method(
        sel!(performDragOperation:),
        perform_drag_operation as unsafe extern "C-unwind" fn(_, _, _) -> _,
    );

    builder.add_method(
        sel!(dispatchTick:),
        dispatch_tick as unsafe extern "C-unwind" fn(_, _, _),
    );
}

unsafe fn initialize_view_ivars(view: id) {
    set_bool_ivar(view, "_expanded", false);
    (*view).store_ivar::<id>("_label", nil);
    (*view).store_ivar::<id>("_collapseTimer", nil);
    (*view).store_ivar::<u64>("_collapseToken", 0);
    (*view).store_ivar::<id>("_dispatchTimer", nil);
}

unsafe fn install_tracking_area(view: id) {
    let area: id = msg_send![get_class("NSTrackingArea"), alloc];
    let area: id = msg_send![
        area,
        initWithRect: NSRect::new(NSPoint::new(0.0, 0.0), NSSize::new(0.0, 0.0)),
        options: TRACKING_OPTIONS,
        owner: view,
        userInfo: nil
    ];
    let _: () = msg_send![view, addTrackingArea: area];
}

unsafe fn register_drag_types(view: id) {
    let types: id = msg_send![get_class("NSArray"), arrayWithObject: nsstring_id(FILE_URL_TYPE)];
    let _: () = msg_send![view, registerForDraggedTypes: types];
}

// ============================================================================
// Size label
// ============================================================================

unsafe fn install_label(view: id) {
    let label: id = msg_send![
        get_class("NSTextField"),
        labelWithString: nsstring_id(WindowState::Collapsed.label())
    ];
    let _: () = msg_send![label, setAlignment: NSTextAlignment::Center];
    let white: id = msg_send![get_class("NSColor"), whiteColor];
    let _: () = msg_send![label, setTextColor: white];
    let _: () = msg_send![view, addSubview: label];
    (*view).store_ivar::<id>("_label", label);
}

/// Update the label text and center it for `state`.
///
/// # Safety
/// Must be called from the main thread. `view` must be a `DuMemoWidgetView`.
pub unsafe fn layout_label(view: id, state: WindowState) {
    let label: id = *(*view).load_ivar::<id>("_label");
    if label.is_null() {
        return;
    }
    let font_size = if state.is_expanded() { 28.0 } else { 13.0 };
    let font: id = msg_send![get_class("NSFont"), boldSystemFontOfSize: font_size];
    let _: () = msg_send![label, setFont: font];
    let _: () = msg_send![label, setStringValue: nsstring_id(state.label())];

    let size = state.size();
    let height = font_size * 1.6;
    let frame = NSRect::new(
        NSPoint::new(0.0, (size - height) / 2.0),
        NSSize::new(size, height),
    );
    let _: () = msg_send![label, setFrame: frame];
}

// ============================================================================
// Timers
// ============================================================================

/// Create a timer on the current run loop in common modes, so it keeps
/// firing during drags and modal panels.
unsafe fn create_timer(target: id, selector: Sel, interval: f64, repeats: bool) -> id {
    let timer: id = msg_send![
        get_class("NSTimer"),
        timerWithTimeInterval: interval,
        target: target,
        selector: selector,
        userInfo: nil,
        repeats: Bool::new(repeats)
    ];
    let run_loop: id = msg_send![get_class("NSRunLoop"), currentRunLoop];
    let common_modes = nsstring_id("kCFRunLoopCommonModes");
    let _: () = msg_send![run_loop, addTimer: timer, forMode: common_modes];
    timer
}

/// Start the main-thread tick that drains the event bus.
///
/// # Safety
/// Must be called from the main thread. `view` must be a `DuMemoWidgetView`.
pub unsafe fn start_dispatch_timer(view: id) -> id {
    let prev: id = *(*view).load_ivar::<id>("_dispatchTimer");
    if !prev.is_null() {
        let _: () = msg_send![prev, invalidate];
    }
    let timer = create_timer(view, sel!(dispatchTick:), EVENT_TICK_SECS, true);
    (*view).store_ivar::<id>("_dispatchTimer", timer);
    timer
}

/// Invalidate and release the pending collapse timer, if any.
unsafe fn cancel_collapse_timer(view: id) {
    let timer: id = *(*view).load_ivar::<id>("_collapseTimer");
    if !timer.is_null() {
        let _: () = msg_send![timer, invalidate];
        let _: () = msg_send![timer, release];
        (*view).store_ivar::<id>("_collapseTimer", nil);
    }
}

unsafe fn arm_collapse_timer(view: id, pending: PendingCollapse) {
    cancel_collapse_timer(view);
    let timer = create_timer(
        view,
        sel!(collapseTimerFired:),
        pending.delay.as_secs_f64(),
        false,
    );
    let _: id = msg_send![timer, retain];
    (*view).store_ivar::<id>("_collapseTimer", timer);
    (*view).store_ivar::<u64>("_collapseToken", pending.token);
    debug!(token = pending.token, "Collapse scheduled");
}

// ============================================================================
// Methods (extern "C-unwind" for the Objective-C runtime)
// ============================================================================

unsafe extern "C-unwind" fn draw_rect(this: &mut AnyObject, _cmd: Sel, _dirty: NSRect) {
    let view = this as *mut _ as id;
    let bounds: NSRect = msg_send![view, bounds];
    let (r, g, b, a) = if get_bool_ivar(view, "_expanded") {
        EXPANDED_COLOR
    } else {
        COLLAPSED_COLOR
    };
    let radius = CORNER_RADIUS
        .min(bounds.size.width / 2.0)
        .min(bounds.size.height / 2.0);

    let color: id = msg_send![
        get_class("NSColor"),
        colorWithCalibratedRed: r,
        green: g,
        blue: b,
        alpha: a
    ];
    let _: () = msg_send![color, setFill];
    let path: id = msg_send![
        get_class("NSBezierPath"),
        bezierPathWithRoundedRect: bounds,
        xRadius: radius,
        yRadius: radius
    ];
    let _: () = msg_send![path, fill];
}

unsafe extern "C-unwind" fn mouse_entered(this: &mut AnyObject, _cmd: Sel, _event: id) {
    let view = this as *mut _ as id;
    cancel_collapse_timer(view);
    if let Some(state) = with_hover(|m| m.hover_entered()).flatten() {
        apply_window_state(view, state);
    }
}

unsafe extern "C-unwind" fn mouse_exited(this: &mut AnyObject, _cmd: Sel, _event: id) {
    let view = this as *mut _ as id;
    if let Some(pending) = with_hover(|m| m.hover_exited(Instant::now())).flatten() {
        arm_collapse_timer(view, pending);
    }
}

unsafe extern "C-unwind" fn collapse_timer_fired(this: &mut AnyObject, _cmd: Sel, _timer: id) {
    let view = this as *mut _ as id;
    cancel_collapse_timer(view);
    let token = *(*view).load_ivar::<u64>("_collapseToken");
    if let Some(state) = with_hover(|m| m.collapse_elapsed(token)).flatten() {
        apply_window_state(view, state);
    }
}

unsafe extern "C-unwind" fn dragging_entered(
    _this: &mut AnyObject,
    _cmd: Sel,
    _sender: id,
) -> usize {
    DRAG_OPERATION_COPY
}

unsafe extern "C-unwind" fn perform_drag_operation(
    _this: &mut AnyObject,
    _cmd: Sel,
    sender: id,
) -> Bool {
    match first_dropped_file(sender) {
        Some(path) => {
            info!(path = %path.display(), "File dropped");
            publish(AppEvent::FileDropped(path));
            YES
        }
        None => {
            debug!("Drop carried no file URL");
            NO
        }
    }
}

unsafe extern "C-unwind" fn dispatch_tick(_this: &mut AnyObject, _cmd: Sel, _timer: id) {
    dispatch_events();
}

/// First file URL on the dragging pasteboard. Further items are ignored.
unsafe fn first_dropped_file(sender: id) -> Option<PathBuf> {
    let pasteboard: id = msg_send![sender, draggingPasteboard];
    let classes: id = msg_send![get_class("NSArray"), arrayWithObject: get_class("NSURL")];
    let urls: id = msg_send![pasteboard, readObjectsForClasses: classes, options: nil];
    if urls.is_null() {
        return None;
    }
    let count: usize = msg_send![urls, count];
    (0..count).find_map(|i| {
        let url: id = msg_send![urls, objectAtIndex: i];
        let is_file: bool = msg_send![url, isFileURL];
        if is_file {
            path_from_nsurl(url)
        } else {
            None
        }
    })
}
