//! macOS-specific entry point and application logic.
//!
//! The widget view lives in platform/macos/ui/widget/view.rs.

use dumemo::config::WidgetConfig;
use dumemo::events::publisher;
use dumemo::platform::macos::app::{build_pipeline, install_pipeline};
use dumemo::platform::macos::ffi::bridge::{autoreleasepool, id, msg_send, NSApp, YES};
use dumemo::platform::macos::ui::{make_widget_window, start_dispatch_timer};

use tracing::{error, info};

/// Main entry point for macOS.
pub fn run() {
    // Event bus is already initialized by main()

    autoreleasepool(|| unsafe {
        let config = WidgetConfig::load();
        info!(
            working_directory = %config.working_directory.display(),
            script = %config.script_path.display(),
            "Configuration loaded"
        );

        let Some(bus) = publisher() else {
            error!("Event bus not initialized");
            return;
        };
        install_pipeline(build_pipeline(config, bus));

        let app = NSApp();
        // NSApplicationActivationPolicyRegular = 0
        let _: bool = msg_send![app, setActivationPolicy: 0i64];

        let (window, view): (id, id) = make_widget_window();
        // Keep window and view alive past the autorelease pool
        let _: id = msg_send![window, retain];
        let _: id = msg_send![view, retain];
        let _: () = msg_send![window, orderFrontRegardless];

        start_dispatch_timer(view);

        let _: () = msg_send![app, activateIgnoringOtherApps: YES];
        info!("Widget ready");
        let _: () = msg_send![app, run];
    });
}
