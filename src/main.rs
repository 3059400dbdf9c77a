#![allow(unexpected_cfgs)] // Silence cfg warnings from objc macros

#[cfg(target_os = "macos")]
mod macos_main;

fn main() {
    let _log_guard = dumemo::logging::init();

    if !dumemo::events::init_event_bus() {
        tracing::warn!("Event bus was already initialized");
    }

    #[cfg(target_os = "macos")]
    macos_main::run();

    #[cfg(not(target_os = "macos"))]
    {
        tracing::error!("DuMemo only runs on macOS");
        std::process::exit(1);
    }
}
