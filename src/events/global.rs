//! Global access to the application event bus.
//!
//! The bus is initialized once at startup via `init_event_bus()`; after that
//! AppKit callbacks, which cannot carry Rust state, publish through the
//! free functions here.
//!
//! - `Sender` is stored in `OnceLock` - it's `Send + Sync`, perfect for static
//! - `Receiver` is stored in `Mutex` - only accessed from main thread

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, OnceLock};

use tracing::warn;

use super::bus::EventPublisher;
use super::types::AppEvent;

static SENDER: OnceLock<Sender<AppEvent>> = OnceLock::new();

static RECEIVER: OnceLock<Mutex<Receiver<AppEvent>>> = OnceLock::new();

/// Initialize the global event bus.
///
/// Returns `false` if it was already initialized.
pub fn init_event_bus() -> bool {
    let (sender, receiver) = mpsc::channel();
    SENDER.set(sender).is_ok() && RECEIVER.set(Mutex::new(receiver)).is_ok()
}

/// Get a publisher handle for the global event bus.
pub fn publisher() -> Option<EventPublisher> {
    SENDER.get().map(|s| EventPublisher::from_sender(s.clone()))
}

/// Publish an event to the global event bus.
pub fn publish(event: AppEvent) {
    match SENDER.get() {
        Some(sender) => {
            let _ = sender.send(event);
        }
        None => warn!(?event, "Event bus not initialized, dropping event"),
    }
}

/// Drain all pending events from the global event bus.
pub fn drain_events() -> Vec<AppEvent> {
    let Some(receiver) = RECEIVER.get() else {
        return Vec::new();
    };
    let receiver = receiver.lock().unwrap_or_else(|e| e.into_inner());

    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
