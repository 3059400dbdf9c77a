//! Event system for decoupled inter-module communication.
//!
//! AppKit callbacks (drag and drop) and worker threads (batch timers, drop
//! pipelines) publish events; the main-thread dispatcher drains them on a
//! short repeating timer. Nothing that may block or show a modal runs inside
//! an AppKit callback.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Drop view  │     │ Batch timer │     │ Drop worker │
//! │  (AppKit)   │     │  (thread)   │     │  (thread)   │
//! └──────┬──────┘     └──────┬──────┘     └──────┬──────┘
//!        │ publish()         │ publish()         │ publish()
//!        ▼                   ▼                   ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                     EventBus                        │
//! │                   (mpsc channel)                    │
//! └─────────────────────────┬───────────────────────────┘
//!                           │ drain()
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                    Dispatcher                       │
//! │                (main thread timer)                  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - [`types`]: Event definitions (`AppEvent` enum)
//! - [`bus`]: `EventBus` and `EventPublisher` types
//! - [`global`]: Static access functions
//! - [`scheduler`]: Deferred publishing for editor batches

pub mod bus;
pub mod global;
pub mod scheduler;
pub mod types;

// Re-export main types for convenient access
pub use bus::{EventBus, EventPublisher};
pub use global::{drain_events, init_event_bus, publish, publisher};
pub use scheduler::EventBusScheduler;
pub use types::AppEvent;
