//! Event handling on the main thread.

pub mod dispatcher;

pub use dispatcher::dispatch_events;
