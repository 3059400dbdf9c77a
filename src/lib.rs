#![allow(unexpected_cfgs)] // Silence cfg warnings from objc macros

//! DuMemo: a floating drop widget that files a document into an authorized
//! directory, runs an analysis script there and opens the text files it
//! produced.
//!
//! Everything outside `platform` is free of macOS FFI so tests can run as
//! normal integration tests.

pub mod access;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod opener;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod relocate;

pub use config::WidgetConfig;
pub use error::{AccessError, PipelineError, PreflightError, ProcessError, RelocationError};
pub use events::{AppEvent, EventBus, EventPublisher};
pub use model::{HoverStateMachine, WindowState};
pub use opener::{OpenResult, TextFileOpener};
pub use pipeline::{Analysis, DropPipeline, PipelineReport};
