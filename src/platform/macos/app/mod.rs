//! Main-thread state shared by the widget view and the event dispatcher.

pub mod controller;

pub use controller::{
    build_pipeline, install_pipeline, with_hover, with_pipeline, MacPipeline,
};
