//! Event dispatcher for handling application events.
//!
//! The dispatcher receives events from the event bus and executes
//! the corresponding actions. It's called from the view's tick timer
//! and processes all pending events in batch.
//!
//! # Architecture
//!
//! ```text
//! EventBus::drain() → dispatch_events() → stage on main thread
//!                                       → analysis / batches on workers
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::{error, info, warn};

use crate::error::{PipelineError, ResultExt};
use crate::events::{drain_events, publisher, AppEvent};
use crate::pipeline::PipelineReport;
use crate::platform::macos::app::with_pipeline;

/// Skips re-entrant ticks.
///
/// The run loop keeps firing the tick timer while the directory prompt runs
/// its modal loop. Events queued meanwhile stay on the bus for a later tick.
static DISPATCH_GUARD: AtomicBool = AtomicBool::new(false);

/// Dispatch all pending events from the global event bus.
///
/// # Safety
///
/// Must be called from the main thread.
pub unsafe fn dispatch_events() {
    if DISPATCH_GUARD
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return;
    }

    for event in drain_events() {
        dispatch_single_event(event);
    }

    DISPATCH_GUARD.store(false, Ordering::SeqCst);
}

fn dispatch_single_event(event: AppEvent) {
    match event {
        AppEvent::FileDropped(path) => handle_drop(&path),
        AppEvent::OpenBatch(files) => handle_batch(files),
        AppEvent::DropFinished(dir) => {
            info!(dir = %dir.display(), "Drop finished");
        }
    }
}

/// Stage on the main thread, then analyze on a worker.
fn handle_drop(path: &Path) {
    let staged = with_pipeline(|pipeline| {
        pipeline
            .stage(path)
            .map(|staged| (staged, pipeline.analysis()))
    });

    let (staged, analysis) = match staged {
        None => {
            error!(path = %path.display(), "Drop received before the pipeline was installed");
            return;
        }
        Some(Err(e)) => {
            report_stage_error(path, &e);
            return;
        }
        Some(Ok(pair)) => pair,
    };

    let bus = publisher();
    let spawned = thread::Builder::new()
        .name("dumemo-analysis".to_string())
        .spawn(move || {
            let directory = staged.directory.clone();
            let report = analysis.process(staged);
            log_report(&report);
            if let Some(bus) = bus {
                bus.publish(AppEvent::DropFinished(directory));
            }
        });
    spawned.log_err();
}

fn handle_batch(files: Vec<PathBuf>) {
    let Some(analysis) = with_pipeline(|pipeline| pipeline.analysis()) else {
        warn!(count = files.len(), "Batch dropped, no pipeline installed");
        return;
    };
    let spawned = thread::Builder::new()
        .name("dumemo-batch".to_string())
        .spawn(move || {
            let result = analysis.opener().open_batch(&files);
            info!(count = files.len(), ?result, "Batch opened");
        });
    spawned.log_err();
}

fn report_stage_error(path: &Path, e: &PipelineError) {
    match e {
        e if e.is_denied() => {
            info!(path = %path.display(), "Drop cancelled, directory not authorized");
        }
        PipelineError::Busy(dir) => {
            warn!(
                path = %path.display(),
                dir = %dir.display(),
                "Drop rejected, target directory busy"
            );
        }
        e => error!(path = %path.display(), error = %e, "Drop failed"),
    }
}

fn log_report(report: &PipelineReport) {
    info!(
        destination = %report.destination.display(),
        analysis_succeeded = report.analysis.is_success(),
        opened = ?report.opened,
        "Pipeline complete"
    );
}
