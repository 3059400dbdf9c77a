//! Owners of the hover state machine and the drop pipeline.
//!
//! Both live in thread-locals on the main thread. They are kept apart so a
//! hover callback that fires while the pipeline is busy (for example during
//! the directory prompt's modal loop) can still update the window.

use std::cell::RefCell;

use tracing::debug;

use crate::access::DirectoryAccess;
use crate::config::WidgetConfig;
use crate::events::{EventBusScheduler, EventPublisher};
use crate::model::HoverStateMachine;
use crate::opener::SystemLauncher;
use crate::pipeline::{Analysis, DropPipeline};
use crate::platform::macos::storage::{SecurityScopedBookmarks, UserDefaultsTokenStore};
use crate::platform::macos::ui::OpenPanelPrompt;

/// The pipeline wired to AppKit storage, the open panel and real processes.
pub type MacPipeline = DropPipeline<
    UserDefaultsTokenStore,
    SecurityScopedBookmarks,
    OpenPanelPrompt,
    SystemLauncher,
    EventBusScheduler,
>;

thread_local! {
    static HOVER: RefCell<HoverStateMachine> = RefCell::new(HoverStateMachine::new());
    static PIPELINE: RefCell<Option<MacPipeline>> = const { RefCell::new(None) };
}

/// Build the pipeline for `config`. Deferred batches go through `publisher`.
pub fn build_pipeline(config: WidgetConfig, publisher: EventPublisher) -> MacPipeline {
    let access = DirectoryAccess::new(
        UserDefaultsTokenStore::default(),
        SecurityScopedBookmarks::new(),
        OpenPanelPrompt,
        config.working_directory.clone(),
    );
    let analysis = Analysis::new(config, SystemLauncher, EventBusScheduler::new(publisher));
    DropPipeline::new(access, analysis)
}

/// Make `pipeline` the one used by the dispatcher.
pub fn install_pipeline(pipeline: MacPipeline) {
    PIPELINE.with(|slot| *slot.borrow_mut() = Some(pipeline));
}

/// Run `f` with the hover state machine.
pub fn with_hover<R>(f: impl FnOnce(&mut HoverStateMachine) -> R) -> Option<R> {
    HOVER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut machine) => Some(f(&mut machine)),
        Err(_) => {
            debug!("Hover state busy, ignoring callback");
            None
        }
    })
}

/// Run `f` with the installed pipeline.
///
/// Returns `None` when no pipeline is installed or when called re-entrantly.
pub fn with_pipeline<R>(f: impl FnOnce(&MacPipeline) -> R) -> Option<R> {
    PIPELINE.with(|cell| match cell.try_borrow() {
        Ok(slot) => slot.as_ref().map(f),
        Err(_) => None,
    })
}
