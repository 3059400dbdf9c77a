//! The drop pipeline: authorize → relocate → analyze → open.
//!
//! A drop is split in two halves so the AppKit host can keep the main thread
//! responsive:
//!
//! - [`DropPipeline::stage`] authorizes the target directory (may prompt),
//!   claims the directory's single-flight slot and moves the file inside a
//!   scoped access session. Runs on the main thread.
//! - [`Analysis::process`] runs the analysis script and the opener. Safe to
//!   run on a worker thread; the slot is released when it returns.
//!
//! [`DropPipeline::run`] does both in sequence.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, info_span, warn};

use crate::access::{Bookmarks, DirectoryAccess, DirectoryPrompt, TokenStore};
use crate::config::WidgetConfig;
use crate::error::{PipelineError, PreflightError, ProcessError};
use crate::opener::{BatchScheduler, Launcher, OpenResult, TextFileOpener};
use crate::process::{ProcessInvocation, ProcessOutput};
use crate::relocate::relocate;

/// Whether later stages run after an earlier one failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelinePolicy {
    /// Run the opener after a failed, skipped or non-zero analysis.
    pub open_after_failed_analysis: bool,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            open_after_failed_analysis: true,
        }
    }
}

impl From<&WidgetConfig> for PipelinePolicy {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            open_after_failed_analysis: config.open_after_failed_analysis,
        }
    }
}

/// What happened to the analysis process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Succeeded(ProcessOutput),
    /// The process ran and exited non-zero (or by signal).
    ExitedWithFailure(ProcessOutput),
    /// A precondition failed; nothing was spawned.
    Skipped(PreflightError),
    SpawnFailed(String),
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Succeeded(_))
    }
}

/// Result of a drop that got past relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub destination: PathBuf,
    pub analysis: AnalysisOutcome,
    /// `None` when the policy suppressed the opener.
    pub opened: Option<OpenResult>,
}

// ============================================================================
// Single-flight guard
// ============================================================================

/// At most one drop in progress per target directory.
#[derive(Debug, Clone, Default)]
pub struct FlightGuard {
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl FlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `dir`, or `None` if a drop into it is in progress.
    pub fn try_acquire(&self, dir: &Path) -> Option<FlightToken> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(dir.to_path_buf()) {
            return None;
        }
        Some(FlightToken {
            dir: dir.to_path_buf(),
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, dir: &Path) -> bool {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.contains(dir)
    }
}

/// Releases its directory when dropped.
#[derive(Debug)]
pub struct FlightToken {
    dir: PathBuf,
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl Drop for FlightToken {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.remove(&self.dir);
    }
}

// ============================================================================
// Stages
// ============================================================================

/// A file moved into the authorized directory, awaiting analysis.
#[derive(Debug)]
pub struct StagedDrop {
    pub directory: PathBuf,
    pub destination: PathBuf,
    _flight: FlightToken,
}

/// Analysis and opening; shareable with worker threads.
pub struct Analysis<L, Q> {
    config: WidgetConfig,
    opener: TextFileOpener<L, Q>,
    policy: PipelinePolicy,
}

impl<L: Launcher, Q: BatchScheduler> Analysis<L, Q> {
    pub fn new(config: WidgetConfig, launcher: L, scheduler: Q) -> Self {
        let opener = TextFileOpener::new(&config, launcher, scheduler);
        let policy = PipelinePolicy::from(&config);
        Self {
            config,
            opener,
            policy,
        }
    }

    pub fn with_policy(mut self, policy: PipelinePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn opener(&self) -> &TextFileOpener<L, Q> {
        &self.opener
    }

    /// Run the script in the staged directory, then open its text files.
    pub fn process(&self, staged: StagedDrop) -> PipelineReport {
        let _span = info_span!("analysis", dir = %staged.directory.display()).entered();

        let invocation = ProcessInvocation::for_analysis(&self.config, &staged.directory);
        let analysis = match invocation.run() {
            Ok(output) if output.success() => AnalysisOutcome::Succeeded(output),
            Ok(output) => AnalysisOutcome::ExitedWithFailure(output),
            Err(ProcessError::Preflight(e)) => {
                warn!(error = %e, "Analysis skipped");
                AnalysisOutcome::Skipped(e)
            }
            Err(e) => {
                warn!(error = %e, "Analysis could not start");
                AnalysisOutcome::SpawnFailed(e.to_string())
            }
        };

        let opened = if analysis.is_success() || self.policy.open_after_failed_analysis {
            Some(self.opener.open_all(&staged.directory))
        } else {
            info!("Analysis failed, not opening results");
            None
        };

        PipelineReport {
            destination: staged.destination,
            analysis,
            opened,
        }
    }
}

/// The full drop pipeline.
pub struct DropPipeline<S, B, P, L, Q> {
    access: DirectoryAccess<S, B, P>,
    analysis: Arc<Analysis<L, Q>>,
    flights: FlightGuard,
}

impl<S, B, P, L, Q> DropPipeline<S, B, P, L, Q>
where
    S: TokenStore,
    B: Bookmarks,
    P: DirectoryPrompt,
    L: Launcher,
    Q: BatchScheduler,
{
    pub fn new(access: DirectoryAccess<S, B, P>, analysis: Analysis<L, Q>) -> Self {
        Self {
            access,
            analysis: Arc::new(analysis),
            flights: FlightGuard::new(),
        }
    }

    pub fn access(&self) -> &DirectoryAccess<S, B, P> {
        &self.access
    }

    /// Shared handle for worker threads.
    pub fn analysis(&self) -> Arc<Analysis<L, Q>> {
        Arc::clone(&self.analysis)
    }

    pub fn flights(&self) -> &FlightGuard {
        &self.flights
    }

    /// Authorize, claim the directory and move `source` into it.
    pub fn stage(&self, source: &Path) -> Result<StagedDrop, PipelineError> {
        let _span = info_span!("stage", source = %source.display()).entered();

        let dir = self.access.authorize()?;
        let flight = self
            .flights
            .try_acquire(dir.path())
            .ok_or_else(|| PipelineError::Busy(dir.path().to_path_buf()))?;

        let destination = {
            let _session = self.access.session(&dir);
            relocate(source, dir.path())?
        };

        Ok(StagedDrop {
            directory: dir.path().to_path_buf(),
            destination,
            _flight: flight,
        })
    }

    /// Stage and process on the calling thread.
    pub fn run(&self, source: &Path) -> Result<PipelineReport, PipelineError> {
        let staged = self.stage(source)?;
        Ok(self.analysis.process(staged))
    }
}
