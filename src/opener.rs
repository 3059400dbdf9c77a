//! Opening produced text files in an external editor.
//!
//! The primary attempt hands at most [`MAX_PRIMARY_FILES`] paths to the editor
//! launcher in one invocation. When that fails the captured stderr picks the
//! fallback:
//!
//! | stderr contains                                  | fallback                              |
//! |--------------------------------------------------|---------------------------------------|
//! | `command not found`, `No such file or directory` | default handler, one file at a time   |
//! | `too many open files`                            | batches of [`BATCH_SIZE`], deferred   |
//! | anything else                                    | log only                              |
//!
//! Directory listing order is whatever the filesystem returns, so which files
//! make the first twenty is not stable across systems.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::config::WidgetConfig;
use crate::model::constants::{
    BATCH_DELAY, BATCH_SIZE, EDITOR_SEARCH_PATH, FALLBACK_SHELL, MAX_PRIMARY_FILES,
};
use crate::process::ProcessOutput;

/// How the editor launcher is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// A launcher found at a known install path.
    Executable(PathBuf),
    /// Launcher looked up by name through the shell.
    Shell { shell: PathBuf, name: String },
}

impl EditorCommand {
    /// First existing candidate, else the shell fallback for `name`.
    pub fn locate(candidates: &[PathBuf], name: &str) -> Self {
        for candidate in candidates {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "Found editor launcher");
                return EditorCommand::Executable(candidate.clone());
            }
        }
        debug!(name, "No editor launcher installed at known paths, using shell");
        EditorCommand::Shell {
            shell: PathBuf::from(FALLBACK_SHELL),
            name: name.to_string(),
        }
    }

    /// Build the command for `files` with the minimal editor search path.
    pub fn command(&self, files: &[PathBuf]) -> Command {
        let mut command = match self {
            EditorCommand::Executable(path) => Command::new(path),
            EditorCommand::Shell { shell, name } => {
                let mut c = Command::new(shell);
                // Paths arrive as positional parameters and are never re-parsed.
                c.arg("-c").arg(format!("{name} \"$@\"")).arg("sh");
                c
            }
        };
        command
            .args(files)
            .env("PATH", EDITOR_SEARCH_PATH)
            .stdin(Stdio::null());
        command
    }
}

/// Why an editor launch failed, read from its stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchFailure {
    CommandNotFound,
    TooManyOpenFiles,
    Other,
}

impl LaunchFailure {
    pub fn classify(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        if lower.contains("command not found") || lower.contains("no such file or directory") {
            LaunchFailure::CommandNotFound
        } else if lower.contains("too many open files") {
            LaunchFailure::TooManyOpenFiles
        } else {
            LaunchFailure::Other
        }
    }
}

/// Outcome of an open attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenResult {
    /// Nothing qualified, or the directory could not be read.
    NoFiles,
    /// The editor accepted the files.
    Opened { count: usize },
    /// The editor was missing; files went to the default handler.
    OpenedWithDefaultHandler { opened: usize, failed: usize },
    /// Too many files at once; re-attempts were scheduled.
    Batched { batches: usize },
    /// The editor failed for another reason.
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Starts external processes for the opener.
pub trait Launcher: Send + Sync {
    fn launch_editor(
        &self,
        editor: &EditorCommand,
        files: &[PathBuf],
    ) -> io::Result<ProcessOutput>;
    fn open_with_default(&self, file: &Path) -> io::Result<()>;
}

/// Defers a batch of files to be opened later.
pub trait BatchScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, files: Vec<PathBuf>);
}

/// Launcher backed by real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch_editor(
        &self,
        editor: &EditorCommand,
        files: &[PathBuf],
    ) -> io::Result<ProcessOutput> {
        editor.command(files).output().map(ProcessOutput::from)
    }

    fn open_with_default(&self, file: &Path) -> io::Result<()> {
        open::that(file)
    }
}

/// Lists text files in a directory and opens them in the editor.
pub struct TextFileOpener<L, S> {
    launcher: L,
    scheduler: S,
    editor_candidates: Vec<PathBuf>,
    editor_name: String,
    extension: String,
}

impl<L: Launcher, S: BatchScheduler> TextFileOpener<L, S> {
    pub fn new(config: &WidgetConfig, launcher: L, scheduler: S) -> Self {
        Self {
            launcher,
            scheduler,
            editor_candidates: config.editor_candidates.clone(),
            editor_name: config.editor_name.clone(),
            extension: config.text_extension.clone(),
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Immediate children of `dir` with the text extension, in listing order.
    pub fn list_text_files(&self, dir: &Path) -> Vec<PathBuf> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Cannot list output directory");
                return Vec::new();
            }
        };
        entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.has_text_extension(path))
            .collect()
    }

    /// Open every qualifying file in `dir`.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn open_all(&self, dir: &Path) -> OpenResult {
        let files = self.list_text_files(dir);
        if files.is_empty() {
            info!("No text files to open");
            return OpenResult::NoFiles;
        }
        self.attempt(&files, true)
    }

    /// Open a deferred batch. A batch is not split again.
    pub fn open_batch(&self, files: &[PathBuf]) -> OpenResult {
        if files.is_empty() {
            return OpenResult::NoFiles;
        }
        self.attempt(files, false)
    }

    fn attempt(&self, files: &[PathBuf], allow_batching: bool) -> OpenResult {
        let primary = &files[..files.len().min(MAX_PRIMARY_FILES)];
        if primary.len() < files.len() {
            info!(
                total = files.len(),
                opening = primary.len(),
                "Capping editor invocation"
            );
        }

        let editor = EditorCommand::locate(&self.editor_candidates, &self.editor_name);
        let output = match self.launcher.launch_editor(&editor, primary) {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, editor = ?editor, "Editor launch failed");
                return self.open_each_with_default(primary);
            }
        };

        if output.success() {
            info!(count = primary.len(), "Opened files in editor");
            return OpenResult::Opened {
                count: primary.len(),
            };
        }

        match LaunchFailure::classify(&output.stderr) {
            LaunchFailure::CommandNotFound => {
                warn!(stderr = %output.stderr.trim(), "Editor not found, using default handler");
                self.open_each_with_default(primary)
            }
            LaunchFailure::TooManyOpenFiles if allow_batching => self.schedule_batches(files),
            failure => {
                warn!(
                    ?failure,
                    exit_code = ?output.exit_code,
                    stderr = %output.stderr.trim(),
                    "Editor failed to open files"
                );
                OpenResult::Failed {
                    exit_code: output.exit_code,
                    stderr: output.stderr,
                }
            }
        }
    }

    fn open_each_with_default(&self, files: &[PathBuf]) -> OpenResult {
        let mut opened = 0;
        let mut failed = 0;
        for file in files {
            match self.launcher.open_with_default(file) {
                Ok(()) => opened += 1,
                Err(e) => {
                    failed += 1;
                    warn!(file = %file.display(), error = %e, "Default handler failed");
                }
            }
        }
        OpenResult::OpenedWithDefaultHandler { opened, failed }
    }

    fn schedule_batches(&self, files: &[PathBuf]) -> OpenResult {
        let mut batches = 0;
        for (i, chunk) in files.chunks(BATCH_SIZE).enumerate() {
            let delay = BATCH_DELAY * (i as u32 + 1);
            self.scheduler.schedule(delay, chunk.to_vec());
            batches += 1;
        }
        info!(files = files.len(), batches, "Too many open files, batching");
        OpenResult::Batched { batches }
    }

    fn has_text_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}
