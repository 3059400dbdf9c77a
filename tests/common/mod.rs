//! Fakes shared by the integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use dumemo::access::DirectoryPrompt;
use dumemo::config::WidgetConfig;
use dumemo::opener::{BatchScheduler, EditorCommand, Launcher};
use dumemo::process::ProcessOutput;

/// Launcher that records calls and answers with a scripted editor result.
#[derive(Default)]
pub struct FakeLauncher {
    exit_code: Option<i32>,
    stderr: String,
    spawn_fails: bool,
    pub editor_calls: Mutex<Vec<Vec<PathBuf>>>,
    pub default_opened: Mutex<Vec<PathBuf>>,
}

impl FakeLauncher {
    /// Editor exits 0.
    pub fn succeeding() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    /// Editor exits 1 with `stderr`.
    pub fn failing(stderr: &str) -> Self {
        Self {
            exit_code: Some(1),
            stderr: stderr.to_string(),
            ..Self::default()
        }
    }

    /// Editor process cannot be started at all.
    pub fn unspawnable() -> Self {
        Self {
            spawn_fails: true,
            ..Self::default()
        }
    }

    pub fn editor_calls(&self) -> Vec<Vec<PathBuf>> {
        self.editor_calls.lock().unwrap().clone()
    }

    pub fn default_opened(&self) -> Vec<PathBuf> {
        self.default_opened.lock().unwrap().clone()
    }
}

impl Launcher for FakeLauncher {
    fn launch_editor(
        &self,
        _editor: &EditorCommand,
        files: &[PathBuf],
    ) -> io::Result<ProcessOutput> {
        self.editor_calls.lock().unwrap().push(files.to_vec());
        if self.spawn_fails {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        Ok(ProcessOutput {
            exit_code: self.exit_code,
            stdout: String::new(),
            stderr: self.stderr.clone(),
        })
    }

    fn open_with_default(&self, file: &Path) -> io::Result<()> {
        self.default_opened.lock().unwrap().push(file.to_path_buf());
        Ok(())
    }
}

/// Scheduler that records batches instead of deferring them.
#[derive(Default)]
pub struct RecordingScheduler {
    pub scheduled: Mutex<Vec<(Duration, Vec<PathBuf>)>>,
}

impl RecordingScheduler {
    pub fn scheduled(&self) -> Vec<(Duration, Vec<PathBuf>)> {
        self.scheduled.lock().unwrap().clone()
    }
}

impl BatchScheduler for RecordingScheduler {
    fn schedule(&self, delay: Duration, files: Vec<PathBuf>) {
        self.scheduled.lock().unwrap().push((delay, files));
    }
}

/// Prompt that always gives the same answer and counts calls.
pub struct FixedPrompt {
    answer: Option<PathBuf>,
    pub calls: Cell<usize>,
}

impl FixedPrompt {
    pub fn choosing(dir: &Path) -> Self {
        Self {
            answer: Some(dir.to_path_buf()),
            calls: Cell::new(0),
        }
    }

    pub fn cancelling() -> Self {
        Self {
            answer: None,
            calls: Cell::new(0),
        }
    }
}

impl DirectoryPrompt for FixedPrompt {
    fn choose_directory(&self, _default: &Path) -> Option<PathBuf> {
        self.calls.set(self.calls.get() + 1);
        self.answer.clone()
    }
}

/// Config running `script` with `/bin/sh` in `working_directory`, with no
/// editor installed at known paths.
pub fn shell_config(script: &Path, working_directory: &Path) -> WidgetConfig {
    WidgetConfig {
        script_path: script.to_path_buf(),
        working_directory: working_directory.to_path_buf(),
        interpreter_path: PathBuf::from("/bin/sh"),
        interpreter_env_dir: None,
        editor_candidates: Vec::new(),
        ..WidgetConfig::default()
    }
}

/// Create `count` files named `file_NN.txt` in `dir`.
pub fn write_text_files(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("file_{i:02}.txt"));
            fs::write(&path, "x").unwrap();
            path
        })
        .collect()
}

pub fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort();
    paths
}
