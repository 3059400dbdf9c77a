//! Running the analysis interpreter.
//!
//! The runner checks its preconditions before spawning so a missing script,
//! working directory or interpreter is reported without side effects. The
//! child runs to completion with stdout and stderr fully buffered in memory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::config::WidgetConfig;
use crate::error::{PreflightError, ProcessError};

/// Longest stdout/stderr excerpt written to the log.
const LOG_EXCERPT_CHARS: usize = 2000;

/// Everything needed to run the analysis script once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    pub executable: PathBuf,
    pub script: PathBuf,
    pub working_directory: PathBuf,
    /// Prepended to the inherited `PATH`.
    pub path_prefix: Option<PathBuf>,
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<Output> for ProcessOutput {
    fn from(output: Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl ProcessInvocation {
    /// Invocation for the configured script with `working_directory` as cwd.
    pub fn for_analysis(config: &WidgetConfig, working_directory: &Path) -> Self {
        Self {
            executable: config.interpreter_path.clone(),
            script: config.script_path.clone(),
            working_directory: working_directory.to_path_buf(),
            path_prefix: config.interpreter_env_dir.clone(),
        }
    }

    /// Check script, working directory and executable, in that order.
    pub fn preflight(&self) -> Result<(), PreflightError> {
        if !self.script.is_file() {
            return Err(PreflightError::ScriptMissing(self.script.clone()));
        }
        if !self.working_directory.exists() {
            return Err(PreflightError::WorkingDirectoryMissing(
                self.working_directory.clone(),
            ));
        }
        if !self.working_directory.is_dir() {
            return Err(PreflightError::WorkingDirectoryNotDirectory(
                self.working_directory.clone(),
            ));
        }
        if !self.executable.is_file() {
            return Err(PreflightError::ExecutableMissing(self.executable.clone()));
        }
        Ok(())
    }

    /// `PATH` value for the child.
    pub fn search_path(&self) -> Option<OsString> {
        let prefix = self.path_prefix.as_ref()?;
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![prefix.clone()];
        paths.extend(std::env::split_paths(&inherited));
        std::env::join_paths(paths).ok()
    }

    /// Preflight, then run to completion.
    #[instrument(skip_all, fields(script = %self.script.display()))]
    pub fn run(&self) -> Result<ProcessOutput, ProcessError> {
        self.preflight()?;

        let mut command = Command::new(&self.executable);
        command
            .arg(&self.script)
            .current_dir(&self.working_directory)
            .stdin(Stdio::null());
        if let Some(path) = self.search_path() {
            command.env("PATH", path);
        }

        debug!(
            executable = %self.executable.display(),
            cwd = %self.working_directory.display(),
            "Spawning analysis process"
        );
        let start = Instant::now();
        let output = command.output().map_err(|e| ProcessError::Spawn {
            executable: self.executable.clone(),
            source: e,
        })?;
        let output = ProcessOutput::from(output);
        let duration_ms = start.elapsed().as_millis() as u64;

        debug!(
            stdout = %excerpt(&output.stdout),
            stderr = %excerpt(&output.stderr),
            "Process output"
        );
        if output.success() {
            info!(duration_ms, "Analysis finished");
        } else {
            warn!(
                duration_ms,
                exit_code = ?output.exit_code,
                stderr = %excerpt(&output.stderr),
                "Analysis exited with failure"
            );
        }
        Ok(output)
    }
}

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(LOG_EXCERPT_CHARS) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn invocation(root: &Path, script_body: &str) -> ProcessInvocation {
        let script = root.join("job.sh");
        fs::write(&script, script_body).unwrap();
        ProcessInvocation {
            executable: PathBuf::from("/bin/sh"),
            script,
            working_directory: root.to_path_buf(),
            path_prefix: None,
        }
    }

    #[test]
    fn test_preflight_reports_missing_script_first() {
        let inv = ProcessInvocation {
            executable: PathBuf::from("/missing/python"),
            script: PathBuf::from("/missing/script.py"),
            working_directory: PathBuf::from("/missing/dir"),
            path_prefix: None,
        };
        assert_eq!(
            inv.preflight(),
            Err(PreflightError::ScriptMissing(PathBuf::from("/missing/script.py")))
        );
    }

    #[test]
    fn test_preflight_reports_missing_directory() {
        let root = tempdir().unwrap();
        let mut inv = invocation(root.path(), "true");
        inv.working_directory = root.path().join("gone");
        assert!(matches!(
            inv.preflight(),
            Err(PreflightError::WorkingDirectoryMissing(_))
        ));
    }

    #[test]
    fn test_preflight_reports_file_as_directory() {
        let root = tempdir().unwrap();
        let mut inv = invocation(root.path(), "true");
        inv.working_directory = inv.script.clone();
        assert!(matches!(
            inv.preflight(),
            Err(PreflightError::WorkingDirectoryNotDirectory(_))
        ));
    }

    #[test]
    fn test_preflight_reports_missing_executable() {
        let root = tempdir().unwrap();
        let mut inv = invocation(root.path(), "true");
        inv.executable = root.path().join("python");
        assert!(matches!(
            inv.preflight(),
            Err(PreflightError::ExecutableMissing(_))
        ));
    }

    #[test]
    fn test_failed_preflight_spawns_nothing() {
        let root = tempdir().unwrap();
        let mut inv = invocation(root.path(), "touch spawned.txt");
        inv.executable = root.path().join("python");
        assert!(matches!(inv.run(), Err(ProcessError::Preflight(_))));
        assert!(!root.path().join("spawned.txt").exists());
    }

    #[test]
    fn test_unspawnable_executable_is_spawn_error() {
        let root = tempdir().unwrap();
        let mut inv = invocation(root.path(), "touch spawned.txt");
        let executable = root.path().join("plain-file");
        fs::write(&executable, "").unwrap();
        inv.executable = executable.clone();

        assert_eq!(inv.preflight(), Ok(()));
        match inv.run() {
            Err(ProcessError::Spawn { executable: e, .. }) => assert_eq!(e, executable),
            other => panic!("expected spawn error, got {other:?}"),
        }
        assert!(!root.path().join("spawned.txt").exists());
    }

    #[test]
    fn test_run_captures_output_and_cwd() {
        let root = tempdir().unwrap();
        let inv = invocation(
            root.path(),
            "echo out; echo err >&2; touch produced.txt\n",
        );
        let output = inv.run().unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(root.path().join("produced.txt").exists());
    }

    #[test]
    fn test_run_reports_nonzero_exit() {
        let root = tempdir().unwrap();
        let inv = invocation(root.path(), "exit 3\n");
        let output = inv.run().unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
    }

    #[test]
    fn test_path_prefix_is_prepended() {
        let root = tempdir().unwrap();
        let mut inv = invocation(root.path(), "printf '%s' \"$PATH\"\n");
        inv.path_prefix = Some(PathBuf::from("/opt/env/bin"));
        let output = inv.run().unwrap();
        assert!(output.stdout.starts_with("/opt/env/bin"));
    }

    #[test]
    fn test_for_analysis_uses_config() {
        let config = WidgetConfig::default();
        let inv = ProcessInvocation::for_analysis(&config, Path::new("/work"));
        assert_eq!(inv.executable, config.interpreter_path);
        assert_eq!(inv.script, config.script_path);
        assert_eq!(inv.working_directory, PathBuf::from("/work"));
        assert_eq!(inv.path_prefix, config.interpreter_env_dir);
    }

    #[test]
    fn test_excerpt_truncates_long_text() {
        let long = "x".repeat(LOG_EXCERPT_CHARS + 10);
        assert_eq!(excerpt(&long).len(), LOG_EXCERPT_CHARS);
        assert_eq!(excerpt("short"), "short");
    }
}
