//! Error types for the drop pipeline.
//!
//! Each stage has its own enum so callers can decide per stage whether to
//! halt or continue. Editor launch failures are not errors; they are reported
//! through [`crate::opener::OpenResult`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::error;

/// Failures while authorizing the target directory.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("directory authorization denied by user")]
    AuthorizationDenied,

    #[error("could not create authorization token for '{path}': {message}")]
    Bookmark { path: PathBuf, message: String },

    #[error("could not resolve stored authorization token: {0}")]
    Resolve(String),

    #[error("could not persist authorization token: {0}")]
    Store(String),
}

/// Failures while moving a dropped file into the target directory.
#[derive(Error, Debug)]
pub enum RelocationError {
    #[error("source file '{0}' does not exist")]
    MissingSource(PathBuf),

    #[error("source path '{0}' has no file name")]
    InvalidSource(PathBuf),

    #[error("could not create target directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not move '{from}' to '{to}': {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelocationError {
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::CreateDirectory { source, .. } | Self::Move { source, .. } => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}

/// A precondition that failed before any process was spawned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreflightError {
    #[error("script not found: {0}")]
    ScriptMissing(PathBuf),

    #[error("working directory does not exist: {0}")]
    WorkingDirectoryMissing(PathBuf),

    #[error("working directory is not a directory: {0}")]
    WorkingDirectoryNotDirectory(PathBuf),

    #[error("executable not found: {0}")]
    ExecutableMissing(PathBuf),
}

/// Failures of the external process runner.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error("failed to spawn '{executable}': {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures that end a drop before the analysis stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Relocation(#[from] RelocationError),

    #[error("a drop into '{0}' is already in progress")]
    Busy(PathBuf),
}

impl PipelineError {
    /// True when the user cancelled the directory prompt.
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Access(AccessError::AuthorizationDenied))
    }
}

/// Extension trait for logging and discarding errors.
pub trait ResultExt<T> {
    fn log_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                let caller = std::panic::Location::caller();
                error!(error = %e, file = caller.file(), line = caller.line(), "Operation failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_detection() {
        let err = RelocationError::Move {
            from: PathBuf::from("/a"),
            to: PathBuf::from("/b"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_permission_denied());
        assert!(!RelocationError::MissingSource(PathBuf::from("/a")).is_permission_denied());
    }

    #[test]
    fn test_preflight_converts_into_process_error() {
        let err: ProcessError = PreflightError::ScriptMissing(PathBuf::from("/s.py")).into();
        assert_eq!(err.to_string(), "script not found: /s.py");
    }

    #[test]
    fn test_denied_detection() {
        let err: PipelineError = AccessError::AuthorizationDenied.into();
        assert!(err.is_denied());
        assert!(!PipelineError::Busy(PathBuf::from("/d")).is_denied());
    }

    #[test]
    fn test_log_err_maps_to_option() {
        let ok: Result<u8, String> = Ok(3);
        let err: Result<u8, String> = Err("boom".into());
        assert_eq!(ok.log_err(), Some(3));
        assert_eq!(err.log_err(), None);
    }
}
