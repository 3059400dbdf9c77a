//! Structured logging: JSONL to a file and compact lines to stderr.
//!
//! - **JSONL** at `~/Library/Logs/DuMemo/dumemo.jsonl`, one JSON object per line
//! - **Compact** human-readable output on stderr
//!
//! The default filter is `info`; `RUST_LOG` overrides it.
//!
//! ```rust,ignore
//! let _guard = dumemo::logging::init();
//! tracing::info!(path = %p.display(), "File dropped");
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE: &str = "dumemo.jsonl";

/// Keeps the file writer alive; dropping it flushes pending lines.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber. Keep the guard for the program's lifetime.
pub fn init() -> LoggingGuard {
    let log_path = log_path();
    let file = log_path
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&log_path));

    let (json_layer, file_guard) = match file {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_current_span(true)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("[dumemo] cannot open log file {}: {}", log_path.display(), e);
            (None, None)
        }
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// `~/Library/Logs/DuMemo/dumemo.jsonl`, or the temp dir without a home.
pub fn log_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join("Library").join("Logs").join("DuMemo"))
        .unwrap_or_else(|| std::env::temp_dir().join("dumemo-logs"))
        .join(LOG_FILE)
}
