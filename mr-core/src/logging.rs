//! Logging setup.
//!
//! Human-readable lines go to stderr. A second copy goes to `meetrec.log`
//! in the log directory, rotated daily, as plain text or one JSON object
//! per line.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants;
use crate::error::{MrError, MrResult};

/// Keeps the background log writer running; pending lines are flushed on drop.
pub struct LogGuard {
    _worker: WorkerGuard,
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber: stderr plus the rotated log file.
///
/// `level` takes any `EnvFilter` directive ("debug", "mr_events=trace,info").
/// An unparsable directive falls back to `info`.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> MrResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (writer, worker) =
        tracing_appender::non_blocking(rolling::daily(log_dir, constants::LOG_FILE_NAME));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    // exactly one of these is set
    let json_file = json_output.then(|| {
        fmt::layer()
            .json()
            .with_writer(writer.clone())
            .with_file(true)
            .with_line_number(true)
    });
    let text_file = (!json_output).then(|| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(stderr_layer)
        .with(json_file)
        .with(text_file)
        .try_init()
        .map_err(|e| MrError::Internal(format!("logger already installed: {e}")))?;

    tracing::info!(level, dir = %log_dir.display(), "logging to file");
    Ok(LogGuard { _worker: worker })
}

/// Stderr-only logging, used when the log directory is unusable.
/// A second call is a no-op.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(level))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_directive_falls_back_to_info() {
        assert_eq!(filter_for("not a filter ===").to_string(), "info");
        assert_eq!(filter_for("debug").to_string(), "debug");
    }

    #[test]
    fn test_console_logging_twice() {
        init_console_logging("debug");
        init_console_logging("warn");
    }

    #[test]
    fn test_file_logging_after_console_is_error() {
        init_console_logging("info");
        let dir = tempfile::tempdir().unwrap();
        let result = init_logging("info", &dir.path().join("logs"), false);
        assert!(matches!(result, Err(MrError::Internal(_))));
        // the directory is prepared before the subscriber is installed
        assert!(dir.path().join("logs").is_dir());
    }
}
