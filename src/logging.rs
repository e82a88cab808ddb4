//! Structured logging for eqview using the tracing crate.
//!
//! Writes to daily-rotated log files under the XDG state directory. Nothing is
//! written to the terminal, which belongs to the equalizer display.

use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Prefix shared by all log files.
pub const LOG_FILE_PREFIX: &str = "eqview.log";

const MAX_LOG_FILES: usize = 7;

/// Initializes the logging system with file-based output.
///
/// Log level is controlled by the RUST_LOG environment variable (defaults to "info").
/// Queued lines are written out when the returned guard is dropped, so the caller
/// must hold it until it is done logging and drop it before exiting the process.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    if let Err(e) = cleanup_old_logs(&log_dir) {
        eprintln!("Warning: Failed to cleanup old logs: {e}");
    }

    let (non_blocking, guard) = file_writer(&log_dir);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| anyhow!("Logging already initialized: {e}"))?;

    tracing::debug!("Logging initialized. Log dir: {}", log_dir.display());
    Ok(guard)
}

/// Daily-rolling writer backed by a background thread.
fn file_writer(log_dir: &Path) -> (NonBlocking, WorkerGuard) {
    tracing_appender::non_blocking(rolling::daily(log_dir, LOG_FILE_PREFIX))
}

/// Log directory: `$XDG_STATE_HOME/eqview`, else `~/.local/state/eqview`.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn log_dir() -> anyhow::Result<PathBuf> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        if !xdg_state.is_empty() {
            return Ok(PathBuf::from(xdg_state).join("eqview"));
        }
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local/state/eqview"))
}

/// Whether a file name is a dated log file (`eqview.log.YYYY-MM-DD`).
fn is_dated_log(file_name: &str) -> bool {
    file_name
        .strip_prefix(LOG_FILE_PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|date| date.matches('-').count() == 2)
}

/// Removes all but the most recent dated log files.
fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let file_name = path.file_name()?.to_string_lossy().to_string();
            if !is_dated_log(&file_name) {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    // newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dated_log_names() {
        assert!(is_dated_log("eqview.log.2026-10-18"));
        assert!(!is_dated_log("eqview.log"));
        assert!(!is_dated_log("other.log.2026-10-18"));
        assert!(!is_dated_log("eqview.logger.2026-10-18"));
    }

    #[test]
    fn test_dropping_guard_flushes_queued_lines() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, guard) = file_writer(dir.path());
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Stopped (EndOfStream): 1 frames rendered, 0 skipped, 0 status lines ignored");
        });
        drop(guard);

        let log_file = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                path.file_name()
                    .is_some_and(|name| is_dated_log(&name.to_string_lossy()))
            })
            .unwrap();
        let content = fs::read_to_string(log_file).unwrap();
        assert!(content.contains("Stopped (EndOfStream): 1 frames rendered"));
    }
}
