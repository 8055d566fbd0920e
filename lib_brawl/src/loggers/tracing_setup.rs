//! # Tracing Setup
//!
//! Installs the global `tracing` subscriber used by the binaries: colored
//! console output plus a JSON log file rotated daily. The file writer is
//! non-blocking; the returned [`WorkerGuard`] must be kept alive for buffered
//! lines to be flushed on exit.

use std::io;
use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("cannot create log directory: {0}")]
    Io(#[from] io::Error),

    /// Neither `RUST_LOG` nor the given level is a valid filter.
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber was already installed.
    #[error("logging already initialized: {0}")]
    AlreadySet(#[from] tracing_subscriber::util::TryInitError),
}

/// Builds the filter: `RUST_LOG` first, then `level`.
fn env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?)
}

/// Installs console and daily JSON file logging under `log_dir`.
///
/// Files are named `<app_name>.<date>`.
pub fn setup_logging(log_dir: &Path, app_name: &str, level: &str) -> Result<WorkerGuard, LoggingError> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, app_name);
    let (non_blocking_appender, guard) = non_blocking(file_appender);

    let console_layer = fmt::layer().with_target(true).with_ansi(true);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_appender)
        .json();

    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!("Logging initialized with level: {}", level);
    Ok(guard)
}
