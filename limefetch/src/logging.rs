//! Logging bootstrap for binaries using this library.
//!
//! The library itself only emits `tracing` events and never installs a
//! global subscriber; callers opt in via [`init_logging`]. Output goes to
//! stderr, with an optional file copy, filtered through `RUST_LOG`
//! (defaulting to `info`).

use std::fs::File;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system.
///
/// # Arguments
///
/// * `log_file` - Optional file to mirror log output into; its parent
///   directory must already exist
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init_logging(log_file: Option<&Path>) -> Result<LoggingGuard, io::Error> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, file_guard) = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
