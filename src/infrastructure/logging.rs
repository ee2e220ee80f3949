use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::DomainError;

/// Tracing target of this crate, used in the default filters.
/// Events are emitted under the library crate name, so `RUST_LOG` must name
/// `droplink_lib` too.
pub const LOG_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Default log directory.
/// - Linux: ~/.local/share/droplink/logs/
/// - macOS: ~/Library/Application Support/droplink/logs/
/// - Windows: %LOCALAPPDATA%\droplink\logs\
///
/// Falls back to `logs/` in the working directory when the platform has no
/// data directory.
pub fn default_logs_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("droplink").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize the logging system with console output and optional file rotation.
///
/// Console output goes to stderr so stdout stays free for the link itself.
/// Returns a guard that must be kept alive for the duration of the process.
/// When the guard is dropped, any remaining logs are flushed.
pub fn init_logging(
    logs_dir: &Path,
    level: &str,
    file_logging: bool,
) -> Result<Option<WorkerGuard>, DomainError> {
    if file_logging {
        fs::create_dir_all(logs_dir)?;
    }

    // RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={},warn", LOG_TARGET, level)));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .with_filter(env_filter);

    if file_logging {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, "droplink.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // File layer keeps debug detail regardless of the console level
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(EnvFilter::new(format!("{}=debug", LOG_TARGET)));

        // try_init: a second initialization is not an error
        if tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .is_ok()
        {
            tracing::debug!(logs_dir = ?logs_dir, level = level, "Logging initialized with file output");
        }

        Ok(Some(guard))
    } else {
        let _ = tracing_subscriber::registry().with(console_layer).try_init();

        tracing::debug!(level = level, "Logging initialized (console only)");

        Ok(None)
    }
}
