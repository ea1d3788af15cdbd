//! Logging for daytrack
//!
//! `fill` and `track` talk to the operator on stdout, so log records go to a
//! daily file under `$XDG_STATE_HOME/daytrack/` instead of the terminal.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Prefix of the rolling log files; the appender adds the date.
pub const LOG_FILE_PREFIX: &str = "daytrack.log";

/// Initialize the logging system
///
/// `RUST_LOG` wins over the configured level. A bad `[logging] level` is a
/// configuration error rather than a silent fallback.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };

    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Keep whichever subscriber was installed first.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Filter for a configured level such as `info` or `daytrack_core=debug`.
pub fn level_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level.trim())
        .map_err(|e| Error::Config(format!("invalid log level {:?}: {}", level, e)))
}

/// Initialize logging for tests (logs to the test writer)
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// Flushes pending log writes when dropped; hold it for the life of `main`.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}
