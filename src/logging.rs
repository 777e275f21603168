//! Logging initialization for paysim.
//!
//! Logs go to stderr so they never interleave with rendered output on
//! stdout. With `logging.to_file`, they go to
//! `<state>/logs/paysim-{datetime}.log` instead.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Flushes buffered file logs when dropped
    pub _guard: Option<WorkerGuard>,

    /// Session log file, when file logging is enabled
    pub log_file_path: Option<PathBuf>,
}

/// Level filter: `RUST_LOG` wins, then `--debug`, then config
fn filter_directive(config: &Config, debug_override: bool) -> String {
    if let Ok(env) = std::env::var("RUST_LOG") {
        return env;
    }
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

/// Session log file for this process, or `None` when logging to stderr
pub fn session_log_path(config: &Config) -> Option<PathBuf> {
    if !config.logging.to_file {
        return None;
    }
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    Some(config.logs_path().join(format!("paysim-{timestamp}.log")))
}

/// Install the global subscriber.
///
/// Keep the returned handle alive until exit.
pub fn init_logging(config: &Config, debug_override: bool) -> Result<LoggingHandle> {
    let filter = EnvFilter::new(filter_directive(config, debug_override));
    let log_file_path = session_log_path(config);

    let (writer, guard) = match &log_file_path {
        Some(path) => {
            let logs_dir = config.logs_path();
            std::fs::create_dir_all(&logs_dir)
                .with_context(|| format!("Failed to create {}", logs_dir.display()))?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(log_file_path.is_none())
                .with_writer(writer),
        )
        .init();

    Ok(LoggingHandle {
        _guard: guard,
        log_file_path,
    })
}
