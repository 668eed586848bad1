//! Structured Logger
//!
//! Wraps `tracing` with an optional console layer, an optional rolling
//! NDJSON file layer, and environment-based level control.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file prefix; the appender adds a `.YYYY-MM-DD` suffix.
const LOG_FILE_PREFIX: &str = "zeorag.log";

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Human-readable lines on stderr.
    Console,
    /// Daily-rolling JSON files only. Used while the terminal UI owns the screen.
    File(PathBuf),
    Both(PathBuf),
    /// Discard everything.
    Silent,
}

impl LogTarget {
    /// Console plus file when a directory is configured, console alone otherwise.
    pub fn console_and(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) => LogTarget::Both(dir),
            None => LogTarget::Console,
        }
    }

    /// File when a directory is configured, nothing otherwise.
    pub fn file_or_silent(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) => LogTarget::File(dir),
            None => LogTarget::Silent,
        }
    }
}

/// Initialize the global structured logger.
///
/// `RUST_LOG` takes precedence over `level`. Calling this twice is a no-op.
pub fn init_logger(target: LogTarget, level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (console, dir) = match target {
        LogTarget::Console => (true, None),
        LogTarget::File(dir) => (false, Some(dir)),
        LogTarget::Both(dir) => (true, Some(dir)),
        LogTarget::Silent => return,
    };

    // Rolling file appender: writes NDJSON to `<dir>/zeorag.log.YYYY-MM-DD`
    let file_layer = dir.map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    // stderr keeps stdout clean for streamed answers
    let console_layer = console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
