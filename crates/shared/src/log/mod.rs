// Logging module
// Console (and optional daily-rolling file) output through the tracing crate

use std::path::Path;

pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// File name prefix of the rolling log
const LOG_FILE_NAME: &str = "stitcher.log";

/// Map the numeric CLI log level onto a tracing filter directive
/// (0=Errors, 1=Warnings, 2=Detail, 3=Debug, 4=Trace)
pub fn map_log_level(level: i32) -> &'static str {
    match level {
        i32::MIN..=0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over `log_level`. When `log_dir` is given a
/// second, non-ANSI layer writes to a daily file there; the returned guard
/// must be held until the program exits so buffered lines are flushed.
pub fn initialize_logging(log_dir: Option<&str>, log_level: &str) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let console = fmt::layer()
        .with_ansi(true)
        .with_target(false)
        .with_thread_ids(false);

    match log_dir {
        Some(dir) => {
            let path = Path::new(dir);
            if !path.exists() {
                let _ = std::fs::create_dir_all(path);
            }

            let file_appender = rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console)
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console)
                .init();
            None
        }
    }
}

/// Progress line for a whole stage (maps, indexes)
#[macro_export]
macro_rules! basic_log {
    ($($arg:tt)*) => { $crate::tracing::info!($($arg)*) };
}

/// Per-plane and per-zoom detail
#[macro_export]
macro_rules! detail_log {
    ($($arg:tt)*) => { $crate::tracing::debug!($($arg)*) };
}
