use std::io;

use sn_config::LoggingConfig;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Parses a configured level name, falling back to INFO
pub fn parse_level(level: &str) -> Level {
    level.parse().unwrap_or(Level::INFO)
}

/// Initialise tracing from the `system.logging` settings
///
/// Always writes to an hourly rolling `<app_name>.log` under `logging.dir`; mirrors to stdout
/// when `logging.stdout` is set. The returned guard must live as long as the process logs.
pub fn init(app_name: &str, logging: &LoggingConfig) -> WorkerGuard {
    if logging.stdout {
        init_with_stdout(app_name, &logging.dir, parse_level(&logging.level))
    } else {
        init_file_only(app_name, &logging.dir, parse_level(&logging.level))
    }
}

/// Initialise tracing with non-blocking file appender
pub fn init_file_only(app_name: &str, log_dir: &str, default_level: Level) -> WorkerGuard {
    // Create log directory if it doesn't exist
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::hourly(log_dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Respects RUST_LOG env var, falls back to default_level
    let env_filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    let fmt_layer =
        fmt::layer().with_writer(non_blocking).with_target(true).with_thread_ids(true).with_line_number(true).with_ansi(false).compact();

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();

    guard
}

/// Initialize tracing with both file and stdout output
pub fn init_with_stdout(app_name: &str, log_dir: &str, default_level: Level) -> WorkerGuard {
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::hourly(log_dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    // File layer (no ANSI colors)
    let file_layer =
        fmt::layer().with_writer(non_blocking).with_target(true).with_thread_ids(true).with_line_number(true).with_ansi(false).compact();

    // Stdout layer (with ANSI colors for readability)
    let stdout_layer = fmt::layer().with_writer(io::stdout).with_target(true).with_line_number(true).with_ansi(true).compact();

    tracing_subscriber::registry().with(env_filter).with(file_layer).with(stdout_layer).init();

    guard
}

/// Stderr-only logging for tools whose stdout is machine-readable
pub fn init_stderr(default_level: Level) {
    let env_filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    tracing_subscriber::registry().with(env_filter).with(fmt::layer().with_writer(io::stderr).with_target(false).compact()).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }
}
