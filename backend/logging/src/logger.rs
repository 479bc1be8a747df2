//! Structured logger.
//!
//! Wraps `tracing` to provide a console layer plus an optional rolling
//! NDJSON file layer, with environment-based level control.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Handle to the installed logger, registered in the dependency registry so
/// downstream stages can observe the effective level. Owns the file
/// appender's flush guard; dropping the handle stops the background writer.
pub struct LoggerHandle {
    pub level: String,
    _file_guard: Option<WorkerGuard>,
}

/// Install the global structured logger.
///
/// `RUST_LOG` overrides the configured level. When `log_dir` is given, an
/// NDJSON file log rolls daily under it alongside the console output.
pub fn init_logger(level: &str, log_dir: Option<&Path>) -> Result<LoggerHandle> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{level}'"))?,
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    // NDJSON file layer, rolled daily as `casd.log.YYYY-MM-DD`
    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "casd.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("logger already installed")?;

    Ok(LoggerHandle {
        level: level.to_string(),
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_rejected() {
        // the configured level is only consulted when RUST_LOG is absent
        unsafe { std::env::remove_var("RUST_LOG") };
        assert!(init_logger("loud", None).is_err());
    }
}
