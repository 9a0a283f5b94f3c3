#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup for the compiler.
//!
//! Libraries in the workspace only emit `tracing` events. Binaries and tests
//! call [`init`] once to install a formatting subscriber built from the
//! `[logging]` section of the configuration.

use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Mutex;

use config::LoggingConfig;
use thiserror::Error;
use tracing::Level;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured level is not one of trace, debug, info, warn, error.
    #[error("invalid log level `{0}`")]
    InvalidLevel(String),
    /// The log file could not be opened.
    #[error("failed to open log file: {0}")]
    File(#[from] std::io::Error),
}

/// Parse a level name, case-insensitively.
pub fn parse_level(level: &str) -> Result<Level, LoggingError> {
    Level::from_str(level.trim()).map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

/// Install the global subscriber described by `config`.
///
/// Returns `Ok(false)` when a subscriber was already installed, in which case
/// nothing changes.
pub fn init(config: &LoggingConfig) -> Result<bool, LoggingError> {
    let level = parse_level(&config.level)?;
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(true);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init().is_ok()
        }
        None => builder.with_writer(std::io::stderr).try_init().is_ok(),
    };
    Ok(installed)
}

/// Emits a trace event tagged with the calling module.
pub fn trace(module: &str, msg: &str) {
    tracing::trace!(module, "{}", msg);
}
