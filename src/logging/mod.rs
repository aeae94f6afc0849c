// Logging module for structured logging using the tracing crate

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::constants::DEFAULT_LOG_LEVEL;

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, for log aggregation systems
    #[default]
    Json,
    /// Human-readable multi-line output
    Pretty,
    /// Single-line human-readable output
    Compact,
}

fn default_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Logging section of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `hayabusa=debug,warn`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level '{}': {}", self.level, e))
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|e| LoggingError::InvalidFilter(e.to_string())),
        }
    }
}

/// Logging setup errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to initialize subscriber: {0}")]
    InitError(String),
}

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber writes to stdout, filtered by `RUST_LOG` when set and by
/// `config.level` otherwise.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
///
/// # Examples
///
/// ```
/// use hayabusa::logging::{init_subscriber, LoggingConfig};
///
/// init_subscriber(&LoggingConfig::default()).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| LoggingError::InitError(e.to_string()))
}
