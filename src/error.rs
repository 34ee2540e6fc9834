//! Export error types

use crate::connection::ConnectionError;
use thiserror::Error;

/// Errors raised while generating a schema script
#[derive(Debug, Error)]
pub enum ExportError {
    /// No persistence unit with this name in the descriptor
    #[error("Persistence unit not found: {0}")]
    UnitNotFound(String),

    /// The unit's mappings cannot be bound to tables
    #[error("Invalid mapping in unit '{unit}': {message}")]
    InvalidMapping { unit: String, message: String },

    /// The persistence descriptor file could not be parsed
    #[error("Invalid persistence descriptor {path}: {source}")]
    Descriptor {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Tool configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// JDBC URL with a scheme we cannot inspect
    #[error("Unsupported JDBC URL: {0}\nSuggestion: use jdbc:postgresql://host[:port]/database")]
    UnsupportedJdbcUrl(String),

    /// Connecting to or querying the live database failed
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Reading the descriptor or writing the script failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub(crate) fn invalid_mapping(unit: &str, message: impl Into<String>) -> Self {
        ExportError::InvalidMapping {
            unit: unit.to_string(),
            message: message.into(),
        }
    }
}
