//! Error types for the silhouette_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for silhouette_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A symbolic value the engine does not recognise, or a numeric field
    /// holding something that is not a finite non-negative number
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Historical observation loading error
    #[error("History error: {0}")]
    History(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid(field: &str, value: impl ToString) -> Self {
        Error::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
