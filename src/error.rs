//! Error types for the planewar crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the planewar crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("reward {value} is not a finite number")]
    InvalidReward { value: f64 },

    #[error("persisted Q-table at {path:?} is unreadable: {message}")]
    CorruptState { path: PathBuf, message: String },

    #[error("invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
