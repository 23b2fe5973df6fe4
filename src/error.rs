//! Error types for `todo_store`.

use crate::schema::ValidationErrors;
use std::path::PathBuf;

/// Errors that can occur while serving or consuming the todo API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Input or stored data failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The record store could not be read.
    #[error("Error in {operation}: {source}")]
    StoreRead {
        /// The store operation that was running.
        operation: &'static str,
        /// What went wrong while reading.
        #[source]
        source: StoreReadError,
    },

    /// A blocking store task was cancelled or panicked.
    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// An HTTP client error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The message returned by the server.
        message: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Failures reading the backing file of a JSON record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreReadError {
    /// The store file does not exist.
    #[error("File not found at {0}")]
    Missing(PathBuf),

    /// The store file is not valid JSON.
    #[error("Invalid JSON in file {path}: {source}")]
    MalformedJson {
        /// Path to the store file.
        path: PathBuf,
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The store file is JSON but does not hold valid todo records.
    #[error("Invalid data in file {path}: {reason}")]
    InvalidData {
        /// Path to the store file.
        path: PathBuf,
        /// Description of the first problem found.
        reason: String,
    },

    /// Any other I/O failure.
    #[error("Could not read {path}: {source}")]
    Io {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
