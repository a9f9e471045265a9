//! Common error types for the Cosmic Astrology backend

use thiserror::Error;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the backend crates
#[derive(Error, Debug)]
pub enum Error {
    /// The hosted backend answered with a non-success status
    #[error("Backend error {status}: {message}")]
    Backend {
        status: u16,
        /// PostgREST error code (e.g. `PGRST116`), when provided
        code: Option<String>,
        message: String,
    },

    /// Transport failure talking to the hosted backend
    #[error("Network error: {0}")]
    Network(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
