//! Error types for the analysis client

use screening_core::EntityId;
use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Analysis client errors
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer from the scoring service
    #[error("Scoring service error {status_code} on {endpoint}: {message}")]
    Status {
        /// Endpoint path
        endpoint: String,
        /// HTTP status code
        status_code: u16,
        /// Response body, if any
        message: String,
    },

    /// Body was not JSON
    #[error("Could not decode response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path
        endpoint: String,
        /// Decoder message
        message: String,
    },

    /// Screening-core error (malformed result, service-reported failure, bad input)
    #[error(transparent)]
    Core(#[from] screening_core::ScreeningError),

    /// Request was cancelled because its row left the view
    #[error("Analysis request for entity {0} cancelled")]
    Cancelled(EntityId),

    /// A request for this entity is still running
    #[error("Analysis already in flight for entity {0}")]
    AlreadyInFlight(EntityId),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
