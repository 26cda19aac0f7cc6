use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T, E = RelayError> = std::result::Result<T, E>;

/// Errors that can occur while serving or dispatching a submission
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Failed to read request body: {0}")]
    RequestBodyError(String),

    #[error("Malformed submission payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] crate::config::ValidationError),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
