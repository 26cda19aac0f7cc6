use crate::fields::FieldId;
use thiserror::Error;

/// Result type alias for intake operations
pub type Result<T, E = IntakeError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] crate::config::ValidationError),

    /// A submission was requested from a form that does not validate.
    #[error("Field {0:?} is not filled in correctly")]
    Incomplete(FieldId),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Relay rejected the submission with {status}: {error}")]
    Rejected {
        status: reqwest::StatusCode,
        error: String,
    },
}
