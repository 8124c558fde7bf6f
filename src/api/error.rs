//! Errors reported by the collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, TLS.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status.
    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The collaborator cannot be reached at all (in-memory actor gone, for example).
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            message: message.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
