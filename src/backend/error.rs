//! Error types for the in-memory backend.

use crate::api::ApiError;
use crate::framework::FrameworkError;
use thiserror::Error;

/// Rule violations raised by the table, order and cash-box entities.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request clashes with current state (a second open box, a paid order).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No open cash box")]
    NoOpenCashBox,

    #[error("Invalid request: {0}")]
    Invalid(String),

    /// Another actor could not be reached while handling the request.
    #[error("Actor communication error: {0}")]
    Unavailable(String),
}

impl From<FrameworkError> for BackendError {
    fn from(e: FrameworkError) -> Self {
        match e.entity_error::<BackendError>() {
            Some(inner) => inner.clone(),
            None => BackendError::Unavailable(e.to_string()),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound(what) => ApiError::NotFound(what),
            BackendError::Conflict(message) => ApiError::rejected(409, message),
            BackendError::NoOpenCashBox => ApiError::rejected(400, e.to_string()),
            BackendError::Invalid(message) => ApiError::rejected(400, message),
            BackendError::Unavailable(message) => ApiError::Unavailable(message),
        }
    }
}

impl From<FrameworkError> for ApiError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => ApiError::NotFound(id),
            other => BackendError::from(other).into(),
        }
    }
}
