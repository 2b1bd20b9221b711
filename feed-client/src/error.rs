//! Error taxonomy surfaced to callers of the client.

use feed_core::{classify_status, ResponseClass};
use thiserror::Error;

use crate::store::StoreError;
use crate::transport::ApiError;

/// Local validation failures. Nothing is sent when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty after trimming.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the field.
        field: &'static str,
    },
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Endpoint unreachable or request timed out.
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a failure status.
    #[error("server returned status {status}")]
    Server {
        /// HTTP status.
        status: u16,
    },

    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// Input rejected before sending.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Login failed, or the server rejected the session.
    #[error("authentication failed: {reason}")]
    Auth {
        /// Description of the failure.
        reason: String,
    },

    /// The session is valid but lacks the required role.
    #[error("not authorized for this action")]
    Authz,

    /// Live stream connectivity failure.
    #[error("stream error: {0}")]
    Stream(String),

    /// A payload could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Durable session storage failed.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unreachable(reason) => Self::Network(reason),
            ApiError::Decode(reason) => Self::Parse(reason),
            ApiError::Status { status, message } => match classify_status(status) {
                ResponseClass::Unauthorized => Self::Auth {
                    reason: message.unwrap_or_else(|| "session expired or missing".into()),
                },
                ResponseClass::Forbidden => Self::Authz,
                ResponseClass::NotFound => Self::NotFound,
                ResponseClass::Success | ResponseClass::ServerError(_) => Self::Server { status },
            },
        }
    }
}
