//! Error types for livefeed payloads.

use thiserror::Error;

/// Errors that can occur decoding livefeed payloads.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// JSON decoding failed
    #[error("malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Payload decoded but carries no usable content
    #[error("empty payload")]
    Empty,
}
