//! Error types for the task API client.
//!
//! # Design
//! Each failure mode a caller might branch on gets its own variant: a failed
//! login is not the same as a failed request, and a failing batch element
//! carries its position so the caller knows which operation died. JSON-decode
//! failures on *successful* responses are deliberately not represented here —
//! the session substitutes the raw text instead, since many success bodies
//! are legitimately non-JSON (empty DELETE responses, for one).

use std::fmt;

use crate::transport::TransportError;

/// Errors surfaced by [`crate::session::Session`] operations.
#[derive(Debug)]
pub enum ApiError {
    /// The login exchange returned a non-success status. No token was stored.
    Auth { status: u16 },

    /// A single-request exchange returned a non-success status, or the 404
    /// retry budget was exhausted. Carries the raw response body.
    Http { status: u16, body: String },

    /// One element of a batch's `results` array carries a non-success
    /// status. `index` is the element's position in the submitted batch.
    BatchItem { index: usize, status: u16 },

    /// The caller tried to batch a descriptor whose target origin differs
    /// from the batch endpoint's origin.
    Configuration(String),

    /// The transport did not receive a response within the timeout.
    Timeout,

    /// The exchange failed below HTTP (connect, TLS, malformed URL).
    Transport(String),

    /// A request body could not be serialized to JSON.
    Serialization(String),

    /// A response that must have a known shape (login body, batch results
    /// document) did not have it.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth { status } => write!(f, "login failed with status {status}"),
            ApiError::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            ApiError::BatchItem { index, status } => {
                write!(f, "batch operation {index} failed with status {status}")
            }
            ApiError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            ApiError::Timeout => write!(f, "request timed out"),
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Serialization(msg) => write!(f, "serialization failed: {msg}"),
            ApiError::Decode(msg) => write!(f, "unexpected response shape: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => ApiError::Timeout,
            TransportError::Io(msg) => ApiError::Transport(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_timeout_maps_to_timeout() {
        let err = ApiError::from(TransportError::Timeout);
        assert!(matches!(err, ApiError::Timeout));
    }

    #[test]
    fn batch_item_display_names_index_and_status() {
        let err = ApiError::BatchItem { index: 2, status: 404 };
        assert_eq!(err.to_string(), "batch operation 2 failed with status 404");
    }
}
