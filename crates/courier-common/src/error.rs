//! Errors

use thiserror::Error;

/// Errors raised while talking to a [`crate::Transport`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request timeout
    #[error("Request timeout")]
    Timeout,
    /// The transport task went away before completing
    #[error("Request interrupted")]
    Interrupted,
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),
    /// HTTP error with status code
    #[error("HTTP error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },
    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Courier Error
///
/// Delivered to the failure callback of a request, never returned to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Network, timeout or interruption
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Response body is not a well-formed envelope
    #[error("Parse error: {0}")]
    Parse(String),
    /// Envelope decoded but the server reported a failure code
    #[error("Business error ({code}): {}", .message.as_deref().unwrap_or("no message"))]
    Business {
        /// Envelope code
        code: i64,
        /// Envelope message
        message: Option<String>,
    },
    /// Result payload does not match the requested type
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// Cache store error
    #[error("Cache error: {0}")]
    Cache(String),
}

impl Error {
    /// Underlying transport error, if any
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Error::Transport(err) => Some(err),
            _ => None,
        }
    }
}
