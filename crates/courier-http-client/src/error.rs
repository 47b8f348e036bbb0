//! HTTP error types

use courier_common::TransportError;
use thiserror::Error;

/// HTTP errors that can occur during requests
#[derive(Debug, Error)]
pub enum HttpError {
    /// HTTP error with status code
    #[error("HTTP error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),
    /// Request timeout
    #[error("Request timeout")]
    Timeout,
    /// Client build error
    #[error("Client build error: {0}")]
    Build(String),
    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else if err.is_builder() {
            HttpError::Build(err.to_string())
        } else if err.is_connect() {
            HttpError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            HttpError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            HttpError::Other(err.to_string())
        }
    }
}

impl From<HttpError> for TransportError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout => TransportError::Timeout,
            HttpError::Connection(message) => TransportError::Connection(message),
            HttpError::Status { status, message } => TransportError::Status { status, message },
            other => TransportError::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_status_display() {
        let error = HttpError::Status {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(format!("{}", error), "HTTP error (404): Not Found");
    }

    #[test]
    fn test_http_error_timeout_display() {
        let error = HttpError::Timeout;
        assert_eq!(format!("{}", error), "Request timeout");
    }

    #[test]
    fn test_into_transport_error() {
        assert_eq!(
            TransportError::from(HttpError::Timeout),
            TransportError::Timeout
        );
        assert_eq!(
            TransportError::from(HttpError::Connection("refused".to_string())),
            TransportError::Connection("refused".to_string())
        );
        assert_eq!(
            TransportError::from(HttpError::Status {
                status: 503,
                message: "busy".to_string()
            }),
            TransportError::Status {
                status: 503,
                message: "busy".to_string()
            }
        );
        assert_eq!(
            TransportError::from(HttpError::Build("invalid config".to_string())),
            TransportError::Other("Client build error: invalid config".to_string())
        );
    }
}
