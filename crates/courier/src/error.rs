//! Configuration errors
//!
//! Failures of an executed request never surface here; they reach the request's
//! callback as an [`crate::Outcome::Failure`].

use thiserror::Error;

/// Errors raised while configuring requests or the orchestrator
#[derive(Debug, Error)]
pub enum BuildError {
    /// Endpoint is not a valid url
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
    /// No transport was given and the default one is not compiled in
    #[error("No transport configured")]
    MissingTransport,
    /// No runtime handle was given and none is running
    #[error("No tokio runtime available")]
    MissingRuntime,
    /// Default transport could not be built
    #[cfg(feature = "http-client")]
    #[error(transparent)]
    HttpClient(#[from] courier_http_client::HttpError),
    /// Cache file could not be opened
    #[cfg(feature = "redb")]
    #[error(transparent)]
    Cache(#[from] courier_redb::Error),
}
