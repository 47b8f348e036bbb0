//! reqwest transport for Courier
//!
//! This crate provides the [`courier_common::Transport`] the orchestrator uses by default.
//! Using this crate keeps the orchestrator free of a direct dependency on the HTTP backend.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use courier_http_client::HttpClient;
//!
//! fn example() -> Result<HttpClient, courier_http_client::HttpError> {
//!     HttpClient::builder()
//!         .timeout(Duration::from_secs(10))
//!         .build()
//! }
//! ```

mod client;
mod error;

pub use client::{HttpClient, HttpClientBuilder, DEFAULT_TIMEOUT};
pub use error::HttpError;
