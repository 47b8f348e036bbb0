//! Courier shared types and traits.
//!
//! This crate is the base foundation for the Courier request orchestrator and its
//! storage and transport backends.
//!
//! It contains the response envelope codec, the error types funneled into request
//! outcomes, and the two collaborator traits the orchestrator consumes:
//! [`Transport`] for the network call and [`CacheStore`] for the per-endpoint cache.

pub mod cache;
pub mod envelope;
pub mod error;
pub mod transport;

pub use cache::{CacheStore, MemoryCache};
pub use envelope::{Envelope, CODE_SUCCESS, CODE_UNKNOWN};
pub use error::{Error, TransportError};
pub use transport::{
    encode_query, ExecutionMode, Method, Transport, TransportRequest, TransportResponse,
    NO_RESPONSE_STATUS,
};

// re-exporting external crates
pub use url;
