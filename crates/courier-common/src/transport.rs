//! Transport trait
//!
//! The orchestrator treats the network as one opaque call per request with a single
//! completion. Retry, pooling and backoff belong to the implementation.

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TransportError;

/// Status reported when no HTTP response was received
pub const NO_RESPONSE_STATUS: i32 = -1;

/// HTTP verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET, parameters go into the query string
    Get,
    /// POST, parameters go into a form body
    Post,
    /// PUT, parameters go into a form body
    Put,
    /// DELETE, parameters go into a form body
    Delete,
}

impl Method {
    /// Verb as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the orchestrator waits for the transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Block the calling thread up to the configured timeout
    Synchronous,
    /// Return immediately and deliver the outcome through the callback
    #[default]
    Asynchronous,
}

/// A single network call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP verb
    pub method: Method,
    /// Endpoint, without the query string
    pub url: Url,
    /// Request parameters
    pub params: BTreeMap<String, String>,
    /// Execution mode of the originating request
    pub mode: ExecutionMode,
    /// Timeout per attempt
    pub timeout: Duration,
}

impl TransportRequest {
    /// Url to send the request to
    ///
    /// GET requests carry their parameters in the query string, other verbs leave the
    /// url untouched.
    pub fn target_url(&self) -> Url {
        let mut url = self.url.clone();

        if self.method == Method::Get && !self.params.is_empty() {
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => {
                    format!("{existing}&{}", encode_query(&self.params))
                }
                _ => encode_query(&self.params),
            };
            url.set_query(Some(&query));
        }

        url
    }

    /// Form encoded body for verbs other than GET
    pub fn form_body(&self) -> Option<String> {
        if self.method == Method::Get || self.params.is_empty() {
            return None;
        }

        serde_urlencoded::to_string(&self.params).ok()
    }
}

/// Result of a single network call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status, [`NO_RESPONSE_STATUS`] when nothing came back
    pub status: i32,
    /// Response body
    pub body: Option<String>,
    /// Failure cause
    pub error: Option<TransportError>,
}

impl TransportResponse {
    /// Response that reached the server
    pub fn new(status: i32, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
            error: None,
        }
    }

    /// Call that never got a response
    pub fn failed(error: TransportError) -> Self {
        Self {
            status: NO_RESPONSE_STATUS,
            body: None,
            error: Some(error),
        }
    }

    /// Attach a failure cause
    pub fn with_error(mut self, error: TransportError) -> Self {
        self.error = Some(error);
        self
    }

    /// No error and a 2xx status
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Network collaborator
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait Transport: Send + Sync + Debug {
    /// Perform the call. Failures are reported in the response, never panicked.
    async fn send(&self, request: &TransportRequest) -> TransportResponse;
}

/// Percent-encode parameters as `key=value` pairs joined by `&`
///
/// Keys and values are UTF-8 encoded and a space becomes `%20`.
pub fn encode_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_component(input: &str) -> String {
    // form encoding already escapes a literal '+' as %2B, so every '+' left is a space
    url::form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
