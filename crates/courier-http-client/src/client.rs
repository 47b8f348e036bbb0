//! HTTP client wrapper

use std::time::Duration;

use courier_common::{Method, Transport, TransportRequest, TransportResponse};
use reqwest::header::CONTENT_TYPE;

use crate::error::HttpError;

/// Timeout applied to each attempt unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP client wrapper
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Create a new HTTP client builder
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create an HttpClient from a reqwest::Client
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }

    async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, HttpError> {
        let mut builder = self
            .inner
            .request(reqwest_method(request.method), request.target_url())
            .timeout(request.timeout);

        if let Some(body) = request.form_body() {
            builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::trace!("{} {} -> {}", request.method, request.url, status);

        if status.is_success() {
            return Ok(TransportResponse::new(i32::from(status.as_u16()), body));
        }

        Ok(
            TransportResponse::new(i32::from(status.as_u16()), body.clone()).with_error(
                HttpError::Status {
                    status: status.as_u16(),
                    message: body,
                }
                .into(),
            ),
        )
    }
}

#[async_trait::async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &TransportRequest) -> TransportResponse {
        match self.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("{} {} failed: {}", request.method, request.url, err);
                TransportResponse::failed(err.into())
            }
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// HTTP client builder
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Client wide timeout, used when a request does not carry its own
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the HTTP client
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(HttpClient { inner: client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_default() {
        let client = HttpClient::default();
        let _ = format!("{:?}", client);
    }

    #[test]
    fn test_builder_build() {
        let result = HttpClientBuilder::default().build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_builder_timeout() {
        let result = HttpClient::builder()
            .timeout(Duration::from_millis(250))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(reqwest_method(Method::Post), reqwest::Method::POST);
        assert_eq!(reqwest_method(Method::Put), reqwest::Method::PUT);
        assert_eq!(reqwest_method(Method::Delete), reqwest::Method::DELETE);
    }
}
