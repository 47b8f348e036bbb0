//! Request configuration

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use courier_common::{ExecutionMode, Method, TransportRequest};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::callback::Callback;
use crate::error::BuildError;
use crate::lifecycle::{CallerContext, Progress, ProgressHook};

/// Whether a request reads and writes the per-endpoint cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Replay the cached body before the call and store successful bodies
    Enabled,
    /// Never touch the cache
    #[default]
    Disabled,
}

/// Fluent request configuration
///
/// The terminal verb call ([`RequestBuilder::get`], [`RequestBuilder::post`],
/// [`RequestBuilder::put`], [`RequestBuilder::delete`]) picks the callback and yields
/// an immutable [`Request`].
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    url: String,
    params: BTreeMap<String, String>,
    cache: CachePolicy,
    mode: ExecutionMode,
    progress: Option<Progress>,
    context: Option<Arc<dyn CallerContext>>,
}

impl RequestBuilder {
    /// Start a request against `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Replace the target url
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Append `path` to the url as is
    pub fn add_path(mut self, path: &str) -> Self {
        self.url.push_str(path);
        self
    }

    /// Replace all parameters
    pub fn params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params = params
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Add one parameter, overriding a previous value for the same key
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Turn the per-endpoint cache on or off
    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.cache = if enabled {
            CachePolicy::Enabled
        } else {
            CachePolicy::Disabled
        };
        self
    }

    /// Report start and end to `hook`, showing `message` meanwhile
    pub fn show_progress(mut self, hook: Arc<dyn ProgressHook>, message: impl Into<String>) -> Self {
        self.progress = Some(Progress::new(hook, message));
        self
    }

    /// Block the calling thread until the outcome is known
    pub fn sync_mode(mut self, synchronous: bool) -> Self {
        self.mode = if synchronous {
            ExecutionMode::Synchronous
        } else {
            ExecutionMode::Asynchronous
        };
        self
    }

    /// Resume asynchronous continuations on `context`
    pub fn resume_on(mut self, context: Arc<dyn CallerContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// GET request
    pub fn get(self, callback: Callback) -> Result<Request, BuildError> {
        self.build(Method::Get, callback)
    }

    /// POST request
    pub fn post(self, callback: Callback) -> Result<Request, BuildError> {
        self.build(Method::Post, callback)
    }

    /// PUT request
    pub fn put(self, callback: Callback) -> Result<Request, BuildError> {
        self.build(Method::Put, callback)
    }

    /// DELETE request
    pub fn delete(self, callback: Callback) -> Result<Request, BuildError> {
        self.build(Method::Delete, callback)
    }

    fn build(self, method: Method, callback: Callback) -> Result<Request, BuildError> {
        let url = Url::parse(&self.url)?;

        Ok(Request {
            method,
            url,
            params: self.params,
            mode: self.mode,
            cache: self.cache,
            progress: self.progress,
            context: self.context,
            callback,
        })
    }
}

/// A configured request, ready for the orchestrator
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: Url,
    params: BTreeMap<String, String>,
    mode: ExecutionMode,
    cache: CachePolicy,
    progress: Option<Progress>,
    context: Option<Arc<dyn CallerContext>>,
    callback: Callback,
}

impl Request {
    /// HTTP verb
    pub fn method(&self) -> Method {
        self.method
    }

    /// Endpoint
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Parameters
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Execution mode
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Cache policy
    pub fn cache_policy(&self) -> CachePolicy {
        self.cache
    }

    /// Progress configuration
    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    /// Context continuations resume on
    pub fn caller_context(&self) -> Option<&Arc<dyn CallerContext>> {
        self.context.as_ref()
    }

    /// Attached handler
    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// Cache key for this endpoint
    pub(crate) fn cache_key(&self) -> &str {
        self.url.as_str()
    }

    pub(crate) fn transport_request(&self, timeout: Duration) -> TransportRequest {
        TransportRequest {
            method: self.method,
            url: self.url.clone(),
            params: self.params.clone(),
            mode: self.mode,
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use courier_common::Envelope;

    use super::*;

    fn noop() -> Callback {
        Callback::envelope(|_status: i32, _envelope: Option<&Envelope>| {})
    }

    #[test]
    fn test_builder_defaults() {
        let request = RequestBuilder::new("https://api.example.com/items")
            .get(noop())
            .expect("Valid request");

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.mode(), ExecutionMode::Asynchronous);
        assert_eq!(request.cache_policy(), CachePolicy::Disabled);
        assert!(request.params().is_empty());
        assert!(request.progress().is_none());
        assert!(request.caller_context().is_none());
    }

    #[test]
    fn test_add_path_and_params() {
        let request = RequestBuilder::new("https://api.example.com")
            .add_path("/v1")
            .add_path("/items")
            .param("page", 2)
            .param("q", "a b")
            .param("page", 3)
            .use_cache(true)
            .sync_mode(true)
            .post(noop())
            .expect("Valid request");

        assert_eq!(request.url().as_str(), "https://api.example.com/v1/items");
        assert_eq!(request.cache_key(), "https://api.example.com/v1/items");
        assert_eq!(request.params().get("page").map(String::as_str), Some("3"));
        assert_eq!(request.params().get("q").map(String::as_str), Some("a b"));
        assert_eq!(request.cache_policy(), CachePolicy::Enabled);
        assert_eq!(request.mode(), ExecutionMode::Synchronous);

        let transport = request.transport_request(Duration::from_secs(10));
        assert_eq!(transport.method, Method::Post);
        assert_eq!(transport.form_body().as_deref(), Some("page=3&q=a+b"));
    }

    #[test]
    fn test_params_replace_previous() {
        let request = RequestBuilder::new("https://api.example.com")
            .param("old", 1)
            .params([("q", "a b")])
            .get(noop())
            .expect("Valid request");

        assert_eq!(
            request.transport_request(Duration::from_secs(1)).target_url().as_str(),
            "https://api.example.com/?q=a%20b"
        );
    }

    #[test]
    fn test_every_verb() {
        let base = RequestBuilder::new("https://api.example.com/items");

        assert_eq!(base.clone().put(noop()).expect("put").method(), Method::Put);
        assert_eq!(
            base.clone().delete(noop()).expect("delete").method(),
            Method::Delete
        );
        let moved = base
            .url("https://other.example.com")
            .post(noop())
            .expect("post");
        assert_eq!(moved.url().host_str(), Some("other.example.com"));
    }

    #[test]
    fn test_invalid_url() {
        let result = RequestBuilder::new("not a url").get(noop());
        assert!(matches!(result, Err(BuildError::InvalidUrl(_))));
    }
}
