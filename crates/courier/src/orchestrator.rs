//! Request orchestrator
//!
//! Runs a [`Request`] end to end: optional replay of the cached body, the transport
//! call, envelope classification, cache update and callback dispatch.
//!
//! The replay is a provisional success dispatched before the network call, not in
//! place of it. When the live body turns out to be byte-identical to the replayed
//! one the second dispatch is suppressed; otherwise the callback sees both.

use std::collections::HashSet;
#[cfg(feature = "redb")]
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};

use courier_common::{
    CacheStore, Envelope, Error, ExecutionMode, MemoryCache, Transport, TransportError,
    TransportResponse,
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::error::BuildError;
use crate::lifecycle::ProgressGuard;
use crate::outcome::{Outcome, RESPONSE_OK};
use crate::request::{CachePolicy, Request};
use crate::settings::{CacheWrite, Settings};

/// Cached body dispatched ahead of the network call
#[derive(Debug)]
struct Served {
    body: String,
    delivered: Outcome,
}

/// Result of [`Orchestrator::execute`]
#[derive(Debug)]
pub enum Execution {
    /// Synchronous request, the outcome has already been dispatched
    Completed(Outcome),
    /// Asynchronous request, the outcome will be dispatched by the task
    Pending(JoinHandle<()>),
}

impl Execution {
    /// Outcome of a synchronous request
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Execution::Completed(outcome) => Some(outcome),
            Execution::Pending(_) => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
    runtime: Handle,
    settings: Settings,
    /// Endpoints that completed at least one live exchange
    exchanged: Mutex<HashSet<String>>,
}

/// Request orchestrator
///
/// Cheap to clone; clones share the transport, the cache and the exchange ledger.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    /// Create a new orchestrator builder
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Settings in use
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Cache store in use
    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.inner.cache
    }

    /// Run `request` in its configured mode
    pub fn execute(&self, request: Request) -> Execution {
        match request.mode() {
            ExecutionMode::Synchronous => Execution::Completed(self.execute_blocking(request)),
            ExecutionMode::Asynchronous => Execution::Pending(self.spawn(request)),
        }
    }

    /// Run `request` on the calling thread
    ///
    /// The transport call runs on the runtime while this thread waits at most
    /// [`Settings::timeout`]. Expiry yields a failure with status `-1`.
    ///
    /// Must not be called from within an async task.
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    pub fn execute_blocking(&self, request: Request) -> Outcome {
        let _progress = ProgressGuard::start(request.progress());
        let served = self.replay(&request);

        let timeout = self.inner.settings.timeout();
        let transport_request = request.transport_request(timeout);
        let transport = Arc::clone(&self.inner.transport);
        let (sender, receiver) = mpsc::channel();

        let task = self.inner.runtime.spawn(async move {
            let response = transport.send(&transport_request).await;
            let _ = sender.send(response);
        });

        let response = match receiver.recv_timeout(timeout) {
            Ok(response) => response,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("No response within {} ms", timeout.as_millis());
                task.abort();
                TransportResponse::failed(TransportError::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("Transport task ended without a response");
                TransportResponse::failed(TransportError::Interrupted)
            }
        };

        self.complete(&request, response, served)
    }

    /// Run `request` on the runtime
    ///
    /// The cached body, if any, is replayed on the calling thread before this returns.
    /// The continuation resumes on the request's caller context when one was set.
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    pub fn spawn(&self, request: Request) -> JoinHandle<()> {
        let progress = ProgressGuard::start(request.progress());
        let served = self.replay(&request);
        let this = self.clone();

        self.inner.runtime.spawn(async move {
            let transport_request = request.transport_request(this.inner.settings.timeout());
            let response = this.inner.transport.send(&transport_request).await;
            let context = request.caller_context().cloned();

            let continuation = move || {
                this.complete(&request, response, served);
                drop(progress);
            };

            match context {
                Some(context) => context.resume(Box::new(continuation)),
                None => continuation(),
            }
        })
    }

    /// Run `request` from async code and return the delivered outcome
    ///
    /// The wait is bounded by [`Settings::timeout`] like a synchronous request. Any
    /// caller context is ignored, the continuation runs in the awaiting task.
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    pub async fn execute_async(&self, request: Request) -> Outcome {
        let _progress = ProgressGuard::start(request.progress());
        let served = self.replay(&request);

        let timeout = self.inner.settings.timeout();
        let transport_request = request.transport_request(timeout);

        let response =
            match tokio::time::timeout(timeout, self.inner.transport.send(&transport_request))
                .await
            {
                Ok(response) => response,
                Err(_) => {
                    tracing::warn!("No response within {} ms", timeout.as_millis());
                    TransportResponse::failed(TransportError::Timeout)
                }
            };

        self.complete(&request, response, served)
    }

    /// Dispatch the cached body as a provisional success
    ///
    /// Returns the dispatched body together with the outcome the callback was given.
    fn replay(&self, request: &Request) -> Option<Served> {
        if request.cache_policy() != CachePolicy::Enabled || !self.inner.settings.replay_cached {
            return None;
        }

        let key = request.cache_key();
        let body = match self.inner.cache.get(key) {
            Ok(body) => body?,
            Err(err) => {
                tracing::warn!("Could not read cache entry for {}: {}", key, err);
                return None;
            }
        };

        let envelope = match Envelope::decode(&body) {
            Ok(envelope) if envelope.is_success() => envelope,
            Ok(envelope) => {
                tracing::debug!(
                    "Not replaying cached entry for {} with code {}",
                    key,
                    envelope.code
                );
                return None;
            }
            Err(err) => {
                tracing::warn!("Cached entry for {} does not decode: {}", key, err);
                return None;
            }
        };

        tracing::debug!("Replaying cached response for {}", key);

        let delivered = request.callback().dispatch(Outcome::Success {
            status: RESPONSE_OK,
            envelope,
        });

        Some(Served { body, delivered })
    }

    /// Classify a live response, update the cache and dispatch
    fn complete(
        &self,
        request: &Request,
        response: TransportResponse,
        served: Option<Served>,
    ) -> Outcome {
        let key = request.cache_key();
        let exchanged_before = !self.mark_exchanged(key);
        let status = response.status;

        if !response.is_ok() {
            let envelope = response
                .body
                .as_deref()
                .filter(|body| !body.trim().is_empty())
                .and_then(|body| Envelope::decode(body).ok());

            tracing::debug!("{} {} failed with status {}", request.method(), key, status);

            return request.callback().dispatch(Outcome::Failure {
                status,
                envelope,
                error: response.error.map(Error::Transport),
            });
        }

        // every 2xx is reported like a replay
        let status = RESPONSE_OK;
        let body = response.body.unwrap_or_default();

        let envelope = match Envelope::decode(&body) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!("Response from {} is not an envelope: {}", key, err);
                return request.callback().dispatch(Outcome::Failure {
                    status,
                    envelope: None,
                    error: Some(err),
                });
            }
        };

        if !envelope.is_success() {
            let error = Error::Business {
                code: envelope.code,
                message: envelope.message.clone(),
            };
            return request.callback().dispatch(Outcome::Failure {
                status,
                envelope: Some(envelope),
                error: Some(error),
            });
        }

        if request.cache_policy() == CachePolicy::Enabled {
            self.persist(key, &body, exchanged_before);
        }

        if let Some(served) = served.filter(|served| served.body == body) {
            tracing::debug!("Live response for {} matches the replayed body", key);
            return served.delivered;
        }

        request
            .callback()
            .dispatch(Outcome::Success { status, envelope })
    }

    fn persist(&self, key: &str, body: &str, exchanged_before: bool) {
        let allowed = match self.inner.settings.cache_write {
            CacheWrite::Always => true,
            CacheWrite::AfterFirstExchange => {
                exchanged_before
                    || self.inner.cache.has(key).unwrap_or_else(|err| {
                        tracing::warn!("Could not check cache entry for {}: {}", key, err);
                        false
                    })
            }
        };

        if !allowed {
            tracing::debug!("First exchange with {}, not caching yet", key);
            return;
        }

        if let Err(err) = self.inner.cache.put(key, body) {
            tracing::warn!("Could not cache response for {}: {}", key, err);
        }
    }

    /// Returns whether this is the first exchange recorded for `key`
    fn mark_exchanged(&self, key: &str) -> bool {
        match self.inner.exchanged.lock() {
            Ok(mut exchanged) => exchanged.insert(key.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(key.to_string()),
        }
    }
}

/// Orchestrator builder
#[derive(Debug, Default)]
pub struct OrchestratorBuilder {
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<dyn CacheStore>>,
    runtime: Option<Handle>,
    settings: Settings,
    #[cfg(feature = "redb")]
    cache_file: Option<PathBuf>,
}

impl OrchestratorBuilder {
    /// Transport to send requests with
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Cache store, an in-memory one is used otherwise
    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Persist the cache in the redb file at `path`, in the partition named by
    /// [`Settings::cache_partition`]
    ///
    /// Ignored when a cache store is given with [`OrchestratorBuilder::cache`].
    #[cfg(feature = "redb")]
    pub fn cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(path.into());
        self
    }

    /// Runtime transport calls run on, the current one is used otherwise
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Settings
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the orchestrator
    pub fn build(mut self) -> Result<Orchestrator, BuildError> {
        let runtime = match self.runtime.take() {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| BuildError::MissingRuntime)?,
        };

        let cache = match self.cache.take() {
            Some(cache) => cache,
            None => default_cache(&self)?,
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&self.settings)?,
        };

        Ok(Orchestrator {
            inner: Arc::new(Inner {
                transport,
                cache,
                runtime,
                settings: self.settings,
                exchanged: Mutex::new(HashSet::new()),
            }),
        })
    }
}

#[cfg(feature = "redb")]
fn default_cache(builder: &OrchestratorBuilder) -> Result<Arc<dyn CacheStore>, BuildError> {
    match &builder.cache_file {
        Some(path) => Ok(Arc::new(courier_redb::RedbCache::new(
            path,
            &builder.settings.cache_partition,
        )?)),
        None => Ok(Arc::new(MemoryCache::new())),
    }
}

#[cfg(not(feature = "redb"))]
fn default_cache(_builder: &OrchestratorBuilder) -> Result<Arc<dyn CacheStore>, BuildError> {
    Ok(Arc::new(MemoryCache::new()))
}

#[cfg(feature = "http-client")]
fn default_transport(settings: &Settings) -> Result<Arc<dyn Transport>, BuildError> {
    let client = courier_http_client::HttpClient::builder()
        .timeout(settings.timeout())
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "http-client"))]
fn default_transport(_settings: &Settings) -> Result<Arc<dyn Transport>, BuildError> {
    Err(BuildError::MissingTransport)
}
