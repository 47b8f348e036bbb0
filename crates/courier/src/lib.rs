//! Envelope-aware HTTP request orchestration
//!
//! Courier sends a request with one of four verbs, unwraps the
//! `{"code", "message", "result"}` envelope the server answers with, optionally
//! replays and stores the last successful body per endpoint, and delivers the outcome
//! to exactly one caller supplied [`Callback`].
//!
//! # Example
//!
//! ```no_run
//! use courier::{Callback, Envelope, Error, Orchestrator, RequestBuilder, TextHandler};
//!
//! struct Print;
//!
//! impl TextHandler for Print {
//!     fn on_success(&self, status: i32, result: Option<&str>) {
//!         println!("{status}: {}", result.unwrap_or_default());
//!     }
//!
//!     fn on_fail(&self, status: i32, _envelope: Option<&Envelope>, error: Option<&Error>) {
//!         eprintln!("{status}: {}", error.map(|e| e.to_string()).unwrap_or_default());
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let orchestrator = Orchestrator::builder()
//!     .runtime(runtime.handle().clone())
//!     .build()?;
//!
//! let request = RequestBuilder::new("https://api.example.com")
//!     .add_path("/v1/search")
//!     .param("q", "a b")
//!     .use_cache(true)
//!     .sync_mode(true)
//!     .get(Callback::text(Print))?;
//!
//! let outcome = orchestrator.execute_blocking(request);
//! println!("delivered success: {}", outcome.is_success());
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod outcome;
pub mod request;
pub mod settings;

pub use callback::{Callback, EnvelopeHandler, ResultHandler, TextHandler};
pub use courier_common::{
    CacheStore, Envelope, Error, ExecutionMode, MemoryCache, Method, Transport, TransportError,
    TransportRequest, TransportResponse,
};
pub use error::BuildError;
pub use lifecycle::{
    queue_context, CallerContext, ContextQueue, Progress, ProgressHook, QueueContext, Resume,
};
pub use orchestrator::{Execution, Orchestrator, OrchestratorBuilder};
pub use outcome::{Outcome, RESPONSE_OK};
pub use request::{CachePolicy, Request, RequestBuilder};
pub use settings::{CacheWrite, Settings};

// re-exporting internal crates
pub use courier_common;
#[cfg(feature = "http-client")]
pub use courier_http_client;
#[cfg(feature = "redb")]
pub use courier_redb;
