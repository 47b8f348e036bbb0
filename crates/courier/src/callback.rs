//! Callback dispatch
//!
//! A request carries exactly one [`Callback`], picked when the verb is chosen. Each
//! shape receives the outcome in its own form:
//!
//! - [`EnvelopeHandler`]: the raw envelope, for success and failure alike
//! - [`TextHandler`]: the result payload as a string
//! - [`ResultHandler`]: the result payload deserialized into `T`, plus the raw string

use std::fmt;
use std::marker::PhantomData;

use courier_common::{Envelope, Error};
use serde::de::DeserializeOwned;

use crate::outcome::Outcome;

/// Receives the raw envelope of every outcome
pub trait EnvelopeHandler: Send + Sync {
    /// Called once per outcome, `envelope` is absent when nothing could be decoded
    fn on_response(&self, status: i32, envelope: Option<&Envelope>);
}

impl<F> EnvelopeHandler for F
where
    F: Fn(i32, Option<&Envelope>) + Send + Sync,
{
    fn on_response(&self, status: i32, envelope: Option<&Envelope>) {
        self(status, envelope)
    }
}

/// Receives the result payload as text
pub trait TextHandler: Send + Sync {
    /// Envelope decoded with code `0`
    fn on_success(&self, status: i32, result: Option<&str>);

    /// Transport, parse or business failure
    fn on_fail(&self, status: i32, envelope: Option<&Envelope>, error: Option<&Error>);
}

/// Receives the result payload deserialized into `T`
pub trait ResultHandler<T>: Send + Sync {
    /// Envelope decoded with code `0` and its result deserialized into `T`
    ///
    /// `raw` is the result payload exactly as it was received.
    fn on_success(&self, status: i32, value: T, raw: Option<&str>);

    /// Transport, parse, business or deserialization failure
    fn on_fail(&self, status: i32, envelope: Option<&Envelope>, error: Option<&Error>);
}

/// Type erased [`ResultHandler`]
trait TypedDispatch: Send + Sync {
    fn success(&self, status: i32, envelope: Envelope) -> Outcome;

    fn fail(&self, status: i32, envelope: Option<&Envelope>, error: Option<&Error>);

    fn target(&self) -> &'static str;
}

struct Typed<T, H> {
    handler: H,
    _target: PhantomData<fn() -> T>,
}

impl<T, H> TypedDispatch for Typed<T, H>
where
    T: DeserializeOwned,
    H: ResultHandler<T>,
{
    fn success(&self, status: i32, envelope: Envelope) -> Outcome {
        // an absent payload is handed to serde as JSON null
        let payload = envelope.result.as_deref().unwrap_or("null");

        match serde_json::from_str::<T>(payload) {
            Ok(value) => {
                self.handler
                    .on_success(status, value, envelope.result.as_deref());
                Outcome::Success { status, envelope }
            }
            Err(err) => {
                tracing::debug!(
                    "Result payload does not match {}: {}",
                    self.target(),
                    err
                );
                let error = Error::Deserialization(err.to_string());
                self.handler.on_fail(status, Some(&envelope), Some(&error));
                Outcome::Failure {
                    status,
                    envelope: Some(envelope),
                    error: Some(error),
                }
            }
        }
    }

    fn fail(&self, status: i32, envelope: Option<&Envelope>, error: Option<&Error>) {
        self.handler.on_fail(status, envelope, error)
    }

    fn target(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

enum Shape {
    Envelope(Box<dyn EnvelopeHandler>),
    Text(Box<dyn TextHandler>),
    Typed(Box<dyn TypedDispatch>),
}

/// The single handler attached to a request
pub struct Callback {
    shape: Shape,
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            Shape::Envelope(_) => f.write_str("Callback::Envelope"),
            Shape::Text(_) => f.write_str("Callback::Text"),
            Shape::Typed(handler) => write!(f, "Callback::Typed<{}>", handler.target()),
        }
    }
}

impl Callback {
    /// Deliver the raw envelope
    pub fn envelope<H>(handler: H) -> Self
    where
        H: EnvelopeHandler + 'static,
    {
        Self {
            shape: Shape::Envelope(Box::new(handler)),
        }
    }

    /// Deliver the result payload as text
    pub fn text<H>(handler: H) -> Self
    where
        H: TextHandler + 'static,
    {
        Self {
            shape: Shape::Text(Box::new(handler)),
        }
    }

    /// Deliver the result payload deserialized into `T`
    pub fn typed<T, H>(handler: H) -> Self
    where
        T: DeserializeOwned + 'static,
        H: ResultHandler<T> + 'static,
    {
        Self {
            shape: Shape::Typed(Box::new(Typed {
                handler,
                _target: PhantomData,
            })),
        }
    }

    /// Hand `outcome` to the handler
    ///
    /// Returns the outcome actually delivered: a typed handler turns a success whose
    /// payload does not deserialize into a failure.
    pub fn dispatch(&self, outcome: Outcome) -> Outcome {
        match (&self.shape, outcome) {
            (Shape::Envelope(handler), outcome) => {
                handler.on_response(outcome.status(), outcome.envelope());
                outcome
            }
            (Shape::Text(handler), Outcome::Success { status, envelope }) => {
                handler.on_success(status, envelope.result.as_deref());
                Outcome::Success { status, envelope }
            }
            (Shape::Typed(handler), Outcome::Success { status, envelope }) => {
                handler.success(status, envelope)
            }
            (Shape::Text(handler), outcome @ Outcome::Failure { .. }) => {
                handler.on_fail(outcome.status(), outcome.envelope(), outcome.error());
                outcome
            }
            (Shape::Typed(handler), outcome @ Outcome::Failure { .. }) => {
                handler.fail(outcome.status(), outcome.envelope(), outcome.error());
                outcome
            }
        }
    }
}
