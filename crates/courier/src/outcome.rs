//! Request outcome

use courier_common::{Envelope, Error};

/// Transport status reported for successful exchanges and cache replays
pub const RESPONSE_OK: i32 = 200;

/// Classification of a completed request
#[derive(Debug)]
pub enum Outcome {
    /// Envelope decoded with code `0`
    Success {
        /// Transport status
        status: i32,
        /// Decoded envelope
        envelope: Envelope,
    },
    /// Anything else
    Failure {
        /// Transport status, `-1` when no response was received
        status: i32,
        /// Envelope, when one could be decoded
        envelope: Option<Envelope>,
        /// Cause, when one is known
        error: Option<Error>,
    },
}

impl Outcome {
    /// Transport status
    pub fn status(&self) -> i32 {
        match self {
            Outcome::Success { status, .. } | Outcome::Failure { status, .. } => *status,
        }
    }

    /// Decoded envelope, if any
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Outcome::Success { envelope, .. } => Some(envelope),
            Outcome::Failure { envelope, .. } => envelope.as_ref(),
        }
    }

    /// Failure cause, if any
    pub fn error(&self) -> Option<&Error> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { error, .. } => error.as_ref(),
        }
    }

    /// Whether this is a [`Outcome::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}
