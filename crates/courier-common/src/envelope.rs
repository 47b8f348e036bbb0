//! Response envelope
//!
//! Servers wrap every payload as `{"code": <int>, "message": <string>, "result": <string>}`.
//! `code == 0` means success. A missing code is never read as success: it decodes to
//! [`CODE_UNKNOWN`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Envelope code reported by a successful call
pub const CODE_SUCCESS: i64 = 0;

/// Envelope code used when the body carries no code (timeout/unknown)
pub const CODE_UNKNOWN: i64 = -1;

const CODE_KEY: &str = "code";
const MESSAGE_KEY: &str = "message";
const RESULT_KEY: &str = "result";

/// Literal the legacy wire format uses for an absent string field
const NULL_LITERAL: &str = "null";

/// Decoded server response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Business status code, `0` on success
    pub code: i64,
    /// Human readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Opaque result payload, often JSON text itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl Envelope {
    /// Decode a raw response body
    pub fn decode(body: &str) -> Result<Self, Error> {
        let value: Value =
            serde_json::from_str(body).map_err(|err| Error::Parse(err.to_string()))?;

        let Value::Object(object) = value else {
            return Err(Error::Parse("envelope is not a JSON object".to_string()));
        };

        Ok(Self {
            code: decode_code(&object)?,
            message: decode_text(&object, MESSAGE_KEY),
            result: decode_text(&object, RESULT_KEY),
        })
    }

    /// Whether the server reported success
    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}

fn decode_code(object: &Map<String, Value>) -> Result<i64, Error> {
    match object.get(CODE_KEY) {
        None | Some(Value::Null) => Ok(CODE_UNKNOWN),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| integral(number.as_f64()?))
            .ok_or_else(|| Error::Parse(format!("code is not an integer: {number}"))),
        Some(Value::String(text)) => text
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("code is not an integer: {text}"))),
        Some(other) => Err(Error::Parse(format!("code is not an integer: {other}"))),
    }
}

/// `0.0` style codes, as long as nothing is lost
fn integral(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Non-string values are kept as compact JSON text.
fn decode_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };

    (text != NULL_LITERAL).then_some(text)
}
