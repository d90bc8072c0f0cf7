//! Decoding of the presence request body.

use serde_json::Value;

use keliling_core::error::{AppError, ErrorKind};
use keliling_core::result::AppResult;

/// The optional target value carried by a presence request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceRequest {
    /// Explicit target; `None` means "flip the stored value".
    pub online: Option<bool>,
}

impl PresenceRequest {
    /// Request that flips the stored flag.
    pub fn flip() -> Self {
        Self { online: None }
    }

    /// Request for an explicit value.
    pub fn set(online: bool) -> Self {
        Self {
            online: Some(online),
        }
    }

    /// Decode a raw request body.
    ///
    /// An empty body, or a JSON object without an `online` key, is a flip.
    /// A present `online` (including `null`) is coerced with JavaScript
    /// truthiness. Anything that is not a JSON object or array is rejected.
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::flip());
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::with_source(ErrorKind::Validation, "Malformed JSON body", e))?;

        match value {
            Value::Object(map) => Ok(Self {
                online: map.get("online").map(is_truthy),
            }),
            Value::Array(_) => Ok(Self::flip()),
            _ => Err(AppError::validation("Malformed JSON body")),
        }
    }

    /// The value to write given the currently stored flag.
    pub fn resolve(&self, stored: bool) -> bool {
        self.online.unwrap_or(!stored)
    }
}

/// JavaScript `Boolean(value)` for JSON values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
