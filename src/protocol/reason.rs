//! Abort/error reason carried across the port

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Arbitrary reason value attached to `abort` and `error` messages
///
/// Any JSON value is accepted. Strings display bare, anything else
/// displays as compact JSON. A missing reason is `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reason(Value);

impl Reason {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Reason used when the port closes underneath the sink
    pub fn disconnected() -> Self {
        Self::from("port disconnected")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for Reason {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl From<String> for Reason {
    fn from(s: String) -> Self {
        Self(Value::String(s))
    }
}

impl From<Value> for Reason {
    fn from(v: Value) -> Self {
        Self(v)
    }
}
