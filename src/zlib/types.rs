//! Library client types
//!
//! Raw records as returned by the upstream library, and the errors the
//! client layer can produce.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A raw book record: field name to value, exactly as the upstream sent it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a field value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Book identifier, normalized to a string
    ///
    /// The upstream sends ids either as strings or as numbers.
    pub fn id(&self) -> Option<String> {
        self.scalar("id")
    }

    /// A scalar field rendered as a string
    ///
    /// Strings are returned as-is, numbers and booleans are stringified.
    /// Null, arrays and objects yield `None`.
    pub fn scalar(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert a JSON value into a record, if it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Errors raised while talking to the upstream library
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream rejected request: {0}")]
    Rejected(String),

    #[error("Unexpected upstream response: {0}")]
    Decode(String),
}
