use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value, json};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    KeyNotFound,
    IncorrectType,
    IncorrectRawRepresentableRawValue,
    ConversionFailure,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::KeyNotFound => "key_not_found",
            Reason::IncorrectType => "incorrect_type",
            Reason::IncorrectRawRepresentableRawValue => "incorrect_raw_representable_raw_value",
            Reason::ConversionFailure => "conversion_failure",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DecodingError {
    key_path: String,
    reason: Reason,
    expected_type: String,
    value: String,
    collection: Option<String>,
}

impl DecodingError {
    pub fn new(reason: Reason, key_path: impl Into<String>) -> Self {
        Self {
            key_path: key_path.into(),
            reason,
            expected_type: String::new(),
            value: String::new(),
            collection: None,
        }
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    pub fn expected_type(&self) -> &str {
        &self.expected_type
    }

    /// Snapshot of the offending node; empty for `KeyNotFound`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Snapshot of the enclosing array or object when the node was a collection item.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn with_expected_type(mut self, expected_type: impl Into<String>) -> Self {
        self.expected_type = expected_type.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }
}

impl fmt::Display for DecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at \"{}\"", self.reason, self.key_path)?;
        if !self.expected_type.is_empty() {
            write!(f, " (expected: {})", self.expected_type)?;
        }
        if self.reason != Reason::KeyNotFound {
            write!(f, " (value: {})", self.value)?;
        }
        if let Some(collection) = &self.collection {
            write!(f, " (in: {collection})")?;
        }
        Ok(())
    }
}

impl StdError for DecodingError {}

/// Wraps an error in the stable `{"decoding_error": {...}}` diagnostic envelope.
pub fn diagnostic_json(error: &DecodingError) -> Value {
    let mut inner = Map::new();
    inner.insert("reason".to_string(), json!(error.reason));
    inner.insert("key_path".to_string(), json!(error.key_path));
    inner.insert("expected_type".to_string(), json!(error.expected_type));
    inner.insert("value".to_string(), json!(error.value));
    if let Some(collection) = &error.collection {
        inner.insert("collection".to_string(), json!(collection));
    }
    inner.insert("message".to_string(), json!(error.to_string()));

    let mut outer = Map::new();
    outer.insert("decoding_error".to_string(), Value::Object(inner));
    Value::Object(outer)
}
