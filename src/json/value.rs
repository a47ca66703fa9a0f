//! Purpose: Name the JSON value model and render diagnostic snapshots of it.
//! Exports: `JsonValue`, `JsonObject`, `JsonArray`, `JsonKind`, `snapshot`.
//! Role: Closed variant the resolver and dispatch match over exhaustively.
//! Invariants: Top-level strings render as raw text; everything else as compact JSON.
//! Invariants: Truncation always lands on a char boundary.

use std::fmt;

use serde_json::{Map, Value};

pub type JsonValue = Value;
pub type JsonObject = Map<String, Value>;
pub type JsonArray = Vec<Value>;

const ELLIPSIS: char = '…';

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders `value` for error messages and recovery handlers.
///
/// A string renders without quotes so `"2"` and `2` both read as `2`; callers
/// that need to tell them apart should inspect the tree, not the snapshot.
pub fn snapshot(value: &Value, limit: Option<usize>) -> String {
    let rendered = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    truncate(rendered, limit)
}

fn truncate(mut text: String, limit: Option<usize>) -> String {
    let Some(limit) = limit else {
        return text;
    };
    if let Some((cut, _)) = text.char_indices().nth(limit) {
        text.truncate(cut);
        text.push(ELLIPSIS);
    }
    text
}
