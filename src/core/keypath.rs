//! Purpose: Parse dotted key paths and walk them through a JSON object tree.
//! Exports: `KeyPath`.
//! Role: Leaf lookup used by every decode entrypoint; never decides error semantics.
//! Invariants: Resolution never fails loudly; it yields a node or `None`.
//! Invariants: One trailing `.` is ignored; any other empty segment resolves to `None`.
//! Invariants: A numeric segment indexes only when the current node is an array.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::json::value::JsonObject;

const SEPARATOR: char = '.';

/// Address of a node inside a JSON object.
///
/// `Key` is looked up verbatim, dots included. `Path` holds the segments of a
/// dotted string and walks them one level at a time.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum KeyPath {
    Key(String),
    Path(Vec<String>),
}

impl KeyPath {
    pub fn new(path: &str) -> Self {
        let mut segments: Vec<&str> = path.split(SEPARATOR).collect();
        if segments.len() > 1 && segments.last().is_some_and(|last| last.is_empty()) {
            segments.pop();
        }
        match segments.as_slice() {
            [key] if !key.is_empty() || !path.contains(SEPARATOR) => Self::Key((*key).to_string()),
            _ => Self::Path(segments.into_iter().map(str::to_string).collect()),
        }
    }

    /// A single-key path that is never split, for keys that contain dots.
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Key(key) => vec![key.as_str()],
            Self::Path(segments) => segments.iter().map(String::as_str).collect(),
        }
    }

    pub fn resolve<'v>(&self, object: &'v JsonObject) -> Option<&'v Value> {
        match self {
            Self::Key(key) => object.get(key),
            Self::Path(segments) => {
                if segments.iter().any(String::is_empty) {
                    return None;
                }
                walk(object, segments)
            }
        }
    }
}

fn walk<'v>(object: &'v JsonObject, segments: &[String]) -> Option<&'v Value> {
    let (first, rest) = segments.split_first()?;
    let value = object.get(first)?;
    let Some((next, after)) = rest.split_first() else {
        return Some(value);
    };

    if let (Ok(index), Value::Array(items)) = (next.parse::<usize>(), value) {
        let item = items.get(index)?;
        if after.is_empty() {
            return Some(item);
        }
        return walk(item.as_object()?, after);
    }

    walk(value.as_object()?, rest)
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Path(segments) => {
                for (position, segment) in segments.iter().enumerate() {
                    if position > 0 {
                        write!(f, "{SEPARATOR}")?;
                    }
                    f.write_str(segment)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for KeyPath {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

impl From<&String> for KeyPath {
    fn from(path: &String) -> Self {
        Self::new(path)
    }
}

impl From<&KeyPath> for KeyPath {
    fn from(path: &KeyPath) -> Self {
        path.clone()
    }
}

impl FromStr for KeyPath {
    type Err = Infallible;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(path))
    }
}
