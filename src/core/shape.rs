//! Purpose: Declare the capability traits that select a decode strategy per target type.
//! Exports: `JsonDecodable`, `DecodeShape`, `Site`, the shape markers, and the capability traits.
//! Role: Compile-time dispatch table; the decoder never inspects target types at runtime.
//! Invariants: A node of the wrong JSON kind is always `IncorrectType`, never a panic.
//! Invariants: Raw decode failures stay distinct from variant and conversion rejections.

use std::fmt;

use serde_json::Value;

use crate::core::decode::Decoder;
use crate::core::error::{DecodingError, Reason};
use crate::core::keypath::KeyPath;
use crate::core::options::DecodeOptions;
use crate::json::value::{JsonObject, snapshot};

/// A target the decoder can produce, tagged with the shape that converts it.
///
/// ```ignore
/// impl JsonDecodable for Colour {
///     type Shape = RawRepresented;
/// }
/// ```
pub trait JsonDecodable: Clone + fmt::Debug + Send + Sync + 'static {
    type Shape: DecodeShape<Self>;

    fn type_name() -> String {
        short_type_name::<Self>()
    }
}

pub trait DecodeShape<T> {
    fn decode_node(node: &Value, site: &Site<'_>) -> Result<T, DecodingError>;
}

/// JSON-native kinds matched directly against the tree.
pub enum Raw {}

/// Enum-like targets built from a raw value.
pub enum RawRepresented {}

/// Targets converted, possibly failing, from a JSON-native value.
pub enum Converted {}

/// User types built from a nested JSON object.
pub enum Nested {}

pub trait JsonNative: Sized {
    fn from_node(node: &Value) -> Option<Self>;
}

/// Scalar JSON-native kinds: integers, floats, strings, and booleans.
pub trait RawType: JsonNative + JsonDecodable {}

pub trait RawRepresentable: Sized {
    type Raw: RawType;

    fn from_raw(raw: Self::Raw) -> Option<Self>;

    fn to_raw(&self) -> Self::Raw;
}

pub trait PrimitiveConvertible: Sized {
    type Json: JsonNative + JsonDecodable;

    fn from_json_value(value: Self::Json) -> Option<Self>;
}

pub trait FromJsonObject: Sized {
    fn from_json_object(json: &Decoder<'_>) -> Result<Self, DecodingError>;
}

/// Dictionary key built from a raw JSON object key; `None` skips the entry.
pub trait JsonKey: Ord + Clone + fmt::Debug + Send + Sync + 'static {
    fn from_key(key: &str) -> Option<Self>;
}

impl JsonKey for String {
    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

/// Where a node was found, used to address the errors raised while converting it.
#[derive(Clone, Copy)]
pub struct Site<'a> {
    key_path: &'a KeyPath,
    container: Option<&'a Value>,
    options: &'a DecodeOptions,
}

impl<'a> Site<'a> {
    pub(crate) fn new(key_path: &'a KeyPath, options: &'a DecodeOptions) -> Self {
        Self {
            key_path,
            container: None,
            options,
        }
    }

    pub(crate) fn within(mut self, container: &'a Value) -> Self {
        self.container = Some(container);
        self
    }

    pub fn key_path(&self) -> &'a KeyPath {
        self.key_path
    }

    pub fn options(&self) -> &'a DecodeOptions {
        self.options
    }

    pub fn error(
        &self,
        reason: Reason,
        expected_type: impl Into<String>,
        node: &Value,
    ) -> DecodingError {
        let limit = self.options.snapshot_limit;
        let error = DecodingError::new(reason, self.key_path.to_string())
            .with_expected_type(expected_type)
            .with_value(snapshot(node, limit));
        match self.container {
            Some(container) => error.with_collection(snapshot(container, limit)),
            None => error,
        }
    }

    pub(crate) fn missing(&self, expected_type: impl Into<String>) -> DecodingError {
        DecodingError::new(Reason::KeyNotFound, self.key_path.to_string())
            .with_expected_type(expected_type)
    }
}

impl<T> DecodeShape<T> for Raw
where
    T: JsonNative + JsonDecodable,
{
    fn decode_node(node: &Value, site: &Site<'_>) -> Result<T, DecodingError> {
        T::from_node(node).ok_or_else(|| site.error(Reason::IncorrectType, T::type_name(), node))
    }
}

impl<T> DecodeShape<T> for RawRepresented
where
    T: RawRepresentable + JsonDecodable,
{
    fn decode_node(node: &Value, site: &Site<'_>) -> Result<T, DecodingError> {
        let raw = <T::Raw as JsonNative>::from_node(node)
            .ok_or_else(|| site.error(Reason::IncorrectType, T::Raw::type_name(), node))?;
        T::from_raw(raw).ok_or_else(|| {
            site.error(
                Reason::IncorrectRawRepresentableRawValue,
                T::type_name(),
                node,
            )
        })
    }
}

impl<T> DecodeShape<T> for Converted
where
    T: PrimitiveConvertible + JsonDecodable,
{
    fn decode_node(node: &Value, site: &Site<'_>) -> Result<T, DecodingError> {
        let value = <T::Json as JsonNative>::from_node(node)
            .ok_or_else(|| site.error(Reason::IncorrectType, T::Json::type_name(), node))?;
        T::from_json_value(value)
            .ok_or_else(|| site.error(Reason::ConversionFailure, T::type_name(), node))
    }
}

impl<T> DecodeShape<T> for Nested
where
    T: FromJsonObject + JsonDecodable,
{
    fn decode_node(node: &Value, site: &Site<'_>) -> Result<T, DecodingError> {
        let Value::Object(object) = node else {
            return Err(site.error(Reason::IncorrectType, JsonObject::type_name(), node));
        };
        T::from_json_object(&Decoder::with_options(object, site.options().clone()))
    }
}

macro_rules! raw_type {
    ($($ty:ty => $extract:expr),+ $(,)?) => {
        $(
            impl JsonNative for $ty {
                fn from_node(node: &Value) -> Option<Self> {
                    $extract(node)
                }
            }

            impl JsonDecodable for $ty {
                type Shape = Raw;
            }

            impl RawType for $ty {}
        )+
    };
}

raw_type! {
    i64 => |node: &Value| node.as_i64(),
    i32 => |node: &Value| node.as_i64().and_then(|n| i32::try_from(n).ok()),
    u64 => |node: &Value| node.as_u64(),
    u32 => |node: &Value| node.as_u64().and_then(|n| u32::try_from(n).ok()),
    f64 => |node: &Value| node.as_f64(),
    f32 => |node: &Value| node.as_f64().map(|n| n as f32).filter(|n| n.is_finite()),
    String => |node: &Value| node.as_str().map(str::to_string),
    bool => |node: &Value| node.as_bool(),
}

impl JsonNative for JsonObject {
    fn from_node(node: &Value) -> Option<Self> {
        node.as_object().cloned()
    }
}

impl JsonDecodable for JsonObject {
    type Shape = Raw;

    fn type_name() -> String {
        "JsonObject".to_string()
    }
}

/// `std::any::type_name` with every module path stripped: `Vec<String>`, not
/// `alloc::vec::Vec<alloc::string::String>`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut token = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            token.push(ch);
            continue;
        }
        out.push_str(last_segment(&token));
        token.clear();
        out.push(ch);
    }
    out.push_str(last_segment(&token));
    out
}

fn last_segment(token: &str) -> &str {
    token.rsplit("::").next().unwrap_or(token)
}
