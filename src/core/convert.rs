//! Purpose: Built-in conversions from JSON strings to common library types.
//! Exports: `PrimitiveConvertible` impls for `url::Url` and `time::OffsetDateTime`.
//! Role: Ready-made `Converted` targets; user conversions follow the same pattern.
//! Invariants: A rejected string is `conversion_failure`; a non-string is `incorrect_type`.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

use crate::core::shape::{Converted, JsonDecodable, PrimitiveConvertible};

/// Absolute URLs only; relative references have no base to resolve against.
impl PrimitiveConvertible for Url {
    type Json = String;

    fn from_json_value(value: String) -> Option<Self> {
        Url::parse(&value).ok()
    }
}

impl JsonDecodable for Url {
    type Shape = Converted;
}

impl PrimitiveConvertible for OffsetDateTime {
    type Json = String;

    fn from_json_value(value: String) -> Option<Self> {
        OffsetDateTime::parse(&value, &Rfc3339).ok()
    }
}

impl JsonDecodable for OffsetDateTime {
    type Shape = Converted;
}
