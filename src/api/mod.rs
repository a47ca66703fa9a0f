//! Purpose: Define the stable public Rust API boundary for keypath-json.
//! Exports: The decoder, its capability traits, recovery policy, notifier, and errors.
//! Role: Public, additive-only surface; `use keypath_json::api::*` is enough to decode.
//! Invariants: Everything a `FromJsonObject` impl needs is reachable from here.
//! Invariants: Crate-internal helpers (`Site` construction, `ItemSite`) stay private.

pub use crate::core::decode::Decoder;
pub use crate::core::error::{DecodingError, Reason, diagnostic_json};
pub use crate::core::keypath::KeyPath;
pub use crate::core::notify::{Action, ErasedValue, Event, Listener, Notifier};
pub use crate::core::options::DecodeOptions;
pub use crate::core::policy::{InvalidItemBehaviour, InvalidItemLocation};
pub use crate::core::shape::{
    Converted, DecodeShape, FromJsonObject, JsonDecodable, JsonKey, JsonNative, Nested,
    PrimitiveConvertible, Raw, RawRepresentable, RawRepresented, RawType, Site,
};
pub use crate::json::value::{JsonArray, JsonKind, JsonObject, JsonValue, snapshot};
