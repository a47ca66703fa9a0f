//! Purpose: Decide what happens to a collection item that fails to decode.
//! Exports: `InvalidItemBehaviour`, `InvalidItemLocation`.
//! Role: Per-item recovery used by every collection decode; container failures never reach it.
//! Invariants: Exactly one event per terminal decision, however deep `Custom` delegation goes.
//! Invariants: `Custom` is resolved iteratively with no depth cap; cycles are the caller's problem.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::error::DecodingError;
use crate::core::notify::{Action, ErasedValue, Event, Notifier};
use crate::json::value::{JsonArray, JsonKind, JsonObject};

pub type Resolve<T> = Arc<dyn Fn(&DecodingError) -> InvalidItemBehaviour<T> + Send + Sync>;

/// What to do with an item that failed to decode.
///
/// - `Remove` drops the item and keeps going.
/// - `Fail` aborts the whole collection with the item's error.
/// - `Value` puts a substitute in the item's place.
/// - `Custom` picks one of the above from the error.
pub enum InvalidItemBehaviour<T> {
    Remove,
    Fail,
    Value(T),
    Custom(Resolve<T>),
}

impl<T> InvalidItemBehaviour<T> {
    pub fn custom<F>(resolve: F) -> Self
    where
        F: Fn(&DecodingError) -> Self + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(resolve))
    }
}

impl<T> InvalidItemBehaviour<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn type_erase(&self) -> InvalidItemBehaviour<ErasedValue> {
        match self {
            Self::Remove => InvalidItemBehaviour::Remove,
            Self::Fail => InvalidItemBehaviour::Fail,
            Self::Value(value) => InvalidItemBehaviour::Value(ErasedValue::new(value.clone())),
            Self::Custom(resolve) => {
                let resolve = Arc::clone(resolve);
                InvalidItemBehaviour::custom(move |error| resolve(error).type_erase())
            }
        }
    }

    /// Carries the policy up to a whole inner container: a substitute becomes an empty one.
    pub(crate) fn lift<C>(&self) -> InvalidItemBehaviour<C>
    where
        C: Default + 'static,
    {
        match self {
            Self::Remove => InvalidItemBehaviour::Remove,
            Self::Fail => InvalidItemBehaviour::Fail,
            Self::Value(_) => InvalidItemBehaviour::Value(C::default()),
            Self::Custom(resolve) => {
                let resolve = Arc::clone(resolve);
                InvalidItemBehaviour::custom(move |error| resolve(error).lift::<C>())
            }
        }
    }

    /// `Ok(None)` drops the item, `Ok(Some)` replaces it, `Err` aborts the collection.
    pub(crate) fn recover(
        &self,
        error: DecodingError,
        site: ItemSite<'_>,
        notifier: &Notifier,
    ) -> Result<Option<T>, DecodingError> {
        let mut behaviour = self.clone();
        loop {
            match behaviour {
                Self::Custom(resolve) => behaviour = resolve(&error),
                Self::Remove => {
                    tracing::debug!(
                        key_path = error.key_path(),
                        reason = %error.reason(),
                        location = %site,
                        found = %site.item_kind(),
                        "invalid item removed"
                    );
                    notifier.emit_with(|| Event {
                        action: Action::Removed,
                        location: site.to_location(),
                        behaviour: InvalidItemBehaviour::Remove,
                        error: error.clone(),
                    });
                    return Ok(None);
                }
                Self::Fail => {
                    tracing::warn!(
                        key_path = error.key_path(),
                        reason = %error.reason(),
                        location = %site,
                        found = %site.item_kind(),
                        "invalid item failed its collection"
                    );
                    notifier.emit_with(|| Event {
                        action: Action::Failed,
                        location: site.to_location(),
                        behaviour: InvalidItemBehaviour::Fail,
                        error: error.clone(),
                    });
                    return Err(error);
                }
                Self::Value(value) => {
                    tracing::debug!(
                        key_path = error.key_path(),
                        reason = %error.reason(),
                        location = %site,
                        found = %site.item_kind(),
                        substitute = ?value,
                        "invalid item replaced"
                    );
                    notifier.emit_with(|| {
                        let erased = ErasedValue::new(value.clone());
                        Event {
                            action: Action::ChangedValue(erased.clone()),
                            location: site.to_location(),
                            behaviour: InvalidItemBehaviour::Value(erased),
                            error: error.clone(),
                        }
                    });
                    return Ok(Some(value));
                }
            }
        }
    }
}

impl<T> Default for InvalidItemBehaviour<T> {
    fn default() -> Self {
        Self::Remove
    }
}

impl<T: Clone> Clone for InvalidItemBehaviour<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Remove => Self::Remove,
            Self::Fail => Self::Fail,
            Self::Value(value) => Self::Value(value.clone()),
            Self::Custom(resolve) => Self::Custom(Arc::clone(resolve)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for InvalidItemBehaviour<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove => f.write_str("Remove"),
            Self::Fail => f.write_str("Fail"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Where an invalid item sat, with a snapshot of its container.
#[derive(Clone, Debug, PartialEq)]
pub enum InvalidItemLocation {
    InArray { array: JsonArray, index: usize },
    InDictionary { object: JsonObject, key: String },
}

impl InvalidItemLocation {
    pub fn structure_name(&self) -> &'static str {
        match self {
            Self::InArray { .. } => "Array",
            Self::InDictionary { .. } => "Dictionary",
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::InArray { array, index } => array.get(*index),
            Self::InDictionary { object, key } => object.get(key),
        }
    }
}

/// Borrowed form of `InvalidItemLocation`, cloned only when a listener needs it.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ItemSite<'a> {
    Array { array: &'a [Value], index: usize },
    Dictionary { object: &'a JsonObject, key: &'a str },
}

impl ItemSite<'_> {
    fn item_kind(self) -> JsonKind {
        let item = match self {
            Self::Array { array, index } => array.get(index),
            Self::Dictionary { object, key } => object.get(key),
        };
        item.map_or(JsonKind::Null, JsonKind::of)
    }

    fn to_location(self) -> InvalidItemLocation {
        match self {
            Self::Array { array, index } => InvalidItemLocation::InArray {
                array: array.to_vec(),
                index,
            },
            Self::Dictionary { object, key } => InvalidItemLocation::InDictionary {
                object: object.clone(),
                key: key.to_string(),
            },
        }
    }
}

impl fmt::Display for ItemSite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array { index, .. } => write!(f, "array[{index}]"),
            Self::Dictionary { key, .. } => write!(f, "dictionary[{key:?}]"),
        }
    }
}
