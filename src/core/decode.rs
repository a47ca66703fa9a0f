//! Purpose: Decode typed values and collections out of a JSON object by key path.
//! Exports: `Decoder`.
//! Role: Entry point for hand-written `FromJsonObject` constructors.
//! Invariants: Containers are resolved first; a missing or mistyped container is a hard error.
//! Invariants: Only item-level failures go through the caller's `InvalidItemBehaviour`.
//! Invariants: `*_opt` variants turn every error into `None`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::error::{DecodingError, Reason};
use crate::core::keypath::KeyPath;
use crate::core::options::DecodeOptions;
use crate::core::policy::{InvalidItemBehaviour, ItemSite};
use crate::core::shape::{DecodeShape, JsonDecodable, JsonKey, Site, short_type_name};
use crate::json::value::JsonObject;

/// Typed view over one JSON object.
///
/// ```ignore
/// impl FromJsonObject for Child {
///     fn from_json_object(json: &Decoder<'_>) -> Result<Self, DecodingError> {
///         Ok(Self {
///             name: json.decode("name")?,
///             tags: json.decode_array("meta.tags", InvalidItemBehaviour::Remove)?,
///             nickname: json.decode_opt("nickname"),
///         })
///     }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    object: &'a JsonObject,
    options: DecodeOptions,
}

impl<'a> Decoder<'a> {
    pub fn new(object: &'a JsonObject) -> Self {
        Self::with_options(object, DecodeOptions::new())
    }

    pub fn with_options(object: &'a JsonObject, options: DecodeOptions) -> Self {
        Self { object, options }
    }

    pub fn object(&self) -> &'a JsonObject {
        self.object
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn value_at(&self, path: impl Into<KeyPath>) -> Option<&'a Value> {
        path.into().resolve(self.object)
    }

    pub fn decode<T: JsonDecodable>(&self, path: impl Into<KeyPath>) -> Result<T, DecodingError> {
        let path = path.into();
        let site = Site::new(&path, &self.options);
        let Some(node) = path.resolve(self.object) else {
            return Err(site.missing(T::type_name()));
        };
        <T::Shape as DecodeShape<T>>::decode_node(node, &site)
    }

    pub fn decode_opt<T: JsonDecodable>(&self, path: impl Into<KeyPath>) -> Option<T> {
        self.decode(path).ok()
    }

    pub fn decode_array<T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Result<Vec<T>, DecodingError> {
        let path = path.into();
        let (node, items) = self.array_at(&path, || vec_name::<T>())?;
        self.collect_array(&path, node, items, &behaviour)
    }

    pub fn decode_array_opt<T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Option<Vec<T>> {
        self.decode_array(path, behaviour).ok()
    }

    /// Entries whose key `K` rejects are skipped without consulting `behaviour`.
    pub fn decode_map<K: JsonKey, T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Result<BTreeMap<K, T>, DecodingError> {
        let path = path.into();
        let (node, entries) = self.object_at(&path, || map_name::<K>(&T::type_name()))?;
        self.collect_map(node, entries, &behaviour)
    }

    pub fn decode_map_opt<K: JsonKey, T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Option<BTreeMap<K, T>> {
        self.decode_map(path, behaviour).ok()
    }

    /// Rows that are not arrays go through `behaviour` lifted to a whole row.
    pub fn decode_nested_arrays<T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Result<Vec<Vec<T>>, DecodingError> {
        let path = path.into();
        let (node, rows) = self.array_at(&path, || format!("Vec<{}>", vec_name::<T>()))?;
        let row_behaviour = behaviour.lift::<Vec<T>>();
        let site = Site::new(&path, &self.options).within(node);

        let mut decoded = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let outcome = match row {
                Value::Array(items) => Some(self.collect_array(&path, row, items, &behaviour)?),
                other => row_behaviour.recover(
                    site.error(Reason::IncorrectType, vec_name::<T>(), other),
                    ItemSite::Array { array: rows, index },
                    &self.options.notifier,
                )?,
            };
            decoded.extend(outcome);
        }
        Ok(decoded)
    }

    pub fn decode_nested_arrays_opt<T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Option<Vec<Vec<T>>> {
        self.decode_nested_arrays(path, behaviour).ok()
    }

    /// Entries that are not arrays go through `behaviour` lifted to a whole array.
    pub fn decode_map_of_arrays<K: JsonKey, T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Result<BTreeMap<K, Vec<T>>, DecodingError> {
        let path = path.into();
        let (node, entries) = self.object_at(&path, || map_name::<K>(&vec_name::<T>()))?;
        let entry_behaviour = behaviour.lift::<Vec<T>>();

        let mut decoded = BTreeMap::new();
        for (raw_key, entry) in entries {
            let Some(key) = K::from_key(raw_key) else {
                tracing::trace!(key = raw_key.as_str(), "dictionary key rejected");
                continue;
            };
            let entry_path = KeyPath::key(raw_key.as_str());
            let outcome = match entry {
                Value::Array(items) => {
                    Some(self.collect_array(&entry_path, entry, items, &behaviour)?)
                }
                other => entry_behaviour.recover(
                    Site::new(&entry_path, &self.options).within(node).error(
                        Reason::IncorrectType,
                        vec_name::<T>(),
                        other,
                    ),
                    ItemSite::Dictionary {
                        object: entries,
                        key: raw_key,
                    },
                    &self.options.notifier,
                )?,
            };
            if let Some(items) = outcome {
                decoded.insert(key, items);
            }
        }
        Ok(decoded)
    }

    pub fn decode_map_of_arrays_opt<K: JsonKey, T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Option<BTreeMap<K, Vec<T>>> {
        self.decode_map_of_arrays(path, behaviour).ok()
    }

    /// Entries that are not objects go through `behaviour` lifted to a whole inner map.
    pub fn decode_map_of_maps<K: JsonKey, J: JsonKey, T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Result<BTreeMap<K, BTreeMap<J, T>>, DecodingError> {
        let path = path.into();
        let inner_name = || map_name::<J>(&T::type_name());
        let (node, entries) = self.object_at(&path, || map_name::<K>(&inner_name()))?;
        let entry_behaviour = behaviour.lift::<BTreeMap<J, T>>();

        let mut decoded = BTreeMap::new();
        for (raw_key, entry) in entries {
            let Some(key) = K::from_key(raw_key) else {
                tracing::trace!(key = raw_key.as_str(), "dictionary key rejected");
                continue;
            };
            let outcome = match entry {
                Value::Object(inner) => Some(self.collect_map(entry, inner, &behaviour)?),
                other => {
                    let entry_path = KeyPath::key(raw_key.as_str());
                    entry_behaviour.recover(
                        Site::new(&entry_path, &self.options).within(node).error(
                            Reason::IncorrectType,
                            inner_name(),
                            other,
                        ),
                        ItemSite::Dictionary {
                            object: entries,
                            key: raw_key,
                        },
                        &self.options.notifier,
                    )?
                }
            };
            if let Some(inner) = outcome {
                decoded.insert(key, inner);
            }
        }
        Ok(decoded)
    }

    pub fn decode_map_of_maps_opt<K: JsonKey, J: JsonKey, T: JsonDecodable>(
        &self,
        path: impl Into<KeyPath>,
        behaviour: InvalidItemBehaviour<T>,
    ) -> Option<BTreeMap<K, BTreeMap<J, T>>> {
        self.decode_map_of_maps(path, behaviour).ok()
    }

    fn array_at(
        &self,
        path: &KeyPath,
        expected: impl Fn() -> String,
    ) -> Result<(&'a Value, &'a [Value]), DecodingError> {
        let site = Site::new(path, &self.options);
        let Some(node) = path.resolve(self.object) else {
            return Err(site.missing(expected()));
        };
        let Value::Array(items) = node else {
            return Err(site.error(Reason::IncorrectType, expected(), node));
        };
        Ok((node, items.as_slice()))
    }

    fn object_at(
        &self,
        path: &KeyPath,
        expected: impl Fn() -> String,
    ) -> Result<(&'a Value, &'a JsonObject), DecodingError> {
        let site = Site::new(path, &self.options);
        let Some(node) = path.resolve(self.object) else {
            return Err(site.missing(expected()));
        };
        let Value::Object(entries) = node else {
            return Err(site.error(Reason::IncorrectType, expected(), node));
        };
        Ok((node, entries))
    }

    // Item errors carry the array's own path.
    fn collect_array<T: JsonDecodable>(
        &self,
        path: &KeyPath,
        node: &Value,
        items: &[Value],
        behaviour: &InvalidItemBehaviour<T>,
    ) -> Result<Vec<T>, DecodingError> {
        let site = Site::new(path, &self.options).within(node);
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match <T::Shape as DecodeShape<T>>::decode_node(item, &site) {
                Ok(value) => decoded.push(value),
                Err(error) => decoded.extend(behaviour.recover(
                    error,
                    ItemSite::Array {
                        array: items,
                        index,
                    },
                    &self.options.notifier,
                )?),
            }
        }
        Ok(decoded)
    }

    // Entry errors carry the entry's raw key as their path.
    fn collect_map<K: JsonKey, T: JsonDecodable>(
        &self,
        node: &Value,
        entries: &JsonObject,
        behaviour: &InvalidItemBehaviour<T>,
    ) -> Result<BTreeMap<K, T>, DecodingError> {
        let mut decoded = BTreeMap::new();
        for (raw_key, entry) in entries {
            let Some(key) = K::from_key(raw_key) else {
                tracing::trace!(key = raw_key.as_str(), "dictionary key rejected");
                continue;
            };
            let entry_path = KeyPath::key(raw_key.as_str());
            let site = Site::new(&entry_path, &self.options).within(node);
            let outcome = match <T::Shape as DecodeShape<T>>::decode_node(entry, &site) {
                Ok(value) => Some(value),
                Err(error) => behaviour.recover(
                    error,
                    ItemSite::Dictionary {
                        object: entries,
                        key: raw_key,
                    },
                    &self.options.notifier,
                )?,
            };
            if let Some(value) = outcome {
                decoded.insert(key, value);
            }
        }
        Ok(decoded)
    }
}

fn vec_name<T: JsonDecodable>() -> String {
    format!("Vec<{}>", T::type_name())
}

fn map_name<K>(value_name: &str) -> String {
    format!("BTreeMap<{}, {value_name}>", short_type_name::<K>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notify::{Action, Event, Notifier};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture is not an object: {other}"),
        }
    }

    fn isolated() -> (DecodeOptions, Arc<Mutex<Vec<Event>>>) {
        let notifier = Notifier::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let _listener = notifier.add_listener(move |event| {
            sink.lock().expect("lock").push(event.clone());
        });
        (DecodeOptions::new().with_notifier(notifier), events)
    }

    #[test]
    fn scalar_missing_and_mistyped() {
        let tree = object(json!({"name": "x", "count": "seven"}));
        let json = Decoder::new(&tree);

        let name: String = json.decode("name").expect("name");
        assert_eq!(name, "x");

        let missing = json.decode::<String>("nope").unwrap_err();
        assert_eq!(missing.reason(), Reason::KeyNotFound);
        assert_eq!(missing.key_path(), "nope");
        assert_eq!(missing.value(), "");

        let mistyped = json.decode::<i64>("count").unwrap_err();
        assert_eq!(mistyped.reason(), Reason::IncorrectType);
        assert_eq!(mistyped.expected_type(), "i64");
        assert_eq!(mistyped.value(), "seven");
        assert_eq!(mistyped.collection(), None);

        assert_eq!(json.decode_opt::<i64>("count"), None);
        assert_eq!(json.decode_opt::<i64>("nope"), None);
    }

    #[test]
    fn container_errors_bypass_the_policy() {
        let (options, events) = isolated();
        let tree = object(json!({"list": "not a list", "map": [1]}));
        let json = Decoder::with_options(&tree, options);

        let missing = json
            .decode_array::<String>("absent", InvalidItemBehaviour::Value("x".into()))
            .unwrap_err();
        assert_eq!(missing.reason(), Reason::KeyNotFound);
        assert_eq!(missing.expected_type(), "Vec<String>");

        let wrong = json
            .decode_map::<String, String>("map", InvalidItemBehaviour::Remove)
            .unwrap_err();
        assert_eq!(wrong.reason(), Reason::IncorrectType);
        assert_eq!(wrong.expected_type(), "BTreeMap<String, String>");

        assert!(events.lock().expect("lock").is_empty());
    }

    #[test]
    fn array_item_errors_carry_container_path_and_snapshot() {
        let (options, events) = isolated();
        let tree = object(json!({"outer": {"list": ["a", 2, "c"]}}));
        let json = Decoder::with_options(&tree, options);

        let error = json
            .decode_array::<String>("outer.list", InvalidItemBehaviour::Fail)
            .unwrap_err();

        assert_eq!(error.key_path(), "outer.list");
        assert_eq!(error.value(), "2");
        assert_eq!(error.collection(), Some(r#"["a",2,"c"]"#));
        let events = events.lock().expect("lock");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, Action::Failed);
        assert_eq!(events[0].error, error);
    }

    #[test]
    fn map_entry_keys_with_dots_are_not_split() {
        let tree = object(json!({"hosts": {"a.example": 1, "b.example": "two"}}));
        let json = Decoder::new(&tree);

        let error = json
            .decode_map::<String, i64>("hosts", InvalidItemBehaviour::Fail)
            .unwrap_err();
        assert_eq!(error.key_path(), "b.example");
    }

    #[test]
    fn nested_arrays_lift_the_policy_for_bad_rows() {
        let (options, events) = isolated();
        let tree = object(json!({"grid": [[1, 2], "row", [3, "x"]]}));
        let json = Decoder::with_options(&tree, options);

        let removed: Vec<Vec<i64>> = json
            .decode_nested_arrays("grid", InvalidItemBehaviour::Remove)
            .expect("grid");
        assert_eq!(removed, vec![vec![1, 2], vec![3]]);

        let substituted: Vec<Vec<i64>> = json
            .decode_nested_arrays("grid", InvalidItemBehaviour::Value(0))
            .expect("grid");
        assert_eq!(substituted, vec![vec![1, 2], vec![], vec![3, 0]]);

        let events = events.lock().expect("lock");
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0].location.structure_name(),
            "Array",
            "row failure is located in the outer array"
        );
        assert_eq!(events[0].location.value(), Some(&json!("row")));
        assert_eq!(events[1].location.value(), Some(&json!("x")));
    }

    #[test]
    fn map_of_maps_decodes_inner_entries_by_key() {
        let tree = object(json!({
            "groups": {
                "a": {"x": 1, "y": "bad"},
                "b": 7
            }
        }));
        let json = Decoder::new(&tree);

        let decoded: BTreeMap<String, BTreeMap<String, i64>> = json
            .decode_map_of_maps("groups", InvalidItemBehaviour::Remove)
            .expect("groups");
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded["a"], BTreeMap::from([("x".to_string(), 1)]));

        let error = json
            .decode_map_of_maps::<String, String, i64>("groups", InvalidItemBehaviour::Fail)
            .unwrap_err();
        assert_eq!(error.key_path(), "y");
        assert_eq!(error.reason(), Reason::IncorrectType);
    }

    #[test]
    fn value_at_exposes_the_resolver() {
        let tree = object(json!({"a": [{"b": true}]}));
        let json = Decoder::new(&tree);
        assert_eq!(json.value_at("a.0.b"), Some(&json!(true)));
        assert_eq!(json.value_at("a..b"), None);
    }
}
