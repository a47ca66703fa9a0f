//! Purpose: Shared fixtures, mock types, and event capture for integration tests.
//! Exports: Fixture loaders, `MockChild`, `MockSimpleChild`, `MockEnum`, `Recorder`, `init_tracing`.
//! Role: Test-only helpers included with `mod common;` from each integration test.
//! Invariants: Each `Recorder` owns a fresh `Notifier`, so parallel tests never share events.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use keypath_json::api::{
    DecodeOptions, Decoder, DecodingError, Event, FromJsonObject, JsonDecodable, JsonObject,
    Listener, Nested, Notifier, RawRepresentable, RawRepresented,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

pub fn parse_object(text: &str) -> JsonObject {
    match serde_json::from_str::<Value>(text).expect("fixture parses") {
        Value::Object(object) => object,
        other => panic!("fixture root is not an object: {other}"),
    }
}

pub fn correct() -> JsonObject {
    parse_object(include_str!("../fixtures/correct.json"))
}

pub fn empty() -> JsonObject {
    parse_object(include_str!("../fixtures/empty.json"))
}

/// One named sample from `invalid_items.json`, e.g. `"arrayString"`.
pub fn invalid_items(name: &str) -> JsonObject {
    let samples = parse_object(include_str!("../fixtures/invalid_items.json"));
    match samples.get(name) {
        Some(Value::Object(sample)) => sample.clone(),
        _ => panic!("no invalid_items sample named {name}"),
    }
}

/// `correct.json` with one key dropped from the `keypath` object.
pub fn correct_without(key: &str) -> JsonObject {
    let mut tree = correct();
    if let Some(Value::Object(inner)) = tree.get_mut("keypath") {
        inner.remove(key).expect("fixture key exists");
    }
    tree
}

/// Captures every event delivered to a private notifier.
pub struct Recorder {
    pub notifier: Notifier,
    pub events: Arc<Mutex<Vec<Event>>>,
    pub listener: Listener,
}

impl Recorder {
    pub fn new() -> Self {
        let notifier = Notifier::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let listener = notifier.add_listener(move |event| {
            sink.lock().expect("events lock").push(event.clone());
        });
        Self {
            notifier,
            events,
            listener,
        }
    }

    pub fn options(&self) -> DecodeOptions {
        DecodeOptions::new().with_notifier(self.notifier.clone())
    }

    pub fn decoder<'a>(&self, object: &'a JsonObject) -> Decoder<'a> {
        Decoder::with_options(object, self.options())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("events lock").clone()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MockChild {
    pub string: String,
    pub integer: i64,
    pub double: f64,
    pub boolean: bool,
}

impl MockChild {
    pub fn expected() -> Self {
        Self {
            string: "stringValue".to_string(),
            integer: 1,
            double: 1.2,
            boolean: true,
        }
    }
}

impl FromJsonObject for MockChild {
    fn from_json_object(json: &Decoder<'_>) -> Result<Self, DecodingError> {
        Ok(Self {
            string: json.decode("stringKey")?,
            integer: json.decode("integerKey")?,
            double: json.decode("doubleKey")?,
            boolean: json.decode("boolKey")?,
        })
    }
}

impl JsonDecodable for MockChild {
    type Shape = Nested;
}

#[derive(Clone, Debug, PartialEq)]
pub struct MockSimpleChild {
    pub name: String,
}

impl MockSimpleChild {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FromJsonObject for MockSimpleChild {
    fn from_json_object(json: &Decoder<'_>) -> Result<Self, DecodingError> {
        Ok(Self {
            name: json.decode("name")?,
        })
    }
}

impl JsonDecodable for MockSimpleChild {
    type Shape = Nested;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MockEnum {
    One,
    Two,
}

impl RawRepresentable for MockEnum {
    type Raw = String;

    fn from_raw(raw: String) -> Option<Self> {
        match raw.as_str() {
            "one" => Some(Self::One),
            "two" => Some(Self::Two),
            _ => None,
        }
    }

    fn to_raw(&self) -> String {
        match self {
            Self::One => "one".to_string(),
            Self::Two => "two".to_string(),
        }
    }
}

impl JsonDecodable for MockEnum {
    type Shape = RawRepresented;
}
