//! The JSON value sum type carried by `JSON` DOM nodes.

use serde::Serialize;

/// One JSON value. `Undefined` is a transient sentinel the parser's DOM
/// adaptor never leaves attached to a finished tree; it only appears while
/// an array/object container is being assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum JsonValue {
    Undefined,
    True,
    False,
    Null,
    Number(JsonNumber),
    String(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

/// A JSON number keeps the parsed value *and* the original source text, so
/// serialisation can round-trip byte-for-byte instead of reformatting.
#[derive(Debug, Clone, Serialize)]
pub struct JsonNumber {
    pub origin: String,
    pub value: NumberValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NumberValue {
    Integer(i64),
    Double(f64),
}

impl PartialEq for JsonNumber {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
    }
}

impl JsonValue {
    pub fn object_insert(&mut self, key: String, val: JsonValue) {
        if let JsonValue::Object(pairs) = self {
            if let Some(slot) = pairs.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = val;
            } else {
                pairs.push((key, val));
            }
        }
    }

    /// The textual value used when a JSON node participates in XPath string
    /// coercion: numbers use their original text, strings their raw bytes.
    pub fn string_value(&self) -> String {
        match self {
            JsonValue::Undefined => String::new(),
            JsonValue::True => "true".to_string(),
            JsonValue::False => "false".to_string(),
            JsonValue::Null => "null".to_string(),
            JsonValue::Number(n) => n.origin.clone(),
            JsonValue::String(s) => s.clone(),
            JsonValue::Array(items) => items
                .iter()
                .map(|v| v.string_value())
                .collect::<Vec<_>>()
                .join(""),
            JsonValue::Object(pairs) => pairs
                .iter()
                .map(|(_, v)| v.string_value())
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}
