//! Common types used throughout node-schema
//!
//! This module contains the record data model shared by the record store,
//! the example merger and the type builder.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Field map of a record or nested object
pub type FieldMap = BTreeMap<String, Value>;

// ============================================================================
// Values
// ============================================================================

/// A record field value.
///
/// JSON input never produces `Date` or `Link`: dates are recognised later by
/// the type builder and links are tagged by field naming or declared mapping.
/// Both variants exist for records constructed in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(DateTime<FixedOffset>),
    List(Vec<Value>),
    Object(FieldMap),
    /// Reference to another record by id
    Link {
        target: String,
        kind: Option<String>,
    },
}

impl Value {
    /// Create a link to another record
    pub fn link(target: impl Into<String>) -> Self {
        Value::Link {
            target: target.into(),
            kind: None,
        }
    }

    /// Create a link carrying the expected target kind
    pub fn link_to_kind(target: impl Into<String>, kind: impl Into<String>) -> Self {
        Value::Link {
            target: target.into(),
            kind: Some(kind.into()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String content of a `String` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Nested field of an `Object` value
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Id this value refers to when used as a link
    pub fn as_link_id(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Link { target, .. } => Some(target.clone()),
            Value::Int(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Int(i) => JsonValue::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s),
            Value::Date(d) => JsonValue::String(d.to_rfc3339()),
            Value::List(items) => JsonValue::Array(items.into_iter().map(JsonValue::from).collect()),
            Value::Object(map) => {
                JsonValue::Object(map.into_iter().map(|(k, v)| (k, JsonValue::from(v))).collect())
            }
            Value::Link { target, .. } => JsonValue::String(target),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Collect every value found under a dotted selector (`a.b[].c`).
///
/// Lists are flattened at every level, including the leaf, so the selector
/// never needs element indexes.
pub fn values_at<'a>(fields: &'a FieldMap, selector: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = selector
        .split('.')
        .map(|s| s.trim_end_matches("[]"))
        .filter(|s| !s.is_empty())
        .collect();

    let mut out = Vec::new();
    if let Some((first, rest)) = segments.split_first() {
        if let Some(value) = fields.get(*first) {
            collect(value, rest, &mut out);
        }
    }
    out
}

fn collect<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    match (value, segments.split_first()) {
        (Value::List(items), _) => {
            for item in items {
                collect(item, segments, out);
            }
        }
        (_, None) => out.push(value),
        (Value::Object(map), Some((first, rest))) => {
            if let Some(next) = map.get(*first) {
                collect(next, rest, out);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Records
// ============================================================================

/// Arena handle assigned to a record (and every value nested in it) when the
/// record store ingests it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueHandle(usize);

impl ValueHandle {
    /// Handle of a record that was never ingested by a store
    pub const DETACHED: ValueHandle = ValueHandle(usize::MAX);

    pub fn new(index: usize) -> Self {
        ValueHandle(index)
    }

    /// Arena slot, `None` when detached
    pub fn index(self) -> Option<usize> {
        if self == Self::DETACHED {
            None
        } else {
            Some(self.0)
        }
    }
}

impl Default for ValueHandle {
    fn default() -> Self {
        Self::DETACHED
    }
}

/// One unit of ingested data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record id
    pub id: String,

    /// Grouping category; all records of a kind are inferred together
    pub kind: String,

    /// Id of the record this one was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Record content
    #[serde(default)]
    pub fields: FieldMap,

    /// Ownership handle, set by the record store
    #[serde(skip)]
    pub handle: ValueHandle,
}

impl Record {
    /// Create a record with no fields
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            parent: None,
            fields: FieldMap::new(),
            handle: ValueHandle::DETACHED,
        }
    }

    /// Create a record from a JSON object of fields
    pub fn from_json(id: impl Into<String>, kind: impl Into<String>, fields: JsonValue) -> Self {
        let mut record = Self::new(id, kind);
        if let Value::Object(map) = Value::from(fields) {
            record.fields = map;
        }
        record
    }

    /// Set the parent record id
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set a field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Get a top-level field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a top-level string field
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_from_json_numbers() {
        assert_eq!(Value::from(json!(3)), Value::Int(3));
        assert_eq!(Value::from(json!(3.5)), Value::Float(3.5));
        assert_eq!(Value::from(json!(2.0)), Value::Float(2.0));
    }

    #[test]
    fn test_value_json_round_trip_of_link() {
        let json: JsonValue = Value::link("abc").into();
        assert_eq!(json, json!("abc"));
    }

    #[test]
    fn test_record_deserialize() {
        let record: Record = serde_json::from_value(json!({
            "id": "1",
            "kind": "Post",
            "fields": {"title": "Hello", "tags": ["a", "b"]}
        }))
        .unwrap();

        assert_eq!(record.kind, "Post");
        assert_eq!(record.parent, None);
        assert_eq!(record.str_field("title"), Some("Hello"));
        assert_eq!(record.handle, ValueHandle::DETACHED);
    }

    #[test]
    fn test_values_at_flattens_lists() {
        let record = Record::from_json(
            "1",
            "Post",
            json!({
                "gallery": [
                    {"image": "a.png"},
                    {"image": ["b.png", "c.png"]}
                ]
            }),
        );

        let found: Vec<_> = values_at(&record.fields, "gallery[].image")
            .into_iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(found, vec!["a.png", "b.png", "c.png"]);
        assert!(values_at(&record.fields, "missing.path").is_empty());
    }
}
