//! Example values
//!
//! An [`Example`] is the merged representative of a field across all records
//! of a kind. It has the shape of a record [`Value`] plus the `Invalid`
//! marker for fields whose observed types cannot be reconciled.

use crate::types::{JsonValue, Value};
use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Merged field example
#[derive(Debug, Clone, PartialEq)]
pub enum Example {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(DateTime<FixedOffset>),
    List(Vec<Example>),
    Object(BTreeMap<String, Example>),
    Link {
        target: String,
        kind: Option<String>,
    },
    /// Irreconcilable types were observed here
    Invalid,
}

/// Runtime kind of an example, used to decide mergeability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExampleKind {
    Null,
    Bool,
    /// `Int` and `Float` merge with each other
    Number,
    String,
    Date,
    Link,
    List,
    Object,
    Invalid,
}

impl Example {
    pub fn kind(&self) -> ExampleKind {
        match self {
            Example::Null => ExampleKind::Null,
            Example::Bool(_) => ExampleKind::Bool,
            Example::Int(_) | Example::Float(_) => ExampleKind::Number,
            Example::String(_) => ExampleKind::String,
            Example::Date(_) => ExampleKind::Date,
            Example::Link { .. } => ExampleKind::Link,
            Example::List(_) => ExampleKind::List,
            Example::Object(_) => ExampleKind::Object,
            Example::Invalid => ExampleKind::Invalid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Example::Null)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Example::Invalid)
    }

    /// True when the example carries no type information.
    ///
    /// `Null`, `Invalid` and containers holding only such values are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Example::Null | Example::Invalid => true,
            Example::List(items) => items.iter().all(Example::is_empty),
            Example::Object(fields) => fields.values().all(Example::is_empty),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Example::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Example>> {
        match self {
            Example::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Id this example refers to when used as a link
    pub fn as_link_id(&self) -> Option<String> {
        match self {
            Example::String(s) => Some(s.clone()),
            Example::Link { target, .. } => Some(target.clone()),
            Example::Int(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Human-readable type name used in conflict reports.
    ///
    /// Lists name their distinct element types: `List<Int|String>`.
    pub fn type_name(&self) -> String {
        match self {
            Example::Null => "Null".to_string(),
            Example::Bool(_) => "Bool".to_string(),
            Example::Int(_) => "Int".to_string(),
            Example::Float(_) => "Float".to_string(),
            Example::String(_) => "String".to_string(),
            Example::Date(_) => "Date".to_string(),
            Example::Link { .. } => "Link".to_string(),
            Example::Object(_) => "Object".to_string(),
            Example::Invalid => "Invalid".to_string(),
            Example::List(items) => {
                let names: BTreeSet<String> = items.iter().map(Example::type_name).collect();
                format!("List<{}>", names.into_iter().collect::<Vec<_>>().join("|"))
            }
        }
    }

    /// Total order used to pick a representative among same-kind values.
    ///
    /// Values of different kinds order by kind.
    pub fn canonical_cmp(&self, other: &Example) -> Ordering {
        match (self, other) {
            (Example::Bool(a), Example::Bool(b)) => a.cmp(b),
            (Example::Int(a), Example::Int(b)) => a.cmp(b),
            (Example::Float(a), Example::Float(b)) => a.total_cmp(b),
            (Example::Int(a), Example::Float(b)) => (*a as f64).total_cmp(b),
            (Example::Float(a), Example::Int(b)) => a.total_cmp(&(*b as f64)),
            (Example::String(a), Example::String(b)) => a.cmp(b),
            (Example::Date(a), Example::Date(b)) => a.cmp(b),
            (
                Example::Link {
                    target: a,
                    kind: ak,
                },
                Example::Link {
                    target: b,
                    kind: bk,
                },
            ) => a.cmp(b).then_with(|| ak.cmp(bk)),
            (Example::List(a), Example::List(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.canonical_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Example::Object(a), Example::Object(b)) => a
                .iter()
                .zip(b)
                .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| va.canonical_cmp(vb)))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.kind().cmp(&other.kind()),
        }
    }

    /// JSON rendering of a sample value; `Invalid` renders as null
    pub fn to_json(&self) -> JsonValue {
        match self {
            Example::Null | Example::Invalid => JsonValue::Null,
            Example::Bool(b) => JsonValue::Bool(*b),
            Example::Int(i) => JsonValue::from(*i),
            Example::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Example::String(s) => JsonValue::String(s.clone()),
            Example::Date(d) => JsonValue::String(d.to_rfc3339()),
            Example::Link { target, .. } => JsonValue::String(target.clone()),
            Example::List(items) => JsonValue::Array(items.iter().map(Example::to_json).collect()),
            Example::Object(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Example {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Example::Null,
            Value::Bool(b) => Example::Bool(*b),
            Value::Int(i) => Example::Int(*i),
            Value::Float(f) => Example::Float(*f),
            Value::String(s) => Example::String(s.clone()),
            Value::Date(d) => Example::Date(*d),
            Value::List(items) => Example::List(items.iter().map(Example::from).collect()),
            Value::Object(fields) => Example::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Example::from(v)))
                    .collect(),
            ),
            Value::Link { target, kind } => Example::Link {
                target: target.clone(),
                kind: kind.clone(),
            },
        }
    }
}

impl From<Value> for Example {
    fn from(value: Value) -> Self {
        Example::from(&value)
    }
}
