//! Query-time field resolution
//!
//! Fields built from links, mappings and file paths hold record ids or
//! relative paths in the data; the resolver turns those into records of the
//! store when a field is read.

use super::heuristics::join_path;
use super::types::{Field, FieldSource, TypeNode};
use crate::config::InferenceConfig;
use crate::store::RecordStore;
use crate::types::{FieldMap, Record, Value};

/// Value of a field at query time
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'s> {
    Null,
    Value(Value),
    Record(&'s Record),
    List(Vec<Resolved<'s>>),
}

impl<'s> Resolved<'s> {
    pub fn is_null(&self) -> bool {
        matches!(self, Resolved::Null)
    }

    pub fn as_record(&self) -> Option<&'s Record> {
        match self {
            Resolved::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Ids of the resolved records, in order
    pub fn record_ids(&self) -> Vec<&'s str> {
        match self {
            Resolved::Record(record) => vec![record.id.as_str()],
            Resolved::List(items) => items.iter().flat_map(Resolved::record_ids).collect(),
            _ => Vec::new(),
        }
    }
}

/// Resolves fields of built types against a record store
pub struct Resolver<'s, S: RecordStore + ?Sized> {
    store: &'s S,
    config: &'s InferenceConfig,
}

impl<'s, S: RecordStore + ?Sized> Resolver<'s, S> {
    pub fn new(store: &'s S, config: &'s InferenceConfig) -> Self {
        Self { store, config }
    }

    /// Resolve `field` read from `object`, a value owned by `owner`.
    ///
    /// `object` is the record's field map for top-level fields and the
    /// nested map for fields of inferred object types. List fields accept a
    /// single value and resolve it as a one-element list.
    pub fn resolve(&self, field: &Field, object: &FieldMap, owner: &'s Record) -> Resolved<'s> {
        let raw = match field.source.key() {
            "id" if matches!(field.source, FieldSource::Value { .. }) => {
                return Resolved::Value(Value::String(owner.id.clone()))
            }
            key => object.get(key),
        };
        let Some(raw) = raw.filter(|v| !v.is_null()) else {
            return Resolved::Null;
        };

        if field.ty.is_list() {
            let items: Vec<&Value> = match raw {
                Value::List(items) => items.iter().filter(|v| !v.is_null()).collect(),
                single => vec![single],
            };
            return Resolved::List(
                items
                    .into_iter()
                    .map(|item| self.resolve_one(field, item, owner))
                    .collect(),
            );
        }
        self.resolve_one(field, raw, owner)
    }

    fn resolve_one(&self, field: &Field, value: &Value, owner: &'s Record) -> Resolved<'s> {
        let found = match &field.source {
            FieldSource::Value { .. } => return resolve_value(field, value),
            FieldSource::Link { by: None, .. } => value
                .as_link_id()
                .and_then(|id| self.store.get_record(&id)),
            FieldSource::Link { by: Some(by), .. } => value.as_link_id().and_then(|id| {
                self.store
                    .records()
                    .find(|r| r.field(by).and_then(Value::as_link_id) == Some(id.clone()))
            }),
            FieldSource::Mapping { kind, .. } => value
                .as_link_id()
                .and_then(|id| self.store.get_record(&id))
                .filter(|r| r.kind == *kind),
            FieldSource::File { .. } => value.as_str().and_then(|path| self.find_file(owner, path)),
        };
        found.map_or(Resolved::Null, Resolved::Record)
    }

    fn find_file(&self, owner: &'s Record, relative: &str) -> Option<&'s Record> {
        let root = self.store.root_record(owner, self.config.max_ancestor_depth)?;
        let dir = root.str_field(&self.config.file_dir_field)?;
        let path = join_path(dir, relative);
        self.store.records().find(|r| {
            r.kind == self.config.file_kind
                && r.str_field(&self.config.file_path_field) == Some(path.as_str())
        })
    }
}

/// Plain values resolve to themselves; containers under a scalar type do not
fn resolve_value<'s>(field: &Field, value: &Value) -> Resolved<'s> {
    let scalar = matches!(field.ty.innermost(), TypeNode::Scalar(_));
    match value {
        Value::List(_) | Value::Object(_) if scalar => Resolved::Null,
        other => Resolved::Value(other.clone()),
    }
}
