//! Type building
//!
//! Turns the merged examples of a record kind into an object type. Each
//! field is decided by the first rule that applies:
//!
//! 1. declared field type
//! 2. declared mapping to another kind
//! 3. link marker in the key (`author___NODE`), or a link value
//! 4. relative path to a record of the file kind
//! 5. date-like string
//! 6. list, typed by its element
//! 7. scalar
//! 8. nested object
//!
//! Empty examples produce no field.

use super::example::Example;
use super::heuristics::{
    create_key, is_date_like, join_path, looks_like_relative_file, object_type_name,
    union_type_name, LinkKey,
};
use super::path::FieldPath;
use super::registry::TypeRegistry;
use super::types::{Field, FieldSource, ObjectType, ScalarKind, TypeNode, TypeRef, UnionType};
use crate::config::{DeclaredTypeRef, InferenceConfig};
use crate::error::{Error, Result};
use crate::store::RecordStore;
use crate::types::{values_at, Record, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Builds the types of one record kind into the registry
pub struct TypeBuilder<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    config: &'a InferenceConfig,
    registry: &'a mut TypeRegistry,
    /// Records of the kind being built
    records: &'a [&'a Record],
}

impl<'a, S: RecordStore + ?Sized> TypeBuilder<'a, S> {
    pub fn new(
        store: &'a S,
        config: &'a InferenceConfig,
        registry: &'a mut TypeRegistry,
        records: &'a [&'a Record],
    ) -> Self {
        Self {
            store,
            config,
            registry,
            records,
        }
    }

    /// Build and register the object type of a record kind.
    ///
    /// Every kind gets an `id: String` field besides the inferred ones.
    pub fn build_kind(&mut self, kind: &str, example: &BTreeMap<String, Example>) -> Result<TypeRef> {
        let root = FieldPath::root(kind);
        let mut fields = self.build_object_fields(example, &root, kind)?;
        fields.insert(
            "id".to_string(),
            Field::new(self.registry.scalar(ScalarKind::String), FieldSource::value("id")),
        );

        debug!(kind, fields = fields.len(), "built record type");
        let object = ObjectType {
            name: kind.to_string(),
            fields,
        };
        Ok(self.registry.register_type(kind, TypeNode::Object(object)))
    }

    /// Fields of the object type `type_name` inferred at `path`.
    ///
    /// Declared fields the data never provides are added as well.
    pub fn build_object_fields(
        &mut self,
        example: &BTreeMap<String, Example>,
        path: &FieldPath,
        type_name: &str,
    ) -> Result<BTreeMap<String, Field>> {
        let declared = self
            .config
            .declared_fields(type_name)
            .cloned()
            .unwrap_or_default();

        let mut fields = BTreeMap::new();
        for (key, value) in example {
            if path.is_root() && self.config.exclude_fields.iter().any(|f| f == key) {
                continue;
            }

            let exposed = LinkKey::parse(key, &self.config.link_marker)
                .map_or_else(|| key.clone(), |link| link.field_name);
            let declared_ref = declared.get(&exposed).or_else(|| declared.get(key));

            if let Some(field) = self.build_field(value, &path.child(key), declared_ref)? {
                fields.insert(create_key(&exposed), field);
            }
        }

        for (name, declared_ref) in &declared {
            let field_name = create_key(name);
            if fields.contains_key(&field_name) {
                continue;
            }
            let ty = self.registry.resolve_declared(declared_ref)?;
            fields.insert(field_name, Field::declared(name.clone(), ty));
        }

        Ok(fields)
    }

    fn build_field(
        &mut self,
        example: &Example,
        path: &FieldPath,
        declared: Option<&DeclaredTypeRef>,
    ) -> Result<Option<Field>> {
        if example.is_empty() {
            return Ok(None);
        }
        let key = path.leaf().to_string();

        if let Some(declared) = declared {
            return self.infer_from_declared(example, path, declared).map(Some);
        }

        if let Some(target) = self.config.mapping.get(&path.mapping_key()) {
            return self.infer_from_mapping(example, path, target).map(Some);
        }

        if let Some(link) = LinkKey::parse(&key, &self.config.link_marker) {
            return self.infer_from_link(example, path, link.by).map(Some);
        }

        self.infer_from_value(example, path)
    }

    fn infer_from_declared(
        &mut self,
        example: &Example,
        path: &FieldPath,
        declared: &DeclaredTypeRef,
    ) -> Result<Field> {
        // A declared object type over object data keeps the inferred fields too
        if let (Example::Object(fields), DeclaredTypeRef::Named(name)) = (example, declared) {
            if ScalarKind::from_name(name).is_none() && !self.registry.is_kind(name) {
                self.registry.reserve(name);
                if let Some(field) = self.build_object(fields, path, name.clone())? {
                    return Ok(field);
                }
            }
        }

        let ty = self.registry.resolve_declared(declared)?;
        Ok(Field::declared(path.leaf(), ty))
    }

    fn infer_from_mapping(&mut self, example: &Example, path: &FieldPath, target: &str) -> Result<Field> {
        if !self.registry.is_kind(target) {
            return Err(Error::mapping_target(path.mapping_key(), target));
        }

        let link = self.registry.link(target);
        let ty = if matches!(example, Example::List(_)) {
            self.registry.wrap_in_list(&link)
        } else {
            link
        };
        Ok(Field::new(
            ty,
            FieldSource::Mapping {
                key: path.leaf().to_string(),
                kind: target.to_string(),
            },
        ))
    }

    /// Type a link field from the kinds of the records it points at.
    ///
    /// Link lists over several kinds become a union named after the sorted
    /// kinds, so it is registered once whatever the record order.
    fn infer_from_link(&mut self, example: &Example, path: &FieldPath, by: Option<String>) -> Result<Field> {
        let kind = path.kind().unwrap_or_default();
        let targets: Vec<&Example> = match example {
            Example::List(items) => items.iter().filter(|e| !e.is_null()).collect(),
            other => vec![other],
        };

        let mut kinds = BTreeSet::new();
        for target in targets {
            let Some(id) = target.as_link_id() else {
                return Err(Error::unresolved_link(
                    kind,
                    path.selector(),
                    format!("{} is not a record reference", target.type_name()),
                ));
            };
            let Some(record) = self.find_linked(&id, by.as_deref()) else {
                return Err(Error::unresolved_link(
                    kind,
                    path.selector(),
                    format!(
                        "there is no record with {} \"{id}\"",
                        by.as_deref().unwrap_or("id")
                    ),
                ));
            };
            if let Example::Link { kind: Some(expected), .. } = target {
                if *expected != record.kind {
                    return Err(Error::unresolved_link(
                        kind,
                        path.selector(),
                        format!("record \"{id}\" is a {}, not a {expected}", record.kind),
                    ));
                }
            }
            if !self.registry.is_kind(&record.kind) {
                return Err(Error::unresolved_link(
                    kind,
                    path.selector(),
                    format!("there is no type \"{}\" available to link to", record.kind),
                ));
            }
            kinds.insert(record.kind.clone());
        }

        let source = FieldSource::Link {
            key: path.leaf().to_string(),
            by,
        };

        let item = match kinds.len() {
            0 => {
                return Err(Error::cannot_infer(path.qualified(), "link list without targets"));
            }
            1 => self.registry.link(kinds.into_iter().next().unwrap_or_default()),
            _ => {
                let name = union_type_name(kinds.iter().map(String::as_str));
                match self.registry.get_type(&name) {
                    Some(existing) => existing,
                    None => self.registry.register_type(
                        name.clone(),
                        TypeNode::UnionLink(UnionType {
                            name,
                            members: kinds,
                        }),
                    ),
                }
            }
        };

        let ty = if matches!(example, Example::List(_)) {
            self.registry.wrap_in_list(&item)
        } else {
            item
        };
        Ok(Field::new(ty, source))
    }

    fn find_linked(&self, id: &str, by: Option<&str>) -> Option<&'a Record> {
        match by {
            None => self.store.get_record(id),
            Some(field) => self
                .store
                .records()
                .find(|r| r.field(field).and_then(Value::as_link_id).as_deref() == Some(id)),
        }
    }

    fn infer_from_value(&mut self, example: &Example, path: &FieldPath) -> Result<Option<Field>> {
        if example.is_empty() {
            return Ok(None);
        }
        let key = path.leaf().to_string();

        if self.config.detect_files && self.points_to_file(example, path) {
            let file = self.registry.link(self.config.file_kind.clone());
            let ty = if matches!(example, Example::List(_)) {
                self.registry.wrap_in_list(&file)
            } else {
                file
            };
            return Ok(Some(Field::new(ty, FieldSource::File { key })));
        }

        match example {
            Example::Date(_) => Ok(Some(self.scalar_field(ScalarKind::Date, key))),
            Example::String(s) if self.config.detect_dates && is_date_like(s) => {
                Ok(Some(self.scalar_field(ScalarKind::Date, key)))
            }
            Example::String(_) => Ok(Some(self.scalar_field(ScalarKind::String, key))),
            Example::Bool(_) => Ok(Some(self.scalar_field(ScalarKind::Boolean, key))),
            Example::Int(_) => Ok(Some(self.scalar_field(ScalarKind::Int, key))),
            Example::Float(_) => Ok(Some(self.scalar_field(ScalarKind::Float, key))),
            Example::Link { .. } => self.infer_from_link(example, path, None).map(Some),
            Example::List(items) => {
                let Some(first) = items.iter().find(|e| !e.is_empty()) else {
                    return Ok(None);
                };
                if let Example::Link { .. } = first {
                    return self.infer_from_link(example, path, None).map(Some);
                }

                let Some(element) = self.infer_from_value(first, &path.elements())? else {
                    return Err(Error::cannot_infer(
                        path.qualified(),
                        format!("no type fits the list element {}", first.to_json()),
                    ));
                };
                let ty = self.registry.wrap_in_list(&element.ty);
                Ok(Some(Field::new(ty, element.source)))
            }
            Example::Object(fields) => {
                let name = self
                    .registry
                    .create_type_name(&object_type_name(path, &self.config.link_marker));
                self.build_object(fields, path, name)
            }
            Example::Null | Example::Invalid => Ok(None),
        }
    }

    fn scalar_field(&self, kind: ScalarKind, key: String) -> Field {
        Field::new(self.registry.scalar(kind), FieldSource::Value { key })
    }

    fn build_object(
        &mut self,
        example: &BTreeMap<String, Example>,
        path: &FieldPath,
        type_name: String,
    ) -> Result<Option<Field>> {
        let fields = self.build_object_fields(example, path, &type_name)?;
        if fields.is_empty() {
            return Ok(None);
        }

        let object = ObjectType {
            name: type_name.clone(),
            fields,
        };
        let ty = self.registry.register_type(type_name, TypeNode::Object(object));
        Ok(Some(Field::new(ty, FieldSource::value(path.leaf()))))
    }

    /// Check if a string example is a path relative to the file record
    /// owning it, and a record of the file kind exists at the joined path.
    fn points_to_file(&self, example: &Example, path: &FieldPath) -> bool {
        let candidate = match example {
            Example::String(s) => s.as_str(),
            Example::List(items) => match items.first() {
                Some(Example::String(s)) => s.as_str(),
                _ => return false,
            },
            _ => return false,
        };
        if !looks_like_relative_file(candidate) {
            return false;
        }
        if path.kind() == Some(self.config.file_kind.as_str()) {
            return false;
        }

        let Some(owner) = self.records.iter().find(|record| {
            values_at(&record.fields, path.selector())
                .iter()
                .any(|v| v.as_str() == Some(candidate))
        }) else {
            return false;
        };

        let Some(root) = self.store.root_record(owner, self.config.max_ancestor_depth) else {
            return false;
        };
        if root.kind != self.config.file_kind {
            return false;
        }
        let Some(dir) = root.str_field(&self.config.file_dir_field) else {
            return false;
        };

        let target = join_path(dir, candidate);
        self.store.records().any(|r| {
            r.kind == self.config.file_kind
                && r.str_field(&self.config.file_path_field) == Some(target.as_str())
        })
    }
}
