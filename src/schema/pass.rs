//! Schema build pass
//!
//! One pass resets the registry and the conflict tracker, merges the
//! examples of every record kind, builds their types and reports the
//! conflicts it collected. Nothing is carried from one pass to the next.

use super::builder::TypeBuilder;
use super::conflict::{log_conflicts, ConflictEntry, ConflictTracker};
use super::merge::ExampleMerger;
use super::path::FieldPath;
use super::registry::TypeRegistry;
use super::types::{ObjectType, TypeNode, TypeRef};
use crate::config::{InferenceConfig, UnresolvedLinkPolicy};
use crate::error::{Error, Result};
use crate::store::RecordStore;
use crate::types::Record;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

// ============================================================================
// Schema
// ============================================================================

/// Result of a build pass
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    /// Every registered type by name, scalars and lists included
    pub types: BTreeMap<String, TypeRef>,
    /// Conflicts found while merging, sorted by kind and selector
    pub conflicts: Vec<ConflictEntry>,
    /// Kinds dropped because of unresolvable links
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_kinds: Vec<String>,
}

impl Schema {
    pub fn get_type(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }

    /// Object type by name
    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name).and_then(|ty| ty.as_object())
    }

    /// Type name of `type_name.field`
    pub fn field_type(&self, type_name: &str, field: &str) -> Option<String> {
        self.object(type_name)?.field(field).map(|f| f.type_name())
    }

    /// GraphQL-like SDL listing of the object and union types
    pub fn to_sdl(&self) -> String {
        let mut out = String::new();
        for ty in self.types.values() {
            match ty.as_ref() {
                TypeNode::Object(object) => {
                    out.push_str(&format!("type {} {{\n", object.name));
                    for (name, field) in &object.fields {
                        out.push_str(&format!("  {name}: {}\n", field.type_name()));
                    }
                    out.push_str("}\n\n");
                }
                TypeNode::UnionLink(union) => {
                    let members: Vec<&str> = union.members.iter().map(String::as_str).collect();
                    out.push_str(&format!("union {} = {}\n\n", union.name, members.join(" | ")));
                }
                _ => {}
            }
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
        out
    }
}

// ============================================================================
// Schema Builder
// ============================================================================

/// Runs build passes over a record store
pub struct SchemaBuilder<'s, S: RecordStore + ?Sized> {
    store: &'s S,
    config: InferenceConfig,
    registry: TypeRegistry,
    tracker: ConflictTracker,
}

impl<'s, S: RecordStore + ?Sized> SchemaBuilder<'s, S> {
    pub fn new(store: &'s S, config: InferenceConfig) -> Self {
        Self {
            store,
            config,
            registry: TypeRegistry::new(),
            tracker: ConflictTracker::new(),
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Registry state after the last pass
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Build the schema.
    ///
    /// With [`UnresolvedLinkPolicy::SkipKind`], a kind whose links cannot be
    /// resolved is dropped and the pass starts over without it.
    pub fn build(&mut self) -> Result<Schema> {
        self.config.validate()?;

        let mut skipped = BTreeSet::new();
        loop {
            match self.run_pass(&skipped) {
                Ok(mut schema) => {
                    schema.skipped_kinds = skipped.into_iter().collect();
                    return Ok(schema);
                }
                Err(err) => {
                    let skippable = match (self.config.unresolved_links, err.skippable_kind()) {
                        (UnresolvedLinkPolicy::SkipKind, Some(kind)) if !skipped.contains(kind) => {
                            Some(kind.to_string())
                        }
                        _ => None,
                    };
                    let Some(kind) = skippable else {
                        return Err(err);
                    };
                    warn!(kind = %kind, error = %err, "skipping kind with unresolvable links");
                    skipped.insert(kind);
                }
            }
        }
    }

    /// Merge every kind and return the conflicts, without building types
    pub fn collect_conflicts(&mut self) -> Result<Vec<ConflictEntry>> {
        self.config.validate()?;
        self.tracker.clear();

        let by_kind = self.group_by_kind(&BTreeSet::new());
        let mut merger = ExampleMerger::new(&mut self.tracker, &self.config.link_marker);
        for (kind, records) in &by_kind {
            merger.merge(records, Some(&FieldPath::root(*kind)));
        }
        Ok(self.tracker.drain_report(self.store))
    }

    fn group_by_kind(&self, skipped: &BTreeSet<String>) -> BTreeMap<&'s str, Vec<&'s Record>> {
        let mut by_kind: BTreeMap<&'s str, Vec<&'s Record>> = BTreeMap::new();
        for record in self.store.records() {
            if !skipped.contains(&record.kind) {
                by_kind.entry(record.kind.as_str()).or_default().push(record);
            }
        }
        by_kind
    }

    fn run_pass(&mut self, skipped: &BTreeSet<String>) -> Result<Schema> {
        self.registry.reset(self.config.declared_types.clone());
        self.tracker.clear();

        let by_kind = self.group_by_kind(skipped);
        if by_kind.is_empty() {
            return Err(Error::empty_schema("there are no records to infer types from"));
        }
        self.registry.set_kinds(by_kind.keys().copied());

        for (selector, target) in &self.config.mapping {
            if !self.registry.is_kind(target) {
                return Err(Error::mapping_target(selector.clone(), target.clone()));
            }
        }

        info!(
            kinds = by_kind.len(),
            records = by_kind.values().map(Vec::len).sum::<usize>(),
            skipped = skipped.len(),
            "building schema"
        );

        let mut examples = BTreeMap::new();
        let mut merger = ExampleMerger::new(&mut self.tracker, &self.config.link_marker);
        for (kind, records) in &by_kind {
            examples.insert(*kind, merger.merge(records, Some(&FieldPath::root(*kind))));
        }

        let mut inferred_fields = 0;
        for (kind, records) in &by_kind {
            let Some(example) = examples.get(kind) else {
                continue;
            };
            debug!(kind, records = records.len(), "building type");
            let mut builder = TypeBuilder::new(self.store, &self.config, &mut self.registry, records);
            let ty = builder.build_kind(kind, example)?;
            inferred_fields += ty
                .as_object()
                .map_or(0, |object| object.fields.len().saturating_sub(1));
        }

        if inferred_fields == 0 {
            return Err(Error::empty_schema(
                "no record kind has a field a type could be inferred for",
            ));
        }

        let conflicts = self.tracker.drain_report(self.store);
        log_conflicts(&conflicts);

        info!(
            types = self.registry.len(),
            conflicts = conflicts.len(),
            "schema built"
        );
        Ok(Schema {
            types: self.registry.snapshot(),
            conflicts,
            skipped_kinds: Vec::new(),
        })
    }
}

/// Build a schema from every record of `store`
pub fn build_schema<S: RecordStore + ?Sized>(store: &S, config: InferenceConfig) -> Result<Schema> {
    SchemaBuilder::new(store, config).build()
}
