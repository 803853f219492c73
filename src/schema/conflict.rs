//! Type conflict tracking
//!
//! The merger records here every type it sees at a path whose values cannot
//! be reconciled. Entries are only diagnostics: the merger's `Invalid`
//! decision alone drops the field from the schema.

use super::example::Example;
use super::path::FieldPath;
use crate::store::RecordStore;
use crate::types::{JsonValue, ValueHandle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// A value observed at a conflicting path, with the record it came from
#[derive(Debug, Clone, Copy)]
pub struct ConflictSample<'a> {
    pub value: &'a Example,
    pub origin: Option<ValueHandle>,
}

impl<'a> ConflictSample<'a> {
    pub fn new(value: &'a Example, origin: Option<ValueHandle>) -> Self {
        Self { value, origin }
    }
}

#[derive(Debug, Clone)]
struct TypeSample {
    sample: JsonValue,
    origin: Option<ValueHandle>,
}

/// Conflicting types per field path, for one build pass
#[derive(Debug, Clone, Default)]
pub struct ConflictTracker {
    entries: BTreeMap<FieldPath, BTreeMap<String, TypeSample>>,
}

impl ConflictTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the values seen at a conflicting path.
    ///
    /// The first sample of each type name is kept. Null and `Invalid` values
    /// carry no type and are ignored.
    pub fn record_conflict<'a>(
        &mut self,
        path: &FieldPath,
        samples: impl IntoIterator<Item = ConflictSample<'a>>,
    ) {
        for sample in samples {
            if sample.value.is_null() || sample.value.is_invalid() {
                continue;
            }
            self.entries
                .entry(path.clone())
                .or_default()
                .entry(sample.value.type_name())
                .or_insert_with(|| TypeSample {
                    sample: sample.value.to_json(),
                    origin: sample.origin,
                });
        }
    }

    /// Forget everything; called at the start of each build pass
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of conflicting paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Conflicting paths, in report order
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.entries.keys()
    }

    /// Lazily build the report, sorted by kind, selector, then type name.
    ///
    /// Origins are resolved through the store; values whose owner cannot be
    /// found are reported without one.
    pub fn report<'a, S: RecordStore + ?Sized>(
        &'a self,
        store: &'a S,
    ) -> impl Iterator<Item = ConflictEntry> + 'a {
        self.entries.iter().map(move |(path, types)| ConflictEntry {
            kind: path.kind().map(str::to_string),
            selector: path.selector().to_string(),
            types: types
                .iter()
                .map(|(type_name, sample)| ConflictType {
                    type_name: type_name.clone(),
                    sample: sample.sample.clone(),
                    origin: sample
                        .origin
                        .and_then(|handle| store.resolve_owning_record(handle))
                        .map(str::to_string),
                })
                .collect(),
        })
    }

    /// Build the report and empty the tracker
    pub fn drain_report<S: RecordStore + ?Sized>(&mut self, store: &S) -> Vec<ConflictEntry> {
        let report = self.report(store).collect();
        self.clear();
        report
    }
}

/// Conflicting types at one selector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictEntry {
    /// Record kind, when the path was bound to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Path relative to the kind
    pub selector: String,
    /// One entry per distinct type name, sorted
    pub types: Vec<ConflictType>,
}

/// One type seen at a conflicting selector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictType {
    #[serde(rename = "type")]
    pub type_name: String,
    pub sample: JsonValue,
    /// Id of the record the sample came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ConflictEntry {
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.type_name.as_str()).collect()
    }

    /// `Kind.selector`, or the bare selector without a kind
    pub fn qualified_selector(&self) -> String {
        match &self.kind {
            Some(kind) => format!("{kind}.{}", self.selector),
            None => self.selector.clone(),
        }
    }
}

impl fmt::Display for ConflictEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.qualified_selector(),
            self.type_names().join(", ")
        )
    }
}

/// Log a conflict report, one line per selector
pub fn log_conflicts(entries: &[ConflictEntry]) {
    if entries.is_empty() {
        return;
    }
    warn!("There are conflicting field types in your data. The schema will omit those fields.");
    for entry in entries {
        warn!("{entry}");
    }
}
