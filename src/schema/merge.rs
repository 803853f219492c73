//! Example merging
//!
//! Reduces all records of a kind into one [`Example`] per field. The merge
//! is a pure fold: any permutation of the same records produces the same
//! examples, and merging a merged result again changes nothing.
//!
//! Rules, per pair of values:
//! - `Null` absorbs into the other side
//! - different runtime kinds give `Invalid` and a recorded conflict;
//!   `Invalid` stays `Invalid` and later values are still reported
//! - objects merge field by field
//! - lists drop nulls, concatenate, and must hold a single kind; their
//!   elements fold into one representative (`[x]`), except for link lists
//!   which keep every element so all linked kinds stay visible
//! - `Int` widens to `Float`, never the reverse
//! - empty and all-null containers reduce to `Null`

use super::conflict::{ConflictSample, ConflictTracker};
use super::example::{Example, ExampleKind};
use super::path::FieldPath;
use crate::types::{Record, ValueHandle};
use std::collections::{BTreeMap, BTreeSet};

/// Shape of a value during the fold; containers keep their children sourced
#[derive(Debug, Clone)]
enum Node {
    /// Scalars, links, `Null` and `Invalid`
    Leaf(Example),
    Object(BTreeMap<String, Sourced>),
    List(Vec<Sourced>),
}

/// A value and the record it was taken from.
///
/// Every nested value keeps its own origin, so a conflict deep inside a
/// merged object names the record that actually held it.
#[derive(Debug, Clone)]
struct Sourced {
    node: Node,
    origin: Option<ValueHandle>,
}

impl Sourced {
    fn null() -> Self {
        Self::leaf(Example::Null, None)
    }

    fn leaf(example: Example, origin: Option<ValueHandle>) -> Self {
        Self {
            node: Node::Leaf(example),
            origin,
        }
    }

    /// Wrap an example whose values all come from `origin`
    fn new(example: Example, origin: Option<ValueHandle>) -> Self {
        let node = match example {
            Example::Object(fields) => Node::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Sourced::new(value, origin)))
                    .collect(),
            ),
            Example::List(items) => Node::List(
                items
                    .into_iter()
                    .map(|item| Sourced::new(item, origin))
                    .collect(),
            ),
            other => Node::Leaf(other),
        };
        Self { node, origin }
    }

    fn is_null(&self) -> bool {
        matches!(self.node, Node::Leaf(Example::Null))
    }

    fn is_invalid(&self) -> bool {
        matches!(self.node, Node::Leaf(Example::Invalid))
    }

    fn kind(&self) -> ExampleKind {
        match &self.node {
            Node::Leaf(example) => example.kind(),
            Node::Object(_) => ExampleKind::Object,
            Node::List(_) => ExampleKind::List,
        }
    }

    fn to_example(&self) -> Example {
        self.clone().into_example()
    }

    fn into_example(self) -> Example {
        match self.node {
            Node::Leaf(example) => example,
            Node::Object(fields) => Example::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into_example()))
                    .collect(),
            ),
            Node::List(items) => Example::List(items.into_iter().map(Sourced::into_example).collect()),
        }
    }
}

/// Folds record values into examples, reporting conflicts as it goes
pub struct ExampleMerger<'t> {
    tracker: &'t mut ConflictTracker,
    link_marker: &'t str,
}

impl<'t> ExampleMerger<'t> {
    /// Create a merger writing conflicts to `tracker`.
    ///
    /// List fields whose key contains `link_marker` keep all their elements.
    pub fn new(tracker: &'t mut ConflictTracker, link_marker: &'t str) -> Self {
        Self {
            tracker,
            link_marker,
        }
    }

    /// Merge the fields of `records`.
    ///
    /// Conflicts are recorded under `path` (usually the kind's root path);
    /// without a path nothing is recorded.
    pub fn merge(&mut self, records: &[&Record], path: Option<&FieldPath>) -> BTreeMap<String, Example> {
        let sources = records.iter().map(|record| {
            let fields = record
                .fields
                .iter()
                .map(|(key, value)| (key.clone(), Example::from(value)))
                .collect();
            (fields, Some(record.handle))
        });
        self.merge_field_maps(sources, path)
    }

    /// Merge already-converted field maps, each with the handle of its record
    pub fn merge_field_maps<I>(&mut self, sources: I, path: Option<&FieldPath>) -> BTreeMap<String, Example>
    where
        I: IntoIterator<Item = (BTreeMap<String, Example>, Option<ValueHandle>)>,
    {
        let mut merged: BTreeMap<String, Sourced> = BTreeMap::new();

        for (fields, origin) in sources {
            for (key, example) in fields {
                let current = merged.remove(&key).unwrap_or_else(Sourced::null);
                let child = path.map(|p| p.child(&key));
                let next = self.merge_value(&key, current, Sourced::new(example, origin), child.as_ref());
                merged.insert(key, next);
            }
        }

        merged
            .into_iter()
            .map(|(key, sourced)| (key, sourced.into_example()))
            .collect()
    }

    fn is_link_key(&self, key: &str) -> bool {
        key.contains(self.link_marker)
    }

    fn merge_value(
        &mut self,
        key: &str,
        current: Sourced,
        next: Sourced,
        path: Option<&FieldPath>,
    ) -> Sourced {
        if current.is_invalid() || next.is_invalid() {
            let (invalid, other) = if current.is_invalid() {
                (current, next)
            } else {
                (next, current)
            };
            // Keep reporting so every offending record shows up, not just the first pair
            if let Some(path) = path {
                let sample = other.to_example();
                self.tracker
                    .record_conflict(path, [ConflictSample::new(&sample, other.origin)]);
            }
            return Sourced::leaf(Example::Invalid, invalid.origin);
        }

        let (current_origin, next_origin) = (current.origin, next.origin);
        match (current.node, next.node) {
            (Node::Leaf(Example::Null), Node::Leaf(Example::Null)) => Sourced::null(),

            (Node::Object(a), Node::Object(b)) => {
                self.merge_objects(a, current_origin, b, next_origin, path)
            }
            (Node::Object(a), Node::Leaf(Example::Null)) => {
                self.merge_objects(a, current_origin, BTreeMap::new(), None, path)
            }
            (Node::Leaf(Example::Null), Node::Object(b)) => {
                self.merge_objects(BTreeMap::new(), None, b, next_origin, path)
            }

            (Node::List(a), Node::List(b)) => {
                self.merge_lists(key, a, current_origin, b, next_origin, path)
            }
            (Node::List(a), Node::Leaf(Example::Null)) => {
                self.merge_lists(key, a, current_origin, Vec::new(), None, path)
            }
            (Node::Leaf(Example::Null), Node::List(b)) => {
                self.merge_lists(key, Vec::new(), None, b, next_origin, path)
            }

            (Node::Leaf(Example::Null), node) => Sourced {
                node,
                origin: next_origin,
            },
            (node, Node::Leaf(Example::Null)) => Sourced {
                node,
                origin: current_origin,
            },

            (Node::Leaf(a), Node::Leaf(b)) if a.kind() == b.kind() => {
                pick_scalar(a, current_origin, b, next_origin)
            }

            (a, b) => {
                if let Some(path) = path {
                    let a = Sourced { node: a, origin: current_origin }.into_example();
                    let b = Sourced { node: b, origin: next_origin }.into_example();
                    self.tracker.record_conflict(
                        path,
                        [
                            ConflictSample::new(&a, current_origin),
                            ConflictSample::new(&b, next_origin),
                        ],
                    );
                }
                Sourced::leaf(Example::Invalid, current_origin)
            }
        }
    }

    fn merge_objects(
        &mut self,
        mut a: BTreeMap<String, Sourced>,
        a_origin: Option<ValueHandle>,
        mut b: BTreeMap<String, Sourced>,
        b_origin: Option<ValueHandle>,
        path: Option<&FieldPath>,
    ) -> Sourced {
        let keys: BTreeSet<String> = a.keys().chain(b.keys()).cloned().collect();

        let mut merged = BTreeMap::new();
        for key in keys {
            let current = a.remove(&key).unwrap_or_else(Sourced::null);
            let next = b.remove(&key).unwrap_or_else(Sourced::null);
            let child = path.map(|p| p.child(&key));
            let value = self.merge_value(&key, current, next, child.as_ref());
            merged.insert(key, value);
        }

        if merged.values().all(Sourced::is_null) {
            return Sourced::null();
        }
        Sourced {
            node: Node::Object(merged),
            origin: a_origin.or(b_origin),
        }
    }

    fn merge_lists(
        &mut self,
        key: &str,
        a: Vec<Sourced>,
        a_origin: Option<ValueHandle>,
        b: Vec<Sourced>,
        b_origin: Option<ValueHandle>,
        path: Option<&FieldPath>,
    ) -> Sourced {
        let a: Vec<Sourced> = a.into_iter().filter(|e| !e.is_null()).collect();
        let b: Vec<Sourced> = b.into_iter().filter(|e| !e.is_null()).collect();
        let origin = if a.is_empty() { b_origin } else { a_origin };

        let Some(first_kind) = a.iter().chain(&b).next().map(Sourced::kind) else {
            return Sourced::null();
        };

        if !a.iter().chain(&b).all(|e| e.kind() == first_kind) {
            if let Some(path) = path {
                let left = Example::List(a.iter().map(Sourced::to_example).collect());
                let right = Example::List(b.iter().map(Sourced::to_example).collect());
                let samples = [
                    ConflictSample::new(&left, a_origin),
                    ConflictSample::new(&right, b_origin),
                ];
                self.tracker.record_conflict(
                    path,
                    samples.into_iter().filter(|s| !s.value.is_empty()),
                );
            }
            return Sourced::leaf(Example::Invalid, origin);
        }

        if self.is_link_key(key) {
            let mut items: Vec<Sourced> = a.into_iter().chain(b).collect();
            items.sort_by(|x, y| x.to_example().canonical_cmp(&y.to_example()));
            return Sourced {
                node: Node::List(items),
                origin,
            };
        }

        let element_path = path.map(FieldPath::elements);
        let mut representative = Sourced::null();
        for element in a.into_iter().chain(b) {
            representative = self.merge_value(key, representative, element, element_path.as_ref());
        }

        if representative.is_null() || representative.is_invalid() {
            return representative;
        }
        let origin = representative.origin;
        Sourced {
            node: Node::List(vec![representative]),
            origin,
        }
    }
}

/// Choose the representative of two same-kind scalars.
///
/// `Float` wins over `Int`; otherwise the smaller value in canonical order
/// wins so the choice does not depend on record order. Strings compare
/// lexically, so ISO dates (leading digits) usually sort before words and a
/// single date-like value can make a mixed string field typed as `Date`.
fn pick_scalar(
    a: Example,
    a_origin: Option<ValueHandle>,
    b: Example,
    b_origin: Option<ValueHandle>,
) -> Sourced {
    match (&a, &b) {
        (Example::Int(_), Example::Float(_)) => Sourced::leaf(b, b_origin),
        (Example::Float(_), Example::Int(_)) => Sourced::leaf(a, a_origin),
        _ if b.canonical_cmp(&a).is_lt() => Sourced::leaf(b, b_origin),
        _ => Sourced::leaf(a, a_origin),
    }
}
