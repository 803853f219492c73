//! In-memory record store.

use std::collections::HashMap;

use super::RecordStore;
use crate::error::{Error, Result};
use crate::types::{Record, ValueHandle};

/// Arena-backed record store.
///
/// Records are kept in ingestion order. Each record gets the handle of its
/// arena slot; the owner table maps a handle back to the record id so values
/// seen while merging can be attributed without back-pointers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Records by arena slot.
    records: Vec<Record>,
    /// Record id -> arena slot.
    index: HashMap<String, usize>,
    /// Arena slot -> owning record id.
    owners: Vec<String>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from records, rejecting duplicate ids.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Add a record and return its handle.
    pub fn insert(&mut self, mut record: Record) -> Result<ValueHandle> {
        if self.index.contains_key(&record.id) {
            return Err(Error::DuplicateRecord { id: record.id });
        }

        let slot = self.records.len();
        let handle = ValueHandle::new(slot);
        record.handle = handle;

        self.index.insert(record.id.clone(), slot);
        self.owners.push(record.id.clone());
        self.records.push(record);
        Ok(handle)
    }

    /// Get number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one kind, in ingestion order.
    pub fn records_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.kind == kind)
    }
}

impl RecordStore for MemoryStore {
    fn get_record(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|slot| &self.records[*slot])
    }

    fn records(&self) -> Box<dyn Iterator<Item = &Record> + '_> {
        Box::new(self.records.iter())
    }

    fn resolve_owning_record(&self, handle: ValueHandle) -> Option<&str> {
        handle
            .index()
            .and_then(|slot| self.owners.get(slot))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_handles() {
        let mut store = MemoryStore::new();
        let a = store.insert(Record::new("a", "Post")).unwrap();
        let b = store.insert(Record::new("b", "Post")).unwrap();

        assert_ne!(a, b);
        assert_eq!(store.resolve_owning_record(a), Some("a"));
        assert_eq!(store.resolve_owning_record(b), Some("b"));
        assert_eq!(store.get_record("b").unwrap().handle, b);
        assert_eq!(store.resolve_owning_record(ValueHandle::DETACHED), None);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = MemoryStore::new();
        store.insert(Record::new("a", "Post")).unwrap();
        let err = store.insert(Record::new("a", "Page")).unwrap_err();
        assert!(matches!(err, Error::DuplicateRecord { id } if id == "a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_root_record_walks_parents() {
        let store = MemoryStore::from_records(vec![
            Record::new("file", "File"),
            Record::new("md", "Markdown").with_parent("file"),
            Record::new("excerpt", "Excerpt").with_parent("md"),
        ])
        .unwrap();

        let excerpt = store.get_record("excerpt").unwrap();
        assert_eq!(store.root_record(excerpt, 100).unwrap().id, "file");

        let file = store.get_record("file").unwrap();
        assert_eq!(store.root_record(file, 100).unwrap().id, "file");
    }

    #[test]
    fn test_root_record_stops_on_cycle() {
        let store = MemoryStore::from_records(vec![
            Record::new("a", "Markdown").with_parent("b"),
            Record::new("b", "Markdown").with_parent("a"),
            Record::new("self", "Markdown").with_parent("self"),
        ])
        .unwrap();

        assert!(store.root_record(store.get_record("a").unwrap(), 100).is_none());
        assert!(store.root_record(store.get_record("self").unwrap(), 10).is_none());
    }

    #[test]
    fn test_records_of_kind() {
        let store = MemoryStore::from_records(vec![
            Record::new("1", "Post"),
            Record::new("2", "Page"),
            Record::new("3", "Post"),
        ])
        .unwrap();

        let ids: Vec<_> = store.records_of_kind("Post").map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
