//! Record storage
//!
//! The build pass only reads records: it looks them up by id, lists them,
//! and asks which record owns a value it saw while merging.

mod memory;

pub use memory::MemoryStore;

use crate::types::{Record, ValueHandle};
use tracing::warn;

/// Read access to the records of a build pass.
///
/// Implementations must list records in a stable order.
pub trait RecordStore {
    /// Fetch a record by id.
    fn get_record(&self, id: &str) -> Option<&Record>;

    /// All records.
    fn records(&self) -> Box<dyn Iterator<Item = &Record> + '_>;

    /// Id of the record owning a value, from the handle assigned at ingestion.
    fn resolve_owning_record(&self, handle: ValueHandle) -> Option<&str>;

    /// Walk parent links up to the root record.
    ///
    /// The walk stops after `max_depth` hops: a parent chain that long is
    /// treated as a cycle (ambiguous ownership) and yields no root.
    fn root_record<'a>(&'a self, record: &'a Record, max_depth: usize) -> Option<&'a Record> {
        let mut current = record;
        for _ in 0..max_depth {
            match current.parent.as_deref().and_then(|id| self.get_record(id)) {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }

        warn!(
            record = %record.id,
            max_depth,
            "ambiguous ownership: parent chain does not end, the record may be its own ancestor"
        );
        None
    }
}
