//! Store traits shared by every adapter.

use polars::prelude::DataFrame;

use crate::error::Result;

/// Read access to the relations of a store.
pub trait RelationStore {
    /// Names of every relation, sorted.
    fn relation_names(&self) -> Result<Vec<String>>;

    /// Reads a relation fully into memory.
    fn read_relation(&self, name: &str) -> Result<DataFrame>;

    fn has_relation(&self, name: &str) -> Result<bool> {
        Ok(self.relation_names()?.iter().any(|n| n == name))
    }
}

/// Bulk write path.
pub trait BulkWriter {
    /// Replaces `name` with the contents of `frame`.
    ///
    /// Either the whole frame becomes the relation or the previous content
    /// stays in place.
    fn write_relation(&mut self, name: &str, frame: &DataFrame) -> Result<()>;
}

/// A store that can be both read and written.
pub trait Store: RelationStore + BulkWriter {}

impl<T: RelationStore + BulkWriter + ?Sized> Store for T {}
