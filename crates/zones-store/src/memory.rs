//! In-memory store.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;

use crate::error::{Result, StoreError};
use crate::store::{BulkWriter, RelationStore};

/// Relations kept as DataFrames in a sorted map.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    relations: BTreeMap<String, DataFrame>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl RelationStore for MemoryStore {
    fn relation_names(&self) -> Result<Vec<String>> {
        Ok(self.relations.keys().cloned().collect())
    }

    fn read_relation(&self, name: &str) -> Result<DataFrame> {
        self.relations
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::RelationNotFound {
                relation: name.to_string(),
            })
    }

    fn has_relation(&self, name: &str) -> Result<bool> {
        Ok(self.relations.contains_key(name))
    }
}

impl BulkWriter for MemoryStore {
    fn write_relation(&mut self, name: &str, frame: &DataFrame) -> Result<()> {
        if frame.width() == 0 {
            return Err(StoreError::EmptySchema {
                relation: name.to_string(),
            });
        }
        self.relations.insert(name.to_string(), frame.clone());
        Ok(())
    }
}
