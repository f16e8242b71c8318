//! Relational store for the zone pipeline.
//!
//! Components receive a store handle explicitly. [`RelationStore`] lists and
//! reads relations, [`BulkWriter`] replaces a relation with a DataFrame in one
//! atomic step. [`SqliteStore`] is the production adapter and [`MemoryStore`]
//! backs tests and dry runs.

pub mod error;
mod memory;
mod sqlite;
mod store;
mod url;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, quote_ident};
pub use store::{BulkWriter, RelationStore, Store};
pub use url::StoreUrl;
