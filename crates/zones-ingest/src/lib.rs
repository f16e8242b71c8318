//! Bulk loading for the zone pipeline.
//!
//! This crate reads csv, dta and xlsx files into Polars DataFrames and
//! writes each one to the relational store under its file's base name.
//!
//! # Features
//!
//! - **Bulk Loader**: format chosen by extension; unsupported files are skipped
//! - **Lenient CSV**: malformed rows are dropped rather than failing the load
//! - **Discovery**: list the tabular files of a directory
//! - **Landing zone**: promote temporal files into the dated persistent zone
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use zones_ingest::{LoadOptions, list_tabular_files, load_files};
//! use zones_store::SqliteStore;
//!
//! let mut store = SqliteStore::open("sqlite://zones.db")?;
//! let files = list_tabular_files(Path::new("data/landing/persistent"))?;
//! let outcomes = load_files(&files, &mut store, LoadOptions::default())?;
//! ```

mod delimited;
mod discovery;
mod error;
mod landing;
mod loader;
mod spreadsheet;
mod stata;

// === Error Types ===
pub use error::{IngestError, Result};

// === Readers ===
pub use delimited::{CsvTable, read_csv};
pub use spreadsheet::read_xlsx;
pub use stata::read_stata;

// === Loading ===
pub use loader::{LoadOptions, LoadOutcome, SkipReason, load_file, load_files, read_table};

// === File Discovery ===
pub use discovery::{expand_inputs, list_tabular_files};

// === Landing Zone ===
pub use landing::{ZoneLayout, dated_file_name, promote_temporal_files};
