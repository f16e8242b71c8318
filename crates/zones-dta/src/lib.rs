//! Stata `.dta` file reader.
//!
//! Reads the fixed-layout releases 113-115 and the tagged releases 117-119
//! (including strL long strings) into an in-memory [`DtaDataset`].
//!
//! # Features
//!
//! - Little- and big-endian files
//! - All Stata missing codes (`.`, `.a`-`.z`) collapse to [`DtaValue::Missing`]
//! - Value label tables and `%t` date formats
//! - Optional Polars DataFrame conversion (with the `polars` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use zones_dta::read_dta;
//!
//! let dataset = read_dta(Path::new("conflict.dta")).unwrap();
//! println!("{} ({} rows)", dataset.version, dataset.num_rows());
//! ```

mod cursor;
mod dates;
mod error;
mod reader;
mod types;

#[cfg(feature = "polars")]
mod polars_ext;

pub use error::{DtaError, Result};

pub use dates::{DateFormat, unix_millis};
pub use types::{
    ByteOrder, DtaDataset, DtaType, DtaValue, DtaVariable, DtaVersion, ValueLabels,
};

pub use reader::{DtaReader, parse_dta, read_dta};

#[cfg(feature = "polars")]
pub use polars_ext::{dataset_to_dataframe, read_dta_to_dataframe};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
