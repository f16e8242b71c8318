use std::path::Path;

use polars::prelude::DataFrame;
use zones_dta::DtaError;

use crate::error::{IngestError, Result};

/// Reads a Stata file; missing values become nulls.
pub fn read_stata(path: &Path) -> Result<DataFrame> {
    zones_dta::read_dta_to_dataframe(path).map_err(|source| match source {
        DtaError::FileNotFound { path } => IngestError::FileNotFound { path },
        source => IngestError::Stata {
            path: path.to_path_buf(),
            source,
        },
    })
}
