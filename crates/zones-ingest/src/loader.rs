//! Bulk loading of tabular files into relations.

use std::fmt;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::{info, warn};
use zones_model::{FileFormat, RelationName};
use zones_store::{BulkWriter, Store};

use crate::delimited::read_csv;
use crate::error::Result;
use crate::spreadsheet::read_xlsx;
use crate::stata::read_stata;

/// Why a file produced no relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The extension is not csv, dta or xlsx.
    UnsupportedFormat,
    /// The relation exists and replacement was not requested.
    AlreadyLoaded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat => f.write_str("unsupported format"),
            Self::AlreadyLoaded => f.write_str("already loaded"),
        }
    }
}

/// Result of loading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded {
        path: PathBuf,
        relation: RelationName,
        format: FileFormat,
        rows: usize,
        columns: usize,
        /// Malformed CSV rows left out by the lenient parse.
        dropped_rows: usize,
    },
    Skipped {
        path: PathBuf,
        reason: SkipReason,
    },
}

impl LoadOutcome {
    /// The relation written, if any.
    pub fn relation(&self) -> Option<&RelationName> {
        match self {
            Self::Loaded { relation, .. } => Some(relation),
            Self::Skipped { .. } => None,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Loaded { path, .. } | Self::Skipped { path, .. } => path,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Options for [`load_files`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Replace relations that already exist (otherwise skip their files).
    pub replace_existing: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            replace_existing: true,
        }
    }
}

/// Reads a file of a known format into memory.
///
/// Returns the frame and the number of malformed rows dropped.
pub fn read_table(path: &Path, format: FileFormat) -> Result<(DataFrame, usize)> {
    match format {
        FileFormat::Csv => {
            let table = read_csv(path)?;
            Ok((table.frame, table.dropped_rows))
        }
        FileFormat::Stata => Ok((read_stata(path)?, 0)),
        FileFormat::Xlsx => Ok((read_xlsx(path)?, 0)),
    }
}

/// Loads one file into the relation named after its base name, replacing
/// any relation of that name.
///
/// Files with an unrecognized extension are skipped with a warning.
pub fn load_file<S: BulkWriter + ?Sized>(path: &Path, store: &mut S) -> Result<LoadOutcome> {
    let Some(format) = FileFormat::from_path(path) else {
        warn!(path = %path.display(), "unsupported file format; skipping");
        return Ok(LoadOutcome::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::UnsupportedFormat,
        });
    };
    let relation = RelationName::from_file_path(path)?;

    let (frame, dropped_rows) = read_table(path, format)?;
    if dropped_rows > 0 {
        warn!(
            relation = %relation,
            dropped_rows,
            "dropped malformed rows while loading"
        );
    }

    store.write_relation(relation.as_str(), &frame)?;
    info!(
        relation = %relation,
        format = %format,
        rows = frame.height(),
        columns = frame.width(),
        "file loaded"
    );

    Ok(LoadOutcome::Loaded {
        path: path.to_path_buf(),
        relation,
        format,
        rows: frame.height(),
        columns: frame.width(),
        dropped_rows,
    })
}

/// Loads every path in order and returns one outcome per path.
///
/// The first read or store failure aborts the batch.
pub fn load_files<S: Store + ?Sized>(
    paths: &[PathBuf],
    store: &mut S,
    options: LoadOptions,
) -> Result<Vec<LoadOutcome>> {
    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        if !options.replace_existing && FileFormat::from_path(path).is_some() {
            let relation = RelationName::from_file_path(path)?;
            if store.has_relation(relation.as_str())? {
                info!(relation = %relation, "relation already loaded; skipping");
                outcomes.push(LoadOutcome::Skipped {
                    path: path.clone(),
                    reason: SkipReason::AlreadyLoaded,
                });
                continue;
            }
        }
        outcomes.push(load_file(path, store)?);
    }
    Ok(outcomes)
}
