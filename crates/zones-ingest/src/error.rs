//! Error types for bulk loading.

use std::path::PathBuf;
use thiserror::Error;

use zones_dta::DtaError;
use zones_model::ModelError;
use zones_store::StoreError;

/// Errors that can occur while discovering, reading or loading files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a zone directory or move a file between zones.
    #[error("failed to move {from} to {to}: {source}")]
    FileMove {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// The file could not be parsed even leniently.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// The workbook could not be opened or its first sheet read.
    #[error("failed to read spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// The Stata file is corrupt or uses an unsupported release.
    #[error("failed to read Stata file {path}: {source}")]
    Stata {
        path: PathBuf,
        #[source]
        source: DtaError,
    },

    // === Pipeline Errors ===
    /// No relation name can be derived from the file name.
    #[error(transparent)]
    RelationName(#[from] ModelError),

    /// The store rejected a write.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/landing/wgi.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /landing/wgi.csv");
    }

    #[test]
    fn test_error_from_store() {
        let err: IngestError = StoreError::RelationNotFound {
            relation: "wgi".into(),
        }
        .into();
        assert!(matches!(err, IngestError::Store(_)));
        assert_eq!(err.to_string(), "store error: relation not found: wgi");
    }
}
