//! Error types for relational store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection URL uses a scheme no adapter understands.
    #[error("unsupported store URL '{url}' (expected sqlite://<path> or sqlite::memory:)")]
    UnsupportedUrl { url: String },

    /// Opening the database failed.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Preparing the database location failed.
    #[error("failed to prepare database directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested relation does not exist.
    #[error("relation not found: {relation}")]
    RelationNotFound { relation: String },

    /// A frame without columns cannot become a relation.
    #[error("relation {relation} has no columns")]
    EmptySchema { relation: String },

    /// A statement against a relation failed.
    #[error("SQL error on relation {relation}: {source}")]
    Sql {
        relation: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement against the catalog failed.
    #[error("SQL error: {0}")]
    Catalog(#[from] rusqlite::Error),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    Frame { message: String },
}

impl From<polars::prelude::PolarsError> for StoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::Frame {
            message: err.to_string(),
        }
    }
}

impl StoreError {
    /// Wraps a SQLite error with the relation it concerns.
    pub fn sql(relation: &str) -> impl FnOnce(rusqlite::Error) -> Self + '_ {
        move |source| Self::Sql {
            relation: relation.to_string(),
            source,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::RelationNotFound {
            relation: "wgi".to_string(),
        };
        assert_eq!(err.to_string(), "relation not found: wgi");

        let err = StoreError::UnsupportedUrl {
            url: "postgres://db".to_string(),
        };
        assert!(err.to_string().starts_with("unsupported store URL 'postgres://db'"));
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("gdp".into());
        let err: StoreError = polars_err.into();
        assert!(matches!(err, StoreError::Frame { .. }));
    }
}
