//! Error types for version integration.

use thiserror::Error;
use zones_store::StoreError;

/// Errors that can occur while integrating versions.
#[derive(Debug, Error)]
pub enum IntegrateError {
    /// Listing, reading or writing relations failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed while integrating {relation}: {message}")]
    Frame { relation: String, message: String },
}

impl IntegrateError {
    /// Wraps a Polars error with the canonical relation being built.
    pub fn frame(relation: &str) -> impl FnOnce(polars::prelude::PolarsError) -> Self + '_ {
        move |err| Self::Frame {
            relation: relation.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for integration operations.
pub type Result<T> = std::result::Result<T, IntegrateError>;
