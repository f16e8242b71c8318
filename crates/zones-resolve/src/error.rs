//! Error types for applying resolutions to frames.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Column not found in DataFrame.
    #[error("column '{column}' not found in DataFrame")]
    ColumnNotFound { column: String },

    /// Labels must come from a text column.
    #[error("column '{column}' holds {dtype}, not text labels")]
    NotText { column: String, dtype: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ResolveError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
