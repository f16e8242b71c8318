//! Error types for Stata file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading Stata `.dta` files.
#[derive(Debug, Error)]
pub enum DtaError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Release number not supported by this reader.
    #[error("unsupported Stata release: {release}")]
    UnsupportedRelease { release: u16 },

    /// Invalid file structure.
    #[error("invalid dta file: {message}")]
    InvalidFormat { message: String },

    /// A section tag was expected but something else was found.
    #[error("expected tag {expected} at offset {offset}")]
    UnexpectedTag {
        expected: String,
        offset: usize,
    },

    /// Unknown variable type code.
    #[error("unknown type code {code} for variable {index}")]
    UnknownType { code: u16, index: usize },

    /// The file ended before a field could be read.
    #[error("file truncated at offset {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame construction failed.
    #[cfg(feature = "polars")]
    #[error("DataFrame conversion failed: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}

/// Result type alias for dta operations.
pub type Result<T> = std::result::Result<T, DtaError>;

impl DtaError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub(crate) fn unexpected_tag(expected: &[u8], offset: usize) -> Self {
        Self::UnexpectedTag {
            expected: String::from_utf8_lossy(expected).into_owned(),
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DtaError::invalid_format("bad byte order");
        assert_eq!(err.to_string(), "invalid dta file: bad byte order");

        let err = DtaError::unexpected_tag(b"<map>", 211);
        assert_eq!(err.to_string(), "expected tag <map> at offset 211");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: DtaError = io_err.into();
        assert!(matches!(err, DtaError::Io(_)));
    }
}
