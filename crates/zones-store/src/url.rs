//! Store connection URLs.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::StoreError;

const SQLITE_MEMORY: &str = "sqlite::memory:";
const SQLITE_PREFIX: &str = "sqlite://";

/// A parsed store location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    /// File database, created if absent.
    SqliteFile(PathBuf),
    /// Private in-memory database that lives as long as the connection.
    SqliteMemory,
}

impl FromStr for StoreUrl {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == SQLITE_MEMORY {
            return Ok(Self::SqliteMemory);
        }
        match s.strip_prefix(SQLITE_PREFIX) {
            Some(path) if !path.is_empty() => Ok(Self::SqliteFile(PathBuf::from(path))),
            _ => Err(StoreError::UnsupportedUrl { url: s.to_string() }),
        }
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SqliteFile(path) => write!(f, "{SQLITE_PREFIX}{}", path.display()),
            Self::SqliteMemory => f.write_str(SQLITE_MEMORY),
        }
    }
}
