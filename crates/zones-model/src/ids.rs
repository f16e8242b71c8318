#![deny(unsafe_code)]

use std::fmt;
use std::path::Path;

use crate::ModelError;

/// Name of a relation in the store.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct RelationName(String);

impl RelationName {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains('\0') {
            return Err(ModelError::InvalidRelationName(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derives the relation name from a file's base name with the extension stripped.
    ///
    /// `landing/persistent/wgi_20240101.csv` becomes `wgi_20240101`.
    pub fn from_file_path(path: &Path) -> Result<Self, ModelError> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| ModelError::NoBaseName(path.display().to_string()))?;
        Self::new(stem).map_err(|_| ModelError::NoBaseName(path.display().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substring membership test used to discover the versions of a source.
    pub fn contains_token(&self, token: &str) -> bool {
        self.0.contains(token)
    }
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RelationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RelationName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RelationName> for String {
    fn from(value: RelationName) -> Self {
        value.0
    }
}
