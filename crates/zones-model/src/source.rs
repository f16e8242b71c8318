//! Logical sources and their canonical relation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// A family of version relations that integrate into one canonical relation.
///
/// The canonical relation defaults to the source name itself. Parsed from
/// `name` or `name=canonical`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Token shared by every version relation of the source (e.g. `wgi`).
    pub name: String,
    /// Explicit canonical relation name (e.g. `countries_dim`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::InvalidSourceSpec(name));
        }
        Ok(Self {
            name: name.trim().to_string(),
            canonical: None,
        })
    }

    /// Sets an explicit canonical relation name.
    #[must_use]
    pub fn with_canonical(mut self, canonical: impl Into<String>) -> Self {
        let canonical = canonical.into();
        let canonical = canonical.trim();
        self.canonical = if canonical.is_empty() {
            None
        } else {
            Some(canonical.to_string())
        };
        self
    }

    /// Name of the relation the integrated result is written to.
    pub fn canonical_name(&self) -> &str {
        self.canonical.as_deref().unwrap_or(&self.name)
    }

    /// Whether `relation` is one of the version relations of this source.
    ///
    /// Membership is substring containment of the source token, excluding
    /// the source name itself and the canonical relation.
    pub fn is_version(&self, relation: &str) -> bool {
        relation.contains(self.name.as_str())
            && relation != self.name
            && relation != self.canonical_name()
    }
}

impl FromStr for SourceSpec {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, canonical)) => {
                if canonical.trim().is_empty() {
                    return Err(ModelError::InvalidSourceSpec(s.to_string()));
                }
                Self::new(name)
                    .map_err(|_| ModelError::InvalidSourceSpec(s.to_string()))
                    .map(|spec| spec.with_canonical(canonical))
            }
            None => Self::new(s),
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.canonical {
            Some(canonical) => write!(f, "{}={}", self.name, canonical),
            None => f.write_str(&self.name),
        }
    }
}
