//! Pipeline configuration: a TOML file layered under command-line flags.
//!
//! ```toml
//! database_url = "sqlite://data/zones.db"
//! root = "data"
//! connect_attempts = 3
//! replace_existing = true
//!
//! [[sources]]
//! name = "wgi"
//!
//! [[sources]]
//! name = "countries"
//! canonical = "countries_dim"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use zones_model::{ModelError, SourceSpec};

/// Zone root used when neither the file nor a flag names one.
pub const DEFAULT_ROOT: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no database URL: pass --database-url or set database_url in the config file")]
    MissingDatabaseUrl,

    #[error("connect_attempts must be at least 1")]
    ZeroConnectAttempts,

    #[error(transparent)]
    Source(#[from] ModelError),
}

/// The TOML file as written; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineFile {
    pub database_url: Option<String>,
    pub root: Option<PathBuf>,
    pub connect_attempts: Option<u32>,
    pub replace_existing: Option<bool>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

impl PipelineFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parses file contents; `path` is only used in error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line. Each one that is set wins over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub root: Option<PathBuf>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub database_url: String,
    pub root: PathBuf,
    /// Connection tries before giving up; 1 means no retry.
    pub connect_attempts: u32,
    pub replace_existing: bool,
    pub sources: Vec<SourceSpec>,
}

impl PipelineConfig {
    pub fn resolve(file: PipelineFile, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let database_url = overrides
            .database_url
            .or(file.database_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let connect_attempts = file.connect_attempts.unwrap_or(1);
        if connect_attempts == 0 {
            return Err(ConfigError::ZeroConnectAttempts);
        }
        // Deserialized sources skip the constructor's checks.
        let sources = file
            .sources
            .into_iter()
            .map(|source| {
                let spec = SourceSpec::new(source.name)?;
                Ok(match source.canonical {
                    Some(canonical) => spec.with_canonical(canonical),
                    None => spec,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            database_url,
            root: overrides
                .root
                .or(file.root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
            connect_attempts,
            replace_existing: file.replace_existing.unwrap_or(true),
            sources,
        })
    }

    /// Reads the optional config file and applies `overrides` on top.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => PipelineFile::load(path)?,
            None => PipelineFile::default(),
        };
        Self::resolve(file, overrides)
    }
}
