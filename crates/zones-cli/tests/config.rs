//! Integration tests for pipeline configuration.

use std::path::{Path, PathBuf};

use zones_cli::config::{ConfigError, ConfigOverrides, DEFAULT_ROOT, PipelineConfig, PipelineFile};

const FULL: &str = r#"
database_url = "sqlite://data/zones.db"
root = "zones"
connect_attempts = 3
replace_existing = false

[[sources]]
name = "wgi"

[[sources]]
name = "countries"
canonical = "countries_dim"
"#;

fn parse(contents: &str) -> Result<PipelineFile, ConfigError> {
    PipelineFile::parse(contents, Path::new("zones.toml"))
}

#[test]
fn full_file_resolves_every_field() {
    let config = PipelineConfig::resolve(parse(FULL).unwrap(), ConfigOverrides::default()).unwrap();

    assert_eq!(config.database_url, "sqlite://data/zones.db");
    assert_eq!(config.root, PathBuf::from("zones"));
    assert_eq!(config.connect_attempts, 3);
    assert!(!config.replace_existing);
    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.sources[0].canonical_name(), "wgi");
    assert_eq!(config.sources[1].canonical_name(), "countries_dim");
}

#[test]
fn command_line_values_win_over_the_file() {
    let overrides = ConfigOverrides {
        database_url: Some("sqlite::memory:".to_string()),
        root: Some(PathBuf::from("elsewhere")),
    };
    let config = PipelineConfig::resolve(parse(FULL).unwrap(), overrides).unwrap();

    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.root, PathBuf::from("elsewhere"));
}

#[test]
fn defaults_apply_without_a_file() {
    let overrides = ConfigOverrides {
        database_url: Some("sqlite::memory:".to_string()),
        root: None,
    };
    let config = PipelineConfig::load(None, overrides).unwrap();

    assert_eq!(config.root, PathBuf::from(DEFAULT_ROOT));
    assert_eq!(config.connect_attempts, 1);
    assert!(config.replace_existing);
    assert!(config.sources.is_empty());
}

#[test]
fn missing_database_url_is_an_error() {
    let err = PipelineConfig::load(None, ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingDatabaseUrl));

    let file = parse("database_url = \"  \"").unwrap();
    let err = PipelineConfig::resolve(file, ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingDatabaseUrl));
}

#[test]
fn invalid_files_are_rejected() {
    assert!(matches!(
        parse("database_url = 1"),
        Err(ConfigError::Toml { .. })
    ));
    assert!(matches!(
        parse("databse_url = \"sqlite::memory:\""),
        Err(ConfigError::Toml { .. })
    ));

    let zero = parse("database_url = \"sqlite::memory:\"\nconnect_attempts = 0").unwrap();
    assert!(matches!(
        PipelineConfig::resolve(zero, ConfigOverrides::default()),
        Err(ConfigError::ZeroConnectAttempts)
    ));

    let blank = parse("database_url = \"sqlite::memory:\"\n[[sources]]\nname = \" \"").unwrap();
    assert!(matches!(
        PipelineConfig::resolve(blank, ConfigOverrides::default()),
        Err(ConfigError::Source(_))
    ));
}

#[test]
fn file_is_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zones.toml");
    std::fs::write(&path, FULL).unwrap();

    let config = PipelineConfig::load(Some(&path), ConfigOverrides::default()).unwrap();
    assert_eq!(config.sources.len(), 2);

    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        PipelineConfig::load(Some(&missing), ConfigOverrides::default()),
        Err(ConfigError::Io { .. })
    ));
}
