use std::path::Path;

use zones_model::{FileFormat, ModelError, SourceSpec};

#[test]
fn source_spec_parses_plain_and_override_forms() {
    let plain: SourceSpec = "wgi".parse().unwrap();
    assert_eq!(plain.name, "wgi");
    assert_eq!(plain.canonical_name(), "wgi");

    let custom: SourceSpec = "countries=countries_dim".parse().unwrap();
    assert_eq!(custom.name, "countries");
    assert_eq!(custom.canonical_name(), "countries_dim");
    assert_eq!(custom.to_string(), "countries=countries_dim");
}

#[test]
fn source_spec_rejects_blank_parts() {
    assert!(matches!(
        "".parse::<SourceSpec>(),
        Err(ModelError::InvalidSourceSpec(_))
    ));
    assert!("=dim".parse::<SourceSpec>().is_err());
    assert!("countries=".parse::<SourceSpec>().is_err());
}

#[test]
fn version_membership_excludes_source_and_canonical() {
    let spec: SourceSpec = "countries=countries_dim".parse().unwrap();
    assert!(spec.is_version("countries_20240101"));
    assert!(spec.is_version("old_countries"));
    assert!(!spec.is_version("countries"));
    assert!(!spec.is_version("countries_dim"));
    assert!(!spec.is_version("wgi_2020"));
}

#[test]
fn source_spec_deserializes_from_toml() {
    #[derive(serde::Deserialize)]
    struct Doc {
        sources: Vec<SourceSpec>,
    }

    let doc: Doc = toml::from_str(
        r#"
        [[sources]]
        name = "wbd"

        [[sources]]
        name = "countries"
        canonical = "countries_dim"
        "#,
    )
    .unwrap();

    assert_eq!(doc.sources.len(), 2);
    assert_eq!(doc.sources[0].canonical_name(), "wbd");
    assert_eq!(doc.sources[1].canonical_name(), "countries_dim");
}

#[test]
fn file_format_detection_is_case_insensitive() {
    assert_eq!(
        FileFormat::from_path(Path::new("a/wbd.CSV")),
        Some(FileFormat::Csv)
    );
    assert_eq!(
        FileFormat::from_path(Path::new("conflict.dta")),
        Some(FileFormat::Stata)
    );
    assert_eq!(
        FileFormat::from_path(Path::new("countries.xlsx")),
        Some(FileFormat::Xlsx)
    );
    assert_eq!(FileFormat::from_path(Path::new("notes.json")), None);
    assert_eq!(FileFormat::from_path(Path::new("README")), None);
}

#[test]
fn relation_name_round_trips_through_json() {
    let name = zones_model::RelationName::new("wgi_2020").unwrap();
    let json = serde_json::to_string(&name).unwrap();
    assert_eq!(json, "\"wgi_2020\"");
    let back: zones_model::RelationName = serde_json::from_str(&json).unwrap();
    assert_eq!(back, name);
    assert!(serde_json::from_str::<zones_model::RelationName>("\"  \"").is_err());
}
