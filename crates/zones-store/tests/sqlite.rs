use std::time::Duration;

use polars::prelude::*;
use zones_store::{BulkWriter, RelationStore, SqliteStore, StoreError};

fn indicators() -> DataFrame {
    df! {
        "country" => [Some("Chile"), Some("Perú"), None],
        "year" => [2019i64, 2020, 2020],
        "gdp" => [Some(1.5f64), None, Some(3.25)],
        "member" => [true, false, true],
    }
    .unwrap()
}

#[test]
fn write_then_read_preserves_types_and_nulls() {
    let mut store = SqliteStore::open("sqlite::memory:").unwrap();
    let frame = indicators();
    store.write_relation("wgi_2020", &frame).unwrap();

    let back = store.read_relation("wgi_2020").unwrap();
    assert_eq!(back.shape(), (3, 4));
    assert_eq!(back.column("year").unwrap().dtype(), &DataType::Int64);
    assert_eq!(back.column("gdp").unwrap().dtype(), &DataType::Float64);
    assert_eq!(back.column("member").unwrap().dtype(), &DataType::Boolean);
    assert!(back.equals_missing(&frame));
}

#[test]
fn write_replaces_existing_relation() {
    let mut store = SqliteStore::open("sqlite::memory:").unwrap();
    store.write_relation("wgi", &indicators()).unwrap();
    let replacement = df! { "name" => ["only"] }.unwrap();
    store.write_relation("wgi", &replacement).unwrap();

    let back = store.read_relation("wgi").unwrap();
    assert_eq!(back.shape(), (1, 1));
    assert!(back.column("name").is_ok());
}

#[test]
fn relation_names_are_sorted_and_quoting_is_internal() {
    let mut store = SqliteStore::open("sqlite::memory:").unwrap();
    let frame = df! { "odd \"col\"" => [1i64] }.unwrap();
    for name in ["wgi_2020", "countries", "select"] {
        store.write_relation(name, &frame).unwrap();
    }
    assert_eq!(
        store.relation_names().unwrap(),
        ["countries", "select", "wgi_2020"]
    );
    assert!(store.has_relation("select").unwrap());
    assert!(!store.has_relation("wgi").unwrap());
    assert!(store.read_relation("select").unwrap().equals(&frame));
}

#[test]
fn empty_frame_with_columns_round_trips_schema() {
    let mut store = SqliteStore::open("sqlite::memory:").unwrap();
    let frame = indicators().head(Some(0));
    store.write_relation("empty", &frame).unwrap();
    let back = store.read_relation("empty").unwrap();
    assert_eq!(back.height(), 0);
    assert_eq!(back.column("year").unwrap().dtype(), &DataType::Int64);
    assert_eq!(back.column("country").unwrap().dtype(), &DataType::String);
}

#[test]
fn unknown_relation_and_empty_schema_are_errors() {
    let mut store = SqliteStore::open("sqlite::memory:").unwrap();
    assert!(matches!(
        store.read_relation("missing"),
        Err(StoreError::RelationNotFound { .. })
    ));
    assert!(matches!(
        store.write_relation("x", &DataFrame::empty()),
        Err(StoreError::EmptySchema { .. })
    ));
}

#[test]
fn file_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("nested/zones.db").display());

    let mut store = SqliteStore::connect_with_retry(&url, 3, Duration::ZERO).unwrap();
    store.write_relation("wbd", &indicators()).unwrap();
    store.close().unwrap();

    let store = SqliteStore::open(&url).unwrap();
    assert_eq!(store.relation_names().unwrap(), ["wbd"]);
    assert_eq!(store.read_relation("wbd").unwrap().height(), 3);
}

#[test]
fn unsupported_url_is_not_retried() {
    let err = SqliteStore::connect_with_retry("postgres://db", 5, Duration::from_secs(60))
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::UnsupportedUrl { .. }));
}
