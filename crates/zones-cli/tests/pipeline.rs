//! Integration tests for the pipeline module.

use std::path::Path;

use chrono::NaiveDate;
use zones_cli::config::PipelineConfig;
use zones_cli::pipeline::run_pipeline;
use zones_ingest::{LoadOutcome, SkipReason, ZoneLayout};
use zones_model::SourceSpec;
use zones_store::{MemoryStore, RelationStore};

fn config(root: &Path, sources: &[&str]) -> PipelineConfig {
    PipelineConfig {
        database_url: "sqlite::memory:".to_string(),
        root: root.to_path_buf(),
        connect_attempts: 1,
        replace_existing: true,
        sources: sources.iter().map(|s| s.parse::<SourceSpec>().unwrap()).collect(),
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
}

fn seed(layout: &ZoneLayout) {
    layout.ensure().unwrap();
    std::fs::write(
        layout.persistent.join("wgi_20230105.csv"),
        "country,score\nPeru,1\nChile,2\n",
    )
    .unwrap();
    std::fs::write(
        layout.temporal.join("wgi.csv"),
        "country,score\nPeru,1\nSpain,3\n",
    )
    .unwrap();
    std::fs::write(layout.temporal.join("notes.json"), "{}").unwrap();
}

#[test]
fn run_promotes_loads_and_integrates() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ZoneLayout::from_root(dir.path());
    seed(&layout);
    let mut store = MemoryStore::new();

    let report = run_pipeline(&config(dir.path(), &["wgi"]), &mut store, date()).unwrap();

    assert_eq!(report.promoted, [layout.persistent.join("wgi_20240105.csv")]);
    assert!(layout.temporal.join("notes.json").exists());
    assert!(!layout.temporal.join("wgi.csv").exists());

    assert_eq!(report.loaded_count(), 2);
    let relations: Vec<&str> = report
        .loads
        .iter()
        .filter_map(|o| o.relation().map(|r| r.as_str()))
        .collect();
    assert_eq!(relations, ["wgi_20230105", "wgi_20240105"]);

    assert_eq!(report.integrated_count(), 1);
    let outcome = report.integrations[0].1.as_ref().unwrap();
    assert_eq!(outcome.canonical, "wgi");
    assert_eq!(outcome.versions, ["wgi_20230105", "wgi_20240105"]);
    assert_eq!(outcome.rows_read, 4);
    assert_eq!(outcome.rows_written, 3);
    assert_eq!(outcome.duplicates_removed, 1);
    assert_eq!(store.read_relation("wgi").unwrap().height(), 3);
}

#[test]
fn source_without_versions_is_reported_not_failed() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ZoneLayout::from_root(dir.path());
    seed(&layout);
    let mut store = MemoryStore::new();

    let report = run_pipeline(&config(dir.path(), &["wbd"]), &mut store, date()).unwrap();

    assert_eq!(report.integrated_count(), 0);
    assert!(report.integrations[0].1.is_none());
    assert!(!store.has_relation("wbd").unwrap());
}

#[test]
fn second_run_keeps_loaded_relations_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ZoneLayout::from_root(dir.path());
    seed(&layout);
    let mut store = MemoryStore::new();
    let mut config = config(dir.path(), &["wgi"]);
    run_pipeline(&config, &mut store, date()).unwrap();

    config.replace_existing = false;
    let report = run_pipeline(&config, &mut store, date()).unwrap();

    assert!(report.promoted.is_empty());
    assert!(report.loads.iter().all(|o| matches!(
        o,
        LoadOutcome::Skipped {
            reason: SkipReason::AlreadyLoaded,
            ..
        }
    )));
    let outcome = report.integrations[0].1.as_ref().unwrap();
    assert_eq!(outcome.rows_written, 3);
}

#[test]
fn empty_root_is_laid_out_on_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("zones");
    let mut store = MemoryStore::new();

    let report = run_pipeline(&config(&root, &[]), &mut store, date()).unwrap();

    assert!(report.loads.is_empty());
    for zone in ZoneLayout::from_root(&root).directories() {
        assert!(zone.is_dir(), "{}", zone.display());
    }
}
