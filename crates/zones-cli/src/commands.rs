use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use zones_cli::config::PipelineConfig;
use zones_cli::pipeline::{PipelineReport, run_pipeline};
use zones_ingest::{LoadOptions, LoadOutcome, expand_inputs, load_files};
use zones_integrate::{DuplicationOverview, IntegrationOutcome, duplication_overview, integrate_all};
use zones_model::SourceSpec;
use zones_resolve::{ResolutionMapping, distinct_labels, resolve, rewrite_column};
use zones_store::{BulkWriter, RelationStore, SqliteStore};

use crate::cli::{ColumnRef, IntegrateArgs, LoadArgs, ResolveArgs};

/// Pause between connection attempts.
const CONNECT_BACKOFF: Duration = Duration::from_secs(2);

pub fn open_store(config: &PipelineConfig) -> Result<SqliteStore> {
    SqliteStore::connect_with_retry(
        &config.database_url,
        config.connect_attempts,
        CONNECT_BACKOFF,
    )
    .with_context(|| format!("connect to {}", config.database_url))
}

pub fn run_load(config: &PipelineConfig, args: &LoadArgs) -> Result<Vec<LoadOutcome>> {
    let files = expand_inputs(&args.paths).context("collect input files")?;
    let options = LoadOptions {
        replace_existing: config.replace_existing && !args.keep_existing,
    };
    let mut store = open_store(config)?;
    let outcomes = load_files(&files, &mut store, options).context("load files")?;
    store.close().context("close store")?;
    Ok(outcomes)
}

pub fn run_integrate(
    config: &PipelineConfig,
    args: &IntegrateArgs,
) -> Result<Vec<(SourceSpec, Option<IntegrationOutcome>)>> {
    let sources = if args.sources.is_empty() {
        &config.sources
    } else {
        &args.sources
    };
    if sources.is_empty() {
        bail!("no sources given on the command line or in the config file");
    }
    let mut store = open_store(config)?;
    let results = integrate_all(&mut store, sources).context("integrate sources")?;
    store.close().context("close store")?;
    Ok(results)
}

/// What `resolve` found and, with `--apply`, changed.
#[derive(Debug)]
pub struct ResolveReport {
    pub left: ColumnRef,
    pub right: ColumnRef,
    pub left_labels: usize,
    pub right_labels: usize,
    pub mapping: ResolutionMapping,
    /// Cells rewritten in the left relation when the mapping was applied.
    pub rewritten: Option<usize>,
}

pub fn run_resolve(config: &PipelineConfig, args: &ResolveArgs) -> Result<ResolveReport> {
    let _span = info_span!("resolve", left = %args.left, right = %args.right).entered();
    let mut store = open_store(config)?;

    let mut left_frame = store
        .read_relation(&args.left.relation)
        .with_context(|| format!("read {}", args.left.relation))?;
    let right_frame = store
        .read_relation(&args.right.relation)
        .with_context(|| format!("read {}", args.right.relation))?;
    let left_labels = distinct_labels(&left_frame, &args.left.column)
        .with_context(|| format!("labels of {}", args.left))?;
    let right_labels = distinct_labels(&right_frame, &args.right.column)
        .with_context(|| format!("labels of {}", args.right))?;

    let mapping = resolve(&left_labels, &right_labels);
    info!(pairs = mapping.len(), "labels resolved");

    let rewritten = if args.apply {
        let changed = rewrite_column(&mut left_frame, &args.left.column, &mapping)
            .with_context(|| format!("rewrite {}", args.left))?;
        store
            .write_relation(&args.left.relation, &left_frame)
            .with_context(|| format!("store {}", args.left.relation))?;
        info!(changed, relation = %args.left.relation, "resolution applied");
        Some(changed)
    } else {
        None
    };
    store.close().context("close store")?;

    Ok(ResolveReport {
        left: args.left.clone(),
        right: args.right.clone(),
        left_labels: left_labels.len(),
        right_labels: right_labels.len(),
        mapping,
        rewritten,
    })
}

pub fn run_relations(config: &PipelineConfig) -> Result<Vec<(String, DuplicationOverview)>> {
    let store = open_store(config)?;
    let mut relations = Vec::new();
    for name in store.relation_names().context("list relations")? {
        let frame = store
            .read_relation(&name)
            .with_context(|| format!("read {name}"))?;
        let overview =
            duplication_overview(&frame).with_context(|| format!("profile {name}"))?;
        relations.push((name, overview));
    }
    store.close().context("close store")?;
    Ok(relations)
}

pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let mut store = open_store(config)?;
    let today = chrono::Local::now().date_naive();
    let report = run_pipeline(config, &mut store, today)?;
    store.close().context("close store")?;
    Ok(report)
}
