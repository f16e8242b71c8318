//! Zone pipeline with explicit stages.
//!
//! The pipeline runs these stages in order:
//! 1. **Landing**: promote files from `landing/temporal` into `landing/persistent`
//!    under a dated name
//! 2. **Formatted**: load every tabular file of `landing/persistent` into the store
//! 3. **Trusted**: integrate each configured source into its canonical relation
//!
//! Each stage runs to completion before the next begins.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, info_span};

use zones_ingest::{
    LoadOptions, LoadOutcome, ZoneLayout, list_tabular_files, load_files, promote_temporal_files,
};
use zones_integrate::{IntegrationOutcome, integrate_all};
use zones_model::SourceSpec;
use zones_store::Store;

use crate::config::PipelineConfig;

/// What one pipeline run did.
#[derive(Debug)]
pub struct PipelineReport {
    /// Files moved into the persistent landing zone.
    pub promoted: Vec<PathBuf>,
    pub loads: Vec<LoadOutcome>,
    pub integrations: Vec<(SourceSpec, Option<IntegrationOutcome>)>,
}

impl PipelineReport {
    pub fn loaded_count(&self) -> usize {
        self.loads.iter().filter(|outcome| outcome.is_loaded()).count()
    }

    pub fn integrated_count(&self) -> usize {
        self.integrations
            .iter()
            .filter(|(_, outcome)| outcome.is_some())
            .count()
    }
}

/// Promotes the temporal landing files stamped with `date`.
pub fn landing(layout: &ZoneLayout, date: NaiveDate) -> Result<Vec<PathBuf>> {
    let _span = info_span!("landing", root = %layout.root.display()).entered();
    layout.ensure().context("create zone directories")?;
    let promoted = promote_temporal_files(&layout.temporal, &layout.persistent, date)
        .context("promote temporal landing files")?;
    info!(promoted = promoted.len(), "landing stage complete");
    Ok(promoted)
}

/// Loads the persistent landing zone into the store.
pub fn formatted<S: Store + ?Sized>(
    layout: &ZoneLayout,
    store: &mut S,
    options: LoadOptions,
) -> Result<Vec<LoadOutcome>> {
    let _span = info_span!("formatted").entered();
    let files = list_tabular_files(&layout.persistent).context("list persistent landing files")?;
    let outcomes = load_files(&files, store, options).context("load persistent landing files")?;
    info!(
        files = files.len(),
        loaded = outcomes.iter().filter(|o| o.is_loaded()).count(),
        "formatted stage complete"
    );
    Ok(outcomes)
}

/// Integrates every source into its canonical relation.
pub fn trusted<S: Store + ?Sized>(
    store: &mut S,
    sources: &[SourceSpec],
) -> Result<Vec<(SourceSpec, Option<IntegrationOutcome>)>> {
    let _span = info_span!("trusted", sources = sources.len()).entered();
    let results = integrate_all(store, sources).context("integrate sources")?;
    info!(
        integrated = results.iter().filter(|(_, o)| o.is_some()).count(),
        "trusted stage complete"
    );
    Ok(results)
}

/// Runs landing, formatted and trusted in order against `store`.
pub fn run_pipeline<S: Store + ?Sized>(
    config: &PipelineConfig,
    store: &mut S,
    date: NaiveDate,
) -> Result<PipelineReport> {
    let started = Instant::now();
    let layout = ZoneLayout::from_root(config.root.clone());

    let promoted = landing(&layout, date)?;
    let loads = formatted(
        &layout,
        store,
        LoadOptions {
            replace_existing: config.replace_existing,
        },
    )?;
    let integrations = trusted(store, &config.sources)?;

    let report = PipelineReport {
        promoted,
        loads,
        integrations,
    };
    info!(
        promoted = report.promoted.len(),
        loaded = report.loaded_count(),
        integrated = report.integrated_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pipeline complete"
    );
    Ok(report)
}
