//! Merging version relations into a canonical relation.

use serde::Serialize;
use tracing::{debug, info, info_span};
use zones_model::SourceSpec;
use zones_store::Store;

use crate::dedupe::drop_duplicate_rows;
use crate::error::{IntegrateError, Result};
use crate::frame::concat_aligned;

/// What one integration wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationOutcome {
    pub source: String,
    pub canonical: String,
    /// Version relations merged, in merge order.
    pub versions: Vec<String>,
    pub rows_read: usize,
    pub rows_written: usize,
    pub duplicates_removed: usize,
}

/// The version relations of `source` among `names`, sorted.
///
/// A relation is a version when its name contains the source token and is
/// neither the source name nor the canonical name.
pub fn version_relations(names: &[String], source: &SourceSpec) -> Vec<String> {
    let mut versions: Vec<String> = names
        .iter()
        .filter(|name| source.is_version(name))
        .cloned()
        .collect();
    versions.sort();
    versions
}

/// Merges every version relation of `source` into its canonical relation.
///
/// Versions are read in name order and stacked; exact duplicate rows are
/// then removed and the deduplicated frame replaces the canonical relation.
/// Returns `None` without writing when the source has no versions.
pub fn integrate<S: Store + ?Sized>(
    store: &mut S,
    source: &SourceSpec,
) -> Result<Option<IntegrationOutcome>> {
    let canonical = source.canonical_name().to_string();
    let _span = info_span!("integrate", source = %source.name, canonical = %canonical).entered();

    let versions = version_relations(&store.relation_names()?, source);
    if versions.is_empty() {
        info!("no version relations found; nothing to integrate");
        return Ok(None);
    }

    let mut frames = Vec::with_capacity(versions.len());
    for version in &versions {
        let frame = store.read_relation(version)?;
        debug!(relation = %version, rows = frame.height(), "version read");
        frames.push(frame);
    }
    let rows_read = frames.iter().map(polars::prelude::DataFrame::height).sum();

    let Some(mut merged) = concat_aligned(&frames).map_err(IntegrateError::frame(&canonical))?
    else {
        return Ok(None);
    };
    let duplicates_removed =
        drop_duplicate_rows(&mut merged).map_err(IntegrateError::frame(&canonical))?;

    store.write_relation(&canonical, &merged)?;
    info!(
        versions = versions.len(),
        rows_read,
        rows_written = merged.height(),
        duplicates_removed,
        "canonical relation written"
    );

    Ok(Some(IntegrationOutcome {
        source: source.name.clone(),
        canonical,
        versions,
        rows_read,
        rows_written: merged.height(),
        duplicates_removed,
    }))
}

/// Integrates each source in order, stopping at the first failure.
pub fn integrate_all<S: Store + ?Sized>(
    store: &mut S,
    sources: &[SourceSpec],
) -> Result<Vec<(SourceSpec, Option<IntegrationOutcome>)>> {
    let mut results = Vec::with_capacity(sources.len());
    for source in sources {
        results.push((source.clone(), integrate(store, source)?));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn versions_use_substring_membership_and_sort() {
        let all = names(&["wgi_2020", "wgi", "old_wgi", "wgi_2019", "wbd_2020"]);
        let source = SourceSpec::new("wgi").unwrap();
        assert_eq!(
            version_relations(&all, &source),
            ["old_wgi", "wgi_2019", "wgi_2020"]
        );
    }

    #[test]
    fn canonical_override_is_excluded() {
        let all = names(&["countries_dim", "countries_2023", "countries"]);
        let source = SourceSpec::new("countries")
            .unwrap()
            .with_canonical("countries_dim");
        assert_eq!(version_relations(&all, &source), ["countries_2023"]);
    }
}
