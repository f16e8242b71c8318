//! Zone directory layout and landing-zone promotion.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};
use zones_model::FileFormat;

use crate::discovery::read_dir_files;
use crate::error::{IngestError, Result};

/// Directories of the landing → formatted → trusted → exploitation →
/// analysis layout under one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneLayout {
    pub root: PathBuf,
    pub temporal: PathBuf,
    pub persistent: PathBuf,
    pub formatted: PathBuf,
    pub trusted: PathBuf,
    pub exploitation: PathBuf,
    pub analysis: PathBuf,
}

impl ZoneLayout {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let landing = root.join("landing");
        Self {
            temporal: landing.join("temporal"),
            persistent: landing.join("persistent"),
            formatted: root.join("formatted"),
            trusted: root.join("trusted"),
            exploitation: root.join("exploitation"),
            analysis: root.join("analysis"),
            root,
        }
    }

    pub fn directories(&self) -> [&Path; 6] {
        [
            &self.temporal,
            &self.persistent,
            &self.formatted,
            &self.trusted,
            &self.exploitation,
            &self.analysis,
        ]
    }

    /// Creates every zone directory that does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        for dir in self.directories() {
            std::fs::create_dir_all(dir).map_err(|e| IngestError::DirectoryRead {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// `wgi.csv` on 2024-01-05 becomes `wgi_20240105.csv`.
pub fn dated_file_name(path: &Path, date: NaiveDate) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let extension = path.extension()?.to_str()?;
    Some(format!("{stem}_{}.{extension}", date.format("%Y%m%d")))
}

/// Moves every recognized tabular file from `temporal` into `persistent`,
/// stamping its name with `date`. A file already at the destination is
/// replaced; unrecognized files stay in `temporal`.
///
/// Returns the promoted paths sorted by name.
pub fn promote_temporal_files(
    temporal: &Path,
    persistent: &Path,
    date: NaiveDate,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(persistent).map_err(|e| IngestError::DirectoryRead {
        path: persistent.to_path_buf(),
        source: e,
    })?;

    let mut promoted = Vec::new();
    for source in read_dir_files(temporal)? {
        if FileFormat::from_path(&source).is_none() {
            debug!(path = %source.display(), "not a tabular file; left in temporal");
            continue;
        }
        let Some(name) = dated_file_name(&source, date) else {
            continue;
        };
        let target = persistent.join(name);
        move_file(&source, &target)?;
        info!(from = %source.display(), to = %target.display(), "promoted to persistent");
        promoted.push(target);
    }
    promoted.sort();
    Ok(promoted)
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    let move_error = |source| IngestError::FileMove {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    // rename replaces an existing target but cannot cross filesystems.
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(move_error)?;
    std::fs::remove_file(from).map_err(move_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn layout_resolves_six_zones() {
        let layout = ZoneLayout::from_root("/data");
        assert_eq!(layout.temporal, Path::new("/data/landing/temporal"));
        assert_eq!(layout.persistent, Path::new("/data/landing/persistent"));
        assert_eq!(layout.analysis, Path::new("/data/analysis"));
        assert_eq!(layout.directories().len(), 6);
    }

    #[test]
    fn ensure_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ZoneLayout::from_root(dir.path());
        layout.ensure().unwrap();
        assert!(layout.directories().iter().all(|d| d.is_dir()));
    }

    #[test]
    fn dated_names_keep_the_final_extension() {
        assert_eq!(
            dated_file_name(Path::new("t/wgi.csv"), date()).as_deref(),
            Some("wgi_20240105.csv")
        );
        assert_eq!(
            dated_file_name(Path::new("t/countries.v2.xlsx"), date()).as_deref(),
            Some("countries.v2_20240105.xlsx")
        );
        assert_eq!(dated_file_name(Path::new("t/README"), date()), None);
    }

    #[test]
    fn promotion_moves_only_tabular_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ZoneLayout::from_root(dir.path());
        layout.ensure().unwrap();
        std::fs::write(layout.temporal.join("wgi.csv"), b"a\n1\n").unwrap();
        std::fs::write(layout.temporal.join("conflict.dta"), b"x").unwrap();
        std::fs::write(layout.temporal.join("notes.json"), b"{}").unwrap();
        std::fs::write(layout.persistent.join("wgi_20240105.csv"), b"old").unwrap();

        let promoted = promote_temporal_files(&layout.temporal, &layout.persistent, date()).unwrap();

        assert_eq!(
            promoted,
            [
                layout.persistent.join("conflict_20240105.dta"),
                layout.persistent.join("wgi_20240105.csv"),
            ]
        );
        assert_eq!(
            std::fs::read(layout.persistent.join("wgi_20240105.csv")).unwrap(),
            b"a\n1\n"
        );
        assert!(layout.temporal.join("notes.json").exists());
        assert!(!layout.temporal.join("wgi.csv").exists());
    }
}
