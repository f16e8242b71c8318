//! Tabular file discovery.

use std::path::{Path, PathBuf};

use zones_model::FileFormat;

use crate::error::{IngestError, Result};

/// Lists the files in `dir` with a recognized tabular extension.
///
/// Returns files sorted by file name.
pub fn list_tabular_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = read_dir_files(dir)?
        .into_iter()
        .filter(|path| FileFormat::from_path(path).is_some())
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Expands command-line inputs: directories become their tabular files,
/// plain paths are kept as given so unsupported files still get reported.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(list_tabular_files(input)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Regular files directly inside `dir`, in directory order.
pub(crate) fn read_dir_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_tabular_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["wgi.CSV", "conflict.dta", "notes.json", "countries.xlsx", "README"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("archive.csv")).unwrap();

        let files = list_tabular_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["conflict.dta", "countries.xlsx", "wgi.CSV"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = list_tabular_files(&dir.path().join("nope"));
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_expand_inputs_keeps_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wbd.csv"), b"").unwrap();
        let json = dir.path().join("notes.json");
        std::fs::write(&json, b"{}").unwrap();

        let files = expand_inputs(&[dir.path().to_path_buf(), json.clone()]).unwrap();
        assert_eq!(files, [dir.path().join("wbd.csv"), json]);
    }
}
