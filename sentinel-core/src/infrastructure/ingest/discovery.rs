// sentinel-core/src/infrastructure/ingest/discovery.rs

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::infrastructure::error::InfrastructureError;

/// Expands run inputs into CSV files.
///
/// Files are taken as given, whatever their extension. Directories are walked
/// recursively for `*.csv` (any case). The result is sorted and deduplicated.
pub fn discover_csv_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, InfrastructureError> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.exists() {
            return Err(InfrastructureError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input not found: {}", input.display()),
            )));
        }
        if input.is_file() {
            files.push(input.clone());
            continue;
        }

        let walker = WalkDir::new(input).follow_links(true).sort_by_file_name();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if entry.file_type().is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    debug!(count = files.len(), "CSV inputs discovered");
    Ok(files)
}

/// Default lineage of a file: its stem (`data/orders.csv` -> `orders`).
pub fn lineage_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_walks_directories_for_csv() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("2024/q1"))?;
        fs::write(dir.path().join("orders.csv"), "id\n1\n")?;
        fs::write(dir.path().join("2024/q1/Returns.CSV"), "id\n1\n")?;
        fs::write(dir.path().join("notes.txt"), "ignore me")?;

        let files = discover_csv_files(&[dir.path().to_path_buf()])?;
        let names: Vec<String> = files.iter().map(|p| lineage_of(p)).collect();
        assert_eq!(files.len(), 2);
        assert!(names.contains(&"orders".to_string()));
        assert!(names.contains(&"Returns".to_string()));
        Ok(())
    }

    #[test]
    fn test_explicit_files_are_kept_once() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("export.tsv");
        fs::write(&file, "id\n1\n")?;

        let files = discover_csv_files(&[file.clone(), file.clone()])?;
        assert_eq!(files, vec![file]);
        Ok(())
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let err = discover_csv_files(&[PathBuf::from("/definitely/not/here.csv")]).unwrap_err();
        assert!(matches!(err, InfrastructureError::Io(_)));
    }
}
