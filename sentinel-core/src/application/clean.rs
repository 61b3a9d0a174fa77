// sentinel-core/src/application/clean.rs

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::project::ProjectConfig;
use crate::error::SentinelError;

/// Removes the target directory (reports and run history).
///
/// Returns the removed path, or `None` when there was nothing to delete.
#[instrument(skip(config), fields(target = %config.target_path))]
pub fn clean_project(
    project_dir: &Path,
    config: &ProjectConfig,
) -> Result<Option<PathBuf>, SentinelError> {
    let target = resolve_target(project_dir, &config.target_path)?;

    if !target.exists() {
        info!("Nothing to clean");
        return Ok(None);
    }

    if target.is_dir() {
        fs::remove_dir_all(&target)?;
    } else {
        fs::remove_file(&target)?;
    }
    info!(path = ?target, "Artifacts removed");
    Ok(Some(target))
}

// Path traversal guard: the target must be a relative path below the project.
fn resolve_target(project_dir: &Path, target_rel_path: &str) -> Result<PathBuf, SentinelError> {
    let relative = Path::new(target_rel_path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    let full_path = project_dir.join(relative);

    if escapes || !full_path.starts_with(project_dir) || full_path == project_dir {
        return Err(SentinelError::UnsafePath(target_rel_path.to_string()));
    }
    Ok(full_path)
}
