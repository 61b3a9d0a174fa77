// sentinel-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, instrument};

use crate::domain::project::ProjectConfig;
use crate::error::SentinelError;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["sentinel.yaml", "sentinel.yml"];

pub const ENV_TARGET_PATH: &str = "SENTINEL_TARGET_PATH";
pub const ENV_TIMEOUT_SECS: &str = "SENTINEL_TIMEOUT_SECS";
pub const ENV_CONCURRENCY: &str = "SENTINEL_CONCURRENCY";

// --- LOADER ---

/// Loads the project configuration.
///
/// An explicit path must exist. Without one, `sentinel.yaml`/`sentinel.yml` in
/// `project_dir` is used when present, defaults otherwise. Environment
/// overrides are applied last, then the result is validated.
#[instrument(skip(project_dir))]
pub fn load_project_config(
    project_dir: &Path,
    explicit: Option<&Path>,
) -> Result<ProjectConfig, SentinelError> {
    let mut config = match find_main_config(project_dir, explicit)? {
        Some(path) => {
            info!(path = ?path, "Loading project configuration");
            let content = fs::read_to_string(&path).map_err(InfrastructureError::Io)?;
            serde_yaml::from_str(&content).map_err(InfrastructureError::YamlError)?
        }
        None => {
            info!("No sentinel.yaml found, using default configuration");
            ProjectConfig::default()
        }
    };

    // Layering: SENTINEL_TARGET_PATH=/tmp/out sentinel run data.csv
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    config.check()?;
    Ok(config)
}

fn find_main_config(
    root: &Path,
    explicit: Option<&Path>,
) -> Result<Option<PathBuf>, InfrastructureError> {
    if let Some(path) = explicit {
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        if !resolved.exists() {
            return Err(InfrastructureError::ConfigNotFound(
                resolved.display().to_string(),
            ));
        }
        return Ok(Some(resolved));
    }

    Ok(CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists()))
}

// --- ENV OVERRIDES ---

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T, InfrastructureError> {
    raw.trim().parse().map_err(|_| {
        InfrastructureError::ConfigError(format!("{} has an invalid value: '{}'", key, raw))
    })
}

/// Applies `SENTINEL_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_TARGET_PATH) {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Some(val) = lookup(ENV_TIMEOUT_SECS) {
        let secs = parse_env(ENV_TIMEOUT_SECS, &val)?;
        info!(old = ?config.timeout_secs, new = secs, "Overriding timeout via ENV");
        config.timeout_secs = Some(secs);
    }
    if let Some(val) = lookup(ENV_CONCURRENCY) {
        let workers = parse_env(ENV_CONCURRENCY, &val)?;
        info!(old = config.concurrency, new = workers, "Overriding concurrency via ENV");
        config.concurrency = workers;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(find_main_config(dir.path(), None)?, None);
        Ok(())
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let err = load_project_config(dir.path(), Some(Path::new("nope.yaml"))).unwrap_err();
        assert!(matches!(
            err,
            SentinelError::Infrastructure(InfrastructureError::ConfigNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_yml_extension_is_discovered() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("sentinel.yml"),
            "name: shop\nrules:\n  null_rate:\n    threshold: 0.2\n",
        )?;
        let path = find_main_config(dir.path(), None)?.unwrap();
        assert!(path.ends_with("sentinel.yml"));

        let content = fs::read_to_string(path)?;
        let config: ProjectConfig = serde_yaml::from_str(&content)?;
        assert_eq!(config.rules.null_rate.threshold, 0.2);
        Ok(())
    }

    #[test]
    fn test_invalid_threshold_fails_at_load() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("sentinel.yaml"),
            "rules:\n  outlier_detection:\n    max_outlier_rate: 2.0\n",
        )?;
        let err = load_project_config(dir.path(), None).unwrap_err();
        assert!(matches!(err, SentinelError::Domain(e) if e.is_configuration_error()));
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut config = ProjectConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_TARGET_PATH, "/tmp/out"),
                (ENV_TIMEOUT_SECS, "12"),
                (ENV_CONCURRENCY, " 8 "),
            ]),
        )?;
        assert_eq!(config.target_path, "/tmp/out");
        assert_eq!(config.timeout_secs, Some(12));
        assert_eq!(config.concurrency, 8);
        Ok(())
    }

    #[test]
    fn test_unparseable_env_override() {
        let mut config = ProjectConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(err.to_string().contains("SENTINEL_TIMEOUT_SECS"));
    }
}
