// sentinel-core/src/domain/project.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::config::RulesConfig;
use crate::domain::error::DomainError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    /// Relative to `target-path` unless absolute.
    #[serde(rename = "history-file", default = "default_history_file")]
    pub history_file: String,

    /// Wall-clock budget for one evaluation; unbounded when absent.
    #[serde(rename = "timeout-secs", default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "timeout-secs must be at least 1"))]
    pub timeout_secs: Option<u64>,

    /// Datasets evaluated in parallel by a batch run.
    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, max = 256))]
    pub concurrency: usize,

    #[serde(default)]
    #[validate(nested)]
    pub ingest: IngestConfig,

    #[serde(default)]
    #[validate(nested)]
    pub rules: RulesConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            target_path: default_target_path(),
            history_file: default_history_file(),
            timeout_secs: None,
            concurrency: default_concurrency(),
            ingest: IngestConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Field-level validation. Rule patterns are compiled later by `RulesConfig::compile`.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidConfiguration(e.to_string()))
    }
}

/// How CSV files are read.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
pub struct IngestConfig {
    #[validate(custom(function = "validate_delimiter"))]
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Cells equal to one of these (after trimming) are read as missing.
    #[serde(rename = "null-markers", default = "default_null_markers")]
    pub null_markers: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            null_markers: default_null_markers(),
        }
    }
}

fn validate_delimiter(delimiter: &char) -> Result<(), ValidationError> {
    if !delimiter.is_ascii() || matches!(*delimiter, '"' | '\n' | '\r') {
        return Err(ValidationError::new("delimiter")
            .with_message("delimiter must be a single ASCII character other than a quote or newline".into()));
    }
    Ok(())
}

fn default_name() -> String {
    "sentinel".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_history_file() -> String {
    "runs.json".to_string()
}
fn default_concurrency() -> usize {
    4
}
fn default_delimiter() -> char {
    ','
}
fn default_null_markers() -> Vec<String> {
    ["NA", "N/A", "NULL", "null", "NaN", "None"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config: ProjectConfig = serde_yaml::from_str("name: shop\n").unwrap();
        assert_eq!(config.name, "shop");
        assert_eq!(config.target_path, "target");
        assert_eq!(config.history_file, "runs.json");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.ingest.delimiter, ',');
        assert!(config.ingest.null_markers.contains(&"N/A".to_string()));
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_kebab_case_keys() {
        let yaml = "target-path: out\ntimeout-secs: 5\ningest:\n  delimiter: ';'\n  null-markers: ['-']\nrules:\n  row_count_anomaly:\n    threshold: 0.5\n";
        let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.target_path, "out");
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.ingest.delimiter, ';');
        assert_eq!(config.ingest.null_markers, vec!["-".to_string()]);
        assert_eq!(config.rules.row_count_anomaly.threshold, 0.5);
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        let mut config = ProjectConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.check().unwrap_err().is_configuration_error());

        config.concurrency = 2;
        config.ingest.delimiter = 'é';
        assert!(config.check().is_err());

        config.ingest.delimiter = '\t';
        config.rules.duplicate_rows.max_rate = -0.1;
        assert!(config.check().is_err());
    }
}
