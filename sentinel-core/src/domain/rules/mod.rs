// sentinel-core/src/domain/rules/mod.rs

pub mod anomaly;
pub mod categorical;
pub mod columns;
pub mod completeness;
pub mod format;
pub mod numeric;
pub mod temporal;
pub mod uniqueness;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::dataset::{Dataset, SampleRow};

// Re-exports
pub use anomaly::{AnomalyError, RowCountAnomalyCheck, RowCountCheck};
pub use categorical::{CategoricalCheck, CategoricalRole};
pub use columns::ColumnMatcher;
pub use completeness::NullRateCheck;
pub use format::{EmailFormatCheck, PhoneZipFormatCheck};
pub use numeric::{NumericBound, NumericRangeCheck, OutlierCheck, Quartiles};
pub use temporal::DateValidityCheck;
pub use uniqueness::{DuplicateRowsCheck, UniqueKeyCheck};

/// Maximum number of offending rows attached to a result.
pub const SAMPLE_ROW_LIMIT: usize = 5;

/// The ten checks, declared in canonical evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    NullRate,
    DuplicateRows,
    UniqueKey,
    NumericRange,
    EmailFormat,
    PhoneZipFormat,
    DateValidity,
    CategoricalValues,
    RowCountAnomaly,
    OutlierDetection,
}

impl RuleKind {
    pub const ALL: [RuleKind; 10] = [
        Self::NullRate,
        Self::DuplicateRows,
        Self::UniqueKey,
        Self::NumericRange,
        Self::EmailFormat,
        Self::PhoneZipFormat,
        Self::DateValidity,
        Self::CategoricalValues,
        Self::RowCountAnomaly,
        Self::OutlierDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NullRate => "null_rate",
            Self::DuplicateRows => "duplicate_rows",
            Self::UniqueKey => "unique_key",
            Self::NumericRange => "numeric_range",
            Self::EmailFormat => "email_format",
            Self::PhoneZipFormat => "phone_zip_format",
            Self::DateValidity => "date_validity",
            Self::CategoricalValues => "categorical_values",
            Self::RowCountAnomaly => "row_count_anomaly",
            Self::OutlierDetection => "outlier_detection",
        }
    }

    /// Display title used by the rendered report and the CLI table.
    pub fn title(&self) -> &'static str {
        match self {
            Self::NullRate => "Null Rate",
            Self::DuplicateRows => "Duplicate Rows",
            Self::UniqueKey => "Unique Key",
            Self::NumericRange => "Numeric Range",
            Self::EmailFormat => "Email Format",
            Self::PhoneZipFormat => "Phone/ZIP Format",
            Self::DateValidity => "Date Validity",
            Self::CategoricalValues => "Categorical Values",
            Self::RowCountAnomaly => "Row Count Anomaly",
            Self::OutlierDetection => "Outlier Detection",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleStatus {
    Pass,
    Fail,
    Skip,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verdict of a single rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_name: RuleKind,
    pub status: RuleStatus,
    /// Column(s) the rule evaluated, when it selected any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub metric: String,
    pub threshold: String,
    pub description: String,
    #[serde(default)]
    pub sample_rows: Vec<SampleRow>,
}

impl RuleResult {
    /// PASS/FAIL verdict. Sample rows are dropped on PASS and capped otherwise.
    pub fn verdict(
        rule: RuleKind,
        failed: bool,
        metric: impl Into<String>,
        threshold: impl Into<String>,
        description: impl Into<String>,
        mut sample_rows: Vec<SampleRow>,
    ) -> Self {
        if failed {
            sample_rows.truncate(SAMPLE_ROW_LIMIT);
        } else {
            sample_rows.clear();
        }
        Self {
            rule_name: rule,
            status: if failed {
                RuleStatus::Fail
            } else {
                RuleStatus::Pass
            },
            column: None,
            metric: metric.into(),
            threshold: threshold.into(),
            description: description.into(),
            sample_rows,
        }
    }

    pub fn skipped(rule: RuleKind, threshold: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule_name: rule,
            status: RuleStatus::Skip,
            column: None,
            metric: "n/a".to_string(),
            threshold: threshold.into(),
            description: reason.into(),
            sample_rows: Vec::new(),
        }
    }

    pub fn on_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

/// Inputs resolved by the caller before evaluation starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationContext {
    /// Row count of the most recent completed run of the same lineage.
    pub previous_row_count: Option<u64>,
    /// Reference instant for the future-date check.
    pub now: DateTime<Utc>,
}

impl EvaluationContext {
    pub fn new(previous_row_count: Option<u64>) -> Self {
        Self {
            previous_row_count,
            now: Utc::now(),
        }
    }

    pub fn at(previous_row_count: Option<u64>, now: DateTime<Utc>) -> Self {
        Self {
            previous_row_count,
            now,
        }
    }
}

/// Internal fault of a single rule. Never crosses the runner boundary.
#[derive(Debug, Error, PartialEq)]
pub enum RuleExecutionError {
    #[error("column index {index} out of range for '{column}'")]
    ColumnOutOfRange { column: String, index: usize },

    #[error("non-finite statistic '{statistic}' computed on column '{column}'")]
    NonFiniteStatistic { column: String, statistic: String },

    #[error("{0}")]
    Internal(String),
}

/// A stateless data-quality check.
pub trait Rule: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn evaluate(
        &self,
        dataset: &Dataset,
        ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError>;
}

/// Formats a fraction as a percentage with one decimal.
pub(crate) fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Fraction `count / total`, 0 when the dataset is empty.
pub(crate) fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Sample rows for a list of row indices, capped at [`SAMPLE_ROW_LIMIT`].
pub(crate) fn sample_rows(dataset: &Dataset, indices: &[usize]) -> Vec<SampleRow> {
    indices
        .iter()
        .take(SAMPLE_ROW_LIMIT)
        .map(|&idx| dataset.sample_row(idx))
        .collect()
}
