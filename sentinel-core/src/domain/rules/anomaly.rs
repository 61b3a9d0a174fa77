// sentinel-core/src/domain/rules/anomaly.rs

use thiserror::Error;

use super::{EvaluationContext, Rule, RuleExecutionError, RuleKind, RuleResult, percent};
use crate::domain::dataset::Dataset;

#[derive(Debug, Error, PartialEq)]
pub enum AnomalyError {
    #[error(
        "Row count deviation too high: {deviation:.1}% (Threshold: {threshold:.1}%). Prev: {prev}, Curr: {curr}"
    )]
    DeviationExceeded {
        deviation: f64,
        threshold: f64,
        prev: u64,
        curr: u64,
    },
    #[error("No previous completed run to compare row count against")]
    NoHistory,
}

pub struct RowCountCheck;

impl RowCountCheck {
    /// Relative change between two row counts, or an error past `threshold`.
    ///
    /// A previous count of zero counts as a 100% change unless the current
    /// count is also zero.
    pub fn validate(
        current_count: u64,
        previous_count: Option<u64>,
        threshold: f64,
    ) -> Result<f64, AnomalyError> {
        let prev = previous_count.ok_or(AnomalyError::NoHistory)?;

        let change = if prev == 0 {
            if current_count > 0 { 1.0 } else { 0.0 }
        } else {
            current_count.abs_diff(prev) as f64 / prev as f64
        };

        if change > threshold {
            return Err(AnomalyError::DeviationExceeded {
                deviation: change * 100.0,
                threshold: threshold * 100.0,
                prev,
                curr: current_count,
            });
        }

        Ok(change)
    }
}

/// Rule 9: row count drift against the last completed run of the same lineage.
#[derive(Debug, Clone)]
pub struct RowCountAnomalyCheck {
    pub threshold: f64,
}

impl Default for RowCountAnomalyCheck {
    fn default() -> Self {
        Self { threshold: 0.3 }
    }
}

impl Rule for RowCountAnomalyCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::RowCountAnomaly
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let threshold = format!("±{}", percent(self.threshold));
        let current = dataset.row_count() as u64;

        match RowCountCheck::validate(current, ctx.previous_row_count, self.threshold) {
            Ok(change) => {
                let prev = ctx.previous_row_count.unwrap_or_default();
                Ok(RuleResult::verdict(
                    self.kind(),
                    false,
                    format!("{} change", percent(change)),
                    threshold,
                    format!("Current: {}, Previous: {}", current, prev),
                    Vec::new(),
                ))
            }
            Err(AnomalyError::NoHistory) => Ok(RuleResult::skipped(
                self.kind(),
                threshold,
                AnomalyError::NoHistory.to_string(),
            )),
            Err(err @ AnomalyError::DeviationExceeded { deviation, .. }) => {
                Ok(RuleResult::verdict(
                    self.kind(),
                    true,
                    format!("{:.1}% change", deviation),
                    threshold,
                    err.to_string(),
                    Vec::new(),
                ))
            }
        }
    }
}
