// sentinel-core/src/domain/rules/completeness.rs

use tracing::warn;

use super::{
    EvaluationContext, Rule, RuleExecutionError, RuleKind, RuleResult, percent, ratio,
    sample_rows,
};
use crate::domain::dataset::{Dataset, is_null};

/// Rule 1: fraction of missing/empty cells per column.
#[derive(Debug, Clone)]
pub struct NullRateCheck {
    pub threshold: f64,
    /// Restricts the check to these columns; all columns when `None`.
    pub required_columns: Option<Vec<String>>,
}

impl Default for NullRateCheck {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            required_columns: None,
        }
    }
}

impl NullRateCheck {
    fn target_columns(&self, dataset: &Dataset) -> Vec<usize> {
        match &self.required_columns {
            None => (0..dataset.columns().len()).collect(),
            Some(required) => required
                .iter()
                .filter_map(|name| {
                    let idx = dataset.column_index(name);
                    if idx.is_none() {
                        warn!(column = %name, "Required column absent from dataset");
                    }
                    idx
                })
                .collect(),
        }
    }
}

impl Rule for NullRateCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::NullRate
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        _ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let threshold = percent(self.threshold);
        let targets = self.target_columns(dataset);
        if targets.is_empty() {
            return Ok(RuleResult::skipped(
                self.kind(),
                threshold,
                "None of the required columns exist in the dataset",
            ));
        }

        // (column index, null row indices)
        let mut worst: Option<(usize, Vec<usize>)> = None;
        for col in targets {
            let nulls: Vec<usize> = dataset
                .column_values(col)
                .filter(|(_, v)| is_null(*v))
                .map(|(idx, _)| idx)
                .collect();
            let is_worse = worst
                .as_ref()
                .is_none_or(|(_, current)| nulls.len() > current.len());
            if is_worse {
                worst = Some((col, nulls));
            }
        }

        let (col, nulls) = worst.ok_or_else(|| {
            RuleExecutionError::Internal("no column evaluated for null rate".into())
        })?;
        let column = dataset
            .columns()
            .get(col)
            .ok_or_else(|| RuleExecutionError::ColumnOutOfRange {
                column: "null_rate".into(),
                index: col,
            })?
            .clone();

        let fraction = ratio(nulls.len(), dataset.row_count());
        let failed = fraction > self.threshold;
        let metric = format!("{} nulls in '{}'", percent(fraction), column);
        let description = if failed {
            format!(
                "Column '{}' has {} of {} values missing or empty, above the {} limit",
                column,
                nulls.len(),
                dataset.row_count(),
                threshold
            )
        } else {
            format!(
                "Every checked column has at most {} missing or empty values",
                threshold
            )
        };

        Ok(RuleResult::verdict(
            self.kind(),
            failed,
            metric,
            threshold,
            description,
            sample_rows(dataset, &nulls),
        )
        .on_column(column))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::rules::RuleStatus;
    use anyhow::Result;

    fn ten_rows_with_nulls(nulls: usize) -> Result<Dataset> {
        let rows = (0..10)
            .map(|i| {
                let email = if i < nulls {
                    None
                } else {
                    Some(format!("u{}@x.io", i))
                };
                vec![Some(i.to_string()), email]
            })
            .collect();
        Ok(Dataset::new(vec!["id".into(), "email".into()], rows)?)
    }

    #[test]
    fn test_thirty_percent_nulls_fail() -> Result<()> {
        let ds = ten_rows_with_nulls(3)?;
        let res = NullRateCheck::default().evaluate(&ds, &EvaluationContext::new(None))?;
        assert_eq!(res.status, RuleStatus::Fail);
        assert!(res.metric.starts_with("30.0%"), "metric: {}", res.metric);
        assert_eq!(res.threshold, "5.0%");
        assert_eq!(res.column.as_deref(), Some("email"));
        assert_eq!(res.sample_rows.len(), 3);
        Ok(())
    }

    #[test]
    fn test_no_nulls_pass() -> Result<()> {
        let ds = ten_rows_with_nulls(0)?;
        let res = NullRateCheck::default().evaluate(&ds, &EvaluationContext::new(None))?;
        assert_eq!(res.status, RuleStatus::Pass);
        assert!(res.sample_rows.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_strings_count_as_null_but_blanks_do_not() -> Result<()> {
        let rows = vec![
            vec![Some("".into())],
            vec![Some("  ".into())],
            vec![Some("x".into())],
        ];
        let ds = Dataset::new(vec!["a".into()], rows)?;
        let res = NullRateCheck::default().evaluate(&ds, &EvaluationContext::new(None))?;
        assert_eq!(res.status, RuleStatus::Fail);
        assert!(res.metric.starts_with("33.3%"), "{}", res.metric);
        Ok(())
    }

    #[test]
    fn test_required_columns_restrict_scope() -> Result<()> {
        let ds = ten_rows_with_nulls(3)?;
        let check = NullRateCheck {
            required_columns: Some(vec!["id".into()]),
            ..Default::default()
        };
        let res = check.evaluate(&ds, &EvaluationContext::new(None))?;
        assert_eq!(res.status, RuleStatus::Pass);

        let check = NullRateCheck {
            required_columns: Some(vec!["nope".into()]),
            ..Default::default()
        };
        let res = check.evaluate(&ds, &EvaluationContext::new(None))?;
        assert_eq!(res.status, RuleStatus::Skip);
        Ok(())
    }
}
