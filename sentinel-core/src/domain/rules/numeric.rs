// sentinel-core/src/domain/rules/numeric.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::columns::ColumnMatch;
use super::{
    ColumnMatcher, EvaluationContext, Rule, RuleExecutionError, RuleKind, RuleResult, percent,
    ratio, sample_rows,
};
use crate::domain::dataset::Dataset;

/// Parses a cell as a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A column is numeric when it has at least one value and every present value parses.
pub fn is_numeric_column(dataset: &Dataset, column: usize) -> bool {
    let mut seen = false;
    for (_, value) in dataset.present_values(column) {
        if parse_number(value).is_none() {
            return false;
        }
        seen = true;
    }
    seen
}

/// Allowed range for a semantic numeric role (price, quantity, age...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NumericBound {
    pub role: String,
    #[validate(length(min = 1, message = "a numeric role needs at least one name fragment"))]
    pub fragments: Vec<String>,
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericBound {
    pub fn new(role: &str, fragments: &[&str], min: f64, max: Option<f64>) -> Self {
        Self {
            role: role.to_string(),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            min,
            max,
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("price", &["price", "amount"], 0.0, Some(100_000.0)),
            Self::new("quantity", &["quantity", "qty"], 0.0, Some(10_000.0)),
            Self::new("age", &["age"], 0.0, Some(120.0)),
        ]
    }

    fn matcher(&self) -> ColumnMatcher {
        ColumnMatcher::new(&self.fragments)
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }

    fn describe(&self) -> String {
        match self.max {
            Some(max) => format!("[{}, {}]", self.min, max),
            None => format!("[{}, +inf)", self.min),
        }
    }
}

/// Rule 4: negative, out-of-range or non-numeric values in a numeric column.
#[derive(Debug, Clone)]
pub struct NumericRangeCheck {
    pub bounds: Vec<NumericBound>,
    /// Exact column override; its role is taken from the first matching bound.
    pub column: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Default for NumericRangeCheck {
    fn default() -> Self {
        Self {
            bounds: NumericBound::defaults(),
            column: None,
            min: None,
            max: None,
        }
    }
}

impl NumericRangeCheck {
    fn select<'a>(&self, dataset: &'a Dataset) -> Result<(usize, &'a str, NumericBound), String> {
        if let Some(explicit) = &self.column {
            let index = dataset
                .column_index(explicit)
                .ok_or_else(|| format!("Configured numeric column '{}' not found in dataset", explicit))?;
            let name = dataset.columns()[index].as_str();
            let mut bound = self
                .bounds
                .iter()
                .find(|b| b.matcher().matches_name(name))
                .cloned()
                .unwrap_or_else(|| NumericBound::new("custom", &[], 0.0, None));
            if let Some(min) = self.min {
                bound.min = min;
            }
            if self.max.is_some() {
                bound.max = self.max;
            }
            return Ok((index, name, bound));
        }

        dataset
            .columns()
            .iter()
            .enumerate()
            .find_map(|(index, name)| {
                self.bounds
                    .iter()
                    .find(|b| b.matcher().matches_name(name))
                    .map(|b| (index, name.as_str(), b.clone()))
            })
            .ok_or_else(|| {
                let fragments: Vec<&str> = self
                    .bounds
                    .iter()
                    .flat_map(|b| b.fragments.iter().map(String::as_str))
                    .collect();
                format!(
                    "No numeric column found (looked for names with the words: {})",
                    fragments.join(", ")
                )
            })
    }
}

impl Rule for NumericRangeCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::NumericRange
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        _ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let (index, column, bound) = match self.select(dataset) {
            Ok(found) => found,
            Err(reason) => {
                return Ok(RuleResult::skipped(self.kind(), "value within role bounds", reason));
            }
        };
        let threshold = bound.describe();

        let mut non_numeric = 0usize;
        let mut offending = Vec::new();
        for (row, value) in dataset.present_values(index) {
            match parse_number(value) {
                Some(v) if bound.contains(v) => {}
                Some(_) => offending.push(row),
                None => {
                    non_numeric += 1;
                    offending.push(row);
                }
            }
        }

        let failed = !offending.is_empty();
        let metric = format!(
            "{} values out of range ({})",
            offending.len(),
            percent(ratio(offending.len(), dataset.row_count()))
        );
        let description = if failed {
            format!(
                "Column '{}' ({}) has {} values outside {}, {} of them non-numeric",
                column,
                bound.role,
                offending.len(),
                threshold,
                non_numeric
            )
        } else {
            format!("Every value in '{}' lies within {}", column, threshold)
        };

        Ok(RuleResult::verdict(
            self.kind(),
            failed,
            metric,
            threshold,
            description,
            sample_rows(dataset, &offending),
        )
        .on_column(column))
    }
}

/// First/third quartiles with linear interpolation between closest ranks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn fences(&self, multiplier: f64) -> (f64, f64) {
        let spread = multiplier * self.iqr();
        (self.q1 - spread, self.q3 + spread)
    }
}

fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Rule 10: IQR outlier detection.
#[derive(Debug, Clone)]
pub struct OutlierCheck {
    pub matcher: ColumnMatcher,
    pub multiplier: f64,
    /// Tolerated fraction of outliers.
    pub max_outlier_rate: f64,
}

impl Default for OutlierCheck {
    fn default() -> Self {
        Self {
            matcher: ColumnMatcher::new(["price", "amount", "quantity", "qty", "age"]),
            multiplier: 1.5,
            max_outlier_rate: 0.0,
        }
    }
}

impl OutlierCheck {
    /// First name match whose values are numeric, else the first numeric column.
    fn select<'a>(&self, dataset: &'a Dataset) -> Result<(usize, &'a str), String> {
        match self
            .matcher
            .locate_where(dataset, |index| is_numeric_column(dataset, index))
        {
            ColumnMatch::Found { index, name } => Ok((index, name)),
            ColumnMatch::MissingExplicit => {
                Err(self.matcher.skip_reason("numeric", ColumnMatch::MissingExplicit))
            }
            ColumnMatch::NotFound => dataset
                .columns()
                .iter()
                .enumerate()
                .find(|(index, _)| is_numeric_column(dataset, *index))
                .map(|(index, name)| (index, name.as_str()))
                .ok_or_else(|| "No numeric column available for outlier detection".to_string()),
        }
    }
}

impl Rule for OutlierCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::OutlierDetection
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        _ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let threshold = if self.max_outlier_rate == 0.0 {
            format!("0 outliers ({}×IQR)", self.multiplier)
        } else {
            format!("{} outliers ({}×IQR)", percent(self.max_outlier_rate), self.multiplier)
        };

        let (index, column) = match self.select(dataset) {
            Ok(found) => found,
            Err(reason) => return Ok(RuleResult::skipped(self.kind(), threshold, reason)),
        };

        let values: Vec<(usize, f64)> = dataset
            .present_values(index)
            .filter_map(|(row, v)| parse_number(v).map(|n| (row, n)))
            .collect();
        let numbers: Vec<f64> = values.iter().map(|(_, v)| *v).collect();

        let Some(quartiles) = Quartiles::compute(&numbers) else {
            return Ok(RuleResult::skipped(
                self.kind(),
                threshold,
                format!("Column '{}' has no numeric values", column),
            )
            .on_column(column));
        };

        let (lower, upper) = quartiles.fences(self.multiplier);
        for (statistic, value) in [("q1", quartiles.q1), ("q3", quartiles.q3), ("lower", lower), ("upper", upper)] {
            if !value.is_finite() {
                return Err(RuleExecutionError::NonFiniteStatistic {
                    column: column.to_string(),
                    statistic: statistic.to_string(),
                });
            }
        }

        let outliers: Vec<usize> = values
            .iter()
            .filter(|(_, v)| *v < lower || *v > upper)
            .map(|(row, _)| *row)
            .collect();

        let fraction = ratio(outliers.len(), values.len());
        let failed = !outliers.is_empty() && fraction > self.max_outlier_rate;
        let metric = format!(
            "{} outliers outside [{:.2}, {:.2}]",
            outliers.len(),
            lower,
            upper
        );
        let description = format!(
            "IQR check on '{}': Q1={:.2}, Q3={:.2}, IQR={:.2}; {} of {} values fall outside the fences",
            column,
            quartiles.q1,
            quartiles.q3,
            quartiles.iqr(),
            outliers.len(),
            values.len()
        );

        Ok(RuleResult::verdict(
            self.kind(),
            failed,
            metric,
            threshold,
            description,
            sample_rows(dataset, &outliers),
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

    fn ctx() -> EvaluationContext {
        EvaluationContext::new(None)
    }

    fn single_column(name: &str, values: &[&str]) -> Result<Dataset> {
        let rows = values.iter().map(|v| vec![Some(v.to_string())]).collect();
        Ok(Dataset::new(vec![name.to_string()], rows)?)
    }

    #[test]
    fn test_quartiles_linear_interpolation() {
        let q = Quartiles::compute(&[10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 1000.0]).unwrap();
        assert!((q.q1 - 11.0).abs() < 1e-9);
        assert!((q.q3 - 12.5).abs() < 1e-9);
        assert!((q.iqr() - 1.5).abs() < 1e-9);
        let (lower, upper) = q.fences(1.5);
        assert!((lower - 8.75).abs() < 1e-9);
        assert!((upper - 14.75).abs() < 1e-9);
    }

    #[test]
    fn test_outlier_flagged() -> Result<()> {
        let ds = single_column("price", &["10", "12", "11", "13", "12", "11", "1000"])?;
        let res = OutlierCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(res.status, RuleStatus::Fail);
        assert!(res.metric.contains("14.75"), "{}", res.metric);
        assert_eq!(res.sample_rows.len(), 1);
        assert_eq!(res.sample_rows[0]["price"].as_deref(), Some("1000"));
        Ok(())
    }

    #[test]
    fn test_outlier_falls_back_to_first_numeric_column() -> Result<()> {
        let rows = vec![
            vec![Some("a".into()), Some("1".into())],
            vec![Some("b".into()), Some("2".into())],
        ];
        let ds = Dataset::new(vec!["label".into(), "score".into()], rows)?;
        let res = OutlierCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(res.status, RuleStatus::Pass);
        assert_eq!(res.column.as_deref(), Some("score"));
        Ok(())
    }

    #[test]
    fn test_outlier_skips_without_numeric_column() -> Result<()> {
        let ds = single_column("label", &["a", "b"])?;
        let res = OutlierCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(res.status, RuleStatus::Skip);
        Ok(())
    }

    #[test]
    fn test_overflowing_spread_is_an_execution_error() -> Result<()> {
        let ds = single_column("price", &["-1.7e308", "1.7e308"])?;
        let res = OutlierCheck::default().evaluate(&ds, &ctx());
        assert!(matches!(
            res,
            Err(RuleExecutionError::NonFiniteStatistic { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_negative_and_non_numeric_prices_fail() -> Result<()> {
        let ds = single_column("unit_price", &["10.5", "-50", "abc", "", "99"])?;
        let res = NumericRangeCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(res.status, RuleStatus::Fail);
        assert!(res.metric.starts_with("2 values out of range"));
        assert_eq!(res.threshold, "[0, 100000]");
        assert_eq!(res.sample_rows.len(), 2);
        Ok(())
    }

    #[test]
    fn test_quantity_upper_bound() -> Result<()> {
        let ds = single_column("qty", &["1", "10001"])?;
        let res = NumericRangeCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(res.status, RuleStatus::Fail);
        Ok(())
    }

    #[test]
    fn test_explicit_column_with_custom_bounds() -> Result<()> {
        let ds = single_column("temperature", &["-5", "20"])?;
        let check = NumericRangeCheck {
            column: Some("temperature".into()),
            min: Some(-10.0),
            max: Some(50.0),
            ..Default::default()
        };
        let res = check.evaluate(&ds, &ctx())?;
        assert_eq!(res.status, RuleStatus::Pass);
        Ok(())
    }

    #[test]
    fn test_range_skips_without_semantic_column() -> Result<()> {
        let ds = single_column("score", &["1"])?;
        let res = NumericRangeCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(res.status, RuleStatus::Skip);
        Ok(())
    }

    #[test]
    fn test_outlier_passes_over_non_numeric_name_match() -> Result<()> {
        let rows = vec![
            vec![Some("n/a".into()), Some("10".into())],
            vec![Some("tbd".into()), Some("12".into())],
            vec![Some("n/a".into()), Some("11".into())],
        ];
        let ds = Dataset::new(vec!["price_note".into(), "price".into()], rows)?;
        let res = OutlierCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(res.column.as_deref(), Some("price"));
        assert_eq!(res.status, RuleStatus::Pass);
        Ok(())
    }

    #[test]
    fn test_lookalike_columns_do_not_fail_a_clean_file() -> Result<()> {
        let rows = vec![
            vec![Some("yes".into()), Some("hello".into()), Some("1".into()), Some("10.0".into())],
            vec![Some("no".into()), Some("world".into()), Some("2".into()), Some("12.5".into())],
            vec![Some("yes".into()), Some("again".into()), Some("3".into()), Some("11.0".into())],
        ];
        let ds = Dataset::new(
            vec!["paid".into(), "message".into(), "order_id".into(), "price".into()],
            rows,
        )?;

        let range = NumericRangeCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(range.column.as_deref(), Some("price"));
        assert_eq!(range.status, RuleStatus::Pass);

        let outliers = OutlierCheck::default().evaluate(&ds, &ctx())?;
        assert_eq!(outliers.column.as_deref(), Some("price"));
        assert_eq!(outliers.status, RuleStatus::Pass);
        Ok(())
    }
}
