// sentinel-core/src/domain/rules/categorical.rs

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::columns::name_has_words;
use super::{
    EvaluationContext, Rule, RuleExecutionError, RuleKind, RuleResult, percent, ratio,
    sample_rows,
};
use crate::domain::dataset::Dataset;

/// Number of most frequent values accepted when a role has no fixed allow-list.
pub const INFERRED_TOP_VALUES: usize = 10;

/// A semantic column role and its allowed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CategoricalRole {
    #[validate(length(min = 1, message = "role fragment cannot be empty"))]
    pub fragment: String,
    /// `None` infers the allow-list from the column's most frequent values.
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
}

impl CategoricalRole {
    pub fn fixed(fragment: &str, allowed: &[&str]) -> Self {
        Self {
            fragment: fragment.to_string(),
            allowed: Some(allowed.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn inferred(fragment: &str) -> Self {
        Self {
            fragment: fragment.to_string(),
            allowed: None,
        }
    }

    /// Roles in priority order: the more specific payment roles shadow `status`.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::fixed("payment_status", &["paid", "pending", "failed", "refunded"]),
            Self::fixed(
                "payment_method",
                &["credit_card", "debit_card", "paypal", "cash", "bank_transfer"],
            ),
            Self::fixed(
                "status",
                &[
                    "pending",
                    "processing",
                    "shipped",
                    "delivered",
                    "completed",
                    "cancelled",
                    "returned",
                ],
            ),
            Self::inferred("category"),
            Self::inferred("type"),
        ]
    }
}

/// Rule 8: values outside the allow-list of a status/category-like column.
#[derive(Debug, Clone)]
pub struct CategoricalCheck {
    pub roles: Vec<CategoricalRole>,
    /// Exact column override. Uses `allowed` when given, otherwise infers.
    pub column: Option<String>,
    pub allowed: Option<Vec<String>>,
}

impl Default for CategoricalCheck {
    fn default() -> Self {
        Self {
            roles: CategoricalRole::defaults(),
            column: None,
            allowed: None,
        }
    }
}

impl CategoricalCheck {
    /// First column (in dataset order) claimed by a role, with the role's allow-list.
    fn select<'a>(
        &'a self,
        dataset: &'a Dataset,
    ) -> Result<(usize, &'a str, Option<&'a [String]>), String> {
        if let Some(explicit) = &self.column {
            return dataset
                .column_index(explicit)
                .map(|idx| (idx, explicit.as_str(), self.allowed.as_deref()))
                .ok_or_else(|| format!("Configured categorical column '{}' not found in dataset", explicit));
        }

        for (idx, name) in dataset.columns().iter().enumerate() {
            let role = self.roles.iter().find(|r| name_has_words(name, &r.fragment));
            if let Some(role) = role {
                return Ok((idx, name.as_str(), role.allowed.as_deref()));
            }
        }

        let fragments: Vec<&str> = self.roles.iter().map(|r| r.fragment.as_str()).collect();
        Err(format!(
            "No categorical column found (looked for names with the words: {})",
            fragments.join(", ")
        ))
    }

    /// The `INFERRED_TOP_VALUES` most frequent values, ties broken by first appearance.
    fn infer_allowed(dataset: &Dataset, column: usize) -> HashSet<String> {
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for (row, value) in dataset.present_values(column) {
            let entry = counts
                .entry(value.trim().to_lowercase())
                .or_insert((0, row));
            entry.0 += 1;
        }
        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
        ranked
            .into_iter()
            .take(INFERRED_TOP_VALUES)
            .map(|(value, _)| value)
            .collect()
    }
}

impl Rule for CategoricalCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::CategoricalValues
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        _ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let (index, column, fixed) = match self.select(dataset) {
            Ok(selection) => selection,
            Err(reason) => {
                return Ok(RuleResult::skipped(self.kind(), "0 unexpected values", reason));
            }
        };

        let allowed: HashSet<String> = match fixed {
            Some(values) => values.iter().map(|v| v.trim().to_lowercase()).collect(),
            None => Self::infer_allowed(dataset, index),
        };
        let threshold = if fixed.is_some() {
            let mut listed: Vec<&str> = allowed.iter().map(String::as_str).collect();
            listed.sort_unstable();
            format!("one of {{{}}}", listed.join(", "))
        } else {
            format!("top {} observed values", INFERRED_TOP_VALUES)
        };

        let offending: Vec<usize> = dataset
            .present_values(index)
            .filter(|(_, v)| !allowed.contains(&v.trim().to_lowercase()))
            .map(|(row, _)| row)
            .collect();

        let failed = !offending.is_empty();
        let metric = format!(
            "{} unexpected values ({})",
            offending.len(),
            percent(ratio(offending.len(), dataset.row_count()))
        );
        let description = if failed {
            let mut seen = HashSet::new();
            let unexpected: Vec<&str> = offending
                .iter()
                .filter_map(|&row| dataset.value(row, index))
                .filter(|v| seen.insert(*v))
                .collect();
            format!(
                "'{}' contains values outside the allowed set: {}",
                column,
                unexpected.join(", ")
            )
        } else {
            format!("Every non-empty value in '{}' is allowed", column)
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
