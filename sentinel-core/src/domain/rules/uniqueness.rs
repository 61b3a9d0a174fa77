// sentinel-core/src/domain/rules/uniqueness.rs

use std::collections::HashMap;

use super::columns::ColumnMatch;
use super::{
    ColumnMatcher, EvaluationContext, Rule, RuleExecutionError, RuleKind, RuleResult, percent,
    ratio, sample_rows,
};
use crate::domain::dataset::{Cell, Dataset};

/// Groups row indices by key, keeping first-seen order of the groups.
fn group_rows<K, I>(keys: I) -> Vec<Vec<usize>>
where
    K: std::hash::Hash + Eq,
    I: IntoIterator<Item = (usize, K)>,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (row, key) in keys {
        match slots.get(&key) {
            Some(&slot) => groups[slot].push(row),
            None => {
                slots.insert(key, groups.len());
                groups.push(vec![row]);
            }
        }
    }
    groups
}

/// Rule 2: exact duplicates over the full row content.
///
/// Every row of a duplicate set is counted: two identical rows give a count of 2.
#[derive(Debug, Clone, Default)]
pub struct DuplicateRowsCheck {
    /// Tolerated fraction of duplicate rows.
    pub max_rate: f64,
}

impl Rule for DuplicateRowsCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::DuplicateRows
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        _ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let groups = group_rows::<&[Cell], _>(dataset.rows().enumerate());
        let duplicate_sets: Vec<&Vec<usize>> = groups.iter().filter(|g| g.len() > 1).collect();
        let duplicate_count: usize = duplicate_sets.iter().map(|g| g.len()).sum();

        let fraction = ratio(duplicate_count, dataset.row_count());
        let failed = duplicate_count > 0 && fraction > self.max_rate;
        let metric = format!("{} duplicate rows ({})", duplicate_count, percent(fraction));
        let threshold = if self.max_rate == 0.0 {
            "0 duplicate rows".to_string()
        } else {
            percent(self.max_rate)
        };
        let description = if duplicate_count == 0 {
            "No fully duplicated rows found".to_string()
        } else {
            format!(
                "{} rows belong to {} sets of identical rows",
                duplicate_count,
                duplicate_sets.len()
            )
        };

        // One representative per duplicate set.
        let representatives: Vec<usize> = duplicate_sets.iter().map(|g| g[0]).collect();

        Ok(RuleResult::verdict(
            self.kind(),
            failed,
            metric,
            threshold,
            description,
            sample_rows(dataset, &representatives),
        ))
    }
}

/// Rule 3: repeated values in the ID-like column.
#[derive(Debug, Clone)]
pub struct UniqueKeyCheck {
    pub matcher: ColumnMatcher,
}

impl Default for UniqueKeyCheck {
    fn default() -> Self {
        Self {
            matcher: ColumnMatcher::new(["id"]),
        }
    }
}

impl Rule for UniqueKeyCheck {
    fn kind(&self) -> RuleKind {
        RuleKind::UniqueKey
    }

    fn evaluate(
        &self,
        dataset: &Dataset,
        _ctx: &EvaluationContext,
    ) -> Result<RuleResult, RuleExecutionError> {
        let threshold = "0 repeated keys";
        let (index, column) = match self.matcher.locate(dataset) {
            ColumnMatch::Found { index, name } => (index, name.to_string()),
            outcome => {
                return Ok(RuleResult::skipped(
                    self.kind(),
                    threshold,
                    self.matcher.skip_reason("ID", outcome),
                ));
            }
        };

        let groups = group_rows(dataset.present_values(index));
        let mut offending: Vec<usize> = groups
            .iter()
            .filter(|g| g.len() > 1)
            .flatten()
            .copied()
            .collect();
        offending.sort_unstable();
        let repeated_keys = groups.iter().filter(|g| g.len() > 1).count();

        let failed = !offending.is_empty();
        let metric = format!(
            "{} rows share {} repeated keys",
            offending.len(),
            repeated_keys
        );
        let description = if failed {
            format!(
                "Column '{}' must be unique but {} values repeat",
                column, repeated_keys
            )
        } else {
            format!("Every value in '{}' is unique", column)
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
