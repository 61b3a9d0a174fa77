// sentinel-core/src/application/engine.rs

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::domain::config::RulesConfig;
use crate::domain::dataset::Dataset;
use crate::domain::error::DomainError;
use crate::domain::rules::{EvaluationContext, Rule, RuleResult};

/// Applies the rule battery to a dataset in canonical order.
///
/// Stateless once built: the same runner may evaluate many datasets, from
/// several threads at once.
pub struct RuleRunner {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRunner {
    /// Builds the ten configured rules. Invalid thresholds or patterns fail here,
    /// before any dataset is seen.
    pub fn new(config: &RulesConfig) -> Result<Self, DomainError> {
        Ok(Self {
            rules: config.compile()?,
        })
    }

    /// Runner over an arbitrary rule list, evaluated in the given order.
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates every rule against `dataset`, using the wall clock for date checks.
    pub fn evaluate(&self, dataset: &Dataset, previous_row_count: Option<u64>) -> Vec<RuleResult> {
        self.evaluate_at(dataset, &EvaluationContext::new(previous_row_count))
    }

    /// Evaluates every rule with an explicit context.
    ///
    /// Always returns one result per rule. A rule that errors or panics is
    /// reported as SKIP with the failure in its description.
    #[instrument(skip_all, fields(rows = dataset.row_count(), columns = dataset.columns().len()))]
    pub fn evaluate_at(&self, dataset: &Dataset, ctx: &EvaluationContext) -> Vec<RuleResult> {
        let start = Instant::now();
        let results: Vec<RuleResult> = self
            .rules
            .iter()
            .map(|rule| Self::evaluate_isolated(rule.as_ref(), dataset, ctx))
            .collect();

        info!(
            rules = results.len(),
            elapsed = ?start.elapsed(),
            "Rule battery evaluated"
        );
        results
    }

    fn evaluate_isolated(rule: &dyn Rule, dataset: &Dataset, ctx: &EvaluationContext) -> RuleResult {
        let kind = rule.kind();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(dataset, ctx)));

        match outcome {
            Ok(Ok(result)) => {
                debug!(rule = %kind, status = %result.status, metric = %result.metric, "Rule evaluated");
                result
            }
            Ok(Err(err)) => {
                warn!(rule = %kind, error = %err, "Rule failed, reporting SKIP");
                RuleResult::skipped(kind, "n/a", format!("Rule could not be evaluated: {}", err))
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(rule = %kind, reason = %reason, "Rule panicked, reporting SKIP");
                RuleResult::skipped(kind, "n/a", format!("Rule could not be evaluated: {}", reason))
            }
        }
    }
}
