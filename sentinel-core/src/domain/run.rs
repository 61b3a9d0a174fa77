// sentinel-core/src/domain/run.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::dataset::Dataset;
use crate::domain::error::DomainError;
use crate::domain::rules::{RuleResult, RuleStatus};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate counts and score over a run's results.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total_rules: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// 0..=100. Skipped rules are left out of the denominator.
    pub score: u8,
}

/// Counts results by status and derives the score.
///
/// `score = round(100 * passed / (passed + failed))`, or 100 when nothing was scored.
pub fn summarize(results: &[RuleResult]) -> RunSummary {
    let count = |status: RuleStatus| results.iter().filter(|r| r.status == status).count();
    let passed = count(RuleStatus::Pass);
    let failed = count(RuleStatus::Fail);
    let skipped = count(RuleStatus::Skip);

    let scored = passed + failed;
    let score = if scored == 0 {
        100
    } else {
        (100.0 * passed as f64 / scored as f64).round() as u8
    };

    RunSummary {
        total_rules: results.len(),
        passed,
        failed,
        skipped,
        score,
    }
}

/// What a run evaluated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    /// Logical dataset identity used to find the previous run for row-count comparison.
    pub lineage: String,
    /// Where the data came from (file path, `demo`...).
    pub source: String,
    pub columns: Vec<String>,
    pub row_count: u64,
}

impl DatasetRef {
    pub fn describe(lineage: impl Into<String>, source: impl Into<String>, dataset: &Dataset) -> Self {
        Self {
            lineage: lineage.into(),
            source: source.into(),
            columns: dataset.columns().to_vec(),
            row_count: dataset.row_count() as u64,
        }
    }
}

/// One execution of the rule battery against one dataset snapshot.
///
/// Mutable only while `running`; `complete` and `fail` are terminal.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Run {
    pub run_id: Uuid,
    pub dataset: DatasetRef,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    #[serde(default)]
    pub summary: Option<RunSummary>,
    #[serde(default)]
    pub results: Vec<RuleResult>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Run {
    pub fn start(dataset: DatasetRef) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            dataset,
            created_at: Utc::now(),
            completed_at: None,
            status: RunStatus::Running,
            summary: None,
            results: Vec::new(),
            duration_ms: None,
            error: None,
        }
    }

    fn ensure_running(&self) -> Result<(), DomainError> {
        if self.status.is_final() {
            return Err(DomainError::RunFinalized(self.run_id.to_string()));
        }
        Ok(())
    }

    fn stamp_completion(&mut self) {
        let now = Utc::now();
        let elapsed = (now - self.created_at).num_milliseconds().max(0);
        self.completed_at = Some(now);
        self.duration_ms = Some(elapsed as u64);
    }

    /// Attaches results and their summary, then freezes the run.
    pub fn complete(&mut self, results: Vec<RuleResult>) -> Result<(), DomainError> {
        self.ensure_running()?;
        self.summary = Some(summarize(&results));
        self.results = results;
        self.status = RunStatus::Completed;
        self.stamp_completion();
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_running()?;
        self.error = Some(error.into());
        self.status = RunStatus::Failed;
        self.stamp_completion();
        Ok(())
    }

    pub fn score(&self) -> Option<u8> {
        self.summary.map(|s| s.score)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::rules::RuleKind;

    fn result(status: RuleStatus) -> RuleResult {
        RuleResult {
            rule_name: RuleKind::NullRate,
            status,
            column: None,
            metric: "m".into(),
            threshold: "t".into(),
            description: "d".into(),
            sample_rows: vec![],
        }
    }

    fn statuses(pass: usize, fail: usize, skip: usize) -> Vec<RuleResult> {
        let mut out = Vec::new();
        out.extend((0..pass).map(|_| result(RuleStatus::Pass)));
        out.extend((0..fail).map(|_| result(RuleStatus::Fail)));
        out.extend((0..skip).map(|_| result(RuleStatus::Skip)));
        out
    }

    fn dataset_ref() -> DatasetRef {
        DatasetRef {
            lineage: "orders".into(),
            source: "orders.csv".into(),
            columns: vec!["id".into()],
            row_count: 3,
        }
    }

    #[test]
    fn test_score_excludes_skipped() {
        let s = summarize(&statuses(6, 2, 2));
        assert_eq!(s.total_rules, 10);
        assert_eq!(s.passed + s.failed + s.skipped, 10);
        assert_eq!(s.score, 75);
    }

    #[test]
    fn test_score_rounds_half_up() {
        // 7 / 8 = 87.5
        assert_eq!(summarize(&statuses(7, 1, 2)).score, 88);
        // 1 / 3 = 33.3
        assert_eq!(summarize(&statuses(1, 2, 7)).score, 33);
    }

    #[test]
    fn test_all_skipped_scores_100() {
        let s = summarize(&statuses(0, 0, 10));
        assert_eq!(s.score, 100);
        assert_eq!(s.skipped, 10);
    }

    #[test]
    fn test_all_failed_scores_0() {
        assert_eq!(summarize(&statuses(0, 10, 0)).score, 0);
    }

    #[test]
    fn test_complete_freezes_run() {
        let mut run = Run::start(dataset_ref());
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.summary.is_none());

        run.complete(statuses(9, 1, 0)).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.score(), Some(90));
        assert!(run.completed_at.is_some());
        assert!(run.duration_ms.is_some());

        assert!(matches!(run.complete(vec![]), Err(DomainError::RunFinalized(_))));
        assert!(matches!(run.fail("late"), Err(DomainError::RunFinalized(_))));
        assert_eq!(run.results.len(), 10);
    }

    #[test]
    fn test_failed_run_keeps_error() {
        let mut run = Run::start(dataset_ref());
        run.fail("evaluation exceeded its 30s budget").unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.summary.is_none());
        assert_eq!(run.error.as_deref(), Some("evaluation exceeded its 30s budget"));
    }

    #[test]
    fn test_run_ids_are_unique_v7() {
        let a = Run::start(dataset_ref());
        let b = Run::start(dataset_ref());
        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.run_id.get_version_num(), 7);
    }
}
