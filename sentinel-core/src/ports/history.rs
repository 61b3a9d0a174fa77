// sentinel-core/src/ports/history.rs

// Run history is what the row-count comparison reads before evaluation starts
// and where finished runs land afterwards. The engine itself never touches it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::run::{Run, RunStatus};
use crate::error::SentinelError;

#[async_trait]
pub trait RunHistory: Send + Sync {
    /// Inserts or replaces the run with the same id.
    async fn record(&self, run: &Run) -> Result<(), SentinelError>;

    async fn get(&self, run_id: Uuid) -> Result<Option<Run>, SentinelError>;

    /// Stored runs, newest first.
    async fn list(&self, limit: Option<usize>) -> Result<Vec<Run>, SentinelError>;

    /// Most recent completed run of a lineage.
    async fn latest_completed(&self, lineage: &str) -> Result<Option<Run>, SentinelError> {
        let runs = self.list(None).await?;
        Ok(runs
            .into_iter()
            .find(|r| r.status == RunStatus::Completed && r.dataset.lineage == lineage))
    }

    /// Row count of the most recent completed run of a lineage.
    async fn previous_row_count(&self, lineage: &str) -> Result<Option<u64>, SentinelError> {
        Ok(self
            .latest_completed(lineage)
            .await?
            .map(|run| run.dataset.row_count))
    }
}
