// sentinel-core/src/infrastructure/store/memory.rs

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::run::Run;
use crate::error::SentinelError;
use crate::ports::RunHistory;

/// Process-local run history, used by tests and one-shot evaluations.
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: RwLock<Vec<Run>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runs(runs: Vec<Run>) -> Self {
        Self {
            runs: RwLock::new(runs),
        }
    }
}

#[async_trait]
impl RunHistory for InMemoryRunStore {
    async fn record(&self, run: &Run) -> Result<(), SentinelError> {
        let mut runs = self.runs.write().await;
        match runs.iter_mut().find(|r| r.run_id == run.run_id) {
            Some(existing) => *existing = run.clone(),
            None => runs.push(run.clone()),
        }
        Ok(())
    }

    async fn get(&self, run_id: Uuid) -> Result<Option<Run>, SentinelError> {
        Ok(self
            .runs
            .read()
            .await
            .iter()
            .find(|r| r.run_id == run_id)
            .cloned())
    }

    async fn list(&self, limit: Option<usize>) -> Result<Vec<Run>, SentinelError> {
        let mut runs = self.runs.read().await.clone();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.run_id.cmp(&a.run_id)));
        runs.truncate(limit.unwrap_or(runs.len()));
        Ok(runs)
    }
}
