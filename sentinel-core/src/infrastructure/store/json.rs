// sentinel-core/src/infrastructure/store/json.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::run::Run;
use crate::error::SentinelError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_json;
use crate::ports::RunHistory;

const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Default)]
struct RunLog {
    version: u32,
    runs: Vec<Run>,
}

/// Run history persisted as a single JSON document.
///
/// Writes go through a temp file and rename, so a crash never leaves a
/// half-written log. The mutex serializes read-modify-write cycles within
/// one process.
pub struct JsonRunStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonRunStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<RunLog, SentinelError> {
        if !self.path.exists() {
            return Ok(RunLog {
                version: STORE_VERSION,
                runs: Vec::new(),
            });
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(RunLog::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            InfrastructureError::StoreError(format!("{}: {}", self.path.display(), e)).into()
        })
    }

    fn save(&self, log: &RunLog) -> Result<(), SentinelError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        write_json(&self.path, log)?;
        Ok(())
    }
}

/// Newest first.
fn sort_newest_first(runs: &mut [Run]) {
    runs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.run_id.cmp(&a.run_id))
    });
}

#[async_trait]
impl RunHistory for JsonRunStore {
    #[instrument(skip(self, run), fields(run_id = %run.run_id, path = ?self.path))]
    async fn record(&self, run: &Run) -> Result<(), SentinelError> {
        let _guard = self.lock.lock().await;
        let mut log = self.load()?;
        log.version = STORE_VERSION;
        match log.runs.iter_mut().find(|r| r.run_id == run.run_id) {
            Some(existing) => *existing = run.clone(),
            None => log.runs.push(run.clone()),
        }
        self.save(&log)?;
        info!(stored = log.runs.len(), "Run recorded");
        Ok(())
    }

    async fn get(&self, run_id: Uuid) -> Result<Option<Run>, SentinelError> {
        let _guard = self.lock.lock().await;
        let log = self.load()?;
        Ok(log.runs.into_iter().find(|r| r.run_id == run_id))
    }

    async fn list(&self, limit: Option<usize>) -> Result<Vec<Run>, SentinelError> {
        let _guard = self.lock.lock().await;
        let mut runs = self.load()?.runs;
        sort_newest_first(&mut runs);
        if let Some(limit) = limit {
            runs.truncate(limit);
        }
        debug!(count = runs.len(), "Runs listed");
        Ok(runs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::run::{DatasetRef, RunStatus};
    use anyhow::Result;
    use chrono::Duration;
    use tempfile::tempdir;

    fn run(lineage: &str, rows: u64, minutes_ago: i64) -> Run {
        let mut run = Run::start(DatasetRef {
            lineage: lineage.into(),
            source: format!("{}.csv", lineage),
            columns: vec!["id".into()],
            row_count: rows,
        });
        run.created_at -= Duration::minutes(minutes_ago);
        run
    }

    #[tokio::test]
    async fn test_record_and_reload() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("runs.json");
        let store = JsonRunStore::new(&path);

        let mut first = run("orders", 100, 5);
        first.complete(vec![])?;
        store.record(&first).await?;

        let reopened = JsonRunStore::new(&path);
        let loaded = reopened.get(first.run_id).await?.unwrap();
        assert_eq!(loaded, first);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_replaces_same_id() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonRunStore::new(dir.path().join("runs.json"));

        let mut r = run("orders", 10, 0);
        store.record(&r).await?;
        r.fail("boom")?;
        store.record(&r).await?;

        let all = store.list(None).await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, RunStatus::Failed);
        Ok(())
    }

    #[tokio::test]
    async fn test_previous_row_count_uses_latest_completed_of_lineage() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonRunStore::new(dir.path().join("runs.json"));

        let mut old = run("orders", 80, 30);
        old.complete(vec![])?;
        let mut recent = run("orders", 100, 10);
        recent.complete(vec![])?;
        let mut failed = run("orders", 5, 1);
        failed.fail("timeout")?;
        let mut other = run("customers", 999, 0);
        other.complete(vec![])?;

        for r in [&old, &recent, &failed, &other] {
            store.record(r).await?;
        }

        assert_eq!(store.previous_row_count("orders").await?, Some(100));
        assert_eq!(store.previous_row_count("customers").await?, Some(999));
        assert_eq!(store.previous_row_count("unknown").await?, None);

        let listed = store.list(Some(2)).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].run_id, other.run_id);
        assert_eq!(listed[1].run_id, failed.run_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_log_is_a_store_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("runs.json");
        fs::write(&path, "{ not json")?;
        let err = JsonRunStore::new(&path).list(None).await.unwrap_err();
        assert!(matches!(
            err,
            SentinelError::Infrastructure(InfrastructureError::StoreError(_))
        ));
        Ok(())
    }
}
