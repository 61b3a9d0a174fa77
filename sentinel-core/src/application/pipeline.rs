// sentinel-core/src/application/pipeline.rs

use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::application::engine::RuleRunner;
use crate::application::report::{ReportPaths, write_reports};
use crate::domain::dataset::Dataset;
use crate::domain::rules::RuleResult;
use crate::domain::run::{DatasetRef, Run};
use crate::error::SentinelError;
use crate::ports::{RunHistory, TemplateEngine};

/// One dataset snapshot to evaluate.
pub struct RunRequest {
    /// Identity shared by successive snapshots of the same data.
    pub lineage: String,
    pub source: String,
    pub dataset: Dataset,
}

impl RunRequest {
    pub fn new(lineage: impl Into<String>, source: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            lineage: lineage.into(),
            source: source.into(),
            dataset,
        }
    }
}

/// Collaborators shared by every run of one invocation.
pub struct PipelineContext<'a> {
    pub runner: Arc<RuleRunner>,
    pub history: &'a dyn RunHistory,
    pub renderer: &'a dyn TemplateEngine,
    pub reports_dir: &'a Path,
    /// Wall-clock budget per evaluation.
    pub timeout_secs: Option<u64>,
    /// Datasets evaluated at once by `run_batch`.
    pub concurrency: usize,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub run: Run,
    pub reports: ReportPaths,
}

/// History lookup, evaluation, persistence and export for one dataset.
///
/// A run that exceeds its budget is recorded as `failed` and still exported;
/// only history or report I/O errors are returned as `Err`.
#[instrument(skip_all, fields(lineage = %request.lineage, source = %request.source))]
pub async fn run_dataset(
    ctx: &PipelineContext<'_>,
    request: RunRequest,
) -> Result<RunOutcome, SentinelError> {
    let RunRequest {
        lineage,
        source,
        dataset,
    } = request;

    let previous_row_count = ctx.history.previous_row_count(&lineage).await?;

    let mut run = Run::start(DatasetRef::describe(lineage, source, &dataset));
    ctx.history.record(&run).await?;
    info!(
        run_id = %run.run_id,
        rows = run.dataset.row_count,
        previous = ?previous_row_count,
        "Run started"
    );

    match evaluate(ctx, dataset, previous_row_count).await {
        Ok(results) => run.complete(results)?,
        Err(err) => {
            warn!(run_id = %run.run_id, error = %err, "Evaluation aborted");
            run.fail(err.to_string())?;
        }
    }
    ctx.history.record(&run).await?;

    let reports = write_reports(&run, ctx.renderer, ctx.reports_dir)?;
    info!(
        run_id = %run.run_id,
        status = %run.status,
        score = ?run.score(),
        duration_ms = ?run.duration_ms,
        "Run finished"
    );
    Ok(RunOutcome { run, reports })
}

// The engine is synchronous, so it runs on the blocking pool. On timeout the
// worker is left to finish and its results are dropped.
async fn evaluate(
    ctx: &PipelineContext<'_>,
    dataset: Dataset,
    previous_row_count: Option<u64>,
) -> Result<Vec<RuleResult>, SentinelError> {
    let runner = Arc::clone(&ctx.runner);
    let task = tokio::task::spawn_blocking(move || runner.evaluate(&dataset, previous_row_count));

    let joined = match ctx.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), task)
            .await
            .map_err(|_| SentinelError::Timeout(secs))?,
        None => task.await,
    };
    joined.map_err(|e| SentinelError::InternalError(format!("Evaluation task failed: {}", e)))
}

/// Evaluates several datasets with bounded parallelism.
///
/// Results come back in request order, each paired with its source. One
/// dataset failing does not stop the others.
#[instrument(skip_all, fields(datasets = requests.len(), concurrency = ctx.concurrency))]
pub async fn run_batch(
    ctx: &PipelineContext<'_>,
    requests: Vec<RunRequest>,
) -> Vec<(String, Result<RunOutcome, SentinelError>)> {
    let futures = requests.into_iter().enumerate().map(move |(idx, request)| {
        let source = request.source.clone();
        async move { (idx, source, run_dataset(ctx, request).await) }
    });

    let mut finished: Vec<_> = futures::stream::iter(futures)
        .buffer_unordered(ctx.concurrency.max(1))
        .collect()
        .await;
    finished.sort_by_key(|(idx, _, _)| *idx);

    let failures = finished.iter().filter(|(_, _, res)| res.is_err()).count();
    info!(failures, "Batch finished");

    finished
        .into_iter()
        .map(|(_, source, res)| (source, res))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::config::RulesConfig;
    use crate::domain::rules::{
        EvaluationContext, Rule, RuleExecutionError, RuleKind, RuleStatus,
    };
    use crate::domain::run::RunStatus;
    use crate::infrastructure::render::JinjaRenderer;
    use crate::infrastructure::store::InMemoryRunStore;
    use anyhow::Result;
    use tempfile::tempdir;

    struct Slow;

    impl Rule for Slow {
        fn kind(&self) -> RuleKind {
            RuleKind::NullRate
        }

        fn evaluate(
            &self,
            _dataset: &Dataset,
            _ctx: &EvaluationContext,
        ) -> Result<RuleResult, RuleExecutionError> {
            std::thread::sleep(Duration::from_millis(1500));
            Ok(RuleResult::skipped(RuleKind::NullRate, "n/a", "slept"))
        }
    }

    fn orders(rows: usize) -> Result<Dataset> {
        let rows = (1..=rows)
            .map(|i| vec![Some(i.to_string()), Some("shipped".to_string())])
            .collect();
        Ok(Dataset::new(vec!["order_id".into(), "status".into()], rows)?)
    }

    fn context<'a>(
        runner: RuleRunner,
        history: &'a InMemoryRunStore,
        renderer: &'a JinjaRenderer,
        dir: &'a Path,
        timeout_secs: Option<u64>,
    ) -> PipelineContext<'a> {
        PipelineContext {
            runner: Arc::new(runner),
            history,
            renderer,
            reports_dir: dir,
            timeout_secs,
            concurrency: 2,
        }
    }

    #[tokio::test]
    async fn test_second_run_compares_row_counts() -> Result<()> {
        let dir = tempdir()?;
        let history = InMemoryRunStore::new();
        let renderer = JinjaRenderer::new()?;
        let ctx = context(
            RuleRunner::new(&RulesConfig::default())?,
            &history,
            &renderer,
            dir.path(),
            None,
        );

        let first = run_dataset(&ctx, RunRequest::new("orders", "orders.csv", orders(100)?)).await?;
        assert_eq!(first.run.status, RunStatus::Completed);
        assert_eq!(first.run.results.len(), 10);
        assert_eq!(first.run.results[8].status, RuleStatus::Skip);
        assert!(first.reports.json.exists());
        assert!(first.reports.html.exists());

        let second = run_dataset(&ctx, RunRequest::new("orders", "orders.csv", orders(145)?)).await?;
        assert_eq!(second.run.results[8].rule_name, RuleKind::RowCountAnomaly);
        assert_eq!(second.run.results[8].status, RuleStatus::Fail);
        assert_eq!(second.run.results[8].metric, "45.0% change");

        assert_eq!(history.list(None).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_timeout_records_a_failed_run() -> Result<()> {
        let dir = tempdir()?;
        let history = InMemoryRunStore::new();
        let renderer = JinjaRenderer::new()?;
        let ctx = context(
            RuleRunner::with_rules(vec![Box::new(Slow)]),
            &history,
            &renderer,
            dir.path(),
            Some(1),
        );

        let outcome = run_dataset(&ctx, RunRequest::new("orders", "orders.csv", orders(3)?)).await?;
        assert_eq!(outcome.run.status, RunStatus::Failed);
        assert!(outcome.run.results.is_empty());
        assert!(outcome.run.error.as_deref().unwrap().contains("1s budget"));

        let stored = history.get(outcome.run.run_id).await?.unwrap();
        assert_eq!(stored.status, RunStatus::Failed);
        // failed runs do not feed the row-count comparison
        assert_eq!(history.previous_row_count("orders").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_preserves_request_order() -> Result<()> {
        let dir = tempdir()?;
        let history = InMemoryRunStore::new();
        let renderer = JinjaRenderer::new()?;
        let ctx = context(
            RuleRunner::new(&RulesConfig::default())?,
            &history,
            &renderer,
            dir.path(),
            None,
        );

        let requests = vec![
            RunRequest::new("a", "a.csv", orders(5)?),
            RunRequest::new("b", "b.csv", orders(50)?),
            RunRequest::new("c", "c.csv", orders(1)?),
        ];
        let results = run_batch(&ctx, requests).await;

        let sources: Vec<&str> = results.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(sources, ["a.csv", "b.csv", "c.csv"]);
        for (_, res) in &results {
            assert_eq!(res.as_ref().unwrap().run.status, RunStatus::Completed);
        }
        assert_eq!(history.list(None).await?.len(), 3);
        Ok(())
    }
}
