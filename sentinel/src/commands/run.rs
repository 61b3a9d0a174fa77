// sentinel/src/commands/run.rs
//
// USE CASE: Evaluate CSV datasets.

use std::path::PathBuf;

use anyhow::{Context, bail};
use sentinel_core::application::pipeline::{RunRequest, run_batch};
use sentinel_core::infrastructure::ingest::{discover_csv_files, lineage_of, read_csv_path};
use tracing::info;

use crate::cli::{OutputFormat, ProjectArgs};
use crate::commands::{Engine, Workspace, exit_code, print_outcomes};

pub async fn execute(
    inputs: Vec<PathBuf>,
    project: ProjectArgs,
    lineage: Option<String>,
    check: bool,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    let workspace = Workspace::load(&project)?;
    let engine = Engine::build(&workspace)?;

    let files = discover_csv_files(&inputs).context("Failed to resolve inputs")?;
    if files.is_empty() {
        bail!("No CSV files found in {:?}", inputs);
    }
    if lineage.is_some() && files.len() > 1 {
        bail!("--lineage applies to a single dataset, got {} files", files.len());
    }
    info!(files = files.len(), project = %workspace.config.name, "Evaluating datasets");

    // Malformed inputs abort before any rule runs.
    let mut requests = Vec::with_capacity(files.len());
    for file in &files {
        let dataset = read_csv_path(file, &workspace.config.ingest)
            .with_context(|| format!("Failed to read dataset {}", file.display()))?;
        let lineage = lineage.clone().unwrap_or_else(|| lineage_of(file));
        requests.push(RunRequest::new(lineage, file.display().to_string(), dataset));
    }

    let ctx = engine.context(&workspace);
    let mut outcomes = Vec::with_capacity(requests.len());
    for (source, result) in run_batch(&ctx, requests).await {
        outcomes.push(result.with_context(|| format!("Run failed for {}", source))?);
    }

    print_outcomes(&outcomes, format)?;
    Ok(exit_code(&outcomes, check))
}
