// sentinel/src/commands/demo.rs
//
// USE CASE: Generate the demo dataset and evaluate it.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use sentinel_core::application::demo::{DEMO_LINEAGE, demo_dataset};
use sentinel_core::application::pipeline::{RunRequest, run_dataset};
use sentinel_core::application::report::format_json;
use sentinel_core::infrastructure::ingest::write_csv_path;

use crate::cli::{OutputFormat, ProjectArgs};
use crate::commands::{Engine, Workspace, exit_code, print_outcomes};

pub async fn execute(
    project: ProjectArgs,
    output: Option<PathBuf>,
    check: bool,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    let workspace = Workspace::load(&project)?;
    let engine = Engine::build(&workspace)?;

    let csv_path = output
        .unwrap_or_else(|| workspace.target_dir.join(format!("{}.csv", DEMO_LINEAGE)));
    if let Some(parent) = csv_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let dataset = demo_dataset()?;
    write_csv_path(&csv_path, &dataset, &workspace.config.ingest)
        .with_context(|| format!("Failed to write demo CSV to {}", csv_path.display()))?;
    if format == OutputFormat::Table {
        println!("🧪 Demo dataset written to {}", csv_path.display());
    }

    let ctx = engine.context(&workspace);
    let request = RunRequest::new(DEMO_LINEAGE, csv_path.display().to_string(), dataset);
    let outcome = run_dataset(&ctx, request).await?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&outcome.run)?),
        OutputFormat::Table => print_outcomes(std::slice::from_ref(&outcome), format)?,
    }
    Ok(exit_code(std::slice::from_ref(&outcome), check))
}
