// sentinel/src/commands/report.rs
//
// USE CASE: Re-render the reports of a stored run.

use anyhow::Context;
use sentinel_core::SentinelError;
use sentinel_core::application::report::{format_html, format_json, write_reports};
use sentinel_core::infrastructure::render::JinjaRenderer;
use sentinel_core::ports::RunHistory;
use uuid::Uuid;

use crate::cli::{ProjectArgs, ReportFormat};
use crate::commands::Workspace;

pub async fn execute(
    run_id: String,
    project: ProjectArgs,
    print: Option<ReportFormat>,
) -> anyhow::Result<()> {
    let id = Uuid::parse_str(run_id.trim())
        .with_context(|| format!("'{}' is not a valid run id", run_id))?;

    let workspace = Workspace::load(&project)?;
    let run = workspace
        .history()
        .get(id)
        .await?
        .ok_or_else(|| SentinelError::RunNotFound(run_id.clone()))?;
    let renderer = JinjaRenderer::new()?;

    match print {
        Some(ReportFormat::Json) => println!("{}", format_json(&run)?),
        Some(ReportFormat::Html) => println!("{}", format_html(&run, &renderer)?),
        None => {
            let paths = write_reports(&run, &renderer, &workspace.reports_dir())?;
            println!("📄 {}", paths.json.display());
            println!("🌐 {}", paths.html.display());
        }
    }
    Ok(())
}
