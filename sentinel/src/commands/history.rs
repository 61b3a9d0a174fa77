// sentinel/src/commands/history.rs
//
// USE CASE: List stored runs.

use sentinel_core::ports::RunHistory;

use crate::cli::{OutputFormat, ProjectArgs};
use crate::commands::Workspace;
use crate::table;

pub async fn execute(project: ProjectArgs, limit: usize, format: OutputFormat) -> anyhow::Result<()> {
    let workspace = Workspace::load(&project)?;
    let runs = workspace.history().list(Some(limit)).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&runs)?),
        OutputFormat::Table if runs.is_empty() => {
            println!("No runs recorded yet. Try 'sentinel demo'.");
        }
        OutputFormat::Table => println!("{}", table::history_table(&runs)),
    }
    Ok(())
}
