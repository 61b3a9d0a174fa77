// sentinel/src/commands/clean.rs
//
// USE CASE: Remove reports and run history.

use sentinel_core::application::clean_project;

use crate::cli::ProjectArgs;
use crate::commands::Workspace;

pub fn execute(project: ProjectArgs) -> anyhow::Result<()> {
    let workspace = Workspace::load(&project)?;
    match clean_project(&workspace.project_dir, &workspace.config)? {
        Some(path) => println!("🗑️  Removed {}", path.display()),
        None => println!("✨ Nothing to clean"),
    }
    Ok(())
}
