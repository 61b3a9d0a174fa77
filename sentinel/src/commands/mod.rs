// sentinel/src/commands/mod.rs

pub mod clean;
pub mod demo;
pub mod history;
pub mod report;
pub mod run;

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

use sentinel_core::application::pipeline::{PipelineContext, RunOutcome};
use sentinel_core::application::RuleRunner;
use sentinel_core::domain::project::ProjectConfig;
use sentinel_core::domain::rules::RuleStatus;
use sentinel_core::domain::run::RunStatus;
use sentinel_core::infrastructure::config::load_project_config;
use sentinel_core::infrastructure::render::JinjaRenderer;
use sentinel_core::infrastructure::store::JsonRunStore;

use crate::cli::{OutputFormat, ProjectArgs};
use crate::table;

pub const EXIT_OK: i32 = 0;
pub const EXIT_RUN_FAILED: i32 = 2;
pub const EXIT_CHECK_FAILED: i32 = 3;

/// A loaded project: configuration plus the paths derived from it.
pub struct Workspace {
    pub project_dir: PathBuf,
    pub config: ProjectConfig,
    pub target_dir: PathBuf,
}

impl Workspace {
    pub fn load(args: &ProjectArgs) -> anyhow::Result<Self> {
        let config = load_project_config(&args.project_dir, args.config.as_deref())
            .with_context(|| {
                format!(
                    "Failed to load project configuration from {:?}",
                    args.project_dir
                )
            })?;
        let target_dir = args.project_dir.join(&config.target_path);
        Ok(Self {
            project_dir: args.project_dir.clone(),
            config,
            target_dir,
        })
    }

    pub fn history(&self) -> JsonRunStore {
        JsonRunStore::new(self.target_dir.join(&self.config.history_file))
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.target_dir.join("reports")
    }
}

/// Shared state of a run/demo invocation.
pub struct Engine {
    pub runner: Arc<RuleRunner>,
    pub history: JsonRunStore,
    pub renderer: JinjaRenderer,
    pub reports_dir: PathBuf,
}

impl Engine {
    pub fn build(workspace: &Workspace) -> anyhow::Result<Self> {
        let runner = RuleRunner::new(&workspace.config.rules)
            .context("Invalid rule configuration in sentinel.yaml")?;
        Ok(Self {
            runner: Arc::new(runner),
            history: workspace.history(),
            renderer: JinjaRenderer::new()?,
            reports_dir: workspace.reports_dir(),
        })
    }

    pub fn context<'a>(&'a self, workspace: &Workspace) -> PipelineContext<'a> {
        PipelineContext {
            runner: Arc::clone(&self.runner),
            history: &self.history,
            renderer: &self.renderer,
            reports_dir: &self.reports_dir,
            timeout_secs: workspace.config.timeout_secs,
            concurrency: workspace.config.concurrency,
        }
    }
}

/// Prints finished runs and derives the exit code.
pub fn print_outcomes(outcomes: &[RunOutcome], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let runs: Vec<_> = outcomes.iter().map(|o| &o.run).collect();
            println!("{}", serde_json::to_string_pretty(&runs)?);
        }
        OutputFormat::Table => {
            for outcome in outcomes {
                table::print_run(&outcome.run);
                println!("   📄 {}", outcome.reports.json.display());
                println!("   🌐 {}", outcome.reports.html.display());
            }
        }
    }
    Ok(())
}

pub fn exit_code(outcomes: &[RunOutcome], check: bool) -> i32 {
    let run_failed = outcomes.iter().any(|o| o.run.status == RunStatus::Failed);
    let rule_failed = outcomes
        .iter()
        .flat_map(|o| &o.run.results)
        .any(|r| r.status == RuleStatus::Fail);

    if run_failed {
        EXIT_RUN_FAILED
    } else if check && rule_failed {
        EXIT_CHECK_FAILED
    } else {
        EXIT_OK
    }
}
