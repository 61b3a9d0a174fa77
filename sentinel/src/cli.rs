// sentinel/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "Data-quality rules engine for CSV datasets", long_about = None)]
#[command(version)]
#[command(after_help = "Exit codes: 0 success, 1 error, 2 run failed (timeout), 3 rule failures with --check")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project directory (holds sentinel.yaml and the target folder)
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Explicit configuration file, relative to the project directory
    #[arg(long, short, env = "SENTINEL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Html,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Evaluates CSV files (or directories of CSV files) against the rule battery
    Run {
        /// CSV files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        project: ProjectArgs,

        /// Lineage used for row-count comparison (default: file stem). Single input only.
        #[arg(long)]
        lineage: Option<String>,

        /// Exit with code 3 when any rule fails
        #[arg(long)]
        check: bool,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// 🧪 Writes the demo dataset as CSV and evaluates it
    Demo {
        #[command(flatten)]
        project: ProjectArgs,

        /// Where to write the CSV (default: <target>/demo_orders.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Exit with code 3 when any rule fails
        #[arg(long)]
        check: bool,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// 📄 Regenerates the reports of a stored run
    Report {
        run_id: String,

        #[command(flatten)]
        project: ProjectArgs,

        /// Print one format to stdout instead of writing files
        #[arg(long, value_enum)]
        print: Option<ReportFormat>,
    },

    /// 📚 Lists stored runs, newest first
    History {
        #[command(flatten)]
        project: ProjectArgs,

        #[arg(long, default_value = "20")]
        limit: usize,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// 🧹 Removes the target folder (reports and run history)
    Clean {
        #[command(flatten)]
        project: ProjectArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::try_parse_from(["sentinel", "run", "orders.csv"])?;
        match args.command {
            Commands::Run {
                inputs,
                project,
                lineage,
                check,
                format,
            } => {
                assert_eq!(inputs, vec![PathBuf::from("orders.csv")]);
                assert_eq!(project.project_dir.to_string_lossy(), ".");
                assert_eq!(lineage, None);
                assert!(!check);
                assert_eq!(format, OutputFormat::Table);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_options() -> Result<()> {
        let args = Cli::try_parse_from([
            "sentinel",
            "run",
            "a.csv",
            "data/",
            "--lineage",
            "orders",
            "--check",
            "--format",
            "json",
            "--project-dir",
            "/tmp",
        ])?;
        match args.command {
            Commands::Run {
                inputs,
                project,
                lineage,
                check,
                format,
            } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(project.project_dir.to_string_lossy(), "/tmp");
                assert_eq!(lineage.as_deref(), Some("orders"));
                assert!(check);
                assert_eq!(format, OutputFormat::Json);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_run_requires_input() {
        assert!(Cli::try_parse_from(["sentinel", "run"]).is_err());
    }

    #[test]
    fn test_cli_parse_report_print() -> Result<()> {
        let args = Cli::try_parse_from(["sentinel", "report", "0192", "--print", "html"])?;
        match args.command {
            Commands::Report { run_id, print, .. } => {
                assert_eq!(run_id, "0192");
                assert_eq!(print, Some(ReportFormat::Html));
                Ok(())
            }
            _ => bail!("Expected Report command"),
        }
    }

    #[test]
    fn test_cli_parse_history_limit() -> Result<()> {
        let args = Cli::try_parse_from(["sentinel", "history", "--limit", "5"])?;
        match args.command {
            Commands::History { limit, format, .. } => {
                assert_eq!(limit, 5);
                assert_eq!(format, OutputFormat::Table);
                Ok(())
            }
            _ => bail!("Expected History command"),
        }
    }
}
