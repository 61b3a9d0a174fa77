// sentinel/src/main.rs

mod cli;
mod commands;
mod table;

use clap::Parser;
use sentinel_core::SentinelError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::commands::EXIT_OK;

fn init_tracing() {
    // stdout carries reports and tables; logs go to stderr.
    // RUST_LOG=debug sentinel run data.csv
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn dispatch(command: Commands) -> anyhow::Result<i32> {
    match command {
        Commands::Run {
            inputs,
            project,
            lineage,
            check,
            format,
        } => commands::run::execute(inputs, project, lineage, check, format).await,

        Commands::Demo {
            project,
            output,
            check,
            format,
        } => commands::demo::execute(project, output, check, format).await,

        Commands::Report {
            run_id,
            project,
            print,
        } => commands::report::execute(run_id, project, print)
            .await
            .map(|_| EXIT_OK),

        Commands::History {
            project,
            limit,
            format,
        } => commands::history::execute(project, limit, format)
            .await
            .map(|_| EXIT_OK),

        Commands::Clean { project } => commands::clean::execute(project).map(|_| EXIT_OK),
    }
}

fn report_error(err: anyhow::Error) {
    let context = err.to_string();
    match err.downcast::<SentinelError>() {
        Ok(diagnostic) => {
            if context != diagnostic.to_string() {
                eprintln!("❌ {}", context);
            }
            eprintln!("{:?}", miette::Report::new(diagnostic));
        }
        Err(other) => eprintln!("❌ {:?}", other),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let code = match dispatch(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            report_error(err);
            1
        }
    };
    std::process::exit(code);
}
