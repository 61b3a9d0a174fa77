// sentinel-core/src/application/report.rs

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::rules::RuleResult;
use crate::domain::run::Run;
use crate::error::SentinelError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::TemplateEngine;

pub const HTML_TEMPLATE: &str = "report.html";

// --- VIEW MODEL ---
// Presentation only: labels for the template, no new figures.

#[derive(Serialize)]
struct ReportView<'a> {
    run: &'a Run,
    rules: Vec<RuleView<'a>>,
}

#[derive(Serialize)]
struct RuleView<'a> {
    title: &'static str,
    #[serde(flatten)]
    result: &'a RuleResult,
    sample_columns: Vec<&'a str>,
}

impl<'a> ReportView<'a> {
    fn new(run: &'a Run) -> Self {
        let rules = run
            .results
            .iter()
            .map(|result| RuleView {
                title: result.rule_name.title(),
                // dataset column order, not the map's alphabetical order
                sample_columns: result
                    .sample_rows
                    .first()
                    .map(|row| {
                        run.dataset
                            .columns
                            .iter()
                            .filter(|c| row.contains_key(c.as_str()))
                            .map(String::as_str)
                            .collect()
                    })
                    .unwrap_or_default(),
                result,
            })
            .collect();
        Self { run, rules }
    }
}

// --- FORMATTERS ---

/// Structured export: the run serialized field for field.
pub fn format_json(run: &Run) -> Result<String, SentinelError> {
    Ok(serde_json::to_string_pretty(run)?)
}

/// Reads back a structured export.
pub fn parse_json(content: &str) -> Result<Run, SentinelError> {
    Ok(serde_json::from_str(content)?)
}

/// Rendered export: a self-contained HTML document built from the run alone.
pub fn format_html(run: &Run, engine: &dyn TemplateEngine) -> Result<String, SentinelError> {
    let context = serde_json::to_value(ReportView::new(run))?;
    engine.render(HTML_TEMPLATE, &context)
}

/// Where a pair of reports landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Writes `<run_id>.json` and `<run_id>.html` under `dir`.
#[instrument(skip(run, engine), fields(run_id = %run.run_id))]
pub fn write_reports(
    run: &Run,
    engine: &dyn TemplateEngine,
    dir: &Path,
) -> Result<ReportPaths, SentinelError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let paths = ReportPaths {
        json: dir.join(format!("{}.json", run.run_id)),
        html: dir.join(format!("{}.html", run.run_id)),
    };

    atomic_write(&paths.json, format_json(run)?)?;
    atomic_write(&paths.html, format_html(run, engine)?)?;

    info!(json = ?paths.json, html = ?paths.html, "Reports written");
    Ok(paths)
}
