// sentinel-core/src/application/mod.rs

pub mod clean;
pub mod demo;
pub mod engine;
pub mod pipeline;
pub mod report;

// --- RE-EXPORTS ---
// `use sentinel_core::application::{RuleRunner, run_dataset, clean_project};`

pub use clean::clean_project;
pub use demo::demo_dataset;
pub use engine::RuleRunner;
pub use pipeline::{PipelineContext, RunOutcome, RunRequest, run_batch, run_dataset};
pub use report::{ReportPaths, format_html, format_json, parse_json, write_reports};
