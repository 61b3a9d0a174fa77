pub mod config;
pub mod dataset;
pub mod error;
pub mod project;
pub mod rules;
pub mod run;

pub use dataset::Dataset;
pub use error::DomainError;
pub use run::{Run, RunStatus, RunSummary, summarize};
