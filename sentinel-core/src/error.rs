// sentinel-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum SentinelError {
    // --- DOMAIN ERRORS (input, configuration, run lifecycle) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, storage) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- APPLICATION ERRORS ---
    #[error("Evaluation exceeded its {0}s budget")]
    #[diagnostic(
        code(sentinel::timeout),
        help("Raise `timeout-secs` in sentinel.yaml or SENTINEL_TIMEOUT_SECS.")
    )]
    Timeout(u64),

    #[error("Run '{0}' not found in history")]
    #[diagnostic(code(sentinel::run_not_found))]
    RunNotFound(String),

    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

impl SentinelError {
    /// True for malformed datasets, which abort a run before any rule executes.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_input_error())
    }
}

impl From<std::io::Error> for SentinelError {
    fn from(err: std::io::Error) -> Self {
        SentinelError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<csv::Error> for SentinelError {
    fn from(err: csv::Error) -> Self {
        SentinelError::Infrastructure(InfrastructureError::Csv(err))
    }
}

impl From<serde_json::Error> for SentinelError {
    fn from(err: serde_json::Error) -> Self {
        SentinelError::Infrastructure(InfrastructureError::Json(err))
    }
}
