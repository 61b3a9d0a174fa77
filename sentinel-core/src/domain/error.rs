// sentinel-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    // --- INPUT ERRORS (dataset rejected before any rule runs) ---
    #[error("Dataset has no columns")]
    #[diagnostic(
        code(sentinel::domain::input::no_columns),
        help("The input must start with a header row naming at least one column.")
    )]
    NoColumns,

    #[error("Duplicate column name '{0}' in header")]
    #[diagnostic(
        code(sentinel::domain::input::duplicate_column),
        help("Column names are matched exactly; rename one of the columns.")
    )]
    DuplicateColumn(String),

    #[error("Row {row} has {found} cells but the header declares {expected} columns")]
    #[diagnostic(code(sentinel::domain::input::ragged_row))]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    // --- CONFIGURATION ERRORS (raised at load time) ---
    #[error("Invalid rule configuration: {0}")]
    #[diagnostic(
        code(sentinel::domain::config),
        help("Check the `rules` section of sentinel.yaml (thresholds are fractions between 0 and 1).")
    )]
    InvalidConfiguration(String),

    #[error("Invalid pattern for rule '{rule}': {reason}")]
    #[diagnostic(code(sentinel::domain::config::pattern))]
    InvalidPattern { rule: String, reason: String },

    // --- RUN LIFECYCLE ---
    #[error("Run {0} is already finalized and cannot change state")]
    #[diagnostic(code(sentinel::domain::run_finalized))]
    RunFinalized(String),
}

impl DomainError {
    /// Input errors abort a run before any rule executes.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoColumns | Self::DuplicateColumn(_) | Self::RaggedRow { .. }
        )
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::InvalidPattern { .. }
        )
    }
}
