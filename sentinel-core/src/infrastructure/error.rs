// sentinel-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(sentinel::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- INGESTION ---
    #[error("CSV Parsing Error: {0}")]
    #[diagnostic(
        code(sentinel::infra::csv),
        help("Check the delimiter, quoting and that the file is UTF-8 encoded.")
    )]
    Csv(#[from] csv::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(sentinel::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(sentinel::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(sentinel::infra::config_missing))]
    ConfigNotFound(String),

    // --- RUN HISTORY ---
    #[error("JSON Error: {0}")]
    #[diagnostic(code(sentinel::infra::json))]
    Json(#[from] serde_json::Error),

    #[error("Run history store is corrupted: {0}")]
    #[diagnostic(
        code(sentinel::infra::store),
        help("Move the history file aside; a fresh one is created on the next run.")
    )]
    StoreError(String),

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(
        code(sentinel::infra::template),
        help("The built-in report template failed to render; this is a bug.")
    )]
    TemplateError(#[from] minijinja::Error),
}
