// sentinel-core/src/infrastructure/config/mod.rs

pub mod project;

pub use project::{apply_env_overrides, load_project_config};
