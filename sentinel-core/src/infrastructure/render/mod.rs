// sentinel-core/src/infrastructure/render/mod.rs

pub mod jinja;

pub use jinja::JinjaRenderer;
