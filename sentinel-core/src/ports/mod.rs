// sentinel-core/src/ports/mod.rs

pub mod history;
pub mod renderer;

pub use history::RunHistory;
pub use renderer::TemplateEngine;
