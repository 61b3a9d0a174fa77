// sentinel-core/src/ports/renderer.rs

use crate::error::SentinelError;

/// Renders a named template against a JSON context.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, SentinelError>;
}
