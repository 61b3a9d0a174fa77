// sentinel-core/src/infrastructure/render/jinja.rs

// Templates are compiled into the binary so a report is renderable from any
// working directory. The `.html` suffix turns on minijinja's auto-escaping.

use minijinja::Environment;

use crate::application::report::HTML_TEMPLATE;
use crate::error::SentinelError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::TemplateEngine;

const REPORT_SOURCE: &str = include_str!("../../../templates/report.html");

pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    pub fn new() -> Result<Self, InfrastructureError> {
        let mut env = Environment::new();
        env.add_template(HTML_TEMPLATE, REPORT_SOURCE)?;
        Ok(Self { env })
    }
}

impl TemplateEngine for JinjaRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, SentinelError> {
        let tmpl = self
            .env
            .get_template(template)
            .map_err(InfrastructureError::TemplateError)?;
        tmpl.render(context)
            .map_err(|e| SentinelError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}
