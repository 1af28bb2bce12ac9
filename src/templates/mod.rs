//! Template engine
//!
//! HTML pages are rendered with Tera. The template sources live in the
//! crate's `templates/` directory and are embedded into the binary, so the
//! server needs no files at runtime.

use rust_embed::RustEmbed;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::TemplateError;

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct EmbeddedTemplates;

/// Renders named templates with a Tera context
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load every embedded template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Load` if a template fails to parse or extends
    /// a template that does not exist.
    pub fn new() -> Result<Self, TemplateError> {
        let mut sources = Vec::new();
        for name in EmbeddedTemplates::iter() {
            let file = EmbeddedTemplates::get(&name)
                .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
            let content = std::str::from_utf8(&file.data)
                .map_err(|e| TemplateError::Load(format!("{} is not UTF-8: {}", name, e)))?
                .to_string();
            sources.push((name.replace('\\', "/"), content));
        }

        let engine = Self::from_sources(sources)?;
        tracing::debug!(count = engine.template_names().len(), "Templates loaded");
        Ok(engine)
    }

    /// Build an engine from `(name, source)` pairs
    pub fn from_sources<I, N, S>(sources: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let sources: Vec<(String, String)> = sources
            .into_iter()
            .map(|(n, s)| (n.as_ref().to_string(), s.as_ref().to_string()))
            .collect();

        let mut tera = Tera::default();
        // Added as one batch so parents and children may come in any order
        tera.add_raw_templates(sources)
            .map_err(|e| TemplateError::Load(error_chain(&e)))?;

        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, TemplateError> {
        if !self.has_template(template) {
            return Err(TemplateError::NotFound(template.to_string()));
        }

        self.tera.render(template, context).map_err(|e| {
            TemplateError::Render(format!("Failed to render '{}': {}", template, error_chain(&e)))
        })
    }

    /// Render a template from any serializable value that maps to an object
    pub fn render_value(
        &self,
        template: &str,
        value: &serde_json::Value,
    ) -> Result<String, TemplateError> {
        let context = TeraContext::from_value(value.clone())
            .map_err(|e| TemplateError::Context(e.to_string()))?;
        self.render(template, &context)
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Names of all loaded templates
    pub fn template_names(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

/// Flatten a Tera error and its causes into one message
fn error_chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}
