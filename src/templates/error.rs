//! Template engine error types

use thiserror::Error;

/// Template loading and rendering errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template registered under this name
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Template source failed to parse or inherit
    #[error("Failed to load templates: {0}")]
    Load(String),

    /// Rendering failed
    #[error("Template error: {0}")]
    Render(String),

    /// Page context could not be turned into template variables
    #[error("Invalid template context: {0}")]
    Context(String),
}
