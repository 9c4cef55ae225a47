//! Error taxonomy for the generation pipeline.
//!
//! Library code returns [`GeneratorError`]; the binary and configuration
//! loading work in `anyhow::Result` and attach context there. Security and
//! style findings are never errors, they travel as warnings and suggestions on
//! the generation result.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::model::Language;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

// =============================================================================
// ERROR CATEGORIES
// =============================================================================

/// Coarse grouping used in logs and failure summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Input,
    Analysis,
    Template,
    Validation,
    Io,
    Config,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Analysis => "analysis",
            ErrorCategory::Template => "template",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Io => "io",
            ErrorCategory::Config => "config",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GENERATOR ERROR
// =============================================================================

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The request itself is unusable (empty description, bad override).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("analysis failed: {0}")]
    Analysis(String),

    /// Neither the mapped category nor the basic fallback exists.
    #[error("no template for {language} in category '{category}' and no basic fallback")]
    TemplateMissing { language: Language, category: String },

    #[error("template '{name}' is missing required variables: {}", .missing.join(", "))]
    MissingVariables { name: String, missing: Vec<String> },

    #[error("failed to render template '{name}': {detail}")]
    TemplateRender { name: String, detail: String },

    #[error("failed to register template '{name}': {detail}")]
    TemplateRegistration { name: String, detail: String },

    #[error("failed to load template definition {}: {detail}", .path.display())]
    TemplateLoad { path: PathBuf, detail: String },

    #[error("template catalog is unusable: {0}")]
    CatalogInvariant(String),

    /// Internal failure while preparing a syntax check.
    #[error("validation could not run: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GeneratorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GeneratorError::InvalidRequest(_) => ErrorCategory::Input,
            GeneratorError::Analysis(_) => ErrorCategory::Analysis,
            GeneratorError::TemplateMissing { .. }
            | GeneratorError::MissingVariables { .. }
            | GeneratorError::TemplateRender { .. }
            | GeneratorError::TemplateRegistration { .. }
            | GeneratorError::TemplateLoad { .. }
            | GeneratorError::CatalogInvariant(_) => ErrorCategory::Template,
            GeneratorError::Validation(_) => ErrorCategory::Validation,
            GeneratorError::Config(_) => ErrorCategory::Config,
            GeneratorError::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether running the same request again could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeneratorError::Validation(_) | GeneratorError::Io(_)
        )
    }

    /// A remediation hint surfaced next to the failure message.
    pub fn suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Provide a non-empty description of what the script should do",
            ErrorCategory::Template => {
                "Check template overrides and any external template definitions"
            }
            ErrorCategory::Config => "Fix the configuration file or command-line options",
            _ => "Try rephrasing your description or specifying the language explicitly",
        }
    }
}

/// Flattens a Tera error and its causes into one line.
pub(crate) fn tera_detail(error: &tera::Error) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
