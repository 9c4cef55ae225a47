//! Natural-language to script generation.
//!
//! A description flows through three stages: the [`analysis::Analyzer`]
//! classifies it, the [`template::TemplateEngine`] renders a Python or Bash
//! script from the best matching template, and the [`validation::Validator`]
//! checks the result. [`generator::ScriptGenerator`] wires them together.

pub mod analysis;
pub mod config;
pub mod error;
pub mod generator;
pub mod health;
pub mod integrations;
pub mod logging;
pub mod model;
pub mod template;
pub mod validation;

pub use config::{CliArgs, GeneratorConfig};
pub use error::{ErrorCategory, GeneratorError, Result};
pub use generator::ScriptGenerator;
pub use health::{ComponentHealth, HealthReport, HealthStatus};
pub use logging::{LoggingConfig, init_logging};
pub use model::{
    Analysis, BatchReport, GenerationRequest, GenerationResult, IntegrationKind, Language,
    LanguagePreference, ValidationResult,
};
