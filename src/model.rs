//! Records exchanged between the analyzer, template engine, validator and
//! callers. Everything serializes with camelCase field names.

use clap::ValueEnum;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// =============================================================================
// LANGUAGES
// =============================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    Python,
    Bash,
}

impl Language {
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Bash => "sh",
        }
    }

    /// Human-facing name used in diagnostics ("Python syntax error: ...").
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Bash => "Bash",
        }
    }
}

/// Language requested by a caller. `Auto` defers to the analyzer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LanguagePreference {
    Python,
    Bash,
    #[default]
    Auto,
}

impl LanguagePreference {
    pub fn explicit(&self) -> Option<Language> {
        match self {
            LanguagePreference::Python => Some(Language::Python),
            LanguagePreference::Bash => Some(Language::Bash),
            LanguagePreference::Auto => None,
        }
    }
}

impl From<Language> for LanguagePreference {
    fn from(language: Language) -> Self {
        match language {
            Language::Python => LanguagePreference::Python,
            Language::Bash => LanguagePreference::Bash,
        }
    }
}

// =============================================================================
// INTENT
// =============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntentCategory {
    NemoIntegration,
    KdeConnect,
    WebAutomation,
    SystemAdministration,
    GuiApplication,
    FileProcessing,
    DataProcessing,
    GeneralScripting,
}

impl IntentCategory {
    /// Desktop integrations earn a complexity bonus and lean towards Bash.
    pub fn is_integration(&self) -> bool {
        matches!(
            self,
            IntentCategory::NemoIntegration | IntentCategory::KdeConnect
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SecondaryIntent {
    ErrorHandling,
    Logging,
    Testing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub primary: IntentCategory,
    pub secondary: Vec<SecondaryIntent>,
    pub actions: IndexSet<String>,
    pub objects: IndexSet<String>,
}

// =============================================================================
// ENTITIES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EntityLabel {
    File,
    Url,
    Command,
    Path,
}

impl EntityLabel {
    pub fn confidence(&self) -> f64 {
        match self {
            EntityLabel::File => 0.9,
            EntityLabel::Url => 0.95,
            EntityLabel::Command => 0.85,
            EntityLabel::Path => 0.8,
        }
    }
}

/// A labelled span of the normalized description. `start..end` are byte
/// offsets into that text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

// =============================================================================
// ANALYSIS
// =============================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    pub input_files: Vec<String>,
    pub output_files: Vec<String>,
    pub libraries: Vec<String>,
    pub system_commands: Vec<String>,
    pub network_access: bool,
    pub file_system_access: bool,
    pub gui_required: bool,
    pub web_required: bool,
    pub database_required: bool,
    pub error_handling: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub intent: Intent,
    pub entities: Vec<Entity>,
    pub complexity: Complexity,
    pub confidence: f64,
    pub suggested_language: Language,
    pub requirements: Requirements,
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IntegrationKind {
    Nemo,
    KdeConnect,
    Vscode,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    #[serde(rename = "type")]
    pub kind: IntegrationKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

fn default_enabled() -> bool {
    true
}

impl Integration {
    pub fn enabled(kind: IntegrationKind) -> Self {
        Self {
            kind,
            enabled: true,
            config: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguagePreference>,
    #[serde(default)]
    pub integrations: Vec<Integration>,
    #[serde(default)]
    pub include_tests: bool,
    #[serde(default)]
    pub include_documentation: bool,
    #[serde(default)]
    pub template_overrides: serde_json::Map<String, serde_json::Value>,
}

impl GenerationRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: LanguagePreference) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_integration(mut self, kind: IntegrationKind) -> Self {
        self.integrations.push(Integration::enabled(kind));
        self
    }

    pub fn with_override(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.template_overrides.insert(key.into(), value.into());
        self
    }

    pub fn integration_enabled(&self, kind: IntegrationKind) -> bool {
        self.integrations
            .iter()
            .any(|integration| integration.kind == kind && integration.enabled)
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Marker every compliant template carries in its attribution banner.
pub const SIGNATURE_MARKER: &str = "scrypgen-signature";

/// Attribution block attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub generator: String,
    pub version: String,
    pub protocol: String,
    pub marker: String,
}

impl Signature {
    pub fn current() -> Self {
        Self {
            generator: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            protocol: "v1".to_string(),
            marker: SIGNATURE_MARKER.to_string(),
        }
    }

    /// Comment banner rendered into generated scripts.
    pub fn banner(&self) -> String {
        format!(
            "# {}: {} {} (protocol {})\n# Review generated code before running it.",
            self.marker, self.generator, self.version, self.protocol
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub template_used: String,
    pub generated_at: String,
    pub requirements: Requirements,
    pub estimated_complexity: Complexity,
    pub dependencies: Vec<String>,
    pub permissions: Vec<String>,
    pub platform: Vec<String>,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationFile {
    /// Integration or companion kind: nemo, kde-connect, vscode, system,
    /// tests, documentation.
    #[serde(rename = "type")]
    pub kind: String,
    pub filename: String,
    pub content: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub executable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub code: String,
    pub language: Language,
    pub metadata: Metadata,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integration_files: Vec<IntegrationFile>,
}

impl GenerationResult {
    /// Result returned when a stage failed before code could be produced.
    pub fn failure(message: impl std::fmt::Display, suggestion: impl Into<String>) -> Self {
        Self {
            success: false,
            code: String::new(),
            language: Language::Bash,
            metadata: Metadata {
                template_used: "error".to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                requirements: Requirements::default(),
                estimated_complexity: Complexity::Simple,
                dependencies: Vec::new(),
                permissions: Vec::new(),
                platform: Vec::new(),
                signature: Signature::current(),
            },
            errors: vec![format!("Generation failed: {message}")],
            warnings: Vec::new(),
            suggestions: vec![suggestion.into()],
            integration_files: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub syntax_errors: Vec<String>,
    pub security_warnings: Vec<String>,
    pub recommendations: Vec<String>,
    /// Soft messages such as an unavailable interpreter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<GenerationResult>,
    pub successful: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn from_results(results: Vec<GenerationResult>) -> Self {
        let successful = results.iter().filter(|result| result.success).count();
        let failed = results.len() - successful;
        Self {
            results,
            successful,
            failed,
        }
    }
}
