//! End-to-end generation through `ScriptGenerator`.
//!
//! Syntax checking is replaced by a recording stub so results do not depend
//! on the host's interpreters.

use async_trait::async_trait;
use scrypgen::analysis::Analyzer;
use scrypgen::error::Result;
use scrypgen::health::{ComponentHealth, HealthStatus};
use scrypgen::model::{
    Complexity, GenerationRequest, IntegrationKind, Language, LanguagePreference,
};
use scrypgen::template::{TemplateEngine, parse_declared_dependencies};
use scrypgen::validation::{SyntaxChecker, SyntaxVerdict, Validator};
use scrypgen::{GeneratorConfig, ScriptGenerator};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Records every check and answers with a fixed verdict.
struct StubChecker {
    verdict: SyntaxVerdict,
    seen: Mutex<Vec<Language>>,
}

impl StubChecker {
    fn new(verdict: SyntaxVerdict) -> Arc<Self> {
        Arc::new(Self {
            verdict,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SyntaxChecker for StubChecker {
    async fn check(&self, _code: &str, language: Language) -> Result<SyntaxVerdict> {
        self.seen.lock().unwrap().push(language);
        Ok(self.verdict.clone())
    }

    async fn probe(&self) -> ComponentHealth {
        ComponentHealth::healthy("validator")
    }
}

fn generator_with(config: GeneratorConfig, checker: Arc<StubChecker>) -> ScriptGenerator {
    ScriptGenerator::with_components(
        config,
        Analyzer::new(),
        TemplateEngine::with_builtins().unwrap(),
        Validator::new(checker),
    )
}

fn generator() -> ScriptGenerator {
    generator_with(GeneratorConfig::default(), StubChecker::new(SyntaxVerdict::Passed))
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[tokio::test]
async fn test_csv_statistics_script() {
    let result = generator()
        .generate(&GenerationRequest::new("Read CSV files and generate statistics"))
        .await;

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.language, Language::Python);
    assert_eq!(result.metadata.template_used, "python_file_processing");
    assert!(result.metadata.requirements.file_system_access);
    assert!(
        result
            .metadata
            .permissions
            .contains(&"file_system_read_write".to_string())
    );
}

#[tokio::test]
async fn test_nemo_action_script() {
    let result = generator()
        .generate(&GenerationRequest::new(
            "Create nemo file manager action for converting images",
        ))
        .await;

    assert!(result.success);
    assert_eq!(result.language, Language::Bash);
    assert_eq!(result.metadata.template_used, "bash_nemo_action");
    assert!(result.code.starts_with("#!/usr/bin/env bash"));
}

#[tokio::test]
async fn test_complexity_scenarios() {
    let generator = generator();

    let simple = generator.generate(&GenerationRequest::new("Print hello world")).await;
    assert_eq!(simple.metadata.estimated_complexity, Complexity::Simple);

    let complex = generator
        .generate(&GenerationRequest::new(
            "Create machine learning model with tensorflow",
        ))
        .await;
    assert_eq!(complex.metadata.estimated_complexity, Complexity::Complex);
}

#[tokio::test]
async fn test_http_download_permissions() {
    let result = generator()
        .generate(&GenerationRequest::new("Download files from HTTP API endpoint"))
        .await;

    assert!(result.metadata.requirements.network_access);
    assert!(result.metadata.requirements.web_required);
    assert!(result.metadata.permissions.contains(&"network_access".to_string()));
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn test_generation_is_idempotent() {
    let generator = generator();
    let request = GenerationRequest::new("Read CSV files and generate statistics");

    let first = generator.generate(&request).await;
    let second = generator.generate(&request).await;

    assert_eq!(first.code, second.code);
    assert_eq!(first.language, second.language);
    assert_eq!(first.metadata.requirements, second.metadata.requirements);
}

#[tokio::test]
async fn test_dependency_header_round_trips() {
    let generator = generator();
    for description in [
        "Read CSV files and generate statistics",
        "Download files from HTTP API endpoint",
        "Copy files with cp and list them with ls",
    ] {
        let result = generator.generate(&GenerationRequest::new(description)).await;
        assert_eq!(
            parse_declared_dependencies(&result.code),
            Some(result.metadata.dependencies.clone()),
            "{description}"
        );
    }
}

#[tokio::test]
async fn test_explicit_language_wins() {
    let result = generator()
        .generate(
            &GenerationRequest::new("Read CSV files and generate statistics")
                .with_language(LanguagePreference::Bash),
        )
        .await;

    assert_eq!(result.language, Language::Bash);
    assert_eq!(result.metadata.template_used, "bash_basic");
    assert!(result.metadata.platform.contains(&"windows-wsl".to_string()));
}

#[tokio::test]
async fn test_configured_default_language_applies_to_auto() {
    let config = GeneratorConfig {
        default_language: LanguagePreference::Bash,
        ..GeneratorConfig::default()
    };
    let generator = generator_with(config, StubChecker::new(SyntaxVerdict::Passed));

    let result = generator
        .generate(
            &GenerationRequest::new("Read CSV files and generate statistics")
                .with_language(LanguagePreference::Auto),
        )
        .await;

    assert_eq!(result.language, Language::Bash);
}

#[tokio::test]
async fn test_explicit_language_beats_configured_default() {
    let config = GeneratorConfig {
        default_language: LanguagePreference::Bash,
        ..GeneratorConfig::default()
    };
    let generator = generator_with(config, StubChecker::new(SyntaxVerdict::Passed));

    let result = generator
        .generate(
            &GenerationRequest::new("Run remote command from my phone")
                .with_language(LanguagePreference::Python),
        )
        .await;

    assert_eq!(result.language, Language::Python);
    assert_eq!(result.metadata.template_used, "python_basic");
}

// =============================================================================
// Validation outcomes
// =============================================================================

#[tokio::test]
async fn test_syntax_failure_marks_result_unsuccessful() {
    let checker = StubChecker::new(SyntaxVerdict::Failed("Bash syntax error: boom".into()));
    let generator = generator_with(GeneratorConfig::default(), checker);

    let result = generator.generate(&GenerationRequest::new("Print hello world")).await;

    assert!(!result.success);
    assert!(!result.code.is_empty());
    assert!(result.errors.contains(&"Bash syntax error: boom".to_string()));
}

#[tokio::test]
async fn test_unavailable_checker_adds_warning_only() {
    let checker = StubChecker::new(SyntaxVerdict::Unavailable("checker missing".into()));
    let generator = generator_with(GeneratorConfig::default(), checker);

    let result = generator.generate(&GenerationRequest::new("Print hello world")).await;

    assert!(result.success);
    assert!(result.warnings.contains(&"checker missing".to_string()));
}

#[tokio::test]
async fn test_validation_can_be_disabled() {
    let checker = StubChecker::new(SyntaxVerdict::Failed("never reported".into()));
    let config = GeneratorConfig {
        validate_scripts: false,
        ..GeneratorConfig::default()
    };
    let generator = generator_with(config, checker.clone());

    let result = generator.generate(&GenerationRequest::new("Print hello world")).await;

    assert!(result.success);
    assert!(checker.seen.lock().unwrap().is_empty());
}

// =============================================================================
// Failure boundary
// =============================================================================

#[tokio::test]
async fn test_empty_description_fails_softly() {
    let result = generator().generate(&GenerationRequest::new("   ")).await;

    assert!(!result.success);
    assert!(result.code.is_empty());
    assert_eq!(result.language, Language::Bash);
    assert_eq!(result.metadata.template_used, "error");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Generation failed: "));
    assert_eq!(result.suggestions.len(), 1);
}

#[tokio::test]
async fn test_render_error_fails_softly() {
    let request = GenerationRequest::new("Print hello world")
        .with_language(LanguagePreference::Python)
        .with_override("imports", json!(42));

    let result = generator().generate(&request).await;

    assert!(!result.success);
    assert_eq!(result.metadata.template_used, "error");
    assert!(result.errors[0].contains("python_basic"));
}

// =============================================================================
// Batch, conveniences and integrations
// =============================================================================

#[tokio::test]
async fn test_batch_isolates_failures_and_keeps_order() {
    let requests = vec![
        GenerationRequest::new("Print hello world"),
        GenerationRequest::new(""),
        GenerationRequest::new("Download files from HTTP API endpoint"),
    ];

    let report = generator().generate_batch(&requests).await;

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.successful, 2);
    assert_eq!(report.failed, 1);
    assert!(report.results[0].success);
    assert!(!report.results[1].success);
    assert!(report.results[2].metadata.requirements.network_access);
}

#[tokio::test]
async fn test_kde_connect_convenience() {
    let result = generator()
        .generate_kde_connect_script("Show disk usage", "df -h")
        .await;

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.language, Language::Bash);
    assert_eq!(result.metadata.template_used, "bash_kde_connect");
    assert!(result.code.contains("ORIGINAL_COMMAND='df -h'"));
    assert!(result.code.contains("    df -h && notify-send \"Command executed\""));
    assert_eq!(result.integration_files.len(), 1);
    assert_eq!(result.integration_files[0].kind, "kde-connect");
}

#[tokio::test]
async fn test_nemo_convenience() {
    let result = generator()
        .generate_nemo_action("Shrink selected images", "Shrink Images")
        .await;

    assert_eq!(result.metadata.template_used, "bash_nemo_action");
    assert!(result.code.contains("ACTION_NAME='Shrink Images'"));
    let action = &result.integration_files[0];
    assert_eq!(action.filename, "nemo_integration.nemo_action");
    assert!(action.content.contains("Name=Shrink Images"));
}

#[tokio::test]
async fn test_companion_files_on_request() {
    let mut request = GenerationRequest::new("Read CSV files and generate statistics")
        .with_integration(IntegrationKind::Vscode)
        .with_integration(IntegrationKind::System);
    request.include_tests = true;
    request.include_documentation = true;

    let result = generator().generate(&request).await;

    let kinds: Vec<&str> = result
        .integration_files
        .iter()
        .map(|file| file.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["vscode", "system", "tests", "documentation"]);
}

#[tokio::test]
async fn test_health_combines_components() {
    let report = generator().health().await;

    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.details.len(), 3);
    assert!(report.details.contains_key("templates"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "healthy");
}
