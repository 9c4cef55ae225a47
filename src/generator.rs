//! The generation pipeline: analyze, pick a language, render, validate,
//! attach integration files and metadata.

use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::analysis::Analyzer;
use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::health::{ComponentHealth, HealthReport};
use crate::integrations::{self, ScriptArtifact};
use crate::logging::generation_span;
use crate::model::{
    Analysis, BatchReport, GenerationRequest, GenerationResult, IntegrationKind, Language,
    LanguagePreference, Metadata, Signature, ValidationResult,
};
use crate::template::{TemplateCatalog, TemplateEngine};
use crate::validation::{CheckerCommand, ProcessSyntaxChecker, Validator};

const SLOW_GENERATION_MS: u64 = 2_000;

/// Commands that tie a Bash script to a native Linux install.
const LINUX_ONLY_COMMANDS: &[&str] = &["systemctl", "service", "apt", "yum"];

pub struct ScriptGenerator {
    config: GeneratorConfig,
    analyzer: Analyzer,
    engine: TemplateEngine,
    validator: Validator,
}

impl ScriptGenerator {
    /// Builds the pipeline from configuration: built-in templates plus the
    /// configured template directory, and a subprocess syntax checker.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let mut catalog = TemplateCatalog::with_builtins();
        if let Some(dir) = config.template_directory.as_ref() {
            let loaded = catalog.load_directory(dir)?;
            info!(path = %dir.display(), loaded, "external templates registered");
        }
        let engine = TemplateEngine::new(catalog)?;

        let mut checker = ProcessSyntaxChecker::new(
            CheckerCommand::python(config.python_program.clone()),
            CheckerCommand::bash(config.bash_program.clone()),
            config.syntax_timeout(),
        );
        if let Some(root) = config.temp_root.as_ref() {
            checker = checker.with_temp_root(root);
        }
        let validator =
            Validator::new(Arc::new(checker)).with_attribution_check(config.compliance);

        Ok(Self::with_components(config, Analyzer::new(), engine, validator))
    }

    pub fn with_components(
        config: GeneratorConfig,
        analyzer: Analyzer,
        engine: TemplateEngine,
        validator: Validator,
    ) -> Self {
        Self {
            config,
            analyzer,
            engine,
            validator,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Runs the whole pipeline. Stage failures come back as an unsuccessful
    /// result, never as an error.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let request_id = Uuid::new_v4().to_string();
        let span = generation_span(&request_id);

        match self.try_generate(request).instrument(span.clone()).await {
            Ok(result) => result,
            Err(err) => {
                span.in_scope(|| {
                    error!(
                        error = %err,
                        category = %err.category(),
                        retryable = err.is_retryable(),
                        "script generation failed"
                    )
                });
                GenerationResult::failure(&err, err.suggestion())
            }
        }
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let started = Instant::now();
        if request.description.trim().is_empty() {
            return Err(GeneratorError::InvalidRequest(
                "description must not be empty".to_string(),
            ));
        }
        info!(
            language = %request.language.unwrap_or_default(),
            integrations = request.integrations.len(),
            "starting script generation"
        );

        let analysis = self.analyzer.analyze(&request.description)?;
        let language = self.select_language(request, &analysis);

        let output = self
            .engine
            .render(language, &analysis, &request.template_overrides)?;

        let validation = if self.config.validate_scripts {
            self.validator.validate(&output.code, language).await
        } else {
            ValidationResult {
                is_valid: true,
                ..ValidationResult::default()
            }
        };

        let integration_files = integrations::build(
            request,
            &ScriptArtifact {
                code: &output.code,
                language,
                analysis: &analysis,
                dependencies: &output.dependencies,
            },
        )?;

        let metadata = metadata(&output.template_name, &analysis, &output.dependencies, language);

        let mut errors = output.errors;
        errors.extend(validation.syntax_errors);
        let mut warnings = output.warnings;
        warnings.extend(validation.security_warnings);
        warnings.extend(validation.notices);
        let mut suggestions = output.suggestions;
        suggestions.extend(validation.recommendations);

        let result = GenerationResult {
            success: validation.is_valid && !output.code.is_empty(),
            code: output.code,
            language,
            metadata,
            errors,
            warnings,
            suggestions,
            integration_files,
        };

        crate::log_slow_operation!(
            started.elapsed(),
            SLOW_GENERATION_MS,
            success = result.success,
            %language,
            template = %result.metadata.template_used,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "script generation completed"
        );
        Ok(result)
    }

    /// Explicit request language, then the configured default, then the
    /// analyzer's suggestion.
    fn select_language(&self, request: &GenerationRequest, analysis: &Analysis) -> Language {
        request
            .language
            .and_then(|preference| preference.explicit())
            .or_else(|| self.config.default_language.explicit())
            .unwrap_or(analysis.suggested_language)
    }

    /// Processes requests one after another; a failure never stops the batch.
    pub async fn generate_batch(&self, requests: &[GenerationRequest]) -> BatchReport {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.generate(request).await);
        }
        let report = BatchReport::from_results(results);
        info!(
            total = requests.len(),
            successful = report.successful,
            failed = report.failed,
            "batch generation completed"
        );
        report
    }

    /// Bash wrapper that runs `command` on behalf of a KDE Connect device.
    pub async fn generate_kde_connect_script(
        &self,
        description: &str,
        command: &str,
    ) -> GenerationResult {
        let request = GenerationRequest::new(format!(
            "{description} - Transform command \"{command}\" for KDE Connect execution"
        ))
        .with_language(LanguagePreference::Bash)
        .with_integration(IntegrationKind::KdeConnect)
        .with_override("original_command", command)
        .with_override(
            "transformed_logic",
            format!("{command} && notify-send \"Command executed\""),
        );
        self.generate(&request).await
    }

    /// Bash action for the Nemo file manager's context menu.
    pub async fn generate_nemo_action(
        &self,
        description: &str,
        action_name: &str,
    ) -> GenerationResult {
        let request = GenerationRequest::new(format!(
            "{description} - Create Nemo file manager action \"{action_name}\""
        ))
        .with_language(LanguagePreference::Bash)
        .with_integration(IntegrationKind::Nemo)
        .with_override("action_name", action_name);
        self.generate(&request).await
    }

    pub async fn health(&self) -> HealthReport {
        let tables = self.analyzer.tables();
        let analyzer = ComponentHealth::healthy_with_details(
            "analyzer",
            json!({
                "pythonCategories": tables.python.len(),
                "bashCategories": tables.bash.len(),
            }),
        );
        HealthReport::from_components([
            analyzer,
            self.engine.health(),
            self.validator.health().await,
        ])
    }
}

fn metadata(
    template_used: &str,
    analysis: &Analysis,
    dependencies: &[String],
    language: Language,
) -> Metadata {
    let requirements = &analysis.requirements;
    let mut permissions = Vec::new();
    if requirements.file_system_access {
        permissions.push("file_system_read_write".to_string());
    }
    if requirements.network_access {
        permissions.push("network_access".to_string());
    }
    if !requirements.system_commands.is_empty() {
        permissions.push("execute_system_commands".to_string());
    }
    if requirements.gui_required {
        permissions.push("gui_display".to_string());
    }

    let platform: Vec<String> = match language {
        Language::Python => vec!["linux", "windows", "macos"],
        Language::Bash => {
            let linux_only = requirements
                .system_commands
                .iter()
                .chain(dependencies)
                .any(|command| LINUX_ONLY_COMMANDS.contains(&command.as_str()));
            if linux_only {
                vec!["linux", "macos"]
            } else {
                vec!["linux", "macos", "windows-wsl"]
            }
        }
    }
    .into_iter()
    .map(str::to_string)
    .collect();

    Metadata {
        template_used: template_used.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        requirements: requirements.clone(),
        estimated_complexity: analysis.complexity,
        dependencies: dependencies.to_vec(),
        permissions,
        platform,
        signature: Signature::current(),
    }
}
