use std::sync::Arc;
use tracing::{debug, error};

use super::syntax::{ProcessSyntaxChecker, SyntaxChecker, SyntaxVerdict};
use super::{recommendations, security};
use crate::health::ComponentHealth;
use crate::model::{Language, ValidationResult};

/// Syntax check, security scan and recommendations over generated code.
#[derive(Clone)]
pub struct Validator {
    checker: Arc<dyn SyntaxChecker>,
    attribution: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Arc::new(ProcessSyntaxChecker::default()))
    }
}

impl Validator {
    pub fn new(checker: Arc<dyn SyntaxChecker>) -> Self {
        Self {
            checker,
            attribution: true,
        }
    }

    /// Whether scripts without the attribution marker get a recommendation.
    pub fn with_attribution_check(mut self, enabled: bool) -> Self {
        self.attribution = enabled;
        self
    }

    /// Never fails. An internal error becomes a single synthetic syntax error.
    pub async fn validate(&self, code: &str, language: Language) -> ValidationResult {
        let mut result = ValidationResult::default();

        match self.checker.check(code, language).await {
            Ok(SyntaxVerdict::Passed) => {}
            Ok(SyntaxVerdict::Failed(message)) => result.syntax_errors.push(message),
            Ok(SyntaxVerdict::Unavailable(notice)) => result.notices.push(notice),
            Err(err) => {
                error!(error = %err, category = %err.category(), "validation failed");
                return ValidationResult {
                    is_valid: false,
                    syntax_errors: vec![format!("Validation error: {err}")],
                    ..ValidationResult::default()
                };
            }
        }

        result.security_warnings = security::scan(code, language);
        result.recommendations = recommendations::recommend(code, language, self.attribution);
        result.is_valid = result.syntax_errors.is_empty();

        debug!(
            %language,
            valid = result.is_valid,
            security = result.security_warnings.len(),
            recommendations = result.recommendations.len(),
            "validation completed"
        );
        result
    }

    pub async fn health(&self) -> ComponentHealth {
        self.checker.probe().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GeneratorError, Result};
    use async_trait::async_trait;

    struct Fixed(std::result::Result<SyntaxVerdict, String>);

    #[async_trait]
    impl SyntaxChecker for Fixed {
        async fn check(&self, _code: &str, _language: Language) -> Result<SyntaxVerdict> {
            self.0.clone().map_err(GeneratorError::Validation)
        }

        async fn probe(&self) -> ComponentHealth {
            ComponentHealth::healthy("validator")
        }
    }

    fn validator(verdict: std::result::Result<SyntaxVerdict, String>) -> Validator {
        Validator::new(Arc::new(Fixed(verdict)))
    }

    #[tokio::test]
    async fn test_failed_check_is_invalid() {
        let result = validator(Ok(SyntaxVerdict::Failed("Bash syntax error: line 2".into())))
            .validate("if then", Language::Bash)
            .await;
        assert!(!result.is_valid);
        assert_eq!(result.syntax_errors, vec!["Bash syntax error: line 2"]);
    }

    #[tokio::test]
    async fn test_unavailable_checker_stays_valid() {
        let result = validator(Ok(SyntaxVerdict::Unavailable("skipped".into())))
            .validate("sudo rm -rf /tmp/x\n", Language::Bash)
            .await;
        assert!(result.is_valid);
        assert_eq!(result.notices, vec!["skipped"]);
        assert_eq!(result.security_warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_internal_error_degrades() {
        let result = validator(Err("disk full".into()))
            .validate("print(1)", Language::Python)
            .await;
        assert!(!result.is_valid);
        assert_eq!(result.syntax_errors.len(), 1);
        assert!(result.syntax_errors[0].starts_with("Validation error: "));
        assert!(result.recommendations.is_empty());
    }
}
