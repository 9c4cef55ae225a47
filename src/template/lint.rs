//! Structural checks on freshly rendered code. Findings are advisory; only
//! an empty render counts as an error.

use super::Template;
use crate::model::{Language, SIGNATURE_MARKER};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn lint(code: &str, template: &Template) -> LintReport {
    let mut report = LintReport::default();

    if code.trim().is_empty() {
        report
            .errors
            .push(format!("Template '{}' produced no code", template.name));
        return report;
    }

    if template.compliant && !code.contains(SIGNATURE_MARKER) {
        report
            .warnings
            .push("Template output is missing the attribution signature".to_string());
    }

    match template.language {
        Language::Python => {
            if !code.contains("def main():") {
                report
                    .warnings
                    .push("Consider adding a main() function for better structure".to_string());
            }
            if !code.contains("if __name__ == \"__main__\":") {
                report
                    .warnings
                    .push("Consider adding main guard for better module structure".to_string());
            }
            if !code.contains("try:") {
                report
                    .suggestions
                    .push("Consider adding error handling with try/except blocks".to_string());
            }
        }
        Language::Bash => {
            if !code.starts_with("#!") {
                report
                    .warnings
                    .push("Consider adding proper shebang line".to_string());
            }
            if !code.contains("set -e") {
                report
                    .suggestions
                    .push("Consider adding \"set -e\" for better error handling".to_string());
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(language: Language, compliant: bool) -> Template {
        Template {
            name: "probe".into(),
            language,
            category: "basic".into(),
            description: String::new(),
            content: String::new(),
            variables: Vec::new(),
            requirements: Vec::new(),
            compliant,
        }
    }

    #[test]
    fn test_empty_output_is_an_error() {
        let report = lint("  \n", &template(Language::Bash, false));
        assert_eq!(report.errors.len(), 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_python_structure_findings() {
        let report = lint("print('hi')\n", &template(Language::Python, true));
        assert_eq!(report.warnings.len(), 3);
        assert_eq!(
            report.suggestions,
            vec!["Consider adding error handling with try/except blocks"]
        );
    }

    #[test]
    fn test_clean_bash_has_no_findings() {
        let code = format!("#!/usr/bin/env bash\n# {SIGNATURE_MARKER}\nset -e\necho ok\n");
        let report = lint(&code, &template(Language::Bash, true));
        assert_eq!(report, LintReport::default());
    }
}
