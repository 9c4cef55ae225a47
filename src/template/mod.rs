//! Script templates: the catalog, the built-in set, Tera helpers, the
//! rendering engine and the self-lint pass over rendered output.

pub mod builtin;
pub mod catalog;
pub mod engine;
pub mod helpers;
pub mod lint;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{IntentCategory, Language};

pub use catalog::TemplateCatalog;
pub use engine::TemplateEngine;
pub use lint::LintReport;

/// Well-known template categories.
pub mod category {
    use crate::model::IntentCategory;

    pub const BASIC: &str = "basic";
    pub const GUI: &str = "gui";
    pub const NEMO_INTEGRATION: &str = "nemo_integration";
    pub const KDE_CONNECT: &str = "kde_connect";
    pub const FILE_PROCESSING: &str = "file_processing";
    pub const WEB: &str = "web";

    /// Category a primary intent maps to; unmapped intents use [`BASIC`].
    pub fn for_intent(primary: IntentCategory) -> &'static str {
        match primary {
            IntentCategory::GuiApplication => GUI,
            IntentCategory::NemoIntegration => NEMO_INTEGRATION,
            IntentCategory::KdeConnect => KDE_CONNECT,
            IntentCategory::FileProcessing | IntentCategory::DataProcessing => FILE_PROCESSING,
            IntentCategory::WebAutomation => WEB,
            _ => BASIC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    String,
    Array,
    Boolean,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableKind,
    #[serde(default)]
    pub required: bool,
    /// Bound when neither the analysis nor an override supplies the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: String,
}

impl TemplateVariable {
    pub fn required(name: &str, kind: VariableKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            default: None,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, kind: VariableKind, default: Value, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: Some(default),
            description: description.to_string(),
        }
    }
}

/// A parametrized code skeleton for one `(language, category)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub language: Language,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Tera source.
    pub content: String,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
    /// Dependency names the template always needs.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Whether rendered output must carry the attribution signature.
    #[serde(default)]
    pub compliant: bool,
}

impl Template {
    /// Required variables absent from `variables`.
    pub fn missing_variables(&self, variables: &Map<String, Value>) -> Vec<String> {
        self.variables
            .iter()
            .filter(|variable| variable.required && !variables.contains_key(&variable.name))
            .map(|variable| variable.name.clone())
            .collect()
    }

    pub fn matches_intent(&self, primary: IntentCategory) -> bool {
        self.category == category::for_intent(primary)
    }
}

/// Rendered code plus what the engine learned while producing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOutput {
    pub code: String,
    pub template_name: String,
    pub dependencies: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

const DEPENDENCY_HEADER: &str = "Dependencies:";

/// Reads the `Dependencies:` header every built-in template renders.
///
/// Returns `None` when the code carries no header.
pub fn parse_declared_dependencies(code: &str) -> Option<Vec<String>> {
    code.lines().find_map(|line| {
        let line = line.trim().trim_start_matches('#').trim_start();
        line.strip_prefix(DEPENDENCY_HEADER).map(|rest| {
            rest.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_mapping() {
        assert_eq!(category::for_intent(IntentCategory::GuiApplication), "gui");
        assert_eq!(category::for_intent(IntentCategory::WebAutomation), "web");
        assert_eq!(
            category::for_intent(IntentCategory::DataProcessing),
            "file_processing"
        );
        assert_eq!(
            category::for_intent(IntentCategory::SystemAdministration),
            "basic"
        );
    }

    #[test]
    fn test_parse_declared_dependencies() {
        let python = "\"\"\"doc\nDependencies: os, logging, pandas\n\"\"\"";
        assert_eq!(
            parse_declared_dependencies(python).unwrap(),
            vec!["os", "logging", "pandas"]
        );

        let bash = "#!/usr/bin/env bash\n# Dependencies: ls, cp\nset -e";
        assert_eq!(parse_declared_dependencies(bash).unwrap(), vec!["ls", "cp"]);

        assert_eq!(
            parse_declared_dependencies("# Dependencies:\n").unwrap(),
            Vec::<String>::new()
        );
        assert!(parse_declared_dependencies("echo hi").is_none());
    }

    #[test]
    fn test_template_deserializes_from_json() {
        let template: Template = serde_json::from_value(json!({
            "name": "bash_web_curl",
            "language": "bash",
            "category": "web",
            "content": "#!/usr/bin/env bash\ncurl \"$1\"\n",
            "variables": [
                { "name": "url", "type": "string", "required": true }
            ]
        }))
        .unwrap();

        assert_eq!(template.language, Language::Bash);
        assert!(!template.compliant);
        assert_eq!(template.missing_variables(&Map::new()), vec!["url"]);
        assert!(template.matches_intent(IntentCategory::WebAutomation));
    }
}
