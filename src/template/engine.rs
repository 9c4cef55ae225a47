//! Renders catalog templates against an analysis.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexSet;
use serde_json::{Map, Value, json};
use tera::{Context, Tera};
use tracing::debug;

use super::{Template, TemplateCatalog, TemplateOutput, category, helpers, lint};
use crate::error::{GeneratorError, Result, tera_detail};
use crate::health::ComponentHealth;
use crate::model::{Analysis, IntentCategory, Language};

/// Owns the catalog and a `Tera` instance holding every template compiled
/// under its catalog name.
pub struct TemplateEngine {
    catalog: TemplateCatalog,
    tera: Tera,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.catalog.len())
            .finish()
    }
}

impl TemplateEngine {
    pub fn new(catalog: TemplateCatalog) -> Result<Self> {
        catalog.check_basic_coverage()?;

        let mut tera = Tera::default();
        helpers::register(&mut tera);
        for template in catalog.iter() {
            compile(&mut tera, template)?;
        }
        debug!(templates = catalog.len(), "template engine ready");

        Ok(Self { catalog, tera })
    }

    pub fn with_builtins() -> Result<Self> {
        Self::new(TemplateCatalog::with_builtins())
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Adds or replaces a template. Replacing recompiles it.
    pub fn register(&mut self, template: Template) -> Result<()> {
        compile(&mut self.tera, &template)?;
        self.catalog.insert(template);
        Ok(())
    }

    pub fn select(&self, language: Language, primary: IntentCategory) -> Result<&Template> {
        self.catalog.select(language, category::for_intent(primary))
    }

    /// Variable map for a render. Later sources win: template defaults,
    /// analysis-derived values, category extras, then caller overrides.
    pub fn variables(
        &self,
        template: &Template,
        language: Language,
        analysis: &Analysis,
        overrides: &Map<String, Value>,
    ) -> Map<String, Value> {
        let mut variables = Map::new();

        for variable in &template.variables {
            if let Some(default) = &variable.default {
                variables.insert(variable.name.clone(), default.clone());
            }
        }

        let requirements = &analysis.requirements;
        variables.insert(
            "timestamp".into(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        variables.insert("description".into(), json!(analysis.intent.primary));
        variables.insert("complexity".into(), json!(analysis.complexity));
        variables.insert("imports".into(), json!(requirements.libraries));
        variables.insert("commands".into(), json!(requirements.system_commands));
        variables.insert("main_logic".into(), json!(main_logic(language, analysis)));

        for (key, value) in category_extras(analysis.intent.primary) {
            variables.insert(key.to_string(), value);
        }

        for (key, value) in overrides {
            variables.insert(key.clone(), value.clone());
        }

        variables
    }

    pub fn render(
        &self,
        language: Language,
        analysis: &Analysis,
        overrides: &Map<String, Value>,
    ) -> Result<TemplateOutput> {
        let template = self.select(language, analysis.intent.primary)?;
        debug!(
            template = %template.name,
            %language,
            primary = ?analysis.intent.primary,
            "selected template"
        );

        let mut variables = self.variables(template, language, analysis, overrides);
        let missing = template.missing_variables(&variables);
        if !missing.is_empty() {
            return Err(GeneratorError::MissingVariables {
                name: template.name.clone(),
                missing,
            });
        }

        let dependencies = dependencies(template, &variables);
        variables.insert("dependencies".into(), json!(dependencies));

        let context =
            Context::from_value(Value::Object(variables)).map_err(|e| GeneratorError::TemplateRender {
                name: template.name.clone(),
                detail: tera_detail(&e),
            })?;
        let code = self
            .tera
            .render(&template.name, &context)
            .map_err(|e| GeneratorError::TemplateRender {
                name: template.name.clone(),
                detail: tera_detail(&e),
            })?;

        let report = lint::lint(&code, template);
        Ok(TemplateOutput {
            code,
            template_name: template.name.clone(),
            dependencies,
            errors: report.errors,
            warnings: report.warnings,
            suggestions: report.suggestions,
        })
    }

    pub fn health(&self) -> ComponentHealth {
        let details = json!({
            "total": self.catalog.len(),
            "compliant": self.catalog.compliant_count(),
            "languages": self.catalog.languages(),
            "categories": self.catalog.categories(),
        });
        if self.catalog.is_empty() {
            return ComponentHealth::unhealthy_with_details("templates", "no templates registered", details);
        }
        match self.catalog.check_basic_coverage() {
            Ok(()) => ComponentHealth::healthy_with_details("templates", details),
            Err(error) => ComponentHealth::unhealthy_with_details("templates", error.to_string(), details),
        }
    }
}

fn compile(tera: &mut Tera, template: &Template) -> Result<()> {
    tera.add_raw_template(&template.name, &template.content)
        .map_err(|e| GeneratorError::TemplateRegistration {
            name: template.name.clone(),
            detail: tera_detail(&e),
        })
}

/// Template requirements, then string entries of `imports` and `commands`,
/// deduplicated in first-seen order.
fn dependencies(template: &Template, variables: &Map<String, Value>) -> Vec<String> {
    let mut set: IndexSet<String> = template.requirements.iter().cloned().collect();
    for key in ["imports", "commands"] {
        if let Some(Value::Array(items)) = variables.get(key) {
            set.extend(items.iter().filter_map(|item| item.as_str()).map(str::to_string));
        }
    }
    set.into_iter().collect()
}

/// Placeholder body for the script's main routine, unindented.
pub fn main_logic(language: Language, analysis: &Analysis) -> String {
    let say = |message: &str| match language {
        Language::Python => format!("print(\"{message}\")"),
        Language::Bash => format!("echo \"{message}\""),
    };
    let actions = &analysis.intent.actions;
    let requirements = &analysis.requirements;

    let mut blocks = Vec::new();
    if requirements.file_system_access {
        if actions.contains("read") {
            blocks.push(format!("# File reading logic\n{}", say("Reading input files")));
        }
        if actions.contains("write") {
            blocks.push(format!("# File writing logic\n{}", say("Writing output files")));
        }
    }
    if requirements.network_access {
        blocks.push(format!("# Network operations\n{}", say("Performing network requests")));
    }
    if requirements.gui_required {
        blocks.push(format!("# GUI setup and interaction\n{}", say("Setting up the interface")));
    }

    if blocks.is_empty() {
        format!("# Main functionality\n{}", say("Hello, World!"))
    } else {
        blocks.join("\n")
    }
}

fn category_extras(primary: IntentCategory) -> Vec<(&'static str, Value)> {
    match primary {
        IntentCategory::NemoIntegration => vec![
            ("action_name", json!("Custom Action")),
            ("file_logic", json!("echo \"Processing file: $file\"")),
        ],
        IntentCategory::KdeConnect => vec![
            ("original_command", json!("ls -la")),
            ("transformed_logic", json!("ls -la && notify-send \"Command executed\"")),
        ],
        IntentCategory::GuiApplication => vec![
            ("app_name", json!("Generated App")),
            ("features", json!(["main_window", "menu_bar", "status_bar"])),
        ],
        _ => Vec::new(),
    }
}
