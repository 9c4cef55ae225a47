//! Template registry keyed by name and queryable by `(language, category)`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{Template, builtin, category};
use crate::error::{GeneratorError, Result};
use crate::model::Language;
use strum::IntoEnumIterator;

#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, Template>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for template in builtin::templates() {
            catalog.insert(template);
        }
        catalog
    }

    /// Adds or replaces a template, returning the one it displaced.
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        self.templates.insert(template.name.clone(), template)
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// First template by name for the pair. Map order makes the smallest
    /// name win.
    pub fn find(&self, language: Language, category: &str) -> Option<&Template> {
        self.templates
            .values()
            .find(|t| t.language == language && t.category == category)
    }

    /// Template for the category, falling back to the language's basic one.
    pub fn select(&self, language: Language, category: &str) -> Result<&Template> {
        if let Some(template) = self.find(language, category) {
            return Ok(template);
        }
        debug!(%language, category, "no category template, using basic");
        self.find(language, category::BASIC)
            .ok_or_else(|| GeneratorError::TemplateMissing {
                language,
                category: category.to_string(),
            })
    }

    /// Every language needs a basic template so selection always resolves.
    pub fn check_basic_coverage(&self) -> Result<()> {
        let missing: Vec<String> = Language::iter()
            .filter(|language| self.find(*language, category::BASIC).is_none())
            .map(|language| language.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GeneratorError::CatalogInvariant(format!(
                "no basic template for: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn languages(&self) -> BTreeSet<Language> {
        self.templates.values().map(|t| t.language).collect()
    }

    pub fn categories(&self) -> BTreeSet<String> {
        self.templates.values().map(|t| t.category.clone()).collect()
    }

    pub fn compliant_count(&self) -> usize {
        self.templates.values().filter(|t| t.compliant).count()
    }

    /// Parses one JSON or YAML template definition.
    pub fn read_definition(path: &Path) -> Result<Template> {
        let load_error = |detail: String| GeneratorError::TemplateLoad {
            path: path.to_path_buf(),
            detail,
        };
        let raw = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&raw).map_err(|e| load_error(e.to_string())),
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&raw).map_err(|e| load_error(e.to_string()))
            }
            _ => Err(load_error("unsupported template format".to_string())),
        }
    }

    /// Registers every definition found directly inside `dir`.
    ///
    /// A missing directory is not an error. Files that fail to parse are
    /// logged and skipped. Returns the number of templates registered.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            warn!(path = %dir.display(), "template directory not found, skipping");
            return Ok(0);
        }

        let mut loaded = 0;
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            let path = entry.path();
            if !matches!(extension(path).as_deref(), Some("json" | "yaml" | "yml")) {
                continue;
            }
            match Self::read_definition(path) {
                Ok(template) => {
                    debug!(name = %template.name, path = %path.display(), "loaded template");
                    if self.insert(template).is_some() {
                        warn!(path = %path.display(), "template replaced an existing definition");
                    }
                    loaded += 1;
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable template");
                }
            }
        }
        Ok(loaded)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template(name: &str, language: Language, category: &str) -> Template {
        Template {
            name: name.into(),
            language,
            category: category.into(),
            description: String::new(),
            content: "echo hi".into(),
            variables: Vec::new(),
            requirements: Vec::new(),
            compliant: false,
        }
    }

    #[test]
    fn test_builtins_cover_basic() {
        let catalog = TemplateCatalog::with_builtins();
        assert_eq!(catalog.len(), 7);
        catalog.check_basic_coverage().unwrap();
        assert_eq!(catalog.compliant_count(), 7);
        assert!(catalog.categories().contains("nemo_integration"));
    }

    #[test]
    fn test_select_falls_back_to_basic() {
        let catalog = TemplateCatalog::with_builtins();
        let template = catalog.select(Language::Python, "nemo_integration").unwrap();
        assert_eq!(template.name, "python_basic");
        let template = catalog.select(Language::Bash, "kde_connect").unwrap();
        assert_eq!(template.name, "bash_kde_connect");
    }

    #[test]
    fn test_select_without_basic_fails() {
        let mut catalog = TemplateCatalog::new();
        catalog.insert(template("bash_web", Language::Bash, "web"));
        let err = catalog.select(Language::Bash, "gui").unwrap_err();
        assert!(matches!(err, GeneratorError::TemplateMissing { .. }));
        assert!(catalog.check_basic_coverage().is_err());
    }

    #[test]
    fn test_smallest_name_wins() {
        let mut catalog = TemplateCatalog::new();
        catalog.insert(template("web_zeta", Language::Bash, "web"));
        catalog.insert(template("web_alpha", Language::Bash, "web"));
        assert_eq!(catalog.find(Language::Bash, "web").unwrap().name, "web_alpha");
    }

    #[test]
    fn test_load_directory_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("curl.json"),
            r#"{"name":"bash_curl","language":"bash","category":"web","content":"curl \"$1\""}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("hello.yaml"),
            "name: python_hello\nlanguage: python\ncategory: basic\ncontent: print('hi')\n",
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = TemplateCatalog::new();
        assert_eq!(catalog.load_directory(dir.path()).unwrap(), 2);
        assert!(catalog.get("bash_curl").is_some());
        assert!(catalog.get("python_hello").is_some());
    }

    #[test]
    fn test_missing_directory_is_soft() {
        let mut catalog = TemplateCatalog::with_builtins();
        let loaded = catalog
            .load_directory(Path::new("/definitely/not/here"))
            .unwrap();
        assert_eq!(loaded, 0);
        assert_eq!(catalog.len(), 7);
    }
}
