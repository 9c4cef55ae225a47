//! Template selection, variable binding and rendering through the public API.

use anyhow::Result;
use assert_matches::assert_matches;
use scrypgen::analysis::Analyzer;
use scrypgen::error::GeneratorError;
use scrypgen::model::{Analysis, Language, SIGNATURE_MARKER};
use scrypgen::template::{
    Template, TemplateCatalog, TemplateEngine, parse_declared_dependencies,
};
use serde_json::{Map, Value, json};
use std::fs;
use tempfile::TempDir;

fn analyze(text: &str) -> Analysis {
    Analyzer::new().analyze(text).expect("analysis succeeds")
}

fn overrides(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_selection_by_intent_and_fallback() -> Result<()> {
    let engine = TemplateEngine::with_builtins()?;

    let cases = [
        ("Read CSV files and generate statistics", Language::Python, "python_file_processing"),
        ("Build a tkinter window that shows a counter", Language::Python, "python_gui"),
        ("Download files from HTTP API endpoint", Language::Python, "python_web"),
        ("Create nemo file manager action for converting images", Language::Bash, "bash_nemo_action"),
        ("Run remote command from my phone", Language::Bash, "bash_kde_connect"),
        ("Download files from HTTP API endpoint", Language::Bash, "bash_basic"),
        ("Create nemo file manager action for converting images", Language::Python, "python_basic"),
    ];

    for (description, language, expected) in cases {
        let output = engine.render(language, &analyze(description), &Map::new())?;
        assert_eq!(output.template_name, expected, "{description} as {language}");
    }
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_every_builtin_renders_clean() -> Result<()> {
    let engine = TemplateEngine::with_builtins()?;
    let descriptions = [
        "Print hello world",
        "Read CSV files and generate statistics",
        "Build a tkinter window that shows a counter",
        "Download files from HTTP API endpoint",
        "Create nemo file manager action for converting images",
        "Run remote command from my phone",
    ];

    for description in descriptions {
        let analysis = analyze(description);
        for language in [Language::Python, Language::Bash] {
            let output = engine.render(language, &analysis, &Map::new())?;
            assert!(output.errors.is_empty(), "{}: {:?}", output.template_name, output.errors);
            assert!(
                output.warnings.is_empty(),
                "{}: {:?}",
                output.template_name,
                output.warnings
            );
            assert!(output.code.contains(SIGNATURE_MARKER));
            assert_eq!(
                parse_declared_dependencies(&output.code),
                Some(output.dependencies.clone()),
                "{} dependency header",
                output.template_name
            );
        }
    }
    Ok(())
}

#[test]
fn test_rendering_is_deterministic() -> Result<()> {
    let engine = TemplateEngine::with_builtins()?;
    let analysis = analyze("Read CSV files and generate statistics");

    let first = engine.render(Language::Python, &analysis, &Map::new())?;
    let second = engine.render(Language::Python, &analysis, &Map::new())?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_imports_render_with_aliases_and_join_dependencies() -> Result<()> {
    let engine = TemplateEngine::with_builtins()?;
    let analysis = analyze("Print hello world");

    let output = engine.render(
        Language::Python,
        &analysis,
        &overrides(&[("imports", json!(["pandas", "json", "pandas"]))]),
    )?;

    assert!(output.code.contains("import pandas as pd\n"));
    assert!(output.code.contains("import json\n"));
    assert_eq!(output.dependencies, vec!["pandas", "json"]);
    Ok(())
}

#[test]
fn test_kde_override_is_shell_quoted() -> Result<()> {
    let engine = TemplateEngine::with_builtins()?;
    let analysis = analyze("Run remote command from my phone");

    let output = engine.render(
        Language::Bash,
        &analysis,
        &overrides(&[("original_command", json!("echo 'it works'"))]),
    )?;

    assert!(output.code.contains(r"ORIGINAL_COMMAND='echo '\''it works'\'''"));
    assert!(output.code.contains("    ls -la && notify-send \"Command executed\""));
    Ok(())
}

#[test]
fn test_gui_identifier_from_app_name() -> Result<()> {
    let engine = TemplateEngine::with_builtins()?;
    let analysis = analyze("Build a tkinter window that shows a counter");

    let output = engine.render(
        Language::Python,
        &analysis,
        &overrides(&[("app_name", json!("photo sorter 2"))]),
    )?;

    assert!(output.code.contains("class PhotoSorter2:"));
    assert!(output.code.contains("PhotoSorter2(root)"));
    assert!(output.code.contains("\"main_window\", \"menu_bar\", \"status_bar\""));
    Ok(())
}

#[test]
fn test_gui_strings_survive_quotes_and_backslashes() -> Result<()> {
    let engine = TemplateEngine::with_builtins()?;
    let analysis = analyze("Build a tkinter window that shows a counter");

    let output = engine.render(
        Language::Python,
        &analysis,
        &overrides(&[
            ("app_name", json!(r#"My "Quoted" App \ v2"#)),
            ("features", json!([r#"say "hi""#])),
        ]),
    )?;

    assert!(output.code.contains(r#"self.root.title("My \"Quoted\" App \\ v2")"#));
    assert!(output.code.contains(r#"FEATURES = ["say \"hi\"", ]"#));
    assert!(!output.code.contains(r#""My "Quoted""#));
    Ok(())
}

#[test]
fn test_non_array_imports_fail_rendering() -> Result<()> {
    let engine = TemplateEngine::with_builtins()?;
    let analysis = analyze("Print hello world");

    let err = engine
        .render(Language::Python, &analysis, &overrides(&[("imports", json!(42))]))
        .unwrap_err();

    assert_matches!(err, GeneratorError::TemplateRender { ref name, .. } if name == "python_basic");
    Ok(())
}

// =============================================================================
// Registration and external templates
// =============================================================================

#[test]
fn test_reregistration_replaces_compiled_template() -> Result<()> {
    let mut engine = TemplateEngine::with_builtins()?;
    let analysis = analyze("Print hello world");

    let mut replacement = engine
        .catalog()
        .get("bash_basic")
        .cloned()
        .expect("builtin");
    replacement.content = "#!/usr/bin/env bash\nset -e\n# {{ complexity }}\n".to_string();
    replacement.compliant = false;
    engine.register(replacement)?;

    let output = engine.render(Language::Bash, &analysis, &Map::new())?;
    assert_eq!(output.code, "#!/usr/bin/env bash\nset -e\n# simple\n");
    Ok(())
}

#[test]
fn test_external_directory_templates_take_part_in_selection() -> Result<()> {
    // Arrange
    let dir = TempDir::new()?;
    let definition = json!({
        "name": "bash_curl_fetch",
        "language": "bash",
        "category": "web",
        "content": "#!/usr/bin/env bash\nset -e\n# Dependencies: {{ dependencies | join(sep=\", \") }}\ncurl -fsSL \"$1\"\n",
        "requirements": ["curl"]
    });
    fs::write(dir.path().join("curl.json"), serde_json::to_string(&definition)?)?;

    let mut catalog = TemplateCatalog::with_builtins();
    assert_eq!(catalog.load_directory(dir.path())?, 1);
    let engine = TemplateEngine::new(catalog)?;

    // Act
    let output = engine.render(
        Language::Bash,
        &analyze("Download files from HTTP API endpoint"),
        &Map::new(),
    )?;

    // Assert
    assert_eq!(output.template_name, "bash_curl_fetch");
    assert_eq!(output.dependencies.first().map(String::as_str), Some("curl"));
    assert_eq!(parse_declared_dependencies(&output.code), Some(output.dependencies.clone()));
    Ok(())
}

#[test]
fn test_catalog_without_basic_is_rejected() {
    let mut catalog = TemplateCatalog::new();
    catalog.insert(Template {
        name: "python_only".into(),
        language: Language::Python,
        category: "basic".into(),
        description: String::new(),
        content: "print('hi')".into(),
        variables: Vec::new(),
        requirements: Vec::new(),
        compliant: false,
    });

    assert_matches!(
        TemplateEngine::new(catalog),
        Err(GeneratorError::CatalogInvariant(_))
    );
}
