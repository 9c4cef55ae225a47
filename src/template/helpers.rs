//! Tera functions and filters shared by every script template.
//!
//! Functions stand in for reusable snippets (`signature()`,
//! `python_imports(libraries=...)`, `bash_dependencies(commands=...)`,
//! `neon_colors()`); filters reshape values for the target language.

use std::collections::HashMap;
use tera::{Tera, Value};

use crate::model::Signature;

pub fn register(tera: &mut Tera) {
    tera.register_function("signature", signature);
    tera.register_function("python_imports", python_imports);
    tera.register_function("bash_dependencies", bash_dependencies);
    tera.register_function("neon_colors", neon_colors);
    tera.register_filter("indent_block", indent_block);
    tera.register_filter("identifier", identifier);
    tera.register_filter("shell_quote", shell_quote);
    tera.register_filter("py_string", py_string);
}

/// String array argument; a missing argument is an empty list.
fn string_list(args: &HashMap<String, Value>, key: &str) -> tera::Result<Vec<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => Ok(text.clone()),
                other => Err(tera::Error::msg(format!(
                    "`{key}` must contain only strings, found {other}"
                ))),
            })
            .collect(),
        Some(other) => Err(tera::Error::msg(format!(
            "`{key}` must be an array of strings, found {other}"
        ))),
    }
}

fn signature(_args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(Signature::current().banner()))
}

/// Import statement for a library name.
pub fn python_import(library: &str) -> String {
    match library {
        "pandas" => "import pandas as pd".to_string(),
        "numpy" => "import numpy as np".to_string(),
        "matplotlib" => "import matplotlib.pyplot as plt".to_string(),
        "tkinter" => "import tkinter as tk\nfrom tkinter import ttk, filedialog, messagebox".to_string(),
        other => format!("import {other}"),
    }
}

fn python_imports(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let libraries = string_list(args, "libraries")?;
    let lines: Vec<String> = libraries.iter().map(|lib| python_import(lib)).collect();
    Ok(Value::String(lines.join("\n")))
}

fn bash_dependencies(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let commands = string_list(args, "commands")?;
    if commands.is_empty() {
        return Ok(Value::String(String::new()));
    }

    let deps: Vec<String> = commands.iter().map(|cmd| quote(cmd)).collect();
    let script = format!(
        r#"# Check dependencies
check_dependencies() {{
    local deps=({deps})
    local dep
    for dep in "${{deps[@]}}"; do
        if ! command -v "$dep" &> /dev/null; then
            echo "Error: $dep is required but not installed." >&2
            exit 1
        fi
    done
    echo "All dependencies satisfied"
}}"#,
        deps = deps.join(" ")
    );
    Ok(Value::String(script))
}

fn neon_colors(_args: &HashMap<String, Value>) -> tera::Result<Value> {
    let palette = [
        ("GREEN", "0;32"),
        ("CYAN", "0;36"),
        ("PURPLE", "0;35"),
        ("NAVY", "0;34"),
        ("YELLOW", "1;33"),
        ("RED", "0;31"),
        ("NC", "0"),
    ];
    let mut lines = vec!["# Terminal colors".to_string()];
    lines.extend(
        palette
            .iter()
            .map(|(name, code)| format!(r"{name}='\033[{code}m'")),
    );
    Ok(Value::String(lines.join("\n")))
}

fn as_str<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("`{filter}` expects a string, found {value}")))
}

/// Prefixes every non-empty line with `width` spaces (default 4).
fn indent_block(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = as_str(value, "indent_block")?;
    let width = match args.get("width") {
        None => 4,
        Some(width) => width
            .as_u64()
            .ok_or_else(|| tera::Error::msg("`indent_block` width must be a non-negative integer"))?
            as usize,
    };
    let pad = " ".repeat(width);
    let lines: Vec<String> = text
        .trim_end_matches('\n')
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect();
    Ok(Value::String(lines.join("\n")))
}

/// PascalCase identifier built from the alphanumeric words of a value.
fn identifier(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = as_str(value, "identifier")?;
    let mut ident: String = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if ident.is_empty() {
        ident = "Application".to_string();
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert_str(0, "App");
    }
    Ok(Value::String(ident))
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Single-quotes a value for safe use as one shell word.
fn shell_quote(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(quote(as_str(value, "shell_quote")?)))
}

/// Double-quoted Python string literal. JSON string escapes are a subset of
/// what Python accepts.
fn py_string(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = as_str(value, "py_string")?;
    serde_json::to_string(text)
        .map(Value::String)
        .map_err(|err| tera::Error::msg(format!("`py_string` failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, context: Value) -> tera::Result<String> {
        let mut tera = Tera::default();
        register(&mut tera);
        tera.add_raw_template("t", source)?;
        tera.render("t", &tera::Context::from_value(context)?)
    }

    #[test]
    fn test_python_imports_use_aliases() {
        let out = render(
            "{{ python_imports(libraries=libs) }}",
            json!({ "libs": ["pandas", "json"] }),
        )
        .unwrap();
        assert_eq!(out, "import pandas as pd\nimport json");
    }

    #[test]
    fn test_python_imports_rejects_non_array() {
        let err = render("{{ python_imports(libraries=libs) }}", json!({ "libs": 42 }));
        assert!(err.is_err());
    }

    #[test]
    fn test_bash_dependencies_quotes_commands() {
        let out = render(
            "{{ bash_dependencies(commands=cmds) }}",
            json!({ "cmds": ["ls", "cp"] }),
        )
        .unwrap();
        assert!(out.contains("local deps=('ls' 'cp')"));
        assert!(out.contains("check_dependencies() {"));
        assert!(out.contains(r#"for dep in "${deps[@]}"; do"#));

        let empty = render("{{ bash_dependencies(commands=cmds) }}", json!({ "cmds": [] })).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_indent_block() {
        let out = render(
            "{{ body | indent_block(width=8) }}",
            json!({ "body": "a = 1\n\nprint(a)\n" }),
        )
        .unwrap();
        assert_eq!(out, "        a = 1\n\n        print(a)");
    }

    #[test]
    fn test_identifier() {
        let out = render(
            "{{ a | identifier }}|{{ b | identifier }}|{{ c | identifier }}",
            json!({ "a": "Generated App", "b": "3d viewer", "c": "!!" }),
        )
        .unwrap();
        assert_eq!(out, "GeneratedApp|App3dViewer|Application");
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        let out = render("{{ cmd | shell_quote }}", json!({ "cmd": "echo 'hi'" })).unwrap();
        assert_eq!(out, r"'echo '\''hi'\'''");
    }

    #[test]
    fn test_py_string_escapes_quotes_and_backslashes() {
        let out = render(
            "{{ a | py_string }}|{{ b | py_string }}",
            json!({ "a": r#"Say "hi" \ bye"#, "b": "two\nlines" }),
        )
        .unwrap();
        assert_eq!(out, r#""Say \"hi\" \\ bye"|"two\nlines""#);
    }

    #[test]
    fn test_signature_and_colors() {
        let out = render("{{ signature() }}\n{{ neon_colors() }}", json!({})).unwrap();
        assert!(out.contains(crate::model::SIGNATURE_MARKER));
        assert!(out.contains(r"NC='\033[0m'"));
    }
}
