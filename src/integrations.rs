//! Companion files for desktop integrations, tests and documentation.
//!
//! Paths use `~` for the user's home so results stay portable. Callers that
//! write files to disk expand it themselves.

use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::model::{
    Analysis, EntityLabel, GenerationRequest, Integration, IntegrationFile, IntegrationKind,
    Language,
};

const NEMO_ACTIONS_DIR: &str = "~/.local/share/nemo/actions";
const KDE_CONNECT_DIR: &str = "~/.config/kdeconnect";
const LOCAL_BIN_DIR: &str = "~/.local/bin";

/// The generated script plus what is known about it.
#[derive(Debug, Clone, Copy)]
pub struct ScriptArtifact<'a> {
    pub code: &'a str,
    pub language: Language,
    pub analysis: &'a Analysis,
    pub dependencies: &'a [String],
}

impl ScriptArtifact<'_> {
    /// File stem shared by every companion file, e.g. `file_processing`.
    pub fn stem(&self) -> String {
        self.analysis.intent.primary.to_string()
    }

    pub fn filename(&self) -> String {
        format!("{}.{}", self.stem(), self.language.extension())
    }

    fn interpreter(&self) -> &'static str {
        match self.language {
            Language::Python => "python3",
            Language::Bash => "bash",
        }
    }
}

/// Files for every enabled integration in request order, then the test
/// skeleton and documentation when asked for.
pub fn build(request: &GenerationRequest, script: &ScriptArtifact<'_>) -> Result<Vec<IntegrationFile>> {
    let mut files = Vec::new();

    for integration in request.integrations.iter().filter(|i| i.enabled) {
        match integration.kind {
            IntegrationKind::Nemo => files.extend(nemo(request, integration, script)),
            IntegrationKind::KdeConnect => files.push(kde_connect(integration, script)?),
            IntegrationKind::Vscode => files.push(vscode(script)?),
            IntegrationKind::System => files.push(system_install(script)),
        }
    }

    if request.include_tests {
        files.push(test_skeleton(script));
    }
    if request.include_documentation {
        files.push(documentation(request, script));
    }

    Ok(files)
}

fn config_str<'a>(integration: &'a Integration, key: &str) -> Option<&'a str> {
    integration
        .config
        .as_ref()
        .and_then(|config| config.get(key))
        .and_then(Value::as_str)
}

fn title_case(stem: &str) -> String {
    stem.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| std::io::Error::from(e).into())
}

fn nemo(
    request: &GenerationRequest,
    integration: &Integration,
    script: &ScriptArtifact<'_>,
) -> Vec<IntegrationFile> {
    let stem = script.stem();
    let script_name = script.filename();
    let name = config_str(integration, "name")
        .map(str::to_string)
        .or_else(|| {
            request
                .template_overrides
                .get("action_name")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| title_case(&stem));
    let icon = config_str(integration, "icon").unwrap_or("system-run");

    let mut extensions: Vec<String> = script
        .analysis
        .entities
        .iter()
        .filter(|entity| entity.label == EntityLabel::File)
        .filter_map(|entity| entity.text.rsplit_once('.').map(|(_, ext)| ext.to_string()))
        .collect();
    extensions.sort();
    extensions.dedup();
    let extensions = if extensions.is_empty() {
        "any;".to_string()
    } else {
        extensions.iter().map(|ext| format!("{ext};")).collect()
    };

    let comment = request.description.lines().next().unwrap_or_default();
    let action = format!(
        "[Nemo Action]\n\
         Active=true\n\
         Name={name}\n\
         Comment={comment}\n\
         Exec=<{script_name} %F>\n\
         Icon-Name={icon}\n\
         Selection=Any\n\
         Extensions={extensions}\n\
         Quote=double\n"
    );

    vec![
        IntegrationFile {
            kind: IntegrationKind::Nemo.to_string(),
            filename: format!("{stem}.nemo_action"),
            content: action,
            path: format!("{NEMO_ACTIONS_DIR}/{stem}.nemo_action"),
            executable: false,
        },
        IntegrationFile {
            kind: IntegrationKind::Nemo.to_string(),
            filename: script_name.clone(),
            content: script.code.to_string(),
            path: format!("{NEMO_ACTIONS_DIR}/{script_name}"),
            executable: true,
        },
    ]
}

fn kde_connect(integration: &Integration, script: &ScriptArtifact<'_>) -> Result<IntegrationFile> {
    let stem = script.stem();
    let name = config_str(integration, "name")
        .map(str::to_string)
        .unwrap_or_else(|| title_case(&stem));

    let mut commands = Map::new();
    commands.insert(
        stem.clone(),
        json!({
            "name": name,
            "command": format!("{} {LOCAL_BIN_DIR}/{}", script.interpreter(), script.filename()),
        }),
    );

    Ok(IntegrationFile {
        kind: IntegrationKind::KdeConnect.to_string(),
        filename: format!("{stem}_kdeconnect.json"),
        content: pretty(&Value::Object(commands))?,
        path: format!("{KDE_CONNECT_DIR}/{stem}_kdeconnect.json"),
        executable: false,
    })
}

fn vscode(script: &ScriptArtifact<'_>) -> Result<IntegrationFile> {
    let tasks = json!({
        "version": "2.0.0",
        "tasks": [
            {
                "label": format!("Run {}", script.filename()),
                "type": "shell",
                "command": script.interpreter(),
                "args": [format!("${{workspaceFolder}}/{}", script.filename())],
                "group": "build",
                "presentation": { "reveal": "always", "panel": "shared" },
                "problemMatcher": []
            }
        ]
    });

    Ok(IntegrationFile {
        kind: IntegrationKind::Vscode.to_string(),
        filename: "tasks.json".to_string(),
        content: pretty(&tasks)?,
        path: ".vscode/tasks.json".to_string(),
        executable: false,
    })
}

fn system_install(script: &ScriptArtifact<'_>) -> IntegrationFile {
    let stem = script.stem();
    let script_name = script.filename();
    let content = format!(
        r#"#!/usr/bin/env bash
# Installs {script_name} into {LOCAL_BIN_DIR}
set -e

SOURCE_DIR="$(cd "$(dirname "${{BASH_SOURCE[0]}}")" && pwd)"
TARGET_DIR="$HOME/.local/bin"

mkdir -p "$TARGET_DIR"
install -m 755 "$SOURCE_DIR/{script_name}" "$TARGET_DIR/{script_name}"
echo "Installed {script_name} to $TARGET_DIR"
"#
    );

    IntegrationFile {
        kind: IntegrationKind::System.to_string(),
        filename: format!("install_{stem}.sh"),
        content,
        path: format!("install_{stem}.sh"),
        executable: true,
    }
}

fn test_skeleton(script: &ScriptArtifact<'_>) -> IntegrationFile {
    let stem = script.stem();
    let script_name = script.filename();
    let (filename, content, executable) = match script.language {
        Language::Python => (
            format!("test_{stem}.py"),
            format!(
                r#""""Tests for {script_name}."""

import py_compile
from pathlib import Path

SCRIPT = Path(__file__).with_name("{script_name}")


def test_script_exists():
    assert SCRIPT.is_file()


def test_script_compiles():
    py_compile.compile(str(SCRIPT), doraise=True)
"#
            ),
            false,
        ),
        Language::Bash => (
            format!("test_{stem}.sh"),
            format!(
                r#"#!/usr/bin/env bash
# Tests for {script_name}
set -e

SCRIPT="$(dirname "$0")/{script_name}"

if [ ! -f "$SCRIPT" ]; then
    echo "FAIL: $SCRIPT not found" >&2
    exit 1
fi

bash -n "$SCRIPT"
echo "PASS: $SCRIPT parses"
"#
            ),
            true,
        ),
    };

    IntegrationFile {
        kind: "tests".to_string(),
        path: filename.clone(),
        filename,
        content,
        executable,
    }
}

fn documentation(request: &GenerationRequest, script: &ScriptArtifact<'_>) -> IntegrationFile {
    let stem = script.stem();
    let script_name = script.filename();
    let analysis = script.analysis;
    let dependencies = if script.dependencies.is_empty() {
        "- none".to_string()
    } else {
        script
            .dependencies
            .iter()
            .map(|dep| format!("- {dep}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let content = format!(
        "# {title}\n\n\
         {description}\n\n\
         ## Details\n\n\
         - Language: {language}\n\
         - Complexity: {complexity}\n\
         - Intent: {primary}\n\n\
         ## Dependencies\n\n\
         {dependencies}\n\n\
         ## Usage\n\n\
         ```sh\n\
         {interpreter} {script_name}\n\
         ```\n",
        title = title_case(&stem),
        description = request.description.trim(),
        language = script.language.display_name(),
        complexity = analysis.complexity,
        primary = analysis.intent.primary,
        interpreter = script.interpreter(),
    );

    IntegrationFile {
        kind: "documentation".to_string(),
        filename: format!("{stem}.md"),
        content,
        path: format!("{stem}.md"),
        executable: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;

    fn analysis(text: &str) -> Analysis {
        Analyzer::new().analyze(text).unwrap()
    }

    #[test]
    fn test_disabled_integrations_produce_nothing() {
        let analysis = analysis("Print hello world");
        let mut request = GenerationRequest::new("Print hello world");
        request.integrations.push(Integration {
            kind: IntegrationKind::Nemo,
            enabled: false,
            config: None,
        });
        let script = ScriptArtifact {
            code: "echo hi",
            language: Language::Bash,
            analysis: &analysis,
            dependencies: &[],
        };
        assert!(build(&request, &script).unwrap().is_empty());
    }

    #[test]
    fn test_nemo_action_file() {
        let text = "Create nemo action to resize photo.jpg and notes.txt files";
        let analysis = analysis(text);
        let request = GenerationRequest::new(text)
            .with_integration(IntegrationKind::Nemo)
            .with_override("action_name", "Resize");
        let script = ScriptArtifact {
            code: "#!/usr/bin/env bash\n",
            language: Language::Bash,
            analysis: &analysis,
            dependencies: &[],
        };

        let files = build(&request, &script).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "nemo_integration.nemo_action");
        assert!(files[0].content.contains("Name=Resize\n"));
        assert!(files[0].content.contains("Exec=<nemo_integration.sh %F>"));
        assert!(files[0].content.contains("Extensions=txt;"));
        assert!(files[1].executable);
        assert_eq!(files[1].path, "~/.local/share/nemo/actions/nemo_integration.sh");
    }

    #[test]
    fn test_vscode_and_kde_json() {
        let analysis = analysis("Run remote command from my phone");
        let request = GenerationRequest::new("Run remote command from my phone")
            .with_integration(IntegrationKind::Vscode)
            .with_integration(IntegrationKind::KdeConnect);
        let script = ScriptArtifact {
            code: "",
            language: Language::Bash,
            analysis: &analysis,
            dependencies: &[],
        };

        let files = build(&request, &script).unwrap();
        let tasks: Value = serde_json::from_str(&files[0].content).unwrap();
        assert_eq!(tasks["tasks"][0]["command"], "bash");
        assert_eq!(files[0].path, ".vscode/tasks.json");

        let kde: Value = serde_json::from_str(&files[1].content).unwrap();
        assert_eq!(kde["kde_connect"]["command"], "bash ~/.local/bin/kde_connect.sh");
    }

    #[test]
    fn test_tests_and_docs() {
        let text = "Read CSV files and generate statistics";
        let analysis = analysis(text);
        let mut request = GenerationRequest::new(text);
        request.include_tests = true;
        request.include_documentation = true;
        let deps = vec!["os".to_string(), "pandas".to_string()];
        let script = ScriptArtifact {
            code: "",
            language: Language::Python,
            analysis: &analysis,
            dependencies: &deps,
        };

        let files = build(&request, &script).unwrap();
        assert_eq!(files[0].filename, "test_file_processing.py");
        assert!(files[0].content.contains("with_name(\"file_processing.py\")"));
        assert_eq!(files[1].kind, "documentation");
        assert!(files[1].content.contains("- pandas"));
        assert!(files[1].content.starts_with("# File Processing\n"));
    }
}
