//! Templates registered in every catalog.
//!
//! Bodies are Tera sources. They must stay free of `{#` since Tera reads it
//! as a comment opener, which rules out Bash `${#var}`.

use serde_json::json;

use super::{Template, TemplateVariable, VariableKind, category};
use crate::model::Language;

pub fn templates() -> Vec<Template> {
    vec![
        python_basic(),
        python_gui(),
        python_file_processing(),
        python_web(),
        bash_basic(),
        bash_nemo_action(),
        bash_kde_connect(),
    ]
}

fn description_var() -> TemplateVariable {
    TemplateVariable::required("description", VariableKind::String, "Script description")
}

fn main_logic_var() -> TemplateVariable {
    TemplateVariable::required("main_logic", VariableKind::String, "Main script logic")
}

fn imports_var() -> TemplateVariable {
    TemplateVariable::optional("imports", VariableKind::Array, json!([]), "Python libraries to import")
}

fn commands_var() -> TemplateVariable {
    TemplateVariable::optional("commands", VariableKind::Array, json!([]), "System commands the script calls")
}

fn builtin(
    name: &str,
    language: Language,
    category: &str,
    description: &str,
    content: &str,
    variables: Vec<TemplateVariable>,
    requirements: &[&str],
) -> Template {
    Template {
        name: name.to_string(),
        language,
        category: category.to_string(),
        description: description.to_string(),
        content: content.to_string(),
        variables,
        requirements: requirements.iter().map(|r| r.to_string()).collect(),
        compliant: true,
    }
}

// =============================================================================
// PYTHON
// =============================================================================

fn python_basic() -> Template {
    builtin(
        "python_basic",
        Language::Python,
        category::BASIC,
        "Basic Python script with logging and a main guard",
        PYTHON_BASIC,
        vec![description_var(), imports_var(), main_logic_var()],
        &[],
    )
}

const PYTHON_BASIC: &str = r##"#!/usr/bin/env python3
"""{{ description }}

Generated by scrypgen ({{ complexity }} complexity).
{{ signature() }}
Dependencies: {{ dependencies | join(sep=", ") }}
"""

import logging
import sys
{% if imports %}{{ python_imports(libraries=imports) }}
{% endif %}
logging.basicConfig(
    level=logging.INFO,
    format="%(asctime)s - %(levelname)s - %(message)s",
    datefmt="%Y-%m-%d %H:%M:%S",
)
logger = logging.getLogger(__name__)


def main():
    """Main execution function."""
    logger.info("Starting script execution")
    try:
{{ main_logic | indent_block(width=8) }}
        logger.info("Script completed successfully")
    except Exception as error:
        logger.error("Script failed: %s", error)
        return 1
    return 0


if __name__ == "__main__":
    sys.exit(main())
"##;

fn python_gui() -> Template {
    builtin(
        "python_gui",
        Language::Python,
        category::GUI,
        "Tkinter desktop application with a dark theme",
        PYTHON_GUI,
        vec![
            description_var(),
            TemplateVariable::optional(
                "app_name",
                VariableKind::String,
                json!("Generated App"),
                "Window title and class name",
            ),
            TemplateVariable::optional(
                "features",
                VariableKind::Array,
                json!(["main_window"]),
                "Feature labels shown in the window",
            ),
            imports_var(),
            main_logic_var(),
        ],
        &["tkinter"],
    )
}

const PYTHON_GUI: &str = r##"#!/usr/bin/env python3
"""{{ description }}

Desktop application generated by scrypgen.
{{ signature() }}
Dependencies: {{ dependencies | join(sep=", ") }}
"""

import logging
import tkinter as tk
from tkinter import ttk, messagebox
{% if imports %}{{ python_imports(libraries=imports) }}
{% endif %}
logging.basicConfig(level=logging.INFO, format="%(asctime)s - %(levelname)s - %(message)s")
logger = logging.getLogger(__name__)

COLORS = {
    "background": "#0a0a0f",
    "surface": "#1a1a2e",
    "accent": "#00ff7f",
    "text": "#ffffff",
}

FEATURES = [{% for feature in features %}{{ feature | py_string }}, {% endfor %}]


class {{ app_name | identifier }}:
    """Main application window."""

    def __init__(self, root):
        self.root = root
        self.status_var = tk.StringVar(value="Ready")
        self.setup_window()
        self.create_widgets()

    def setup_window(self):
        self.root.title({{ app_name | py_string }})
        self.root.geometry("800x600")
        self.root.configure(bg=COLORS["background"])

    def create_widgets(self):
        frame = ttk.Frame(self.root, padding=20)
        frame.pack(fill=tk.BOTH, expand=True)
        ttk.Label(frame, text={{ app_name | py_string }}).pack(pady=(0, 20))
        for feature in FEATURES:
            ttk.Label(frame, text=feature.replace("_", " ").title()).pack(anchor=tk.W)

{{ main_logic | indent_block(width=8) }}

        ttk.Button(frame, text="About", command=self.show_about).pack(side=tk.BOTTOM, pady=10)
        ttk.Label(frame, textvariable=self.status_var).pack(side=tk.BOTTOM, fill=tk.X)

    def show_about(self):
        messagebox.showinfo("About", {{ app_name | py_string }} + " - generated by scrypgen")


def main():
    """Application entry point."""
    try:
        root = tk.Tk()
        {{ app_name | identifier }}(root)
        root.mainloop()
    except tk.TclError as error:
        logger.error("Could not start the application: %s", error)
        return 1
    return 0


if __name__ == "__main__":
    raise SystemExit(main())
"##;

fn python_file_processing() -> Template {
    builtin(
        "python_file_processing",
        Language::Python,
        category::FILE_PROCESSING,
        "File and directory processor with per-file error handling",
        PYTHON_FILE_PROCESSING,
        vec![description_var(), imports_var(), main_logic_var()],
        &["os", "logging"],
    )
}

const PYTHON_FILE_PROCESSING: &str = r##"#!/usr/bin/env python3
"""{{ description }}

File processing script generated by scrypgen.
{{ signature() }}
Dependencies: {{ dependencies | join(sep=", ") }}
"""

import logging
import os
import sys
from pathlib import Path
{% if imports %}{{ python_imports(libraries=imports) }}
{% endif %}
logging.basicConfig(level=logging.INFO, format="%(asctime)s - %(name)s - %(levelname)s - %(message)s")
logger = logging.getLogger(__name__)


class FileProcessor:
    """Walks an input path and processes every file it finds."""

    def __init__(self, input_path, output_path=None):
        self.input_path = Path(input_path)
        self.output_path = Path(output_path) if output_path else None
        self.processed_count = 0
        self.error_count = 0

    def process_files(self):
        """Process a single file or every file below a directory."""
        logger.info("Starting file processing: %s", self.input_path)
        if self.input_path.is_file():
            return self._process_single_file(self.input_path)
        if self.input_path.is_dir():
            return self._process_directory(self.input_path)
        logger.error("Invalid input path: %s", self.input_path)
        return False

    def _process_single_file(self, file_path):
        """Process one file."""
        try:
            logger.info("Processing file: %s", file_path)
{{ main_logic | indent_block(width=12) }}
            self.processed_count += 1
            return True
        except (OSError, ValueError) as error:
            logger.error("Failed to process %s: %s", file_path, error)
            self.error_count += 1
            return False

    def _process_directory(self, dir_path):
        """Process every file below a directory."""
        success = True
        for root, _dirs, files in os.walk(dir_path):
            for name in sorted(files):
                if not self._process_single_file(Path(root) / name):
                    success = False
        return success

    def get_stats(self):
        """Return processing statistics."""
        total = self.processed_count + self.error_count
        rate = (self.processed_count / total) * 100 if total else 0
        return {"processed": self.processed_count, "errors": self.error_count, "success_rate": rate}


def main():
    """Main execution function."""
    if len(sys.argv) < 2:
        logger.error("Usage: %s <input_path> [output_path]", sys.argv[0])
        return 1

    output_path = sys.argv[2] if len(sys.argv) > 2 else None
    processor = FileProcessor(sys.argv[1], output_path)
    success = processor.process_files()
    logger.info("Processing complete: %s", processor.get_stats())
    return 0 if success else 1


if __name__ == "__main__":
    sys.exit(main())
"##;

fn python_web() -> Template {
    builtin(
        "python_web",
        Language::Python,
        category::WEB,
        "HTTP client script built on the standard library",
        PYTHON_WEB,
        vec![description_var(), imports_var(), main_logic_var()],
        &["urllib"],
    )
}

const PYTHON_WEB: &str = r##"#!/usr/bin/env python3
"""{{ description }}

Web automation script generated by scrypgen.
{{ signature() }}
Dependencies: {{ dependencies | join(sep=", ") }}
"""

import logging
import sys
import urllib.request
from urllib.error import URLError
{% if imports %}{{ python_imports(libraries=imports) }}
{% endif %}
logging.basicConfig(level=logging.INFO, format="%(asctime)s - %(levelname)s - %(message)s")
logger = logging.getLogger(__name__)

DEFAULT_TIMEOUT = 30


def fetch(url, timeout=DEFAULT_TIMEOUT):
    """Fetch a URL and return the decoded body."""
    request = urllib.request.Request(url, headers={"User-Agent": "scrypgen-script/1.0"})
    with urllib.request.urlopen(request, timeout=timeout) as response:
        charset = response.headers.get_content_charset() or "utf-8"
        return response.read().decode(charset)


def main():
    """Main execution function."""
    if len(sys.argv) < 2:
        logger.error("Usage: %s <url>", sys.argv[0])
        return 1

    url = sys.argv[1]
    try:
{{ main_logic | indent_block(width=8) }}
        body = fetch(url)
        logger.info("Received %d characters from %s", len(body), url)
    except URLError as error:
        logger.error("Request failed: %s", error)
        return 1
    return 0


if __name__ == "__main__":
    sys.exit(main())
"##;

// =============================================================================
// BASH
// =============================================================================

fn bash_basic() -> Template {
    builtin(
        "bash_basic",
        Language::Bash,
        category::BASIC,
        "Strict-mode Bash script with colored logging",
        BASH_BASIC,
        vec![description_var(), commands_var(), main_logic_var()],
        &[],
    )
}

const BASH_BASIC: &str = r##"#!/usr/bin/env bash
#
# {{ description }}
# Generated by scrypgen ({{ complexity }} complexity).
{{ signature() }}
# Dependencies: {{ dependencies | join(sep=", ") }}
#

set -e
set -u
set -o pipefail

{{ neon_colors() }}

log_info() {
    echo -e "${CYAN}[INFO]${NC} $*"
}

log_success() {
    echo -e "${GREEN}[SUCCESS]${NC} $*"
}

log_error() {
    echo -e "${RED}[ERROR]${NC} $*" >&2
}

cleanup() {
    local exit_code=$?
    if [ "$exit_code" -ne 0 ]; then
        log_error "Script exited with status $exit_code"
    fi
}

trap cleanup EXIT
{% if commands %}
{{ bash_dependencies(commands=commands) }}
{% endif %}
main() {
    log_info "Starting script execution"
{% if commands %}    check_dependencies
{% endif %}
{{ main_logic | indent_block(width=4) }}

    log_success "Script completed successfully"
}

main "$@"
"##;

fn bash_nemo_action() -> Template {
    builtin(
        "bash_nemo_action",
        Language::Bash,
        category::NEMO_INTEGRATION,
        "Nemo file manager action handling the selected files",
        BASH_NEMO_ACTION,
        vec![
            description_var(),
            TemplateVariable::required("action_name", VariableKind::String, "Action label"),
            TemplateVariable::required("file_logic", VariableKind::String, "Per-file logic"),
        ],
        &["zenity"],
    )
}

const BASH_NEMO_ACTION: &str = r##"#!/usr/bin/env bash
#
# {{ description }}
# Nemo file manager action: {{ action_name }}
{{ signature() }}
# Dependencies: {{ dependencies | join(sep=", ") }}
#

set -e

{{ neon_colors() }}

ACTION_NAME={{ action_name | shell_quote }}

HAS_ZENITY=false
if command -v zenity &> /dev/null; then
    HAS_ZENITY=true
fi

show_message() {
    local message="$1"
    if [ "$HAS_ZENITY" = true ]; then
        zenity --info --title="$ACTION_NAME" --text="$message" --width=400
    else
        echo -e "${GREEN}[$ACTION_NAME]${NC} $message"
    fi
}

show_error() {
    local message="$1"
    if [ "$HAS_ZENITY" = true ]; then
        zenity --error --title="$ACTION_NAME" --text="$message" --width=400
    else
        echo -e "${RED}[$ACTION_NAME]${NC} $message" >&2
    fi
}

process_single_file() {
    local file="$1"
{{ file_logic | indent_block(width=4) }}
    return 0
}

process_files() {
    local processed=0
    local failed=0
    local file
    for file in "$@"; do
        if [ -e "$file" ] && process_single_file "$file"; then
            processed=$((processed + 1))
        else
            echo -e "${YELLOW}Skipped:${NC} $file"
            failed=$((failed + 1))
        fi
    done
    show_message "Processed: $processed, failed: $failed"
}

main() {
    if [ $# -eq 0 ]; then
        show_error "No files selected. Select files in Nemo and try again."
        exit 1
    fi
    process_files "$@"
}

main "$@"
"##;

fn bash_kde_connect() -> Template {
    builtin(
        "bash_kde_connect",
        Language::Bash,
        category::KDE_CONNECT,
        "Command wrapper that reports results through KDE Connect",
        BASH_KDE_CONNECT,
        vec![
            description_var(),
            TemplateVariable::required(
                "original_command",
                VariableKind::String,
                "Command as typed on the phone",
            ),
            TemplateVariable::required(
                "transformed_logic",
                VariableKind::String,
                "Commands run on the desktop",
            ),
        ],
        &["notify-send"],
    )
}

const BASH_KDE_CONNECT: &str = r##"#!/usr/bin/env bash
#
# {{ description }}
# KDE Connect command runner
{{ signature() }}
# Dependencies: {{ dependencies | join(sep=", ") }}
#

set -e

{{ neon_colors() }}

ORIGINAL_COMMAND={{ original_command | shell_quote }}
DEVICE_NAME="${KDE_DEVICE_NAME:-phone}"
LOG_FILE="${TMPDIR:-/tmp}/kde_command_$$.log"

log_info() {
    echo -e "${CYAN}[KDE]${NC} $*"
    echo "[INFO] $*" >> "$LOG_FILE"
}

log_error() {
    echo -e "${RED}[KDE]${NC} $*" >&2
    echo "[ERROR] $*" >> "$LOG_FILE"
}

send_notification() {
    local title="$1"
    local message="$2"
    local urgency="${3:-normal}"
    if command -v notify-send &> /dev/null; then
        notify-send -u "$urgency" "$title" "$message"
    fi
    if command -v kdeconnect-cli &> /dev/null; then
        kdeconnect-cli --name "$DEVICE_NAME" --ping-msg "$title: $message" 2> /dev/null || true
    fi
}

run_transformed_command() {
{{ transformed_logic | indent_block(width=4) }}
}

main() {
    log_info "Running: $ORIGINAL_COMMAND"
    local exit_code=0
    run_transformed_command || exit_code=$?

    if [ "$exit_code" -eq 0 ]; then
        send_notification "Command succeeded" "$ORIGINAL_COMMAND" low
        log_info "Command executed successfully"
    else
        send_notification "Command failed" "Exit code $exit_code" critical
        log_error "Command failed with exit code $exit_code"
    fi

    log_info "Log saved to $LOG_FILE"
    return "$exit_code"
}

main "$@"
"##;
