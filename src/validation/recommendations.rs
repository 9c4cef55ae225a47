//! Style recommendations, one per triggered condition.

use crate::model::{Language, SIGNATURE_MARKER};

/// `attribution` adds the check for the attribution marker.
pub fn recommend(code: &str, language: Language, attribution: bool) -> Vec<String> {
    let mut recommendations = Vec::new();
    let mut suggest = |text: &str| recommendations.push(text.to_string());

    match language {
        Language::Python => {
            if !code.contains("try:") && !code.contains("except") {
                suggest("Consider adding error handling with try/except blocks");
            }
            if !code.contains("logging") && !code.contains("print") {
                suggest("Consider adding logging for better debugging");
            }
            if !code.contains("if __name__ == \"__main__\":") {
                suggest("Consider adding main guard for better module structure");
            }
            if !code.contains("\"\"\"") {
                suggest("Consider adding docstrings for better documentation");
            }
            if code.contains("import *") {
                suggest("Avoid wildcard imports - import specific functions instead");
            }
        }
        Language::Bash => {
            if !["echo", "printf", "logger"].iter().any(|cmd| code.contains(cmd)) {
                suggest("Consider adding logging for better debugging");
            }
            if !code.contains("set -e") {
                suggest("Consider adding \"set -e\" for better error handling");
            }
            if !code.starts_with("#!/usr/bin/env bash") && !code.starts_with("#!/bin/bash") {
                suggest("Add proper shebang line for better portability");
            }
            if code.contains("$1") && !code.contains("$#") {
                suggest("Consider checking argument count before using positional parameters");
            }
        }
    }

    if attribution && !code.contains(SIGNATURE_MARKER) {
        suggest("Consider adding scrypgen attribution markers to generated code");
    }

    recommendations
}
