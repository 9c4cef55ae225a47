//! Pattern scan for risky constructs in generated code.
//!
//! Findings are advisory. Each rule that matches contributes exactly one
//! warning, no matter how often its pattern occurs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Language;

struct SecurityRule {
    message: &'static str,
    pattern: Regex,
    /// `None` applies to every language.
    language: Option<Language>,
    /// A comment that acknowledges the construct and silences the rule.
    exemption: Option<&'static str>,
}

fn rule(
    message: &'static str,
    pattern: &str,
    language: Option<Language>,
    exemption: Option<&'static str>,
) -> SecurityRule {
    SecurityRule {
        message,
        pattern: Regex::new(pattern).expect("Invalid regex"),
        language,
        exemption,
    }
}

static RULES: Lazy<Vec<SecurityRule>> = Lazy::new(|| {
    use Language::{Bash, Python};
    vec![
        rule("Security warning: Detected eval usage", r"\beval\s*\(", Some(Python), None),
        rule("Security warning: Detected eval usage", r"(?m)(?:^|[;&|]\s*|\s)eval\s+", Some(Bash), None),
        rule("Security warning: Detected exec usage", r"\bexec\s*\(", Some(Python), None),
        rule("Security warning: Detected shell injection risk", r"shell\s*=\s*True", None, None),
        rule(
            "Security warning: Detected subprocess with shell",
            r"subprocess.*shell\s*=\s*True",
            None,
            None,
        ),
        rule("Security warning: Detected rm -rf usage", r"rm\s+-rf\s+", None, None),
        rule("Security warning: Detected sudo usage", r"\bsudo\s+", None, None),
        rule(
            "Security warning: Detected password in plaintext",
            r#"(?i)password\s*=\s*["'][^"']+["']"#,
            None,
            None,
        ),
        rule(
            "Security warning: Detected hardcoded credentials",
            r#"(?i)(api_key|secret|token)\s*=\s*["'][^"']+["']"#,
            None,
            None,
        ),
        rule(
            "Security warning: Pickle deserialization can be dangerous",
            r"\bpickle\.loads?\b",
            Some(Python),
            None,
        ),
        rule(
            "Security warning: Raw input() usage - consider validation",
            r"\binput\s*\(",
            Some(Python),
            Some("# safe input"),
        ),
        rule(
            "Security warning: Dynamic imports can load untrusted code",
            r"\b__import__\s*\(|\bimportlib\.import_module\s*\(",
            Some(Python),
            None,
        ),
        rule(
            "Security warning: Command substitution - ensure input validation",
            r"\$\([^(]|`[^`\n]+`",
            Some(Bash),
            Some("# safe command substitution"),
        ),
        rule(
            "Security warning: Unquoted positional parameter - quote expansions like \"$1\"",
            r"(?m)(?:^|[\s=(])\$[1-9@*](?:[\s;)|&]|$)",
            Some(Bash),
            None,
        ),
        rule(
            "Security warning: Accessing sensitive system files",
            r"/etc/(?:passwd|shadow|sudoers)\b|\.ssh/id_",
            None,
            None,
        ),
    ]
});

pub fn scan(code: &str, language: Language) -> Vec<String> {
    let mut warnings: Vec<String> = Vec::new();
    for rule in RULES.iter() {
        if rule.language.is_some_and(|only| only != language) {
            continue;
        }
        if rule.exemption.is_some_and(|marker| code.contains(marker)) {
            continue;
        }
        if rule.pattern.is_match(code) && !warnings.iter().any(|w| w == rule.message) {
            warnings.push(rule.message.to_string());
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_risks() {
        let code = "import subprocess, pickle\nsubprocess.run(cmd, shell=True)\npassword = \"hunter2\"\ndata = pickle.loads(blob)\n";
        let warnings = scan(code, Language::Python);
        assert_eq!(
            warnings,
            vec![
                "Security warning: Detected shell injection risk",
                "Security warning: Detected subprocess with shell",
                "Security warning: Detected password in plaintext",
                "Security warning: Pickle deserialization can be dangerous",
            ]
        );
    }

    #[test]
    fn test_rule_table() {
        let cases: &[(&str, Language, &[&str])] = &[
            ("x = eval(expr)\n", Language::Python, &["Security warning: Detected eval usage"]),
            ("exec(source)\n", Language::Python, &["Security warning: Detected exec usage"]),
            ("eval \"$cmd\"\n", Language::Bash, &["Security warning: Detected eval usage"]),
            ("mod = __import__(name)\n", Language::Python, &[
                "Security warning: Dynamic imports can load untrusted code",
            ]),
            ("API_KEY = \"abc123\"\n", Language::Python, &[
                "Security warning: Detected hardcoded credentials",
            ]),
            ("rm -rf \"$dir\"\n", Language::Bash, &["Security warning: Detected rm -rf usage"]),
            ("print('hello')\n", Language::Python, &[]),
            ("echo \"$1\"\n", Language::Bash, &[]),
        ];

        for (code, language, expected) in cases {
            assert_eq!(scan(code, *language), *expected, "{code:?} as {language}");
        }
    }

    #[test]
    fn test_repeated_matches_report_once() {
        let python = "exec(a)\nexec(b)\nsubprocess.run(x, shell=True)\nsubprocess.run(y, shell=True)\n";
        assert_eq!(
            scan(python, Language::Python),
            vec![
                "Security warning: Detected exec usage",
                "Security warning: Detected shell injection risk",
                "Security warning: Detected subprocess with shell",
            ]
        );

        let bash = "sudo a\nsudo b\nx=$(ls)\ny=$(pwd)\n";
        assert_eq!(scan(bash, Language::Bash).len(), 2);
    }

    #[test]
    fn test_eval_reported_once() {
        let warnings = scan("eval(a)\neval(b)\n", Language::Python);
        assert_eq!(warnings, vec!["Security warning: Detected eval usage"]);
    }

    #[test]
    fn test_input_exemption() {
        assert_eq!(scan("name = input('who? ')\n", Language::Python).len(), 1);
        assert!(scan("name = input('who? ')  # safe input\n", Language::Python).is_empty());
    }

    #[test]
    fn test_bash_substitution_but_not_arithmetic() {
        assert!(scan("n=$((n + 1))\n", Language::Bash).is_empty());
        assert_eq!(
            scan("today=$(date)\n", Language::Bash),
            vec!["Security warning: Command substitution - ensure input validation"]
        );
    }

    #[test]
    fn test_unquoted_positional() {
        assert_eq!(scan("cp $1 /backup\n", Language::Bash).len(), 1);
        assert!(scan("cp \"$1\" /backup\n", Language::Bash).is_empty());
        assert!(scan("echo \"args: $*\"\n", Language::Bash).is_empty());
    }

    #[test]
    fn test_language_scoping() {
        assert!(scan("today=$(date)\n", Language::Python).is_empty());
        assert!(scan("eval(x)", Language::Bash).is_empty());
        assert_eq!(scan("cat /etc/shadow\n", Language::Bash).len(), 1);
    }
}
