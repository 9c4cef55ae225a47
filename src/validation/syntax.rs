//! Syntax checking through the language's own toolchain.

use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, warn};

use crate::error::{GeneratorError, Result};
use crate::health::ComponentHealth;
use crate::model::Language;

pub const DEFAULT_SYNTAX_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one syntax check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxVerdict {
    Passed,
    /// The checker rejected the code; carries the checker's diagnostic.
    Failed(String),
    /// The checker could not give an answer (missing program, timeout).
    Unavailable(String),
}

#[async_trait]
pub trait SyntaxChecker: Send + Sync {
    async fn check(&self, code: &str, language: Language) -> Result<SyntaxVerdict>;

    async fn probe(&self) -> ComponentHealth;
}

/// Program plus leading arguments; the script path is appended last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CheckerCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    pub fn python(program: impl Into<String>) -> Self {
        Self::new(program, &["-m", "py_compile"])
    }

    pub fn bash(program: impl Into<String>) -> Self {
        Self::new(program, &["-n"])
    }
}

/// Writes the code into a private temporary directory and runs the
/// language's compiler in check-only mode against it.
#[derive(Debug, Clone)]
pub struct ProcessSyntaxChecker {
    python: CheckerCommand,
    bash: CheckerCommand,
    timeout: Duration,
    temp_root: Option<PathBuf>,
}

impl Default for ProcessSyntaxChecker {
    fn default() -> Self {
        Self::new(
            CheckerCommand::python("python3"),
            CheckerCommand::bash("bash"),
            DEFAULT_SYNTAX_TIMEOUT,
        )
    }
}

impl ProcessSyntaxChecker {
    pub fn new(python: CheckerCommand, bash: CheckerCommand, timeout: Duration) -> Self {
        Self {
            python,
            bash,
            timeout,
            temp_root: None,
        }
    }

    /// Creates scratch directories under `root` instead of the system temp dir.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    fn command_for(&self, language: Language) -> &CheckerCommand {
        match language {
            Language::Python => &self.python,
            Language::Bash => &self.bash,
        }
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("scrypgen-check-");
        match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    async fn program_version(&self, command: &CheckerCommand) -> bool {
        let run = Command::new(&command.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();
        matches!(time::timeout(self.timeout, run).await, Ok(Ok(status)) if status.success())
    }

    fn temp_root_writable(&self) -> bool {
        let file = match &self.temp_root {
            Some(root) => tempfile::NamedTempFile::new_in(root),
            None => tempfile::NamedTempFile::new(),
        };
        file.is_ok()
    }
}

#[async_trait]
impl SyntaxChecker for ProcessSyntaxChecker {
    async fn check(&self, code: &str, language: Language) -> Result<SyntaxVerdict> {
        // Dropping the guard removes the directory on every return path.
        let scratch = self
            .scratch_dir()
            .map_err(|e| GeneratorError::Validation(format!("cannot create temp dir: {e}")))?;
        let script = scratch.path().join(format!("script.{}", language.extension()));
        tokio::fs::write(&script, code)
            .await
            .map_err(|e| GeneratorError::Validation(format!("cannot write script: {e}")))?;

        let command = self.command_for(language);
        let child = Command::new(&command.program)
            .args(&command.args)
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(error) => {
                warn!(program = %command.program, %error, "syntax checker unavailable");
                return Ok(SyntaxVerdict::Unavailable(format!(
                    "{} syntax check skipped: could not run {} ({error})",
                    language.display_name(),
                    command.program
                )));
            }
        };

        let output = match time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                warn!(program = %command.program, %error, "syntax checker failed");
                return Ok(SyntaxVerdict::Unavailable(format!(
                    "{} syntax check skipped: {error}",
                    language.display_name()
                )));
            }
            Err(_) => {
                warn!(program = %command.program, timeout = ?self.timeout, "syntax check timed out");
                return Ok(SyntaxVerdict::Unavailable(format!(
                    "{} syntax check skipped: timed out after {:?}",
                    language.display_name(),
                    self.timeout
                )));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let flagged = stderr.contains("SyntaxError") || stderr.contains("syntax error");
        debug!(%language, status = ?output.status.code(), "syntax check finished");

        if output.status.success() && !flagged {
            return Ok(SyntaxVerdict::Passed);
        }
        let detail = if stderr.is_empty() {
            match output.status.code() {
                Some(code) => format!("checker exited with status {code}"),
                None => "checker terminated by signal".to_string(),
            }
        } else {
            stderr
        };
        Ok(SyntaxVerdict::Failed(format!(
            "{} syntax error: {detail}",
            language.display_name()
        )))
    }

    async fn probe(&self) -> ComponentHealth {
        let python = self.program_version(&self.python).await;
        let bash = self.program_version(&self.bash).await;
        let temp_dir = self.temp_root_writable();
        let details = json!({
            "python": python,
            "bash": bash,
            "tempDir": temp_dir,
        });

        match (python, bash, temp_dir) {
            (true, true, true) => ComponentHealth::healthy_with_details("validator", details),
            (_, _, false) | (false, false, _) => ComponentHealth::unhealthy_with_details(
                "validator",
                "No syntax checking is possible",
                details,
            ),
            _ => ComponentHealth::degraded_with_details(
                "validator",
                "Some validation tools missing",
                details,
            ),
        }
    }
}
