use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::LanguagePreference;

const DEFAULT_SYNTAX_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PYTHON_PROGRAM: &str = "python3";
const DEFAULT_BASH_PROGRAM: &str = "bash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Used when a request asks for `auto`; `auto` here defers to analysis.
    pub default_language: LanguagePreference,
    /// Extra template definitions loaded at startup.
    pub template_directory: Option<PathBuf>,
    pub validate_scripts: bool,
    /// Recommend attribution markers on scripts that lack them.
    pub compliance: bool,
    pub syntax_timeout_secs: u64,
    pub python_program: String,
    pub bash_program: String,
    /// Parent for syntax-check scratch directories.
    pub temp_root: Option<PathBuf>,
    /// Base for relative output paths.
    pub output_directory: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_language: LanguagePreference::Auto,
            template_directory: None,
            validate_scripts: true,
            compliance: true,
            syntax_timeout_secs: DEFAULT_SYNTAX_TIMEOUT_SECS,
            python_program: DEFAULT_PYTHON_PROGRAM.to_string(),
            bash_program: DEFAULT_BASH_PROGRAM.to_string(),
            temp_root: None,
            output_directory: None,
        }
    }
}

impl GeneratorConfig {
    /// Reads a YAML, JSON or TOML file. Absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let partial = load_config_file(path)?;
        Ok(partial.apply(Self::default()))
    }

    /// Defaults, then the config file named by `--config`, then flags and
    /// `SCRYPGEN_*` variables.
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            language: cli_language,
            template_dir: cli_template_dir,
            no_validate,
            no_compliance,
            syntax_timeout: cli_syntax_timeout,
            python: cli_python,
            bash: cli_bash,
            temp_root: cli_temp_root,
            output_dir: cli_output_dir,
            verbose: _,
        } = args;

        let mut resolved = match config.as_ref() {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(language) = cli_language {
            resolved.default_language = language;
        }
        if let Some(dir) = cli_template_dir {
            resolved.template_directory = Some(dir);
        }
        if no_validate {
            resolved.validate_scripts = false;
        }
        if no_compliance {
            resolved.compliance = false;
        }
        if let Some(secs) = cli_syntax_timeout {
            resolved.syntax_timeout_secs = secs;
        }
        if let Some(program) = cli_python {
            resolved.python_program = program;
        }
        if let Some(program) = cli_bash {
            resolved.bash_program = program;
        }
        if let Some(root) = cli_temp_root {
            resolved.temp_root = Some(root);
        }
        if let Some(dir) = cli_output_dir {
            resolved.output_directory = Some(dir);
        }

        Ok(resolved)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.syntax_timeout_secs > 0,
            "syntax_timeout_secs must be greater than zero"
        );
        anyhow::ensure!(
            !self.python_program.trim().is_empty(),
            "python_program must not be empty"
        );
        anyhow::ensure!(
            !self.bash_program.trim().is_empty(),
            "bash_program must not be empty"
        );
        if let Some(root) = self.temp_root.as_ref() {
            anyhow::ensure!(root.is_dir(), "temp_root {:?} is not a directory", root);
        }
        Ok(())
    }

    pub fn syntax_timeout(&self) -> Duration {
        Duration::from_secs(self.syntax_timeout_secs)
    }

    /// Joins relative paths onto the output directory, when one is set.
    pub fn resolve_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        match self.output_directory.as_ref() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML, JSON or TOML)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "default-language",
        env = "SCRYPGEN_DEFAULT_LANGUAGE",
        value_enum,
        value_name = "LANG",
        help = "Language used when a request does not pick one",
        global = true
    )]
    pub language: Option<LanguagePreference>,

    #[arg(
        long,
        env = "SCRYPGEN_TEMPLATE_DIR",
        value_name = "DIR",
        help = "Directory of extra template definitions",
        global = true
    )]
    pub template_dir: Option<PathBuf>,

    #[arg(long, help = "Skip syntax validation of generated scripts", global = true)]
    pub no_validate: bool,

    #[arg(long, help = "Do not recommend attribution markers", global = true)]
    pub no_compliance: bool,

    #[arg(
        long,
        env = "SCRYPGEN_SYNTAX_TIMEOUT",
        value_name = "SECS",
        help = "Seconds a syntax check may run",
        value_parser = clap::value_parser!(u64),
        global = true
    )]
    pub syntax_timeout: Option<u64>,

    #[arg(
        long,
        env = "SCRYPGEN_PYTHON",
        value_name = "PROGRAM",
        help = "Python interpreter used for syntax checks",
        global = true
    )]
    pub python: Option<String>,

    #[arg(
        long,
        env = "SCRYPGEN_BASH",
        value_name = "PROGRAM",
        help = "Bash used for syntax checks",
        global = true
    )]
    pub bash: Option<String>,

    #[arg(
        long,
        env = "SCRYPGEN_TEMP_ROOT",
        value_name = "DIR",
        help = "Directory for syntax-check scratch files",
        global = true
    )]
    pub temp_root: Option<PathBuf>,

    #[arg(
        long,
        env = "SCRYPGEN_OUTPUT_DIR",
        value_name = "DIR",
        help = "Base directory for relative output paths",
        global = true
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(short, long, help = "Enable debug logging", global = true)]
    pub verbose: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    default_language: Option<LanguagePreference>,
    template_directory: Option<PathBuf>,
    validate_scripts: Option<bool>,
    compliance: Option<bool>,
    syntax_timeout_secs: Option<u64>,
    python_program: Option<String>,
    bash_program: Option<String>,
    temp_root: Option<PathBuf>,
    output_directory: Option<PathBuf>,
}

impl PartialConfig {
    fn apply(self, base: GeneratorConfig) -> GeneratorConfig {
        GeneratorConfig {
            default_language: self.default_language.unwrap_or(base.default_language),
            template_directory: self.template_directory.or(base.template_directory),
            validate_scripts: self.validate_scripts.unwrap_or(base.validate_scripts),
            compliance: self.compliance.unwrap_or(base.compliance),
            syntax_timeout_secs: self.syntax_timeout_secs.unwrap_or(base.syntax_timeout_secs),
            python_program: self.python_program.unwrap_or(base.python_program),
            bash_program: self.bash_program.unwrap_or(base.bash_program),
            temp_root: self.temp_root.or(base.temp_root),
            output_directory: self.output_directory.or(base.output_directory),
        }
    }
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        "toml" => toml::from_str(&contents)
            .with_context(|| format!("failed to parse TOML config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
