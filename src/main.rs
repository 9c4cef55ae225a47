use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scrypgen::{
    CliArgs, GenerationRequest, GenerationResult, GeneratorConfig, IntegrationKind,
    LanguagePreference, LoggingConfig, ScriptGenerator, init_logging,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "scrypgen",
    about = "Generate Python and Bash scripts from plain-language descriptions",
    version
)]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a script from a description
    Generate(GenerateArgs),
    /// Generate every request in a JSON or YAML list
    Batch {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, help = "Print the batch report as JSON")]
        json: bool,
    },
    /// Wrap a terminal command so it can be triggered through KDE Connect
    KdeTransform {
        command: String,
        #[arg(short, long, default_value = "Transformed Command")]
        name: String,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Create a Nemo file manager action
    NemoAction {
        description: String,
        #[arg(short, long, default_value = "Custom Action")]
        name: String,
        #[arg(short, long, value_name = "DIR", default_value = "nemo_action")]
        output: PathBuf,
    },
    /// Report availability of analyzer, templates and syntax checkers
    Health,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    description: String,
    #[arg(short, long, value_enum, default_value_t = LanguagePreference::Auto)]
    language: LanguagePreference,
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    #[arg(long, help = "Add a Nemo file manager action")]
    nemo: bool,
    #[arg(long, help = "Add a KDE Connect command entry")]
    kde: bool,
    #[arg(long, help = "Add a VS Code task")]
    vscode: bool,
    #[arg(long, help = "Add a test skeleton")]
    tests: bool,
    #[arg(long, help = "Add a Markdown usage document")]
    docs: bool,
    #[arg(long, help = "Print the full result as JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(LoggingConfig::from_env().verbose(cli.args.verbose))?;

    let config = GeneratorConfig::from_args(cli.args)?;
    config.validate()?;
    let generator =
        ScriptGenerator::new(config.clone()).context("failed to initialize the script generator")?;

    match cli.command {
        Command::Generate(args) => generate(&generator, &config, args).await,
        Command::Batch { file, json } => batch(&generator, &file, json).await,
        Command::KdeTransform {
            command,
            name,
            output,
        } => {
            let result = generator
                .generate_kde_connect_script(&format!("Transform the command: {command}"), &command)
                .await;
            let output = output.map(|path| config.resolve_output(path));
            if result.success {
                eprintln!("KDE Connect script '{name}' generated");
            }
            report(&result, output.as_deref(), false)
        }
        Command::NemoAction {
            description,
            name,
            output,
        } => {
            let result = generator.generate_nemo_action(&description, &name).await;
            let dir = config.resolve_output(output);
            let script = dir.join(format!("{}.sh", slug(&name)));
            report(&result, result.success.then_some(script.as_path()), false)
        }
        Command::Health => {
            let health = generator.health().await;
            println!("{}", serde_json::to_string_pretty(&health)?);
            Ok(exit_code(health.status.exit_code() == 0))
        }
    }
}

async fn generate(
    generator: &ScriptGenerator,
    config: &GeneratorConfig,
    args: GenerateArgs,
) -> Result<ExitCode> {
    let mut request = GenerationRequest::new(args.description).with_language(args.language);
    for (enabled, kind) in [
        (args.nemo, IntegrationKind::Nemo),
        (args.kde, IntegrationKind::KdeConnect),
        (args.vscode, IntegrationKind::Vscode),
    ] {
        if enabled {
            request = request.with_integration(kind);
        }
    }
    request.include_tests = args.tests;
    request.include_documentation = args.docs;

    let result = generator.generate(&request).await;
    let output = args.output.map(|path| config.resolve_output(path));
    report(&result, output.as_deref(), args.json)
}

async fn batch(generator: &ScriptGenerator, file: &Path, json: bool) -> Result<ExitCode> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("failed to read batch file {:?}", file))?;
    let is_json = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let requests: Vec<GenerationRequest> = if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON batch {:?}", file))?
    } else {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML batch {:?}", file))?
    };

    let report = generator.generate_batch(&requests).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (index, result) in report.results.iter().enumerate() {
            let status = if result.success { "ok" } else { "failed" };
            println!(
                "[{}] {status}: {} ({})",
                index + 1,
                result.metadata.template_used,
                result.language
            );
            print_bullets("Errors", &result.errors);
        }
        println!(
            "Batch complete: {} successful, {} failed",
            report.successful, report.failed
        );
    }
    Ok(exit_code(report.failed == 0))
}

/// Prints or writes one result. Integration files land next to the script.
fn report(result: &GenerationResult, output: Option<&Path>, json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else if output.is_none() || !result.success {
        if !result.code.is_empty() {
            println!("{}", result.code);
        }
    }

    if let (Some(path), true) = (output, result.success) {
        write_file(path, &result.code, true)?;
        eprintln!("Script saved to {}", path.display());

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        for file in &result.integration_files {
            let target = if file.path.starts_with('~') {
                dir.join(&file.filename)
            } else {
                dir.join(&file.path)
            };
            write_file(&target, &file.content, file.executable)?;
            eprintln!("{} file saved to {}", file.kind, target.display());
        }
    }

    if !json {
        print_bullets("Errors", &result.errors);
        print_bullets("Warnings", &result.warnings);
        print_bullets("Suggestions", &result.suggestions);
    }
    Ok(exit_code(result.success))
}

fn print_bullets(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    eprintln!("{title}:");
    for (index, item) in items.iter().enumerate() {
        eprintln!("  {}. {item}", index + 1);
    }
}

fn write_file(path: &Path, content: &str, executable: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {:?}", parent))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {:?}", path))?;

    #[cfg(unix)]
    if executable {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to mark {:?} executable", path))?;
    }
    #[cfg(not(unix))]
    let _ = executable;

    Ok(())
}

fn slug(name: &str) -> String {
    let slug = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if slug.is_empty() { "action".to_string() } else { slug }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
