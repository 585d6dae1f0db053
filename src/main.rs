use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sheetwright::artifact::Artifact;
use sheetwright::executor::{ExecutionOutcome, ProgramExecutor, ScriptExecutor};
use sheetwright::llm::{Credential, GeminiClient};
use sheetwright::program::{CandidateProgram, extract, sanitize_report};
use sheetwright::prompt::PromptBuilder;
use sheetwright::repair::{GenerationRequest, RepairFailure, RepairLoop};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(config: &Config) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sheetwright")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("sheetwright.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let default_level = config.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Generate {
            task,
            model,
            output,
            api_key,
            show_program,
        } => handle_generate_command(task, model.as_deref(), output.as_deref(), api_key, *show_program, config).await,
        Commands::Render { script, output } => handle_render_command(script, output.as_deref(), config),
        Commands::Prompt { task } => handle_prompt_command(task),
    }
}

async fn handle_generate_command(
    task: &str,
    model: Option<&str>,
    output: Option<&Path>,
    api_key: &str,
    show_program: bool,
    config: &Config,
) -> Result<()> {
    if task.trim().is_empty() {
        eyre::bail!("Please describe the spreadsheet you want");
    }

    let model = model.unwrap_or(&config.llm.model);
    info!("Generating spreadsheet with model {}: {}", model, task);
    println!("{} {}", "Generating:".green(), task);

    let client = GeminiClient::new(config.llm.client_config()).context("Failed to create generation client")?;
    let runner = RepairLoop::with_config(Arc::new(client), Arc::new(ScriptExecutor::new()), config.repair_config());

    let request = GenerationRequest::new(task, model);
    match runner.run(&request, &Credential::new(api_key)).await {
        Ok(success) => {
            let path = output_path(output, config);
            success
                .artifact
                .write_to(&path)
                .context(format!("Failed to write {}", path.display()))?;

            info!("Wrote {} as {}", path.display(), success.artifact.mime_type());
            println!(
                "{} {} ({} bytes, {} attempt(s))",
                "Saved:".green().bold(),
                path.display(),
                success.artifact.len(),
                success.attempts
            );
            if show_program {
                print_program(&success.program);
            }
            Ok(())
        }
        Err(failure) => {
            report_failure(&failure);
            Err(failure.into())
        }
    }
}

fn handle_render_command(script: &Path, output: Option<&Path>, config: &Config) -> Result<()> {
    info!("Rendering local script: {}", script.display());
    let raw = fs::read_to_string(script).context(format!("Failed to read {}", script.display()))?;

    let sanitized = sanitize_report(&extract(&raw));
    if sanitized.removed > 0 {
        println!(
            "{} removed {} conditional-formatting line(s)",
            "Warning:".yellow(),
            sanitized.removed
        );
    }

    match ScriptExecutor::new().execute(&sanitized.program) {
        ExecutionOutcome::Success(artifact) => {
            let path = output_path(output, config);
            artifact
                .write_to(&path)
                .context(format!("Failed to write {}", path.display()))?;
            info!("Wrote {} as {}", path.display(), artifact.mime_type());
            println!("{} {} ({} bytes)", "Saved:".green().bold(), path.display(), artifact.len());
            Ok(())
        }
        ExecutionOutcome::Failure(fault) => {
            println!("{} {}", "Script failed:".red().bold(), fault);
            eyre::bail!("Script failed: {}", fault)
        }
    }
}

fn handle_prompt_command(task: &str) -> Result<()> {
    println!("{}", PromptBuilder::new().build(task));
    Ok(())
}

fn output_path(output: Option<&Path>, config: &Config) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => config
            .output
            .dir
            .join(Artifact::suggested_file_name(&config.output.file_prefix, &chrono::Local::now())),
    }
}

fn report_failure(failure: &RepairFailure) {
    let label = match failure {
        RepairFailure::BackendRejected { .. } => "Backend rejected the request:",
        RepairFailure::BackendUnavailable { .. } => "Connection failed:",
        RepairFailure::AttemptsExhausted { .. } => "Generation failed:",
    };
    println!("{} {}", label.red().bold(), failure);
    if let Some(program) = failure.last_program() {
        print_program(program);
    }
}

fn print_program(program: &CandidateProgram) {
    println!("{}", "--- script ---".cyan());
    println!("{}", program);
    println!("{}", "--------------".cyan());
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging
    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
