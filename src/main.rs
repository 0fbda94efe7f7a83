use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clinic_agent::agent::{RunOutcome, WorkflowAgent};
use clinic_agent::audit::{AuditEventKind, JsonlAuditSink, read_events};
use clinic_agent::llm::OpenAiClient;
use clinic_agent::operations::{ClinicBackend, MockClinic, OperationRegistry};
use clinic_agent::schema::SchemaRegistry;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, RunArgs, audit_skip};
use config::Config;

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clinic-agent")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("clinic-agent.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.unwrap_or("info")))
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
        None => handle_run_command(&RunArgs::default(), cli.is_verbose(), config).await,
        Some(Commands::Run(args)) => handle_run_command(args, cli.is_verbose(), config).await,
        Some(Commands::Tools) => handle_tools_command(),
        Some(Commands::Audit { limit }) => handle_audit_command(*limit, config),
    }
}

async fn handle_run_command(args: &RunArgs, verbose: bool, config: &Config) -> Result<()> {
    let query = args.query();
    let dry_run = args.dry_run(config.agent.dry_run);
    info!("Running workflow (dry_run={}): {}", dry_run, query);

    let llm = OpenAiClient::from_env(&config.llm.api_key_env, config.llm.to_client_config())
        .context("Failed to create model client")?;
    let audit = JsonlAuditSink::new(&config.audit.path)
        .context(format!("Failed to open audit log {}", config.audit.path.display()))?;
    let backend: Arc<dyn ClinicBackend> = Arc::new(MockClinic::new());

    let agent = WorkflowAgent::with_config(
        Arc::new(llm),
        Arc::new(SchemaRegistry::standard()),
        Arc::new(OperationRegistry::standard(backend)),
        Arc::new(audit),
        config.agent.to_agent_config(config.llm.max_tokens),
    );

    println!("{} {}", "Request:".cyan(), query);
    if dry_run {
        println!("{}", "Dry run: no operation will be executed".yellow());
    }

    let report = agent.run_workflow_with_report(query, dry_run).await;

    if verbose {
        println!(
            "{} {} ({} decision(s))",
            "Run:".cyan(),
            report.run_id,
            report.iterations
        );
    }
    println!("{}", status_line(&report.outcome));
    println!(
        "{}",
        serde_json::to_string_pretty(&report.outcome).context("Failed to render outcome")?
    );
    Ok(())
}

fn status_line(outcome: &RunOutcome) -> ColoredString {
    let status = format!("Status: {}", outcome.status());
    match outcome {
        RunOutcome::Completed { .. } => status.green().bold(),
        RunOutcome::DryRun { .. } => status.yellow().bold(),
        RunOutcome::Refused { .. } => status.magenta().bold(),
        RunOutcome::Error { .. } | RunOutcome::BudgetExceeded { .. } => status.red().bold(),
    }
}

fn handle_tools_command() -> Result<()> {
    let schemas = SchemaRegistry::standard();
    for descriptor in schemas.descriptors() {
        let mut header = format!("{} ({:?})", descriptor.name, descriptor.cardinality).to_lowercase();
        if descriptor.terminal {
            header.push_str(" [terminal]");
        }
        println!("{}", header.green().bold());
        println!("  {}", descriptor.description);
        println!(
            "{}",
            serde_json::to_string_pretty(&descriptor.schema.to_json_schema()).context("Failed to render schema")?
        );
    }
    Ok(())
}

fn handle_audit_command(limit: usize, config: &Config) -> Result<()> {
    let events = read_events(&config.audit.path)
        .context(format!("Failed to read audit log {}", config.audit.path.display()))?;

    if events.is_empty() {
        println!("{}", "No audit events recorded".yellow());
        return Ok(());
    }

    let skip = audit_skip(events.len(), limit);
    for event in events.iter().skip(skip) {
        let kind = match event.event_type {
            AuditEventKind::FinalOutput => event.event_type.as_str().green(),
            AuditEventKind::ToolCall => event.event_type.as_str().cyan(),
            AuditEventKind::Refusal => event.event_type.as_str().magenta(),
            _ => event.event_type.as_str().red(),
        };
        println!("{} {} {}", event.timestamp.to_rfc3339(), kind, event.payload);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    // API key may live in a .env file
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
