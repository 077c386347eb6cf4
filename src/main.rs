use std::io::{self, BufRead, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;

use breakup_recovery::agents::AgentFactory;
use breakup_recovery::cli::{Cli, Commands, KeyCommands, TelemetryCommands, command_label};
use breakup_recovery::config::{RuntimeConfig, load_profiles, resolve_runtime_config};
use breakup_recovery::credential::{
    CredentialStore, ResolvedCredential, env_default_credential, resolve_credential,
};
use breakup_recovery::doctor::run_doctor;
use breakup_recovery::error::{categorize_error, format_cli_error};
use breakup_recovery::keys::{run_key_clear, run_key_save, run_key_status};
use breakup_recovery::media::load_image_files;
use breakup_recovery::model::{GeminiConnector, ModelSettings};
use breakup_recovery::orchestrator::Orchestrator;
use breakup_recovery::recovery::{RecoveryOutcome, read_narrative, run_recovery, run_roles_list};
use breakup_recovery::render::Renderer;
use breakup_recovery::request::RecoveryRequest;
use breakup_recovery::session::RecoverySession;
use breakup_recovery::telemetry::{TelemetrySink, run_telemetry_report};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let show_sensitive_config = cli.show_sensitive_config;
    match run_cli(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{}", format_cli_error(&err, show_sensitive_config));
            tracing::error!(category = %categorize_error(&err).code(), error = %err, "command failed");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Dispatches one command. `Ok(false)` means the command ran but did not succeed.
async fn run_cli(cli: Cli) -> Result<bool> {
    init_tracing(&cli.log_filter)?;
    let profiles = load_profiles(&cli.config_path)?;
    let cfg = resolve_runtime_config(&cli, &profiles)?;
    let store = CredentialStore::new(cfg.credential_path.clone(), cfg.credential_ttl_days);
    let telemetry = TelemetrySink::new(&cfg, command_label(&cli.command));
    let color = io::stdout().is_terminal();

    match cli.command {
        Commands::Run {
            text,
            text_file,
            images,
        } => {
            let narrative = read_narrative(&text, text_file.as_deref())?;
            let buffers = load_image_files(&images)?;
            let active = active_credential(cli.api_key.as_deref(), &store)?;
            if let Some(resolved) = active.as_ref() {
                tracing::info!(
                    source = resolved.source.label(),
                    model = %cfg.model,
                    "Using API key"
                );
            }

            let mut session = RecoverySession::new(build_factory(&cfg));
            let orchestrator = Orchestrator::from_config(&cfg);
            let mut renderer = Renderer::new(io::stdout().lock(), color);
            let outcome = run_recovery(
                &mut session,
                active.map(|resolved| resolved.credential),
                RecoveryRequest::new(narrative, buffers),
                &orchestrator,
                &mut renderer,
                &telemetry,
            )
            .await?;

            Ok(match outcome {
                RecoveryOutcome::Completed(report) => report.succeeded() > 0,
                RecoveryOutcome::Skipped(_) | RecoveryOutcome::Refused => false,
            })
        }
        Commands::Key { command } => {
            let mut renderer = Renderer::new(io::stdout().lock(), color);
            match command {
                KeyCommands::Save { key } => {
                    let input = match key {
                        Some(key) => Some(key),
                        None => read_key_from_stdin()?,
                    };
                    run_key_save(&store, input.as_deref(), &mut renderer)
                }
                KeyCommands::Clear => {
                    run_key_clear(&store, &mut renderer)?;
                    Ok(true)
                }
                KeyCommands::Status => {
                    let active = active_credential(cli.api_key.as_deref(), &store)?;
                    run_key_status(active.as_ref(), &store, &mut renderer)?;
                    Ok(active.is_some())
                }
            }
        }
        Commands::Roles => {
            let mut renderer = Renderer::new(io::stdout().lock(), color);
            run_roles_list(&mut renderer, cfg.web_search)?;
            Ok(true)
        }
        Commands::Doctor => {
            let active = active_credential(cli.api_key.as_deref(), &store)?;
            run_doctor(&cfg, active.as_ref(), &store, &mut io::stdout().lock())
        }
        Commands::Telemetry { command } => match command {
            TelemetryCommands::Report { path, limit } => {
                run_telemetry_report(&cfg, path, limit)?;
                Ok(true)
            }
        },
    }
}

fn active_credential(
    explicit: Option<&str>,
    store: &CredentialStore,
) -> Result<Option<ResolvedCredential>> {
    resolve_credential(explicit, store, env_default_credential())
}

fn build_factory(cfg: &RuntimeConfig) -> AgentFactory {
    let connector = GeminiConnector::new(ModelSettings::from_config(cfg));
    AgentFactory::new(Arc::new(connector), cfg.web_search)
}

fn read_key_from_stdin() -> Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Enter your Gemini API Key: ");
    }
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("failed to read API key from stdin")?;
    let key = line.trim();
    Ok((!key.is_empty()).then(|| key.to_string()))
}

fn init_tracing(log_filter: &str) -> Result<()> {
    let level = log_filter
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(log_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}
