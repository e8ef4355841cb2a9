//! CLI entrypoint for Family Assistant
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use kin_application::{ProviderStatusUseCase, RunTurnInput, RunTurnUseCase};
use kin_domain::Credential;
use kin_infrastructure::{
    BackendToolExecutor, ConfigLoader, FileConfig, FileLoggingConfig, RestFamilyBackend,
    default_tool_catalog,
};
use kin_presentation::{Cli, Command, ConsoleFormatter, OutputFormat, TurnSpinner};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, &config.logging)?;
    info!("Starting Family Assistant");

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {}", issue);
        }
        bail!("invalid configuration ({} problems)", issues.len());
    }

    let Some(command) = cli.command else {
        bail!("No command given. Run with --help to see the available commands.");
    };

    match command {
        Command::Tools { output } => {
            let catalog = default_tool_catalog();
            let text = match output {
                OutputFormat::Text => ConsoleFormatter::format_tools(&catalog),
                OutputFormat::Json => ConsoleFormatter::format_tools_json(&catalog),
            };
            println!("{}", text);
        }
        Command::Status { provider } => {
            let selector = Arc::new(config.providers.build_selector()?);
            let use_case = ProviderStatusUseCase::new(selector)
                .with_params(config.timeouts.to_turn_params());
            let line = use_case.execute(provider.as_deref()).await;
            println!("{}", ConsoleFormatter::format_status(&line));
        }
        Command::Ask {
            prompt,
            provider,
            token,
            quiet,
        } => run_ask(&config, prompt, provider, token, quiet).await?,
    }

    Ok(())
}

async fn run_ask(
    config: &FileConfig,
    prompt: String,
    provider: Option<String>,
    token: Option<String>,
    quiet: bool,
) -> Result<()> {
    // === Dependency Injection ===
    let selector = Arc::new(config.providers.build_selector()?);
    let default_provider = selector.default_name().to_string();
    let backend = RestFamilyBackend::new(&config.backend.base_url)?;
    let executor = Arc::new(BackendToolExecutor::new(Arc::new(backend)));
    let use_case =
        RunTurnUseCase::new(selector, executor).with_params(config.timeouts.to_turn_params());

    let mut input = RunTurnInput::new(prompt).with_credential(Credential::from_optional(token));
    let provider_label = match provider {
        Some(name) => {
            input = input.with_provider(name.clone());
            name
        }
        None => default_provider,
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling turn");
            ctrl_c.cancel();
        }
    });

    let spinner = TurnSpinner::new(&provider_label, quiet);
    let answer = use_case.run_with_cancellation(input, cancel.clone());
    let mut stdout = std::io::stdout();
    let chunks = ConsoleFormatter::stream_answer(answer, Some(&spinner), &mut stdout).await?;

    if cancel.is_cancelled() {
        eprintln!("Cancelled.");
    } else if chunks == 0 {
        eprintln!("(no answer)");
    }
    Ok(())
}

/// Console logging filtered by verbosity (or `RUST_LOG`), plus an optional
/// daily-rolled log file.
fn init_logging(verbose: u8, logging: &FileLoggingConfig) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match &logging.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("logging.file must name a file")?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::daily(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}
