//! soundgen-daemon: sound effect generation and voice conversion client.
//!
//! This binary can run in two modes:
//! - CLI mode: submit one job, wait for it, print the result
//! - Daemon mode: JSON-RPC server over stdio for editor integration

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use soundgen_daemon::cli::{download_target, Cli};
use soundgen_daemon::config::OrchestratorConfig;
use soundgen_daemon::generation::{GenerationOrchestrator, JobOutcome, LogNotifier};
use soundgen_daemon::registry::{StaticVoiceCatalog, TrackRegistry};
use soundgen_daemon::rpc::{run_server, ServerState};
use soundgen_daemon::service::HttpGenerationService;
use soundgen_daemon::types::AudioFile;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries results and JSON-RPC traffic.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = OrchestratorConfig::from_env();
    cli.apply_overrides(&mut config);
    if let Some(problem) = config.validate() {
        bail!("Invalid configuration: {}", problem);
    }

    if cli.is_daemon_mode() {
        run_daemon_mode(config).await
    } else if cli.is_cli_mode() {
        run_cli_mode(&cli, config).await
    } else {
        print_usage();
        Ok(())
    }
}

/// Runs one submission to completion.
async fn run_cli_mode(cli: &Cli, config: OrchestratorConfig) -> anyhow::Result<()> {
    let service = Arc::new(
        HttpGenerationService::from_config(&config).context("Failed to create HTTP client")?,
    );
    let registry = Arc::new(TrackRegistry::with_capacity(config.registry_capacity));
    let voices = Arc::new(StaticVoiceCatalog::new(config.voices.clone()));
    let orchestrator = GenerationOrchestrator::new(
        service.clone(),
        service.clone(),
        registry.clone(),
        Arc::new(LogNotifier),
        voices,
        &config,
    );

    info!(api_url = %config.api_url, credits = cli.credits, "Submitting job");

    let handle = match (&cli.text, &cli.file) {
        (Some(text), _) => orchestrator.submit_text(text, cli.credits).await?,
        (None, Some(path)) => {
            let file = AudioFile::from_path(path, cli.content_type.as_deref())
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let profile = cli.profile(&config);
            orchestrator.submit_file(file, &profile, cli.credits).await?
        }
        (None, None) => bail!("Nothing to submit"),
    };

    let job_id = handle.job.id.clone();
    let kind = handle.kind;
    let wait = handle.wait();
    tokio::pin!(wait);

    let outcome = tokio::select! {
        outcome = &mut wait => outcome.context("Poll task failed")?,
        _ = tokio::signal::ctrl_c() => {
            warn!(%job_id, "Interrupted, cancelling job");
            orchestrator.cancel();
            wait.await.context("Poll task failed")?
        }
    };

    match outcome {
        JobOutcome::Published(id) => {
            let result = registry
                .get(&id)
                .with_context(|| format!("Result {} missing from registry", id))?;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if cli.download {
                let dest = download_target(&config.effective_download_path(), &result);
                let bytes = service
                    .download(&result.audio_url, &dest)
                    .await
                    .context("Failed to download result audio")?;
                info!(bytes, path = %dest.display(), "Saved result audio");
            }
            Ok(())
        }
        JobOutcome::Failed(code) => {
            bail!("Job {} failed [{}]: {}", job_id, code, code.user_message(kind))
        }
        JobOutcome::Cancelled => {
            warn!(%job_id, "Job cancelled");
            Ok(())
        }
    }
}

/// Runs the daemon mode (JSON-RPC server).
async fn run_daemon_mode(config: OrchestratorConfig) -> anyhow::Result<()> {
    info!(
        api_url = %config.api_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Starting JSON-RPC server on stdio"
    );

    let state = ServerState::new(config).context("Failed to create HTTP client")?;
    run_server(state).await;
    Ok(())
}

/// Prints usage information.
fn print_usage() {
    eprintln!("soundgen-daemon: sound effects and voice conversion");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  Sound effect from text:");
    eprintln!("    soundgen-daemon --text \"Thunder rolling over hills\" --credits 40");
    eprintln!();
    eprintln!("  Voice conversion (MP3/WAV, up to 50MB):");
    eprintln!("    soundgen-daemon --file take.wav --voice andreas --credits 40 --download");
    eprintln!();
    eprintln!("  Daemon mode (JSON-RPC server):");
    eprintln!("    soundgen-daemon --daemon");
    eprintln!();
    eprintln!("Run 'soundgen-daemon --help' for full options.");
}
