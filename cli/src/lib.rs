//! `conduit`: runs the adapters defined in a TOML file and announces
//! every message they produce.

pub mod announcer;
pub mod config;
pub mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use conduit_adapter_config::AdapterRegistry;
use conduit_file_source::DirectoryPoller;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use announcer::{AnnounceFormat, MessageAnnouncer};
pub use config::AdapterDefinition;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "conduit", version, about = "Poll directories and announce arriving files")]
pub struct Cli {
    /// TOML file with `[[adapter]]` definitions.
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Print one JSON object per message on stdout instead of logging.
    #[arg(long)]
    pub json: bool,

    /// Poll every adapter once and exit.
    #[arg(long)]
    pub once: bool,
}

/// How long adapters run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// A single tick per adapter.
    Once,

    /// Poll until Ctrl-C.
    UntilInterrupted,
}

struct RunningAdapter {
    name: String,
    poller: DirectoryPoller,
    announcer: JoinHandle<usize>,
}

/// Entry point used by the binary.
pub async fn run(cli: Cli) -> Result<()> {
    let definitions = config::load(&cli.config)?;
    let format = if cli.json {
        AnnounceFormat::Json
    } else {
        AnnounceFormat::Log
    };
    let mode = if cli.once {
        RunMode::Once
    } else {
        RunMode::UntilInterrupted
    };

    run_adapters(definitions, mode, format).await?;
    Ok(())
}

/// Build, run and shut down `definitions`. Returns each adapter's name
/// with the number of messages it produced.
pub async fn run_adapters(
    definitions: Vec<AdapterDefinition>,
    mode: RunMode,
    format: AnnounceFormat,
) -> Result<Vec<(String, usize)>> {
    let registry = AdapterRegistry::global();
    let mut adapters = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let mut poller = registry
            .build(&definition.tag, &definition.config)
            .with_context(|| format!("failed to build adapter `{}`", definition.name))?;
        let messages = poller
            .take_receiver()
            .context("adapter has no output channel")?;
        let announcer = MessageAnnouncer::new(&definition.name, format);

        adapters.push(RunningAdapter {
            name: definition.name,
            poller,
            announcer: tokio::spawn(announcer.run(messages)),
        });
    }

    let outcome = drive(&mut adapters, mode).await;
    let summary = shutdown_all(adapters).await;
    outcome?;
    Ok(summary)
}

async fn drive(adapters: &mut [RunningAdapter], mode: RunMode) -> Result<()> {
    match mode {
        RunMode::Once => {
            for adapter in adapters.iter_mut() {
                let report = adapter
                    .poller
                    .poll_once()
                    .await
                    .with_context(|| format!("adapter `{}` failed to poll", adapter.name))?;
                info!("{}: emitted {} file(s)", adapter.name, report.emitted);
            }
        }
        RunMode::UntilInterrupted => {
            for adapter in adapters.iter_mut() {
                adapter
                    .poller
                    .start()
                    .await
                    .with_context(|| format!("adapter `{}` failed to start", adapter.name))?;
            }
            info!("{} adapter(s) running; press Ctrl-C to stop", adapters.len());
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            info!("Interrupted, shutting down");
        }
    }
    Ok(())
}

async fn shutdown_all(adapters: Vec<RunningAdapter>) -> Vec<(String, usize)> {
    let mut summary = Vec::with_capacity(adapters.len());

    for mut adapter in adapters {
        if let Err(e) = adapter.poller.shutdown().await {
            error!("Failed to shut down `{}`: {e}", adapter.name);
        }
        // Shutdown closed the channel, so the announcer drains and ends.
        let count = match adapter.announcer.await {
            Ok(count) => count,
            Err(e) => {
                error!("Announcer for `{}` failed: {e}", adapter.name);
                0
            }
        };
        info!("{}: {count} message(s) announced", adapter.name);
        summary.push((adapter.name, count));
    }

    summary
}
