//! Landroid Cloud bridge
//!
//! Runs the integration against a replayed device: the mower state comes
//! from a JSON snapshot, commands are read from stdin and every entity
//! state is logged as the host would store it.

mod command;
mod host;
mod replay;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use landroid_cloud::{setup_device, Dispatcher, EntryInfo, LandroidConfig, LandroidDevice};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::BridgeCommand;
use crate::host::LoggingHost;
use crate::replay::ReplayDevice;

#[derive(Parser, Debug)]
#[command(name = "landroid-bridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Account configuration (YAML)
    config: PathBuf,

    /// Device snapshot (JSON), re-read on every refresh
    snapshot: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log: String,
}

fn start(
    cli: &Cli,
    entry: &EntryInfo,
    config: &LandroidConfig,
    host: Arc<LoggingHost>,
) -> Result<LandroidDevice> {
    let device = Arc::new(ReplayDevice::load(&cli.snapshot)?);
    let dispatcher = Arc::new(Dispatcher::new());
    Ok(setup_device(device, entry.clone(), config, host, dispatcher)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting Landroid Cloud bridge");

    let config = LandroidConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {:?}", cli.config))?;
    let entry = EntryInfo::for_account(&config);
    info!(entry_id = %entry.entry_id, "Loaded account {}", entry.title);

    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let host = Arc::new(LoggingHost::new().with_reloads(reload_tx));

    let mut device = start(&cli, &entry, &config, host.clone())?;
    if !device.api.refresh().await {
        warn!("Initial refresh failed, running on the loaded snapshot");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => {
                    let result = match line.parse::<BridgeCommand>() {
                        Ok(command) => command.execute(&device, &host).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = result {
                        error!("{:#}", e);
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    stdin_open = false;
                }
            },
            Some(entry_id) = reload_rx.recv() => {
                info!(entry_id = %entry_id, "Rebuilding device");
                device.unload();
                device = start(&cli, &entry, &config, host.clone())?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Shutting down...");
    device.unload();
    Ok(())
}
