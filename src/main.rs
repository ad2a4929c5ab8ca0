//! media-relay server binary.

use clap::Parser;
use media_relay::{Config, MediaRelay, run_with_shutdown};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Relay posts from the media-fetch service into remote storage.
#[derive(Parser, Debug)]
#[command(name = "media-relay", version = env!("CARGO_PKG_VERSION"), about)]
struct Cli {
    /// Path to the TOML configuration file (defaults are used if it is missing).
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Port to listen on, overriding the config file and environment.
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not clear the job registry at midnight.
    #[arg(long)]
    no_janitor: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_env_overrides()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.no_janitor {
        config.janitor.enabled = false;
    }

    let relay = Arc::new(MediaRelay::new(config)?);
    let _janitor = relay.spawn_janitor();
    let _stats = relay.spawn_stats_reporter();

    run_with_shutdown(relay).await?;
    Ok(())
}
