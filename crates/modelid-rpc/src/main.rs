//! Modelid RPC Server - HTTP frontend for model identity lookups.
//!
//! Thin serving layer over the `modelid-core` library: parses requests,
//! serializes responses, and wires logging and startup.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use modelid_core::{CivitaiClient, PathRegistry};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "modelid-rpc")]
#[command(about = "Model identity and metadata lookup service")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Path registry JSON file (category -> list of search roots)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Models root directory with checkpoints/, loras/, vae/ subdirectories.
    /// Ignored when --registry is given.
    #[arg(long, default_value = "./models")]
    models_root: PathBuf,

    /// Override the metadata service base URL
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Modelid RPC Server");

    let registry = match &args.registry {
        Some(path) => PathRegistry::from_file(path)?,
        None => PathRegistry::standard_layout(&args.models_root),
    };

    let client = match &args.base_url {
        Some(base_url) => CivitaiClient::with_base_url(base_url)?,
        None => CivitaiClient::new()?,
    };

    let state = server::AppState::new(registry, client);
    let addr = server::start_server(state, &args.host, args.port).await?;

    info!("RPC server running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
