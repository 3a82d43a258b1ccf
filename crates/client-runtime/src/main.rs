//! # Ledger Client
//!
//! Connects to the configured nodes and logs websocket status until Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, `LC_CONFIG` file, env overrides)
//! 2. Install logging (`RUST_LOG`, else the configured level)
//! 3. Start the runtime and connect to every node
//! 4. Wait for Ctrl+C, then shut down the store and close all sockets

use anyhow::{Context, Result};
use client_runtime::{ClientConfig, ClientRuntime, VERSION};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("===========================================");
    info!("  Ledger Client v{}", VERSION);
    info!("===========================================");
    info!(magic = config.universe.magic.0, "Universe");
    for node in &config.nodes {
        info!(node = %node, url = %node.websocket_url(), "Configured node");
    }

    let runtime = ClientRuntime::new(config);
    let logger = runtime
        .start()
        .context("Failed to connect to configured nodes")?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
    }
    info!("Shutdown signal received");

    runtime.shutdown().await;
    if let Err(e) = logger.await {
        error!(error = %e, "Status logger ended abnormally");
    }
    info!("Ledger client stopped");
    Ok(())
}
