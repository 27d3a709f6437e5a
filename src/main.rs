//! FireEdge API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  GATEWAY                     │
//!   Client request        │  ┌────────┐   ┌────────┐   ┌──────────────┐  │
//!   ──────────────────────┼─▶│  http  │──▶│  auth  │──▶│   pipeline   │  │
//!                         │  │ server │   │ guard  │   │ zone→params  │  │
//!                         │  └────────┘   └────────┘   └──────┬───────┘  │
//!                         │                                   ▼          │
//!   Client response       │  ┌────────┐               ┌──────────────┐   │     XML-RPC
//!   ◀─────────────────────┼──│envelope│◀──────────────│  rpc bridge  │◀──┼──── zone daemon
//!                         │  └────────┘               └──────────────┘   │
//!                         │                                              │
//!   WebSocket clients     │  ┌────────┐   ┌────────┐                     │     event bus
//!   ◀─────────────────────┼──│  /ws   │◀──│ events │◀────────────────────┼──── line feed
//!                         │  └────────┘   └────────┘                     │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use fireedge_gateway::config::{load_config, loader::finalize};
use fireedge_gateway::lifecycle::{startup, wait_for_signal, Shutdown, StartupError};
use fireedge_gateway::observability::logging::init_tracing;
use fireedge_gateway::{GatewayConfig, GatewayServer};

#[derive(Debug, Parser)]
#[command(name = "fireedge-gateway", version, about = "REST gateway for the orchestration daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "FIREEDGE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path),
        None => finalize(GatewayConfig::default()),
    }
    .map_err(StartupError::from)?;

    init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fireedge-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        zones = config.zones.len(),
        request_timeout_secs = config.timeouts.request_secs,
        rpc_timeout_secs = config.timeouts.rpc_secs,
        events = config.events.enabled,
        "Configuration loaded"
    );

    startup::start_metrics(&config.observability);

    let listener = startup::bind_listener(&config.listener.bind_address).await?;
    let server = GatewayServer::new(config)?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
