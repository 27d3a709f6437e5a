//! Startup helpers.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::commands::CommandTableError;
use crate::config::{ConfigError, ObservabilityConfig};
use crate::observability::metrics;
use crate::rpc::RpcError;
use crate::zones::ZoneError;

/// Anything that stops the gateway from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Commands(#[from] CommandTableError),

    #[error(transparent)]
    Zones(#[from] ZoneError),

    #[error("failed to build RPC client: {0}")]
    Rpc(#[from] RpcError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Install the Prometheus exporter when enabled. A bad address is logged and
/// metrics stay off.
pub fn start_metrics(config: &ObservabilityConfig) {
    if !config.metrics_enabled {
        return;
    }
    match config.metrics_address.parse::<SocketAddr>() {
        Ok(addr) => metrics::init_metrics(addr),
        Err(_) => tracing::error!(
            metrics_address = %config.metrics_address,
            "Failed to parse metrics address"
        ),
    }
}

pub async fn bind_listener(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}
