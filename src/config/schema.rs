//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::zones::Zone;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Backend zones. The first entry is the primary zone.
    pub zones: Vec<Zone>,

    /// Session token and login settings.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Cross-origin settings.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Event relay settings.
    pub events: EventsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:2616").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:2616".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens. Must be supplied.
    pub token_secret: String,

    /// Lifetime of a regular session in minutes.
    pub session_expiration_mins: u64,

    /// Lifetime of a "remember me" session in minutes.
    pub remember_expiration_mins: u64,

    /// Lower bound for the lifetime requested from the backend.
    pub minimum_backend_expiration_mins: u64,

    /// Accepted TOTP clock drift, in 30 second steps either side.
    pub totp_window: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            session_expiration_mins: 180,
            remember_expiration_mins: 3600,
            minimum_backend_expiration_mins: 30,
            totp_window: 1,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole request deadline in seconds.
    pub request_secs: u64,

    /// Deadline for a single backend RPC call in seconds.
    pub rpc_secs: u64,

    /// TCP connect timeout for backend calls in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            rpc_secs: 25,
            connect_secs: 5,
        }
    }
}

/// Cross-origin resource sharing.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Allow any origin. Only for development setups.
    pub enabled: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format (pretty, compact, json).
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Event relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Subscribe to the orchestrator event bus and serve `/ws`.
    pub enabled: bool,

    /// `host:port` of the event bus line feed.
    pub bus_address: String,

    /// Base delay for reconnect backoff in milliseconds.
    pub reconnect_base_ms: u64,

    /// Maximum delay for reconnect backoff in milliseconds.
    pub reconnect_max_ms: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bus_address: "127.0.0.1:2101".to_string(),
            reconnect_base_ms: 500,
            reconnect_max_ms: 30_000,
        }
    }
}
