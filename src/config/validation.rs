//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Zone list integrity (present, unique ids, usable URLs)
//! - Token secret presence and lifetime ordering
//! - Value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;
use crate::observability::logging::LogFormat;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "not a socket address"));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be greater than 0"));
    }

    if config.zones.is_empty() {
        errors.push(ValidationError::new("zones", "at least one zone is required"));
    }
    let mut seen = HashSet::new();
    for (i, zone) in config.zones.iter().enumerate() {
        if !seen.insert(zone.id) {
            errors.push(ValidationError::new(
                format!("zones[{i}].id"),
                format!("duplicate zone id {}", zone.id),
            ));
        }
        match Url::parse(&zone.rpc_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(_) => errors.push(ValidationError::new(
                format!("zones[{i}].rpc_url"),
                "scheme must be http or https",
            )),
            Err(e) => errors.push(ValidationError::new(format!("zones[{i}].rpc_url"), e.to_string())),
        }
    }

    let auth = &config.auth;
    if auth.token_secret.trim().is_empty() {
        errors.push(ValidationError::new(
            "auth.token_secret",
            "must be set (or provide FIREEDGE_TOKEN_SECRET)",
        ));
    }
    if auth.minimum_backend_expiration_mins > auth.session_expiration_mins {
        errors.push(ValidationError::new(
            "auth.minimum_backend_expiration_mins",
            "must not exceed session_expiration_mins",
        ));
    }
    if auth.session_expiration_mins > auth.remember_expiration_mins {
        errors.push(ValidationError::new(
            "auth.session_expiration_mins",
            "must not exceed remember_expiration_mins",
        ));
    }
    if auth.session_expiration_mins == 0 {
        errors.push(ValidationError::new("auth.session_expiration_mins", "must be greater than 0"));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.request_secs", timeouts.request_secs),
        ("timeouts.rpc_secs", timeouts.rpc_secs),
        ("timeouts.connect_secs", timeouts.connect_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }
    // A login makes two backend calls in sequence; both must fit inside the
    // whole-request deadline.
    if timeouts.rpc_secs.saturating_mul(2) >= timeouts.request_secs {
        errors.push(ValidationError::new(
            "timeouts.rpc_secs",
            "two backend calls must fit within request_secs",
        ));
    }

    let observability = &config.observability;
    if LogFormat::parse(&observability.log_format).is_none() {
        errors.push(ValidationError::new(
            "observability.log_format",
            "expected pretty, compact or json",
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    let events = &config.events;
    if events.enabled && events.bus_address.trim().is_empty() {
        errors.push(ValidationError::new("events.bus_address", "required when events are enabled"));
    }
    if events.reconnect_base_ms > events.reconnect_max_ms {
        errors.push(ValidationError::new(
            "events.reconnect_base_ms",
            "must not exceed reconnect_max_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
