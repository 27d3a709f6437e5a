//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fireedge_requests_total` (counter): API requests by method, status, command
//! - `fireedge_request_duration_seconds` (histogram): API latency by command
//! - `fireedge_rpc_calls_total` (counter): backend calls by zone, method, outcome
//! - `fireedge_rpc_duration_seconds` (histogram): backend call latency
//! - `fireedge_logins_total` (counter): login attempts by outcome
//! - `fireedge_ws_clients` (gauge): connected event relay clients
//! - `fireedge_events_relayed_total` (counter): events broadcast to clients

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, command: &str, start: Instant) {
    metrics::counter!(
        "fireedge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "command" => command.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "fireedge_request_duration_seconds",
        "method" => method.to_string(),
        "command" => command.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rpc_call(zone: &str, method: &str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "fireedge_rpc_calls_total",
        "zone" => zone.to_string(),
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "fireedge_rpc_duration_seconds",
        "zone" => zone.to_string(),
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_login(outcome: &'static str) {
    metrics::counter!("fireedge_logins_total", "outcome" => outcome).increment(1);
}

pub fn record_ws_clients(count: usize) {
    metrics::gauge!("fireedge_ws_clients").set(count as f64);
}

pub fn record_event_relayed() {
    metrics::counter!("fireedge_events_relayed_total").increment(1);
}
