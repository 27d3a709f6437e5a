//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, request id in every span)
//!     → metrics.rs (counters, histograms, gauges)
//!
//! Consumers:
//!     → stdout (pretty/compact text or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated secrets
//! - Metric updates are cheap and never fail the request path
//! - Metrics recorder is only installed when enabled; otherwise the
//!   `metrics` macros are no-ops

pub mod logging;
pub mod metrics;
