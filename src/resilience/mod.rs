//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Event bus connection lost / refused:
//!     → backoff.rs (exponential delay with jitter, capped)
//!     → reconnect attempt
//!
//! Backend RPC call:
//!     → single attempt bounded by timeouts.rpc_secs (rpc/bridge.rs)
//! ```
//!
//! # Design Decisions
//! - Backend calls are never retried; a failed call is reported as is
//! - Only the long-lived bus subscription reconnects on its own

pub mod backoff;
