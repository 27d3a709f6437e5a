//! RPC bridge subsystem.
//!
//! # Data Flow
//! ```text
//! (zone, credentials, "one.host.status", [5, 1])
//!     → bridge.rs (prepend session, request-scoped deadline)
//!     → client.rs (RpcConnector: HTTP POST of the methodCall)
//!     → codec.rs (XML-RPC encode / decode)
//!     → [success, value, code] interpreted into Ok(value) | Err(backend text)
//! ```
//!
//! # Design Decisions
//! - No retries: a failed backend call is reported once, verbatim
//! - The connector is a trait object so zones can be served by fakes in tests
//! - Timeouts are distinct from transport and backend errors

pub mod bridge;
pub mod client;
pub mod codec;
pub mod types;

pub use bridge::RpcBridge;
pub use client::{RpcConnector, XmlRpcClient};
pub use types::{Credentials, RpcError, RpcResult};
