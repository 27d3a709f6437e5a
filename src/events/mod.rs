//! Event relay subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator event bus (line feed: "<routing key> <payload>")
//!     → source.rs (TcpLineSource with reconnect backoff, ChannelSource)
//!     → decode.rs (payload: XML, raw or base64 → JSON)
//!     → hub.rs (fan-out to every registered WebSocket client)
//!     → http/websocket.rs (one task per client)
//! ```
//!
//! # Design Decisions
//! - The client registry is the only shared mutable collection; it is a
//!   DashMap so register/unregister are atomic on a multi-threaded runtime
//! - Undecodable bus messages are logged and dropped, never fatal
//! - A client whose channel is closed is removed on the next broadcast

pub mod decode;
pub mod hub;
pub mod source;

pub use decode::{decode_line, decode_payload, DecodeError, RelayEvent};
pub use hub::EventHub;
pub use source::{run_relay, ChannelSource, EventSource, TcpLineSource};
