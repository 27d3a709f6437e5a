//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → auth guard (private routes only)
//!     → handlers.rs (RequestEnvelope → pipeline)
//!     → response.rs ({id, message, data?} envelope, status mapping)
//!     → Send to client
//!
//! /ws → websocket.rs (event relay clients)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{Envelope, GatewayError};
pub use server::{AppState, GatewayServer};
