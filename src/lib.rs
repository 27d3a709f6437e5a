//! FireEdge API gateway library.
//!
//! REST front end for an XML-RPC orchestration daemon: authenticates
//! users with signed session tokens, resolves the target zone, maps
//! `/api/{resource}/...` requests onto registered backend commands and
//! relays bus events to WebSocket clients.

// Dispatch core
pub mod commands;
pub mod pipeline;
pub mod routing;
pub mod zones;

// Backend
pub mod rpc;
pub mod xml;

// Surfaces
pub mod auth;
pub mod events;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
