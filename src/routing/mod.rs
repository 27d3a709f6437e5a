//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! /api/{resource}/{segments...}?query  + JSON body
//!     → envelope.rs (RequestEnvelope: typed path, allow-listed query, body,
//!                    zone selector)
//!     → router.rs (pick the command from the action segment, check verb)
//!     → params.rs (ordered, typed argument list)
//! ```
//!
//! # Design Decisions
//! - Only registered commands are dispatchable; there is no by-name fallback
//! - Unknown query keys are dropped while building the envelope
//! - Resolution is a pure function of the envelope; nothing is shared
//!   between requests

pub mod envelope;
pub mod params;
pub mod router;

pub use envelope::{decode_segment, PathParams, RequestEnvelope};
pub use params::{resolve, ParamError};
pub use router::{CommandRouter, Resolved, RoutingError};
