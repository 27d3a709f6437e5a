//! Zone resolution.
//!
//! # Data Flow
//! ```text
//! [[zones]] from config
//!     → ZoneRegistry (ordered, immutable)
//!     → resolve(selector from query / path)
//!     → &Zone used by the RPC bridge
//! ```
//!
//! # Design Decisions
//! - The first configured zone is the primary zone
//! - An explicit selector that matches nothing is an error, never a fallback
//! - Registry is read-only after startup, shared without locks

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request keys that select the target zone. They are consumed by the
/// pipeline and never forwarded as command arguments.
pub const ZONE_KEYS: [&str; 2] = ["zone", "federation"];

/// A configured backend endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Zone {
    /// Federation id of the zone.
    pub id: u32,

    /// Display name.
    pub name: String,

    /// XML-RPC endpoint, e.g. `http://localhost:2633/RPC2`.
    pub rpc_url: String,

    /// Optional console (guacamole/VNC proxy) base URL.
    #[serde(default)]
    pub console_url: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneError {
    #[error("Invalid zone: '{0}'")]
    NotFound(String),

    #[error("no zones configured")]
    Empty,
}

/// Ordered list of configured zones.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    pub fn new(zones: Vec<Zone>) -> Result<Self, ZoneError> {
        if zones.is_empty() {
            return Err(ZoneError::Empty);
        }
        Ok(Self { zones })
    }

    /// Select the zone for a request.
    ///
    /// `selector` is the raw federation id as sent by the client; it matches
    /// a zone whose id stringifies to the same value.
    pub fn resolve(&self, selector: Option<&str>) -> Result<&Zone, ZoneError> {
        match selector.map(str::trim) {
            None | Some("") => self.primary(),
            Some(wanted) => self
                .zones
                .iter()
                .find(|zone| zone.id.to_string() == wanted)
                .ok_or_else(|| ZoneError::NotFound(wanted.to_string())),
        }
    }

    pub fn primary(&self) -> Result<&Zone, ZoneError> {
        self.zones.first().ok_or(ZoneError::Empty)
    }

    pub fn get(&self, id: u32) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn all(&self) -> &[Zone] {
        &self.zones
    }
}
