//! Bus message decoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::xml::{self, XmlError};

/// Event as delivered to WebSocket clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayEvent {
    /// Bus routing key, e.g. `EVENT VM 5/RUNNING/LCM_INIT`.
    pub command: String,
    pub data: Value,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty message")]
    Empty,

    #[error("message has no payload")]
    MissingPayload,

    #[error("payload is neither XML nor base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Decode an XML payload, raw or base64-encoded, into JSON.
pub fn decode_payload(payload: &str) -> Result<Value, DecodeError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    if payload.starts_with('<') {
        return Ok(xml::to_json(payload)?);
    }
    let bytes = STANDARD.decode(payload)?;
    let text = String::from_utf8(bytes)?;
    Ok(xml::to_json(&text)?)
}

/// Split a bus line into routing key and payload and decode it.
///
/// A raw XML payload starts at the first `<`; otherwise the payload is the
/// last whitespace separated field.
pub fn decode_line(line: &str) -> Result<RelayEvent, DecodeError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DecodeError::Empty);
    }

    let (key, payload) = match line.find('<') {
        Some(pos) => line.split_at(pos),
        None => line.rsplit_once(char::is_whitespace).ok_or(DecodeError::MissingPayload)?,
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(DecodeError::MissingPayload);
    }

    Ok(RelayEvent {
        command: key.to_string(),
        data: decode_payload(payload)?,
    })
}
