//! Response envelope and error mapping.
//!
//! # Responsibilities
//! - Render every outcome as `{id, message, data?}` with `id` equal to the
//!   HTTP status code
//! - Own the single mapping from subsystem errors to status codes
//! - Shape successful backend values (XML document → data, text → message)
//!
//! # Design Decisions
//! - Backend failure text is returned verbatim
//! - Token decode details are logged, never echoed to the client

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;
use crate::routing::{ParamError, RoutingError};
use crate::rpc::RpcError;
use crate::xml;
use crate::zones::ZoneError;

/// Body of every API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub id: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self {
            id: StatusCode::OK.as_u16(),
            message: String::new(),
            data: Some(data),
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            id: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }

    /// Wrap a successful backend value. XML documents are converted to
    /// JSON data, any other string is a message.
    pub fn from_backend(value: Value) -> Self {
        match value {
            Value::String(text) => {
                let trimmed = text.trim_start();
                if trimmed.starts_with('<') {
                    if let Ok(data) = xml::to_json(trimmed) {
                        return Self::ok(data);
                    }
                }
                Self {
                    id: StatusCode::OK.as_u16(),
                    message: text,
                    data: None,
                }
            }
            other => Self::ok(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.id).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Any failure of an API request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Zone(#[from] ZoneError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Routing(RoutingError::UnknownResource(_)) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Routing(RoutingError::MethodNotAllowed { .. }) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Routing(_) => StatusCode::BAD_REQUEST,
            GatewayError::Param(_) => StatusCode::BAD_REQUEST,
            GatewayError::Zone(ZoneError::NotFound(_)) => StatusCode::BAD_REQUEST,
            GatewayError::Zone(ZoneError::Empty) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Auth(e) => auth_status(e),
            GatewayError::Rpc(e) => rpc_status(e),
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the client.
    pub fn message(&self) -> String {
        match self {
            GatewayError::Rpc(e) | GatewayError::Auth(AuthError::Backend(e)) => rpc_message(e),
            // Signature and decode details stay in the logs.
            GatewayError::Auth(AuthError::InvalidToken(_)) => "Invalid token".to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope::error(self.status(), self.message())
    }
}

fn auth_status(error: &AuthError) -> StatusCode {
    match error {
        AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
        AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Backend(e) => rpc_status(e),
        _ => StatusCode::UNAUTHORIZED,
    }
}

fn rpc_status(error: &RpcError) -> StatusCode {
    match error {
        RpcError::Transport(_) | RpcError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        RpcError::Fault { .. } | RpcError::Backend(_) | RpcError::Decode(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn rpc_message(error: &RpcError) -> String {
    match error {
        RpcError::Fault { message, .. } | RpcError::Backend(message) => message.clone(),
        other => other.to_string(),
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        self.to_envelope().into_response()
    }
}
