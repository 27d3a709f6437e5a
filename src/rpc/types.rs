//! Backend call types and error definitions.

use std::fmt;

use thiserror::Error;

/// Backend identity used to open a call against a zone.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Numeric backend user id, as text.
    pub user_id: String,
    pub username: String,
    /// Backend-issued login token, or the password during login.
    pub auth_token: String,
}

impl Credentials {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Session string sent as the first argument of every call.
    pub fn session(&self) -> String {
        format!("{}:{}", self.username, self.auth_token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Errors that can occur while calling a zone.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RpcError {
    /// Zone endpoint unreachable or answered with a non-success HTTP status.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The call exceeded its deadline.
    #[error("RPC timeout after {0} ms")]
    Timeout(u64),

    /// XML-RPC level fault.
    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// The daemon processed the call and reported failure; text is verbatim.
    #[error("{0}")]
    Backend(String),

    /// Response body could not be decoded.
    #[error("Invalid RPC response: {0}")]
    Decode(String),
}

impl RpcError {
    /// Metric label for the outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            RpcError::Transport(_) => "transport",
            RpcError::Timeout(_) => "timeout",
            RpcError::Fault { .. } => "fault",
            RpcError::Backend(_) => "backend",
            RpcError::Decode(_) => "decode",
        }
    }
}

/// Result type for backend calls.
pub type RpcResult<T> = Result<T, RpcError>;
