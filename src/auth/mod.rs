//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Private route:
//!     Authorization: Bearer <token>
//!     → guard.rs (extract, verify signature, check claims and expiry)
//!     → Session inserted into request extensions
//!     → Credentials (user id, username, backend token) for the RPC bridge
//!
//! Login (POST /api/auth):
//!     {user, pass, token?, extended?}
//!     → login.rs (backend login, user info, second factor via totp.rs)
//!     → token.rs (mint signed session)
//!     → background revocation of older backend tokens
//! ```
//!
//! # Design Decisions
//! - Fail closed: any decode or claim problem is a 401, never a panic
//! - The bearer token carries the backend token; the password is never stored
//! - No server-side revocation list; expiry is the only invalidation

pub mod guard;
pub mod login;
pub mod token;
pub mod totp;

use thiserror::Error;

use crate::rpc::RpcError;

pub use guard::{require_session, AuthGuard};
pub use login::{LoginRequest, LoginResponse, LoginService};
pub use token::{Session, TokenSigner};

/// Errors raised while authenticating a request or a login.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken(String),

    #[error("Invalid token: missing claim '{0}'")]
    MissingClaim(&'static str),

    #[error("Token expired")]
    Expired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("2FA token required")]
    SecondFactorRequired,

    #[error("Invalid 2FA token")]
    SecondFactorMismatch,

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Failed to sign session token")]
    Signing(String),

    #[error(transparent)]
    Backend(#[from] RpcError),
}
