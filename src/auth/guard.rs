//! Bearer token guard for private routes.
//!
//! # Responsibilities
//! - Extract the bearer token from the `Authorization` header
//! - Verify signature, claim presence and expiry
//! - Attach the verified `Session` to the request extensions

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::token::{Session, TokenSigner};
use crate::auth::AuthError;
use crate::http::response::GatewayError;

/// Validates bearer tokens issued by the login flow.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    signer: TokenSigner,
}

impl AuthGuard {
    pub fn new(signer: TokenSigner) -> Self {
        Self { signer }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Authenticate a request from its headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Session, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        self.verify_token(token)
    }

    /// Authenticate a raw token, e.g. one passed as a query parameter.
    pub fn verify_token(&self, token: &str) -> Result<Session, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.signer.verify(token).inspect_err(|e| {
            tracing::warn!(error = ?e, "Rejected bearer token");
        })
    }
}

/// Token from `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Middleware for private routes. Rejects with a 401 envelope before any
/// handler runs.
pub async fn require_session(
    State(guard): State<Arc<AuthGuard>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match guard.authenticate(request.headers()) {
        Ok(session) => {
            tracing::debug!(user = %session.audience, "Session accepted");
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => GatewayError::from(e).into_response(),
    }
}
