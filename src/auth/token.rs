//! Signed session tokens.
//!
//! Claims follow the JWT registered names: `iss` carries the backend user
//! id, `aud` the username, `jti` the backend login token.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::rpc::Credentials;

/// Seconds since the Unix epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Claims as found on the wire. Every field is optional so that a missing
/// one is reported precisely instead of as a generic decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// A verified bearer token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Backend numeric user id.
    pub issuer: String,
    /// Backend username.
    pub audience: String,
    /// Backend-issued login token.
    pub token_id: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        backend_token: impl Into<String>,
        issued_at: u64,
        lifetime_secs: u64,
    ) -> Self {
        Self {
            issuer: user_id.into(),
            audience: username.into(),
            token_id: backend_token.into(),
            issued_at,
            expires_at: issued_at.saturating_add(lifetime_secs),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.issuer, &self.audience, &self.token_id)
    }

    fn claims(&self) -> Claims {
        Claims {
            iss: Some(self.issuer.clone()),
            aud: Some(self.audience.clone()),
            jti: Some(self.token_id.clone()),
            iat: Some(self.issued_at),
            exp: Some(self.expires_at),
        }
    }

    /// Build a session from raw claims, enforcing presence and expiry.
    pub fn from_claims(claims: Claims, now: u64) -> Result<Self, AuthError> {
        let issuer = claims.iss.filter(|v| !v.is_empty()).ok_or(AuthError::MissingClaim("iss"))?;
        let audience = claims.aud.filter(|v| !v.is_empty()).ok_or(AuthError::MissingClaim("aud"))?;
        let token_id = claims.jti.filter(|v| !v.is_empty()).ok_or(AuthError::MissingClaim("jti"))?;
        let issued_at = claims.iat.ok_or(AuthError::MissingClaim("iat"))?;
        let expires_at = claims.exp.ok_or(AuthError::MissingClaim("exp"))?;

        if now > expires_at {
            return Err(AuthError::Expired);
        }

        Ok(Self {
            issuer,
            audience,
            token_id,
            issued_at,
            expires_at,
        })
    }
}

/// HS256 signer and verifier keyed by the process-wide secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        // Expiry and presence are checked by Session::from_claims with a
        // zero leeway, so the library checks are switched off here.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn mint(&self, session: &Session) -> Result<String, AuthError> {
        self.encode_claims(&session.claims())
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Session, AuthError> {
        self.verify_at(token, now_secs())
    }

    pub fn verify_at(&self, token: &str, now: u64) -> Result<Session, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Session::from_claims(data.claims, now)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("algorithm", &"HS256").finish()
    }
}
