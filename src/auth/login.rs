//! Login flow: backend password check, optional second factor, session
//! minting and revocation of older backend tokens.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::token::{now_secs, Session, TokenSigner};
use crate::auth::{totp, AuthError};
use crate::config::AuthConfig;
use crate::observability::metrics;
use crate::rpc::{Credentials, RpcBridge, RpcError};
use crate::xml::{self, Element};
use crate::zones::Zone;

const SECRET_PATHS: [&str; 2] = [
    "TEMPLATE/FIREEDGE/TWO_FACTOR_AUTH_SECRET",
    "TEMPLATE/SUNSTONE/TWO_FACTOR_AUTH_SECRET",
];

/// Body of `POST /api/auth`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Second factor code.
    pub token: Option<String>,
    /// "Remember me".
    #[serde(default)]
    pub extended: bool,
}

/// Data returned to the client on success.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub id: String,
}

#[derive(Clone)]
pub struct LoginService {
    bridge: RpcBridge,
    signer: TokenSigner,
    config: AuthConfig,
}

impl LoginService {
    pub fn new(bridge: RpcBridge, signer: TokenSigner, config: AuthConfig) -> Self {
        Self { bridge, signer, config }
    }

    /// Token lifetime in seconds.
    pub fn lifetime_secs(&self, extended: bool) -> u64 {
        let mins = if extended {
            self.config.remember_expiration_mins
        } else {
            self.config.session_expiration_mins
        };
        mins.max(self.config.minimum_backend_expiration_mins) * 60
    }

    pub async fn login(&self, zone: &Zone, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let result = self.authenticate(zone, request).await;
        metrics::record_login(match &result {
            Ok(_) => "ok",
            Err(AuthError::SecondFactorRequired) => "2fa_required",
            Err(AuthError::SecondFactorMismatch) => "2fa_invalid",
            Err(AuthError::InvalidCredentials) => "invalid",
            Err(_) => "error",
        });
        result
    }

    async fn authenticate(&self, zone: &Zone, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let user = request
            .user
            .filter(|u| !u.is_empty())
            .ok_or(AuthError::MissingField("user"))?;
        let pass = request
            .pass
            .filter(|p| !p.is_empty())
            .ok_or(AuthError::MissingField("pass"))?;
        let lifetime = self.lifetime_secs(request.extended);

        let password = Credentials::new("", &user, pass);
        let backend_token = match self
            .bridge
            .invoke(
                zone,
                &password,
                "one.user.login",
                vec![json!(user), json!(""), json!(lifetime), json!(-1)],
            )
            .await
        {
            Ok(Value::String(token)) if !token.is_empty() => token,
            Ok(other) => {
                return Err(AuthError::Backend(RpcError::Decode(format!(
                    "unexpected login result: {other}"
                ))))
            }
            Err(RpcError::Backend(_)) | Err(RpcError::Fault { .. }) => {
                tracing::info!(user = %user, zone = zone.id, "Login rejected by backend");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Backend(e)),
        };

        let session_creds = Credentials::new("", &user, &backend_token);
        let info = self
            .bridge
            .invoke(zone, &session_creds, "one.user.info", vec![json!(-1), json!(false)])
            .await?;
        let document = match info {
            Value::String(doc) => xml::parse(&doc).map_err(|e| RpcError::Decode(e.to_string()))?,
            other => return Err(RpcError::Decode(format!("unexpected user info: {other}")).into()),
        };
        let user_id = document
            .find_text("ID")
            .ok_or_else(|| RpcError::Decode("user document without ID".into()))?
            .to_string();

        if let Some(secret) = two_factor_secret(&document) {
            let Some(code) = request.token.filter(|t| !t.trim().is_empty()) else {
                self.discard_token(zone, &session_creds);
                return Err(AuthError::SecondFactorRequired);
            };
            if !totp::verify(secret, &code, now_secs(), self.config.totp_window) {
                tracing::info!(user = %user, "Second factor mismatch");
                self.discard_token(zone, &session_creds);
                return Err(AuthError::SecondFactorMismatch);
            }
        }

        let session = Session::new(&user_id, &user, &backend_token, now_secs(), lifetime);
        let token = self.signer.mint(&session)?;

        let stale = stale_tokens(&document, &backend_token);
        if !stale.is_empty() {
            self.revoke_tokens(zone, &session_creds, stale);
        }

        tracing::info!(user = %user, user_id = %user_id, zone = zone.id, "Login succeeded");
        Ok(LoginResponse { token, id: user_id })
    }

    /// Invalidate a token issued during a login that did not complete.
    fn discard_token(&self, zone: &Zone, creds: &Credentials) {
        self.revoke_tokens(zone, creds, vec![creds.auth_token.clone()]);
    }

    /// Fire-and-forget invalidation of backend tokens. The login response is
    /// never delayed by it, so older tokens stay valid until the backend
    /// processes the calls.
    fn revoke_tokens(&self, zone: &Zone, creds: &Credentials, tokens: Vec<String>) {
        let bridge = self.bridge.clone();
        let zone = zone.clone();
        let creds = creds.clone();
        tokio::spawn(async move {
            for token in tokens {
                let args = vec![json!(creds.username), json!(token), json!(0), json!(-1)];
                if let Err(e) = bridge.invoke(&zone, &creds, "one.user.login", args).await {
                    tracing::warn!(user = %creds.username, error = %e, "Failed to revoke login token");
                }
            }
        });
    }
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService").finish_non_exhaustive()
    }
}

fn two_factor_secret(user: &Element) -> Option<&str> {
    SECRET_PATHS.iter().find_map(|path| user.find_text(path))
}

/// Login tokens of the user other than `current`.
fn stale_tokens(user: &Element, current: &str) -> Vec<String> {
    user.children_named("LOGIN_TOKEN")
        .filter_map(|entry| entry.find_text("TOKEN"))
        .filter(|token| *token != current)
        .map(str::to_string)
        .collect()
}
