//! Route handlers.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;
use serde_json::json;

use crate::auth::{LoginRequest, Session};
use crate::http::request::request_id;
use crate::http::response::{Envelope, GatewayError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::pipeline::RequestContext;
use crate::routing::{decode_segment, ParamError, RequestEnvelope};
use crate::zones::ZONE_KEYS;

#[derive(Serialize)]
struct ZoneSummary<'a> {
    id: u32,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    console_url: Option<&'a str>,
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Envelope {
    let zones: Vec<_> = state
        .zones
        .all()
        .iter()
        .map(|z| json!({"id": z.id, "name": z.name}))
        .collect();
    Envelope::ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "commands": state.table.len(),
        "zones": zones,
        "ws_clients": state.hub.client_count(),
    }))
}

/// `GET /api/zones`
pub async fn list_zones(State(state): State<AppState>) -> Envelope {
    let zones: Vec<_> = state
        .zones
        .all()
        .iter()
        .map(|z| ZoneSummary {
            id: z.id,
            name: &z.name,
            console_url: z.console_url.as_deref(),
        })
        .collect();
    Envelope::ok(json!(zones))
}

/// `POST /api/auth`
pub async fn login(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let result = async {
        let request: LoginRequest =
            serde_json::from_slice(&body).map_err(|e| ParamError::MalformedBody(e.to_string()))?;
        let selector = query.as_deref().and_then(zone_selector);
        let zone = state.zones.resolve(selector.as_deref())?;
        Ok::<_, GatewayError>(state.login.login(zone, request).await?)
    }
    .await;

    let response = match result {
        Ok(login) => Envelope::ok(json!(login)).into_response(),
        Err(e) => e.into_response(),
    };
    metrics::record_request("POST", response.status().as_u16(), "auth.login", start);
    response
}

/// First zone key of a raw query string.
fn zone_selector(raw: &str) -> Option<String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .find(|(key, _)| ZONE_KEYS.contains(&key.as_ref()))
        .map(|(_, value)| value.into_owned())
}

/// Every private `/api/{resource}/...` route.
pub async fn dispatch(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let method_label = method.to_string();
    // The raw path is split before decoding; `Path` would decode first.
    let raw = uri.path().strip_prefix("/api/").unwrap_or_default();
    let (resource, rest) = raw.split_once('/').unwrap_or((raw, ""));

    let envelope = match RequestEnvelope::new(method, decode_segment(resource), rest)
        .with_query(query.as_deref(), &state.table)
        .with_body(&body)
    {
        Ok(envelope) => envelope,
        Err(e) => {
            let response = GatewayError::from(e).into_response();
            metrics::record_request(&method_label, response.status().as_u16(), "none", start);
            return response;
        }
    };

    let mut ctx = RequestContext::new(request_id(&headers), envelope);
    let response = match state.pipeline.execute(&mut ctx, &session).await {
        Ok(envelope) => envelope.into_response(),
        Err(e) => e.into_response(),
    };

    metrics::record_request(
        &method_label,
        response.status().as_u16(),
        ctx.command().unwrap_or("none"),
        start,
    );
    tracing::info!(
        request_id = %ctx.request_id,
        command = ctx.command().unwrap_or("none"),
        status = response.status().as_u16(),
        elapsed = ?start.elapsed(),
        "Request completed"
    );
    response
}
