//! Event relay WebSocket endpoint.
//!
//! # Data Flow
//! ```text
//! GET /ws?token=<bearer>  (or Authorization header)
//!     → token checked with the same guard as private routes
//!     → upgrade, register with the EventHub
//!     → hub events forwarded as JSON text frames
//!     → on close or send failure: unregister
//! ```

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::guard::bearer_token;
use crate::auth::AuthError;
use crate::events::EventHub;
use crate::http::response::GatewayError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// `GET /ws`
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let token = query.token.as_deref().or_else(|| bearer_token(&headers));
    let session = match token {
        Some(token) => state.guard.verify_token(token),
        None => Err(AuthError::MissingToken),
    };
    let session = match session {
        Ok(session) => session,
        Err(e) => return GatewayError::from(e).into_response(),
    };

    match upgrade {
        Ok(upgrade) => {
            let hub = state.hub.clone();
            let user = session.audience;
            upgrade.on_upgrade(move |socket| client_session(socket, hub, user))
        }
        Err(rejection) => rejection.into_response(),
    }
}

async fn client_session(socket: WebSocket, hub: EventHub, user: String) {
    let (mut sender, mut receiver) = socket.split();
    let (id, mut events) = hub.register();
    tracing::info!(client = id, user = %user, "Event relay client connected");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    hub.unregister(id);
    tracing::info!(client = id, user = %user, "Event relay client disconnected");
}
