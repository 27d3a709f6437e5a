//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared state (command table, zones, guard, RPC bridge, hub)
//! - Create the Axum router with public and private routes
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS)
//! - Run until the shutdown coordinator fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{require_session, AuthGuard, LoginService, TokenSigner};
use crate::commands::CommandTable;
use crate::config::GatewayConfig;
use crate::events::{run_relay, EventHub, TcpLineSource};
use crate::http::handlers;
use crate::http::request::{request_id_header, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::Envelope;
use crate::http::websocket::ws_handler;
use crate::lifecycle::{Shutdown, StartupError};
use crate::pipeline::Pipeline;
use crate::rpc::{RpcBridge, RpcConnector, XmlRpcClient};
use crate::zones::ZoneRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<CommandTable>,
    pub zones: Arc<ZoneRegistry>,
    pub guard: Arc<AuthGuard>,
    pub login: Arc<LoginService>,
    pub pipeline: Arc<Pipeline>,
    pub hub: EventHub,
}

/// The API gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    hub: EventHub,
}

impl GatewayServer {
    /// Create a server talking XML-RPC over HTTP to the configured zones.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let client = XmlRpcClient::new(Duration::from_secs(config.timeouts.connect_secs))?;
        Self::with_connector(config, Arc::new(client))
    }

    /// Create a server with a custom backend transport.
    pub fn with_connector(config: GatewayConfig, connector: Arc<dyn RpcConnector>) -> Result<Self, StartupError> {
        let table = Arc::new(CommandTable::builtin()?);
        let zones = Arc::new(ZoneRegistry::new(config.zones.clone())?);
        let bridge = RpcBridge::new(connector, Duration::from_secs(config.timeouts.rpc_secs));
        let signer = TokenSigner::new(&config.auth.token_secret);
        let hub = EventHub::new();

        tracing::info!(commands = table.len(), zones = zones.all().len(), "Gateway state initialized");

        let state = AppState {
            table: table.clone(),
            zones: zones.clone(),
            guard: Arc::new(AuthGuard::new(signer.clone())),
            login: Arc::new(LoginService::new(bridge.clone(), signer, config.auth.clone())),
            pipeline: Arc::new(Pipeline::new(table, zones, bridge)),
            hub: hub.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config, hub })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let private = Router::new()
            .route("/api/{resource}", any(handlers::dispatch))
            .route("/api/{resource}/{*rest}", any(handlers::dispatch))
            .route_layer(middleware::from_fn_with_state(state.guard.clone(), require_session));

        let public = Router::new()
            .route("/api/auth", post(handlers::login))
            .route("/api/auth/", post(handlers::login))
            .route("/api/health", get(handlers::health))
            .route("/api/zones", get(handlers::list_zones))
            .route("/ws", get(ws_handler));

        let router = public
            .merge(private)
            .fallback(not_found)
            .method_not_allowed_fallback(method_not_allowed)
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri().path(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(request_id_header()))
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
                    .layer(middleware::map_response(timeout_envelope))
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::SERVICE_UNAVAILABLE,
                        Duration::from_secs(config.timeouts.request_secs),
                    )),
            );

        if config.cors.enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// The router, for in-process testing with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires. Starts the event relay
    /// when enabled.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.events.enabled {
            let source = TcpLineSource::new(&self.config.events);
            tokio::spawn(run_relay(source, self.hub.clone(), shutdown.subscribe()));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn not_found() -> impl IntoResponse {
    Envelope::error(StatusCode::NOT_FOUND, "Not found")
}

async fn method_not_allowed() -> impl IntoResponse {
    Envelope::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// The whole-request deadline answers with an empty body; give it the
/// standard envelope.
async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::SERVICE_UNAVAILABLE
        && !response.headers().contains_key(CONTENT_TYPE)
    {
        tracing::warn!("Request deadline exceeded");
        return Envelope::error(StatusCode::SERVICE_UNAVAILABLE, "Request timed out").into_response();
    }
    response
}
