//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use fireedge_gateway::auth::token::{now_secs, Claims};
use fireedge_gateway::auth::{Session, TokenSigner};
use fireedge_gateway::events::EventHub;
use fireedge_gateway::rpc::{RpcConnector, RpcResult};
use fireedge_gateway::zones::Zone;
use fireedge_gateway::{GatewayConfig, GatewayServer, Shutdown};

pub const SECRET: &str = "integration-test-secret";

pub fn zone(id: u32, rpc_url: impl Into<String>) -> Zone {
    Zone {
        id,
        name: format!("zone-{id}"),
        rpc_url: rpc_url.into(),
        console_url: None,
    }
}

pub fn config(zones: Vec<Zone>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.zones = zones;
    config.auth.token_secret = SECRET.to_string();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.timeouts.rpc_secs = 2;
    config
}

/// A gateway served on an ephemeral port. Shuts down when dropped.
pub struct TestGateway {
    pub base: String,
    pub hub: EventHub,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn ws_url(&self, query: &str) -> String {
        format!("{}/ws{}", self.base.replacen("http://", "ws://", 1), query)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn(server: GatewayServer) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hub = server.hub().clone();
    let shutdown = Shutdown::new();
    tokio::spawn(server.run(listener, shutdown.clone()));
    TestGateway {
        base: format!("http://{addr}"),
        hub,
        shutdown,
    }
}

/// Gateway backed by real XML-RPC over HTTP (e.g. a wiremock server).
pub async fn spawn_http(zones: Vec<Zone>) -> TestGateway {
    spawn(GatewayServer::new(config(zones)).unwrap()).await
}

/// Gateway backed by an in-process connector.
pub async fn spawn_with(zones: Vec<Zone>, connector: Arc<dyn RpcConnector>) -> TestGateway {
    spawn_configured(config(zones), connector).await
}

/// Like `spawn_with`, for tests that tune the configuration first.
pub async fn spawn_configured(config: GatewayConfig, connector: Arc<dyn RpcConnector>) -> TestGateway {
    spawn(GatewayServer::with_connector(config, connector).unwrap()).await
}

pub fn token_for(user: &str, backend_token: &str, lifetime_secs: u64) -> String {
    let session = Session::new("0", user, backend_token, now_secs(), lifetime_secs);
    TokenSigner::new(SECRET).mint(&session).unwrap()
}

/// Sign a raw claim set with the gateway secret, including sets the
/// gateway itself would never mint.
pub fn sign_claims(claims: &Claims) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user: &str, backend_token: &str) -> String {
    format!("Bearer {}", token_for(user, backend_token, 600))
}

/// `methodResponse` carrying `[true, <value_xml>, 0]`.
pub fn xmlrpc_ok(value_xml: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><methodResponse><params><param><value><array><data>\
         <value><boolean>1</boolean></value><value>{value_xml}</value><value><i4>0</i4></value>\
         </data></array></value></param></params></methodResponse>"
    )
}

/// `methodResponse` carrying `[false, <message>, code]`.
pub fn xmlrpc_fail(message: &str, code: i32) -> String {
    format!(
        "<?xml version=\"1.0\"?><methodResponse><params><param><value><array><data>\
         <value><boolean>0</boolean></value><value><string>{message}</string></value>\
         <value><i4>{code}</i4></value></data></array></value></param></params></methodResponse>"
    )
}

/// The exact `<params>` fragment the gateway sends for `args`.
pub fn params_fragment(args: &[&str]) -> String {
    args.iter()
        .map(|value| format!("<param><value>{value}</value></param>"))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub method: String,
    pub params: Vec<Value>,
}

/// In-process backend. Answers every call with
/// `{endpoint, method, args}` after a per-endpoint delay.
#[derive(Default)]
pub struct EchoBackend {
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl EchoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, endpoint: &str, delay: Duration) -> Self {
        self.delays.insert(endpoint.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RpcConnector for EchoBackend {
    async fn call(&self, endpoint: &str, method: &str, params: Vec<Value>) -> RpcResult<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            params: params.clone(),
        });
        if let Some(delay) = self.delays.get(endpoint) {
            tokio::time::sleep(*delay).await;
        }
        Ok(json!([
            true,
            {"endpoint": endpoint, "method": method, "args": params[1..].to_vec()},
            0
        ]))
    }
}
