//! XML-RPC transport.
//!
//! # Responsibilities
//! - POST encoded method calls to a zone endpoint
//! - Map HTTP and network failures to `RpcError::Transport`
//! - Decode the response body

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::rpc::codec::{decode_response, encode_call};
use crate::rpc::types::{RpcError, RpcResult};

/// Something able to execute an XML-RPC call against an endpoint.
#[async_trait]
pub trait RpcConnector: Send + Sync {
    async fn call(&self, endpoint: &str, method: &str, params: Vec<Value>) -> RpcResult<Value>;
}

/// HTTP based XML-RPC client shared by all zones.
#[derive(Debug, Clone)]
pub struct XmlRpcClient {
    http: reqwest::Client,
}

impl XmlRpcClient {
    pub fn new(connect_timeout: Duration) -> RpcResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("fireedge-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl RpcConnector for XmlRpcClient {
    async fn call(&self, endpoint: &str, method: &str, params: Vec<Value>) -> RpcResult<Value> {
        let body = encode_call(method, &params);

        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("{endpoint} answered HTTP {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        decode_response(&text)
    }
}
