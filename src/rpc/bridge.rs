//! Zone call dispatch.
//!
//! # Responsibilities
//! - Prepend the session argument to the resolved positional args
//! - Enforce the per-call deadline
//! - Interpret the daemon's `[success, value, code]` result convention
//! - Record call metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::time::timeout;

use crate::observability::metrics;
use crate::rpc::client::RpcConnector;
use crate::rpc::types::{Credentials, RpcError, RpcResult};
use crate::zones::Zone;

/// Invokes backend methods on behalf of an authenticated user.
#[derive(Clone)]
pub struct RpcBridge {
    connector: Arc<dyn RpcConnector>,
    timeout: Duration,
}

impl RpcBridge {
    pub fn new(connector: Arc<dyn RpcConnector>, timeout: Duration) -> Self {
        Self { connector, timeout }
    }

    /// Call `method` on `zone` with `args`, authenticated as `credentials`.
    pub async fn invoke(
        &self,
        zone: &Zone,
        credentials: &Credentials,
        method: &str,
        args: Vec<Value>,
    ) -> RpcResult<Value> {
        let start = Instant::now();

        let mut params = Vec::with_capacity(args.len() + 1);
        params.push(Value::String(credentials.session()));
        params.extend(args);

        let outcome = match timeout(self.timeout, self.connector.call(&zone.rpc_url, method, params)).await {
            Ok(result) => result.and_then(interpret_result),
            Err(_) => Err(RpcError::Timeout(self.timeout.as_millis() as u64)),
        };

        match &outcome {
            Ok(_) => {
                tracing::debug!(zone = zone.id, method, elapsed = ?start.elapsed(), "RPC call succeeded");
                metrics::record_rpc_call(&zone.name, method, "ok", start);
            }
            Err(e) => {
                tracing::warn!(zone = zone.id, method, error = %e, "RPC call failed");
                metrics::record_rpc_call(&zone.name, method, e.outcome(), start);
            }
        }

        outcome
    }
}

impl std::fmt::Debug for RpcBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcBridge")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Unwrap the `[success, value, error_code, ...]` array every daemon method
/// returns. Anything else is passed through untouched.
pub fn interpret_result(value: Value) -> RpcResult<Value> {
    let Value::Array(mut items) = value else {
        return Ok(value);
    };

    match items.first() {
        Some(Value::Bool(true)) => Ok(if items.len() > 1 { items.swap_remove(1) } else { Value::Null }),
        Some(Value::Bool(false)) => {
            let message = match items.get(1) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "Backend call failed".to_string(),
            };
            Err(RpcError::Backend(message))
        }
        _ => Ok(Value::Array(items)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(String, String, Vec<Value>)>>,
        delay: Option<Duration>,
        reply: Option<Value>,
    }

    #[async_trait]
    impl RpcConnector for Recording {
        async fn call(&self, endpoint: &str, method: &str, params: Vec<Value>) -> RpcResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), method.to_string(), params));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.reply.clone().unwrap_or(json!([true, "ok", 0])))
        }
    }

    fn zone() -> Zone {
        Zone {
            id: 0,
            name: "primary".into(),
            rpc_url: "http://zone0/RPC2".into(),
            console_url: None,
        }
    }

    #[tokio::test]
    async fn test_session_prepended_and_result_unwrapped() {
        let connector = Arc::new(Recording {
            reply: Some(json!([true, 42, 0])),
            ..Default::default()
        });
        let bridge = RpcBridge::new(connector.clone(), Duration::from_secs(1));
        let creds = Credentials::new("0", "oneadmin", "tok");

        let value = bridge
            .invoke(&zone(), &creds, "one.host.status", vec![json!(5), json!(1)])
            .await
            .unwrap();
        assert_eq!(value, json!(42));

        let calls = connector.calls.lock().unwrap();
        assert_eq!(calls[0].0, "http://zone0/RPC2");
        assert_eq!(calls[0].1, "one.host.status");
        assert_eq!(calls[0].2, vec![json!("oneadmin:tok"), json!(5), json!(1)]);
    }

    #[tokio::test]
    async fn test_backend_failure_text_verbatim() {
        let connector = Arc::new(Recording {
            reply: Some(json!([false, "[one.host.status] User couldn't be authenticated, aborting call.", 256])),
            ..Default::default()
        });
        let bridge = RpcBridge::new(connector, Duration::from_secs(1));
        let err = bridge
            .invoke(&zone(), &Credentials::new("0", "u", "t"), "one.host.status", vec![])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RpcError::Backend("[one.host.status] User couldn't be authenticated, aborting call.".into())
        );
    }

    #[tokio::test]
    async fn test_timeout() {
        let connector = Arc::new(Recording {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        let bridge = RpcBridge::new(connector, Duration::from_millis(20));
        let err = bridge
            .invoke(&zone(), &Credentials::new("0", "u", "t"), "one.vm.info", vec![])
            .await
            .unwrap_err();
        assert_eq!(err, RpcError::Timeout(20));
    }

    #[test]
    fn test_interpret_result_passthrough() {
        assert_eq!(interpret_result(json!("plain")).unwrap(), json!("plain"));
        assert_eq!(interpret_result(json!([1, 2])).unwrap(), json!([1, 2]));
        assert_eq!(interpret_result(json!([true])).unwrap(), Value::Null);
    }
}
