//! Request pipeline.
//!
//! # Data Flow
//! ```text
//! RequestContext (owned by one request, dropped with it)
//!     Received
//!     → ZoneResolved       zone selector → &Zone
//!     → Authenticated      Session (from the guard) → Credentials
//!     → ParamsResolved     router + params → command, ordered args
//!     → CommandDispatched  RPC bridge call
//!     → ResponseEmitted    Envelope or GatewayError
//! ```
//!
//! # Design Decisions
//! - All per-request state lives in the context value; the pipeline itself
//!   only holds immutable, shared data
//! - Any failure jumps straight to ResponseEmitted with the most specific
//!   status known at that stage

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::auth::Session;
use crate::commands::CommandTable;
use crate::http::response::{Envelope, GatewayError};
use crate::routing::{params, CommandRouter, RequestEnvelope};
use crate::rpc::{Credentials, RpcBridge};
use crate::zones::{Zone, ZoneRegistry};

/// Pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    ZoneResolved,
    Authenticated,
    ParamsResolved,
    CommandDispatched,
    ResponseEmitted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::ZoneResolved => "zone_resolved",
            Stage::Authenticated => "authenticated",
            Stage::ParamsResolved => "params_resolved",
            Stage::CommandDispatched => "command_dispatched",
            Stage::ResponseEmitted => "response_emitted",
        };
        f.write_str(name)
    }
}

/// State of one in-flight request.
#[derive(Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub envelope: RequestEnvelope,
    stage: Stage,
    zone: Option<Zone>,
    credentials: Option<Credentials>,
    command: Option<String>,
    args: Vec<Value>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, envelope: RequestEnvelope) -> Self {
        Self {
            request_id: request_id.into(),
            envelope,
            stage: Stage::Received,
            zone: None,
            credentials: None,
            command: None,
            args: Vec::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Name of the resolved command, once known.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    fn advance(&mut self, stage: Stage) {
        tracing::trace!(request_id = %self.request_id, from = %self.stage, to = %stage, "Pipeline transition");
        self.stage = stage;
    }
}

/// Shared, read-only collaborators of every request.
#[derive(Clone)]
pub struct Pipeline {
    router: CommandRouter,
    zones: Arc<ZoneRegistry>,
    bridge: RpcBridge,
}

impl Pipeline {
    pub fn new(table: Arc<CommandTable>, zones: Arc<ZoneRegistry>, bridge: RpcBridge) -> Self {
        Self {
            router: CommandRouter::new(table),
            zones,
            bridge,
        }
    }

    /// Drive `ctx` to `ResponseEmitted`.
    pub async fn execute(&self, ctx: &mut RequestContext, session: &Session) -> Result<Envelope, GatewayError> {
        let outcome = self.run_stages(ctx, session).await;
        ctx.advance(Stage::ResponseEmitted);
        outcome
    }

    async fn run_stages(&self, ctx: &mut RequestContext, session: &Session) -> Result<Envelope, GatewayError> {
        let zone = self.zones.resolve(ctx.envelope.zone.as_deref())?.clone();
        ctx.zone = Some(zone.clone());
        ctx.advance(Stage::ZoneResolved);

        let credentials = session.credentials();
        ctx.credentials = Some(credentials.clone());
        ctx.advance(Stage::Authenticated);

        let resolved = self.router.route(&ctx.envelope)?;
        let command = resolved.command;
        let args = params::resolve(command, resolved.id, &ctx.envelope)?;
        let method = command.rpc_method();
        ctx.command = Some(command.name().to_string());
        ctx.args = args.clone();
        ctx.advance(Stage::ParamsResolved);

        tracing::debug!(
            request_id = %ctx.request_id,
            zone = zone.id,
            command = %method,
            user = %credentials.username,
            "Dispatching command"
        );
        let value = self.bridge.invoke(&zone, &credentials, &method, args).await?;
        ctx.advance(Stage::CommandDispatched);

        Ok(Envelope::from_backend(value))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("zones", &self.zones.all().len())
            .field("commands", &self.router.table().len())
            .finish()
    }
}
