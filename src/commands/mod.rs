//! Command table subsystem.
//!
//! # Data Flow
//! ```text
//! Per-family tables (host.rs, vm.rs, ...)   &'static [CommandDef]
//!     → CommandTable::from_groups (aggregate, collision policy)
//!     → CommandTable (immutable, shared via Arc)
//!     → lookup("host.status") on every request
//! ```
//!
//! # Design Decisions
//! - Tables are plain data; no behavior lives next to a definition
//! - Declaration order of params is the positional order of the RPC call
//! - The query allow-list is derived from the table, never configured
//! - Name collisions are rejected at load time unless asked otherwise

pub mod cluster;
pub mod host;
pub mod system;
pub mod template;
pub mod user;
pub mod vm;
pub mod vnet;
pub mod zone;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use axum::http::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Prefix of every XML-RPC method exposed by the orchestration daemon.
pub const RPC_PREFIX: &str = "one";

/// HTTP verb a command is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Map an incoming request method. Verbs outside the four used by the
    /// table yield `None` and can never match a command.
    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Self::Get),
            Method::POST => Some(Self::Post),
            Method::PUT => Some(Self::Put),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamSource {
    /// Resource id path segment or a `key=value` path segment.
    PathResource,
    /// Query string entry of the same name.
    Query,
    /// Field of the JSON body of the same name.
    Body,
}

/// Value substituted when a parameter is absent at its source.
///
/// The variant also fixes the type the resolved value is coerced to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'static str),
}

impl ParamDefault {
    pub fn to_value(&self) -> Value {
        match *self {
            Self::Int(v) => Value::from(v),
            Self::Float(v) => Value::from(v),
            Self::Bool(v) => Value::Bool(v),
            Self::Str(v) => Value::String(v.to_string()),
        }
    }

    /// Human readable type name used in validation errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
        }
    }
}

/// How to obtain one positional argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub source: ParamSource,
    pub default: ParamDefault,
}

pub const fn path(name: &'static str, default: ParamDefault) -> ParamSpec {
    ParamSpec { name, source: ParamSource::PathResource, default }
}

pub const fn query(name: &'static str, default: ParamDefault) -> ParamSpec {
    ParamSpec { name, source: ParamSource::Query, default }
}

pub const fn body(name: &'static str, default: ParamDefault) -> ParamSpec {
    ParamSpec { name, source: ParamSource::Body, default }
}

/// Static definition of a command as written in the family tables.
#[derive(Debug, Clone, Copy)]
pub struct CommandDef {
    pub name: &'static str,
    pub method: HttpMethod,
    pub params: &'static [ParamSpec],
}

/// A registered backend operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    http_method: HttpMethod,
    params: Vec<ParamSpec>,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        http_method: HttpMethod,
        params: Vec<ParamSpec>,
    ) -> Result<Self, CommandTableError> {
        let name = name.into();
        match name.split_once('.') {
            Some((resource, action))
                if !resource.is_empty() && !action.is_empty() && !action.contains('.') => {}
            _ => return Err(CommandTableError::InvalidName(name)),
        }
        Ok(Self { name, http_method, params })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource(&self) -> &str {
        self.name.split_once('.').map(|(r, _)| r).unwrap_or(&self.name)
    }

    pub fn action(&self) -> &str {
        self.name.split_once('.').map(|(_, a)| a).unwrap_or_default()
    }

    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// XML-RPC method invoked on the backend.
    pub fn rpc_method(&self) -> String {
        format!("{}.{}", RPC_PREFIX, self.name)
    }
}

impl TryFrom<&CommandDef> for Command {
    type Error = CommandTableError;

    fn try_from(def: &CommandDef) -> Result<Self, Self::Error> {
        Command::new(def.name, def.method, def.params.to_vec())
    }
}

/// Errors raised while building the table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandTableError {
    #[error("command name '{0}' is not of the form resource.action")]
    InvalidName(String),

    #[error("command '{0}' is defined more than once")]
    Duplicate(String),
}

/// What to do when two tables define the same command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    #[default]
    Reject,
    /// Later definitions replace earlier ones.
    Overwrite,
}

/// Flat, immutable namespace of every dispatchable command.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
    resources: HashSet<String>,
    query_allow_list: BTreeSet<String>,
}

impl CommandTable {
    /// The table served by the gateway.
    pub fn builtin() -> Result<Self, CommandTableError> {
        Self::from_groups(
            &[
                host::COMMANDS,
                cluster::COMMANDS,
                vm::COMMANDS,
                vnet::COMMANDS,
                template::COMMANDS,
                user::COMMANDS,
                zone::COMMANDS,
                system::COMMANDS,
            ],
            CollisionPolicy::Reject,
        )
    }

    /// Aggregate several topic tables into one namespace.
    pub fn from_groups(
        groups: &[&[CommandDef]],
        policy: CollisionPolicy,
    ) -> Result<Self, CommandTableError> {
        let commands = groups
            .iter()
            .flat_map(|group| group.iter())
            .map(Command::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_commands(commands, policy)
    }

    pub fn from_commands(
        commands: impl IntoIterator<Item = Command>,
        policy: CollisionPolicy,
    ) -> Result<Self, CommandTableError> {
        let mut table = Self::default();
        for command in commands {
            if table.commands.contains_key(command.name()) {
                match policy {
                    CollisionPolicy::Reject => {
                        return Err(CommandTableError::Duplicate(command.name().to_string()))
                    }
                    CollisionPolicy::Overwrite => {
                        tracing::warn!(command = %command.name(), "Overwriting duplicate command definition");
                    }
                }
            }
            table.commands.insert(command.name().to_string(), command);
        }

        // Derived sets are rebuilt from the surviving definitions so an
        // overwritten command does not leak its query names.
        for command in table.commands.values() {
            table.resources.insert(command.resource().to_string());
            for param in command.params() {
                if param.source == ParamSource::Query {
                    table.query_allow_list.insert(param.name.to_string());
                }
            }
        }

        Ok(table)
    }

    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn find(&self, resource: &str, action: &str) -> Option<&Command> {
        self.commands.get(&format!("{}.{}", resource, action))
    }

    pub fn serves_resource(&self, resource: &str) -> bool {
        self.resources.contains(resource)
    }

    /// True if `key` is declared as a query parameter by any command.
    pub fn is_query_allowed(&self, key: &str) -> bool {
        self.query_allow_list.contains(key)
    }

    pub fn query_allow_list(&self) -> impl Iterator<Item = &str> {
        self.query_allow_list.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
