//! Command resolution from the request path.
//!
//! # Responsibilities
//! - Reject resources no command serves
//! - Find the segment naming an action of the resource
//! - Treat at most one remaining plain segment as the resource id
//! - Fail closed on a verb mismatch, before any argument is resolved

use std::sync::Arc;

use thiserror::Error;

use crate::commands::{Command, CommandTable, HttpMethod};
use crate::routing::envelope::RequestEnvelope;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Resource '{0}' is not available")]
    UnknownResource(String),

    #[error("No valid action given for resource '{0}'")]
    MissingAction(String),

    #[error("Unexpected path segment '{0}'")]
    UnexpectedSegment(String),

    #[error("Method {method} not allowed for '{command}', expected {expected}")]
    MethodNotAllowed {
        command: String,
        method: String,
        expected: HttpMethod,
    },
}

/// Outcome of routing: the command plus the resource id segment, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub command: &'a Command,
    pub id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct CommandRouter {
    table: Arc<CommandTable>,
}

impl CommandRouter {
    pub fn new(table: Arc<CommandTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn route<'a>(&'a self, envelope: &'a RequestEnvelope) -> Result<Resolved<'a>, RoutingError> {
        let resource = envelope.resource.as_str();
        if !self.table.serves_resource(resource) {
            return Err(RoutingError::UnknownResource(resource.to_string()));
        }

        let plain = &envelope.path.plain;
        let (action_index, command) = plain
            .iter()
            .enumerate()
            .find_map(|(i, segment)| self.table.find(resource, segment).map(|cmd| (i, cmd)))
            .ok_or_else(|| RoutingError::MissingAction(resource.to_string()))?;

        let mut rest = plain
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != action_index)
            .map(|(_, segment)| segment.as_str());
        let id = rest.next();
        if let Some(extra) = rest.next() {
            return Err(RoutingError::UnexpectedSegment(extra.to_string()));
        }

        if HttpMethod::from_http(&envelope.method) != Some(command.http_method()) {
            return Err(RoutingError::MethodNotAllowed {
                command: command.name().to_string(),
                method: envelope.method.to_string(),
                expected: command.http_method(),
            });
        }

        Ok(Resolved { command, id })
    }
}
