//! Typed view of an API request.

use std::collections::BTreeMap;

use axum::http::Method;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::commands::CommandTable;
use crate::routing::params::ParamError;
use crate::zones::ZONE_KEYS;

/// Path segments after the resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    /// Segments without `=`, in order (action name, resource id).
    pub plain: Vec<String>,
    /// `key=value` segments.
    pub named: BTreeMap<String, String>,
}

impl PathParams {
    /// Split the still percent-encoded path on `/` and `=`, then decode
    /// each piece, so encoded separators stay inside their segment.
    pub fn parse(rest: &str) -> Self {
        let mut params = Self::default();
        for segment in rest.split('/').filter(|s| !s.is_empty()) {
            match segment.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    params.named.insert(decode_segment(key), decode_segment(value));
                }
                _ => params.plain.push(decode_segment(segment)),
            }
        }
        params
    }
}

pub fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Everything the resolvers need from one request, fixed before any of
/// them runs.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub method: Method,
    pub resource: String,
    pub path: PathParams,
    /// Query entries whose key is declared by some command.
    pub query: BTreeMap<String, String>,
    pub body: Map<String, Value>,
    /// Raw federation id, from a path segment or the query string.
    pub zone: Option<String>,
}

impl RequestEnvelope {
    pub fn new(method: Method, resource: impl Into<String>, rest: &str) -> Self {
        Self {
            method,
            resource: resource.into(),
            path: PathParams::parse(rest),
            query: BTreeMap::new(),
            body: Map::new(),
            zone: None,
        }
        .take_path_zone()
    }

    /// Keep the allow-listed query keys; read the zone selector.
    pub fn with_query(mut self, raw_query: Option<&str>, table: &CommandTable) -> Self {
        let Some(raw) = raw_query else {
            return self;
        };
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if ZONE_KEYS.contains(&key.as_ref()) {
                // A selector in the path wins over the query string.
                if self.zone.is_none() {
                    self.zone = Some(value.into_owned());
                }
            } else if table.is_query_allowed(&key) {
                self.query.insert(key.into_owned(), value.into_owned());
            } else {
                tracing::debug!(key = %key, "Dropping undeclared query parameter");
            }
        }
        self
    }

    /// Parse a JSON object body. An empty body is an empty object.
    pub fn with_body(mut self, body: &[u8]) -> Result<Self, ParamError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(self);
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => {
                self.body = map;
                Ok(self)
            }
            Ok(_) => Err(ParamError::MalformedBody("expected a JSON object".into())),
            Err(e) => Err(ParamError::MalformedBody(e.to_string())),
        }
    }

    fn take_path_zone(mut self) -> Self {
        for key in ZONE_KEYS {
            if let Some(value) = self.path.named.remove(key) {
                self.zone.get_or_insert(value);
            }
        }
        self
    }
}
