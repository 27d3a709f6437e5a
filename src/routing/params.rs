//! Positional argument resolution.
//!
//! For each declared parameter, in declaration order, the value is read from
//! its source, coerced to the type of its default, or replaced by the default
//! when absent.

use serde_json::{Number, Value};
use thiserror::Error;

use crate::commands::{Command, ParamDefault, ParamSource, ParamSpec};
use crate::routing::envelope::RequestEnvelope;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("Invalid value for '{name}': expected {expected}")]
    InvalidValue { name: String, expected: &'static str },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

/// Build the ordered argument list for `command`.
///
/// `id` is the plain resource id segment chosen by the router. It fills the
/// first path parameter that no `key=value` segment names.
pub fn resolve(
    command: &Command,
    id: Option<&str>,
    envelope: &RequestEnvelope,
) -> Result<Vec<Value>, ParamError> {
    let mut id = id;
    command
        .params()
        .iter()
        .map(|spec| match spec.source {
            ParamSource::PathResource => match envelope.path.named.get(spec.name) {
                Some(value) => coerce_str(spec, value),
                None => match id.take() {
                    Some(value) => coerce_str(spec, value),
                    None => Ok(spec.default.to_value()),
                },
            },
            ParamSource::Query => envelope
                .query
                .get(spec.name)
                .map(|value| coerce_str(spec, value))
                .unwrap_or_else(|| Ok(spec.default.to_value())),
            ParamSource::Body => match envelope.body.get(spec.name) {
                None | Some(Value::Null) => Ok(spec.default.to_value()),
                Some(value) => coerce_json(spec, value),
            },
        })
        .collect()
}

fn invalid(spec: &ParamSpec) -> ParamError {
    ParamError::InvalidValue {
        name: spec.name.to_string(),
        expected: spec.default.kind(),
    }
}

/// Coerce a textual value (path or query) to the parameter's type.
fn coerce_str(spec: &ParamSpec, raw: &str) -> Result<Value, ParamError> {
    let trimmed = raw.trim();
    match spec.default {
        ParamDefault::Int(_) => trimmed.parse::<i64>().map(Value::from).map_err(|_| invalid(spec)),
        ParamDefault::Float(_) => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid(spec)),
        ParamDefault::Bool(_) => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Value::Bool(true)),
            "false" | "0" | "no" => Ok(Value::Bool(false)),
            _ => Err(invalid(spec)),
        },
        ParamDefault::Str(_) => Ok(Value::String(raw.to_string())),
    }
}

/// Coerce a body value. Matching types pass as-is, strings are parsed,
/// structured values are forwarded untouched.
fn coerce_json(spec: &ParamSpec, value: &Value) -> Result<Value, ParamError> {
    match (spec.default, value) {
        (_, Value::Array(_) | Value::Object(_)) => Ok(value.clone()),
        (_, Value::String(s)) => coerce_str(spec, s),

        (ParamDefault::Int(_), Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Value::from)
            .ok_or_else(|| invalid(spec)),
        (ParamDefault::Int(_), Value::Bool(b)) => Ok(Value::from(i64::from(*b))),

        (ParamDefault::Float(_), Value::Number(_)) => Ok(value.clone()),
        (ParamDefault::Float(_), Value::Bool(_)) => Err(invalid(spec)),

        (ParamDefault::Bool(_), Value::Bool(_)) => Ok(value.clone()),
        (ParamDefault::Bool(_), Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(invalid(spec)),
        },

        (ParamDefault::Str(_), Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ParamDefault::Str(_), Value::Bool(b)) => Ok(Value::String(b.to_string())),

        (_, Value::Null) => Ok(spec.default.to_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandTable;
    use crate::routing::router::CommandRouter;
    use axum::http::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn resolve_request(
        method: Method,
        resource: &str,
        rest: &str,
        query: Option<&str>,
        body: &str,
    ) -> Result<Vec<Value>, ParamError> {
        let table = Arc::new(CommandTable::builtin().unwrap());
        let envelope = RequestEnvelope::new(method, resource, rest)
            .with_query(query, &table)
            .with_body(body.as_bytes())?;
        let router = CommandRouter::new(table);
        let resolved = router.route(&envelope).unwrap();
        resolve(resolved.command, resolved.id, &envelope)
    }

    #[test]
    fn test_id_from_path_status_from_body() {
        let args = resolve_request(Method::PUT, "host", "5/status", None, r#"{"status": 1}"#).unwrap();
        assert_eq!(args, vec![json!(5), json!(1)]);
    }

    #[test]
    fn test_query_order_and_defaults() {
        let args = resolve_request(Method::GET, "vmpool", "info", Some("filter=-2&start=-1"), "").unwrap();
        assert_eq!(args, vec![json!(-2), json!(-1), json!(-1), json!(-2), json!("")]);
    }

    #[test]
    fn test_all_defaults() {
        let args = resolve_request(Method::GET, "vmpool", "info", None, "").unwrap();
        assert_eq!(args, vec![json!(-1), json!(-1), json!(-1), json!(-2), json!("")]);
    }

    #[test]
    fn test_undeclared_query_never_forwarded() {
        let args = resolve_request(Method::GET, "host", "3/info", Some("injected=evil&decrypt=true"), "").unwrap();
        assert_eq!(args, vec![json!(3), json!(true)]);
    }

    #[test]
    fn test_named_path_segment_overrides_id() {
        let args = resolve_request(Method::GET, "host", "info/id=7", None, "").unwrap();
        assert_eq!(args, vec![json!(7), json!(false)]);
    }

    #[test]
    fn test_body_before_path_order() {
        let args = resolve_request(Method::PUT, "vm", "8/action", None, r#"{"action": "poweroff"}"#).unwrap();
        assert_eq!(args, vec![json!("poweroff"), json!(8)]);
    }

    #[test]
    fn test_string_coercion_in_body() {
        let args = resolve_request(Method::PUT, "host", "5/status", None, r#"{"status": "2"}"#).unwrap();
        assert_eq!(args, vec![json!(5), json!(2)]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = resolve_request(Method::PUT, "host", "abc/status", None, "").unwrap_err();
        assert_eq!(err, ParamError::InvalidValue { name: "id".into(), expected: "integer" });

        let err = resolve_request(Method::GET, "host", "1/info", Some("decrypt=maybe"), "").unwrap_err();
        assert_eq!(err, ParamError::InvalidValue { name: "decrypt".into(), expected: "boolean" });
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let first = resolve_request(Method::GET, "vmpool", "info", Some("filter=-3&state=3"), "").unwrap();
        for _ in 0..10 {
            let again = resolve_request(Method::GET, "vmpool", "info", Some("filter=-3&state=3"), "").unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_coerce_json_variants() {
        let spec = crate::commands::body("flag", ParamDefault::Bool(false));
        assert_eq!(coerce_json(&spec, &json!(1)).unwrap(), json!(true));
        assert_eq!(coerce_json(&spec, &json!("false")).unwrap(), json!(false));
        assert!(coerce_json(&spec, &json!(5)).is_err());

        let spec = crate::commands::body("name", ParamDefault::Str(""));
        assert_eq!(coerce_json(&spec, &json!(12)).unwrap(), json!("12"));
        assert_eq!(coerce_json(&spec, &json!({"a": 1})).unwrap(), json!({"a": 1}));

        let spec = crate::commands::body("n", ParamDefault::Int(0));
        assert_eq!(coerce_json(&spec, &json!(4.0)).unwrap(), json!(4));
        assert!(coerce_json(&spec, &json!(4.5)).is_err());
    }
}
