//! XML-RPC wire format.
//!
//! Values are modelled as `serde_json::Value`:
//!
//! | JSON            | XML-RPC                          |
//! |-----------------|----------------------------------|
//! | null            | `<nil/>`                         |
//! | bool            | `<boolean>`                      |
//! | integer         | `<i4>` (or `<i8>` outside i32)   |
//! | float           | `<double>`                       |
//! | string          | `<string>` (escaped)             |
//! | array           | `<array><data>`                  |
//! | object          | `<struct>`                       |

use quick_xml::escape::escape;
use serde_json::{Map, Number, Value};

use crate::rpc::types::{RpcError, RpcResult};
use crate::xml::{self, Element};

/// Serialize a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        encode_value(param, &mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn encode_value(value: &Value, out: &mut String) {
    out.push_str("<value>");
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str("<boolean>");
            out.push_str(if *b { "1" } else { "0" });
            out.push_str("</boolean>");
        }
        Value::Number(n) => encode_number(n, out),
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(item, out);
            }
            out.push_str("</data></array>");
        }
        Value::Object(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                encode_value(member, out);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

fn encode_number(n: &Number, out: &mut String) {
    match n.as_i64() {
        Some(i) if i32::try_from(i).is_ok() => {
            out.push_str(&format!("<i4>{i}</i4>"));
        }
        Some(i) => out.push_str(&format!("<i8>{i}</i8>")),
        None => {
            let f = n.as_f64().unwrap_or_default();
            out.push_str(&format!("<double>{f}</double>"));
        }
    }
}

/// Decode a `methodResponse` document into its single return value.
pub fn decode_response(body: &str) -> RpcResult<Value> {
    let root = xml::parse(body).map_err(|e| RpcError::Decode(e.to_string()))?;
    if root.name != "methodResponse" {
        return Err(RpcError::Decode(format!("unexpected root <{}>", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| RpcError::Decode("fault without value".into()))?;
        let fault = decode_value(value)?;
        let code = fault.get("faultCode").and_then(Value::as_i64).unwrap_or(-1);
        let message = fault
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(RpcError::Fault { code, message });
    }

    let value = root
        .find("params/param/value")
        .ok_or_else(|| RpcError::Decode("response has no params".into()))?;
    decode_value(value)
}

fn decode_value(value: &Element) -> RpcResult<Value> {
    // An untyped <value> is a string.
    let Some(typed) = value.children.first() else {
        return Ok(Value::String(value.text.clone()));
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "i4" | "int" | "i8" => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| RpcError::Decode(format!("invalid integer '{text}'"))),
        "boolean" => match text {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            other => Err(RpcError::Decode(format!("invalid boolean '{other}'"))),
        },
        "double" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| RpcError::Decode(format!("invalid double '{text}'"))),
        "string" => Ok(Value::String(typed.text.clone())),
        "dateTime.iso8601" | "base64" => Ok(Value::String(text.to_string())),
        "nil" => Ok(Value::Null),
        "array" => {
            let data = typed
                .child("data")
                .ok_or_else(|| RpcError::Decode("array without data".into()))?;
            data.children_named("value")
                .map(decode_value)
                .collect::<RpcResult<Vec<_>>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut map = Map::new();
            for member in typed.children_named("member") {
                let name = member
                    .find_text("name")
                    .ok_or_else(|| RpcError::Decode("struct member without name".into()))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| RpcError::Decode(format!("member '{name}' without value")))?;
                map.insert(name.to_string(), decode_value(value)?);
            }
            Ok(Value::Object(map))
        }
        other => Err(RpcError::Decode(format!("unsupported type <{other}>"))),
    }
}
