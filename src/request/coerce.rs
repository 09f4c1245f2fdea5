//! Parameter value coercion
//!
//! Turns textual input (CLI assignments) and loosely typed JSON input into the
//! value shape each declared parameter type puts on the wire.

use crate::error::{Error, Result};
use crate::loader::ParameterDefinition;
use crate::types::{JsonObject, ParamType};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Number, Value};

/// Coerce a textual value for the given parameter
pub fn coerce_str(param: &ParameterDefinition, raw: &str) -> Result<Value> {
    let invalid = |message: String| Error::invalid_value(&param.name, message);

    match param.param_type {
        ParamType::String => Ok(Value::String(raw.to_string())),
        ParamType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(format!("'{raw}' is not an integer"))),
        ParamType::Boolean => {
            parse_bool(raw).ok_or_else(|| invalid(format!("'{raw}' is not a boolean")))
        }
        ParamType::Timestamp => parse_timestamp(raw)
            .ok_or_else(|| invalid(format!("'{raw}' is not an RFC 3339 date or epoch seconds"))),
        ParamType::StringList => {
            let trimmed = raw.trim();
            if trimmed.starts_with('[') {
                let value: Value = serde_json::from_str(trimmed)
                    .map_err(|e| invalid(format!("invalid JSON list: {e}")))?;
                coerce_value(param, value)
            } else if trimmed.is_empty() {
                Ok(Value::Array(Vec::new()))
            } else {
                Ok(Value::Array(
                    trimmed
                        .split(',')
                        .map(|item| Value::String(item.trim().to_string()))
                        .collect(),
                ))
            }
        }
        ParamType::StringMap => {
            let trimmed = raw.trim();
            if trimmed.starts_with('{') {
                let value: Value = serde_json::from_str(trimmed)
                    .map_err(|e| invalid(format!("invalid JSON map: {e}")))?;
                coerce_value(param, value)
            } else {
                let mut map = JsonObject::new();
                for pair in trimmed.split(',').filter(|p| !p.trim().is_empty()) {
                    let (key, value) = pair
                        .split_once('=')
                        .ok_or_else(|| invalid(format!("'{pair}' is not a key=value pair")))?;
                    map.insert(
                        key.trim().to_string(),
                        Value::String(value.trim().to_string()),
                    );
                }
                Ok(Value::Object(map))
            }
        }
        ParamType::Json => {
            serde_json::from_str(raw).map_err(|e| invalid(format!("invalid JSON: {e}")))
        }
    }
}

/// Check and normalize an already-structured value for the given parameter
pub fn coerce_value(param: &ParameterDefinition, value: Value) -> Result<Value> {
    let invalid = |message: String| Error::invalid_value(&param.name, message);

    match (param.param_type, value) {
        (ParamType::Json, value) => Ok(value),
        (ParamType::String, Value::String(s)) => Ok(Value::String(s)),
        (ParamType::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ParamType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (ParamType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Ok(Value::Number(n))
        }
        (ParamType::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ParamType::Timestamp, Value::Number(n)) => Ok(Value::Number(n)),
        (ParamType::StringList, Value::Array(items)) => {
            let items = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(Value::String(s)),
                    other => Err(invalid(format!("list element {other} is not a string"))),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(items))
        }
        (ParamType::StringList, Value::String(s)) => Ok(Value::Array(vec![Value::String(s)])),
        (ParamType::StringMap, Value::Object(map)) => {
            for (key, value) in &map {
                if !value.is_string() {
                    return Err(invalid(format!("map value for '{key}' is not a string")));
                }
            }
            Ok(Value::Object(map))
        }
        (_, Value::String(s)) => coerce_str(param, &s),
        (expected, other) => Err(invalid(format!("expected {expected}, got {other}"))),
    }
}

/// Parse the boolean spellings accepted on the command line
fn parse_bool(raw: &str) -> Option<Value> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "$true" | "1" | "yes" => Some(Value::Bool(true)),
        "false" | "$false" | "0" | "no" => Some(Value::Bool(false)),
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp, a plain date, or epoch seconds into epoch seconds
fn parse_timestamp(raw: &str) -> Option<Value> {
    let raw = raw.trim();

    if let Ok(seconds) = raw.parse::<i64>() {
        return Some(Value::from(seconds));
    }

    let parsed: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc)
    } else {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        date.and_hms_opt(0, 0, 0)?.and_utc()
    };

    let millis = parsed.timestamp_millis();
    if millis % 1000 == 0 {
        Some(Value::from(parsed.timestamp()))
    } else {
        Number::from_f64(millis as f64 / 1000.0).map(Value::Number)
    }
}
