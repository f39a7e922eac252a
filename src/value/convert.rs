//! Conversion between attribute values and config-map JSON
//!
//! The server normalizes what it stores (`true` comes back as `"true"`,
//! ports come back as numbers), so reading undoes those normalizations for
//! the attribute's declared type. Errors name the key and the expected type,
//! never the value.

use super::types::{AttrType, AttrValue};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use tracing::trace;

/// Convert an attribute value to JSON for an outbound config map
///
/// Returns `None` for null and unknown values; the caller omits the key so
/// the server applies its own default.
pub fn to_native(value: &AttrValue) -> Option<JsonValue> {
    match value {
        AttrValue::Null | AttrValue::Unknown => None,
        AttrValue::Float(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
        AttrValue::Object(fields) => Some(JsonValue::Object(
            fields
                .iter()
                .filter_map(|(k, v)| to_native(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
        other => Some(other.to_json()),
    }
}

/// Read `key` from a config map as an attribute of type `target`
///
/// Absent keys and JSON null both read as null. A present empty string stays
/// an empty string.
pub fn from_native(config: &JsonObject, key: &str, target: AttrType) -> Result<AttrValue> {
    match config.get(key) {
        None | Some(JsonValue::Null) => {
            trace!(key, "Config key absent");
            Ok(AttrValue::Null)
        }
        Some(value) => coerce(key, value, target),
    }
}

/// Coerce one JSON value to the declared attribute type
pub fn coerce(key: &str, value: &JsonValue, target: AttrType) -> Result<AttrValue> {
    if value.is_null() {
        return Ok(AttrValue::Null);
    }

    let mismatch = || Error::conversion(key, target.as_str(), format!("got {}", json_type(value)));

    match target {
        AttrType::String => match value {
            JsonValue::String(s) => Ok(AttrValue::String(s.clone())),
            JsonValue::Number(n) => Ok(AttrValue::String(n.to_string())),
            JsonValue::Bool(b) => Ok(AttrValue::String(b.to_string())),
            _ => Err(mismatch()),
        },
        AttrType::Int => match value {
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral))
                .map(AttrValue::Int)
                .ok_or_else(mismatch),
            JsonValue::String(s) => parse_int(s.trim()).map(AttrValue::Int).ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        AttrType::Float => match value {
            JsonValue::Number(n) => n.as_f64().map(AttrValue::Float).ok_or_else(mismatch),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map(AttrValue::Float)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        AttrType::Bool => match value {
            JsonValue::Bool(b) => Ok(AttrValue::Bool(*b)),
            JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(AttrValue::Bool(true)),
                "false" => Ok(AttrValue::Bool(false)),
                _ => Err(mismatch()),
            },
            JsonValue::Number(n) => match n.as_i64() {
                Some(0) => Ok(AttrValue::Bool(false)),
                Some(1) => Ok(AttrValue::Bool(true)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        AttrType::List => match value {
            JsonValue::Array(items) => items
                .iter()
                .map(|item| coerce(key, item, AttrType::String))
                .collect::<Result<Vec<_>>>()
                .map(AttrValue::List),
            // Some list fields are stored comma-separated
            JsonValue::String(s) => Ok(AttrValue::string_list(
                s.split(',').map(str::trim).filter(|part| !part.is_empty()),
            )),
            _ => Err(mismatch()),
        },
        AttrType::Map => match value {
            JsonValue::Object(map) => Ok(AttrValue::Map(map.clone())),
            JsonValue::String(s) => match serde_json::from_str::<JsonValue>(s) {
                Ok(JsonValue::Object(map)) => Ok(AttrValue::Map(map)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        AttrType::Object => match value {
            JsonValue::Object(_) => Ok(AttrValue::from_json(value)),
            _ => Err(mismatch()),
        },
    }
}

/// Check whether a value fits the declared type without conversion
pub fn matches_type(value: &AttrValue, target: AttrType) -> bool {
    match (value, target) {
        (AttrValue::Null | AttrValue::Unknown, _) => true,
        (AttrValue::String(_), AttrType::String)
        | (AttrValue::Int(_), AttrType::Int | AttrType::Float)
        | (AttrValue::Float(_), AttrType::Float)
        | (AttrValue::Bool(_), AttrType::Bool)
        | (AttrValue::Map(_), AttrType::Map)
        | (AttrValue::Object(_), AttrType::Object | AttrType::Map) => true,
        (AttrValue::List(items), AttrType::List) => items
            .iter()
            .all(|item| matches!(item, AttrValue::String(_) | AttrValue::Unknown)),
        _ => false,
    }
}

fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(integral))
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
