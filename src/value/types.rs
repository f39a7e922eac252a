//! Attribute value types
//!
//! Engine values are three-valued: a known value, null, or unknown (not yet
//! computed at plan time).

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Attribute Type
// ============================================================================

/// Declared type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrType {
    /// UTF-8 string
    #[default]
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// Boolean
    Bool,
    /// Ordered list of strings
    List,
    /// Free-form JSON object
    Map,
    /// Nested object with its own attributes
    Object,
}

impl AttrType {
    /// Name used in error messages and schema dumps
    pub fn as_str(&self) -> &'static str {
        match self {
            AttrType::String => "string",
            AttrType::Int => "int",
            AttrType::Float => "float",
            AttrType::Bool => "bool",
            AttrType::List => "list",
            AttrType::Map => "map",
            AttrType::Object => "object",
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Attribute Value
// ============================================================================

/// One attribute value in the engine's model
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue {
    /// Explicitly absent
    #[default]
    Null,
    /// Not known until apply
    Unknown,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<AttrValue>),
    Map(JsonObject),
    Object(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Check for unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, AttrValue::Unknown)
    }

    /// Neither null nor unknown
    pub fn is_known(&self) -> bool {
        !self.is_null() && !self.is_unknown()
    }

    /// Borrow a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String elements of a list, skipping non-strings
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            AttrValue::List(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Borrow the fields of a nested object
    pub fn as_object(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Build a list of strings
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttrValue::List(
            items
                .into_iter()
                .map(|s| AttrValue::String(s.into()))
                .collect(),
        )
    }

    /// Wrap an optional string, `None` becomes null
    pub fn from_opt_string(value: Option<String>) -> Self {
        value.map_or(AttrValue::Null, AttrValue::String)
    }

    /// Untyped conversion from JSON, used for state documents
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => AttrValue::Null,
            JsonValue::Bool(b) => AttrValue::Bool(*b),
            JsonValue::Number(n) => n
                .as_i64()
                .map(AttrValue::Int)
                .or_else(|| n.as_f64().map(AttrValue::Float))
                .unwrap_or(AttrValue::Null),
            JsonValue::String(s) => AttrValue::String(s.clone()),
            JsonValue::Array(items) => AttrValue::List(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(fields) => AttrValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Render as JSON, unknown becomes null
    pub fn to_json(&self) -> JsonValue {
        match self {
            AttrValue::Null | AttrValue::Unknown => JsonValue::Null,
            AttrValue::String(s) => JsonValue::String(s.clone()),
            AttrValue::Int(i) => JsonValue::from(*i),
            AttrValue::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(JsonValue::Null, JsonValue::Number),
            AttrValue::Bool(b) => JsonValue::Bool(*b),
            AttrValue::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            AttrValue::Map(map) => JsonValue::Object(map.clone()),
            AttrValue::Object(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => f.write_str("null"),
            AttrValue::Unknown => f.write_str("(known after apply)"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

// ============================================================================
// Resource Data
// ============================================================================

/// The attribute tree of one resource instance
///
/// Attributes that were never set read as null.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceData {
    attributes: BTreeMap<String, AttrValue>,
}

impl ResourceData {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an attribute
    pub fn get(&self, name: &str) -> &AttrValue {
        static NULL: AttrValue = AttrValue::Null;
        self.attributes.get(name).unwrap_or(&NULL)
    }

    /// Set an attribute
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Builder-style set
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Remove an attribute, returning its value
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.attributes.remove(name)
    }

    /// Known string value of an attribute
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name)
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Server-assigned id, if known
    pub fn id(&self) -> Option<String> {
        self.get_string("id")
    }

    /// Iterate over attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.attributes.iter()
    }

    /// Untyped conversion from a JSON object
    pub fn from_json(value: &JsonValue) -> Self {
        let attributes = value
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), AttrValue::from_json(v)))
                    .collect()
            })
            .unwrap_or_default();
        Self { attributes }
    }

    /// Render as a JSON object
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, AttrValue)> for ResourceData {
    fn from_iter<T: IntoIterator<Item = (String, AttrValue)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
