//! Decoding and plan-time validation
//!
//! Every error carries the dotted attribute path (`source.id`) and never the
//! offending value.

use super::types::{Attribute, ResourceSchema, Validator};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use crate::value::{coerce, matches_type, AttrType, AttrValue, ResourceData};
use std::collections::BTreeMap;

impl ResourceSchema {
    /// Decode a JSON document into a typed model
    ///
    /// Keys the schema does not declare are rejected. Attributes missing
    /// from the document read as null.
    pub fn decode(&self, document: &JsonValue) -> Result<ResourceData> {
        let fields = match document {
            JsonValue::Object(fields) => fields,
            JsonValue::Null => return Ok(self.new_model()),
            _ => return Err(Error::config("resource document must be a JSON object")),
        };

        let mut data = self.new_model();
        for (key, value) in fields {
            let attribute = self
                .attribute(key)
                .ok_or_else(|| Error::attribute(key, "unsupported attribute"))?;
            data.set(key.clone(), decode_value(attribute, value, key)?);
        }
        Ok(data)
    }

    /// Check a planned model against the schema
    pub fn validate(&self, data: &ResourceData) -> Result<()> {
        for attribute in &self.attributes {
            validate_value(attribute, data.get(&attribute.name), &attribute.name)?;
        }
        Ok(())
    }
}

fn decode_value(attribute: &Attribute, value: &JsonValue, path: &str) -> Result<AttrValue> {
    if attribute.attr_type != AttrType::Object || attribute.attributes.is_empty() {
        return coerce(path, value, attribute.attr_type);
    }

    let fields = match value {
        JsonValue::Null => return Ok(AttrValue::Null),
        JsonValue::Object(fields) => fields,
        _ => return Err(Error::attribute(path, "expected object")),
    };

    let mut decoded = BTreeMap::new();
    for nested in &attribute.attributes {
        decoded.insert(nested.name.clone(), AttrValue::Null);
    }
    for (key, value) in fields {
        let nested_path = format!("{path}.{key}");
        let nested = attribute
            .nested(key)
            .ok_or_else(|| Error::attribute(&nested_path, "unsupported attribute"))?;
        decoded.insert(key.clone(), decode_value(nested, value, &nested_path)?);
    }
    Ok(AttrValue::Object(decoded))
}

fn validate_value(attribute: &Attribute, value: &AttrValue, path: &str) -> Result<()> {
    match value {
        AttrValue::Null => {
            if attribute.required {
                return Err(Error::attribute(path, "is required"));
            }
            return Ok(());
        }
        AttrValue::Unknown => return Ok(()),
        _ => {}
    }

    if !matches_type(value, attribute.attr_type) {
        return Err(Error::attribute(
            path,
            format!("expected {}", attribute.attr_type),
        ));
    }

    if let AttrValue::Object(fields) = value {
        for nested in &attribute.attributes {
            let nested_value = fields.get(&nested.name).cloned().unwrap_or_default();
            validate_value(nested, &nested_value, &format!("{path}.{}", nested.name))?;
        }
    }

    for validator in &attribute.validators {
        check(validator, value, path)?;
    }
    Ok(())
}

fn check(validator: &Validator, value: &AttrValue, path: &str) -> Result<()> {
    match validator {
        Validator::OneOf { values } => {
            if let AttrValue::String(s) = value {
                if !values.iter().any(|v| v == s) {
                    return Err(Error::attribute(
                        path,
                        format!("must be one of: {}", values.join(", ")),
                    ));
                }
            }
        }
        Validator::IntRange { min, max } => {
            let number = match value {
                AttrValue::Int(i) => Some(*i),
                AttrValue::String(s) => Some(
                    s.trim()
                        .parse::<i64>()
                        .map_err(|_| Error::attribute(path, "expected an integer"))?,
                ),
                _ => None,
            };
            if let Some(n) = number {
                if min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m) {
                    return Err(Error::attribute(path, range_message(*min, *max)));
                }
            }
        }
        Validator::NotEmpty => {
            let empty = match value {
                AttrValue::String(s) => s.trim().is_empty(),
                AttrValue::List(items) => items.is_empty(),
                _ => false,
            };
            if empty {
                return Err(Error::attribute(path, "must not be empty"));
            }
        }
    }
    Ok(())
}

fn range_message(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("must be between {lo} and {hi}"),
        (Some(lo), None) => format!("must be at least {lo}"),
        (None, Some(hi)) => format!("must be at most {hi}"),
        (None, None) => "is out of range".to_string(),
    }
}
