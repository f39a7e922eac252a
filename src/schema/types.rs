//! Schema types
//!
//! Typed attribute schemas for every resource kind. Connector schemas are
//! deserialized from YAML, the hand-written resources build theirs with the
//! constructors below.

use crate::types::JsonValue;
use crate::value::{coerce, AttrType, AttrValue, ResourceData};
use serde::{Deserialize, Serialize};

// ============================================================================
// Validators
// ============================================================================

/// Plan-time value check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Validator {
    /// String must be one of the listed values
    OneOf { values: Vec<String> },
    /// Integer (or integer string) must lie in the inclusive range
    IntRange {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    /// String or list must not be empty
    NotEmpty,
}

// ============================================================================
// Attribute
// ============================================================================

fn is_false(b: &bool) -> bool {
    !*b
}

/// One attribute of a resource schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Engine-facing attribute name
    pub name: String,
    /// Declared type
    #[serde(rename = "type", default)]
    pub attr_type: AttrType,
    /// Must be set in configuration
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// May be set in configuration
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Value may come from the server
    #[serde(default, skip_serializing_if = "is_false")]
    pub computed: bool,
    /// Never logged or shown in drift reports
    #[serde(default, skip_serializing_if = "is_false")]
    pub sensitive: bool,
    /// Changing the value destroys and recreates the resource
    #[serde(default, skip_serializing_if = "is_false")]
    pub requires_replace: bool,
    /// Value restored when configuration omits the attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    /// Plan-time checks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Nested attributes of an object
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl Attribute {
    fn new(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            requires_replace: false,
            default: None,
            validators: Vec::new(),
            description: None,
            attributes: Vec::new(),
        }
    }

    /// Attribute that must be configured
    pub fn required(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            required: true,
            ..Self::new(name, attr_type)
        }
    }

    /// Attribute that may be configured
    pub fn optional(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            optional: true,
            ..Self::new(name, attr_type)
        }
    }

    /// Attribute set only by the server
    pub fn computed(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            computed: true,
            ..Self::new(name, attr_type)
        }
    }

    /// Attribute that may be configured or filled in by the server
    pub fn optional_computed(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            optional: true,
            computed: true,
            ..Self::new(name, attr_type)
        }
    }

    /// Nested object attribute
    pub fn object(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            ..Self::new(name, AttrType::Object)
        }
    }

    /// Mark required
    #[must_use]
    pub fn set_required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Mark optional
    #[must_use]
    pub fn set_optional(mut self) -> Self {
        self.optional = true;
        self.required = false;
        self
    }

    /// Mark sensitive
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Mark as forcing replacement
    #[must_use]
    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    /// Declare a default; the attribute becomes optional and computed
    #[must_use]
    pub fn with_default(mut self, default: impl Into<JsonValue>) -> Self {
        self.default = Some(default.into());
        self.optional = true;
        self.computed = true;
        self.required = false;
        self
    }

    /// Add a validator
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Set the description
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Configurable; attributes with no flags at all count as optional
    pub fn is_optional(&self) -> bool {
        self.optional || (!self.required && !self.computed)
    }

    /// Set only by the server
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }

    /// Declared default as a typed value
    pub fn default_value(&self) -> Option<AttrValue> {
        self.default
            .as_ref()
            .and_then(|d| coerce(&self.name, d, self.attr_type).ok())
            .filter(AttrValue::is_known)
    }

    /// Nested attribute by name
    pub fn nested(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

// ============================================================================
// Field Mapping
// ============================================================================

/// Link between a schema attribute and a server config key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Engine-facing attribute name
    pub attribute: String,
    /// Key in the server config map
    pub key: String,
}

impl FieldMapping {
    /// Create a mapping
    pub fn new(attribute: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            key: key.into(),
        }
    }
}

// ============================================================================
// Resource Schema
// ============================================================================

/// Typed schema of one resource kind
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Schema version, bumped on incompatible state changes
    #[serde(default)]
    pub version: u64,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attributes in declaration order
    pub attributes: Vec<Attribute>,
}

impl ResourceSchema {
    /// Create an empty schema at version 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append an attribute
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append several attributes
    #[must_use]
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check if an attribute exists
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// An empty model with every attribute null
    pub fn new_model(&self) -> ResourceData {
        self.attributes
            .iter()
            .map(|a| (a.name.clone(), AttrValue::Null))
            .collect()
    }

    /// Attributes flagged as forcing replacement whose value changed
    ///
    /// Unknown or null planned values never force replacement.
    pub fn requires_replacement(&self, prior: &ResourceData, planned: &ResourceData) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|a| a.requires_replace)
            .filter(|a| {
                let before = prior.get(&a.name);
                let after = planned.get(&a.name);
                before.is_known() && after.is_known() && before != after
            })
            .map(|a| a.name.clone())
            .collect()
    }
}
