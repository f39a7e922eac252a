//! Connector definition types
//!
//! A connector variant is data: a family, a server kind tag and a list of
//! attributes, each mapped to one key of the server config map.

use crate::resources::timeouts_attribute;
use crate::schema::{Attribute, FieldMapping, ResourceSchema, Validator};
use crate::types::{ConnectorFamily, TYPE_PREFIX};
use crate::value::{AttrType, ResourceData};
use serde::{Deserialize, Serialize};

// ============================================================================
// Connector Definition
// ============================================================================

/// Attribute plus the server config key it maps to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedAttribute {
    /// Server config key (often dotted)
    pub key: String,
    /// Schema attribute
    #[serde(flatten)]
    pub attribute: Attribute,
}

/// Top-level connector definition, as written in YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorDefinition {
    /// Resource name suffix (`source_postgresql`)
    pub name: String,
    /// API collection
    pub family: ConnectorFamily,
    /// Server connector or transform kind tag (`postgresql`)
    pub kind: String,
    /// Schema version
    #[serde(default)]
    pub version: u64,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Mapped attributes
    #[serde(default)]
    pub attributes: Vec<MappedAttribute>,
}

// ============================================================================
// Connector Config
// ============================================================================

/// Everything the generic lifecycle needs to manage one connector variant
pub trait ConnectorConfig: Send + Sync + std::fmt::Debug {
    /// Typed attribute schema
    fn schema(&self) -> &ResourceSchema;

    /// Attribute name to server config key
    fn field_mappings(&self) -> &[FieldMapping];

    /// Server connector or transform kind tag
    fn kind_code(&self) -> &str;

    /// Engine-facing resource type suffix
    fn resource_name(&self) -> &str;

    /// API collection
    fn family(&self) -> ConnectorFamily;

    /// Empty model with every attribute null
    fn new_model(&self) -> ResourceData {
        self.schema().new_model()
    }

    /// Full engine-facing type name
    fn type_name(&self) -> String {
        format!("{TYPE_PREFIX}{}", self.resource_name())
    }
}

/// A validated definition with its schema and mappings built
#[derive(Debug, Clone)]
pub struct Connector {
    definition: ConnectorDefinition,
    schema: ResourceSchema,
    mappings: Vec<FieldMapping>,
}

impl Connector {
    /// Build from a definition that already passed validation
    pub(crate) fn from_validated(definition: ConnectorDefinition) -> Self {
        let family = definition.family;
        let mut schema = ResourceSchema {
            version: definition.version,
            description: definition.description.clone(),
            attributes: Vec::with_capacity(definition.attributes.len() + 4),
        }
        .with_attribute(
            Attribute::computed("id", AttrType::String).describe("Server-assigned identifier"),
        )
        .with_attribute(
            Attribute::required("name", AttrType::String)
                .with_validator(Validator::NotEmpty)
                .describe(format!("Name of the {family}")),
        )
        .with_attribute(
            Attribute::computed(family.kind_attribute(), AttrType::String)
                .requires_replace()
                .describe("Server kind tag"),
        );

        let mut mappings = Vec::with_capacity(definition.attributes.len());
        for mapped in &definition.attributes {
            mappings.push(FieldMapping::new(&mapped.attribute.name, &mapped.key));
            schema.attributes.push(mapped.attribute.clone());
        }
        schema.attributes.push(timeouts_attribute());

        Self {
            definition,
            schema,
            mappings,
        }
    }

    /// Source definition
    pub fn definition(&self) -> &ConnectorDefinition {
        &self.definition
    }
}

impl ConnectorConfig for Connector {
    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn field_mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    fn kind_code(&self) -> &str {
        &self.definition.kind
    }

    fn resource_name(&self) -> &str {
        &self.definition.name
    }

    fn family(&self) -> ConnectorFamily {
        self.definition.family
    }
}
