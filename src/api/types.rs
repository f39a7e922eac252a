//! Streamkap API wire types
//!
//! Request and response bodies for every resource collection, plus the
//! paged envelope every GET answers with.

use crate::types::{ConnectorFamily, JsonObject};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Paged Envelope
// ============================================================================

/// Paged envelope returned by every GET
///
/// An empty `result` on a lookup by id means the resource does not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    /// Items on this page
    #[serde(alias = "Result")]
    pub result: Vec<T>,
    /// Total number of matching items
    #[serde(default, alias = "Total")]
    pub total: u64,
    /// Page number, starting at 1
    #[serde(default, alias = "Page")]
    pub page: u64,
    /// Requested page size
    #[serde(default, alias = "PageSize")]
    pub page_size: u64,
}

impl<T> PagedResponse<T> {
    /// First item, if any
    pub fn into_first(self) -> Option<T> {
        self.result.into_iter().next()
    }

    /// Check if the page holds no items
    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }
}

/// Mutation responses come back either bare or wrapped in an envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum EntityResponse<T> {
    Paged(PagedResponse<T>),
    Entity(T),
}

impl<T> EntityResponse<T> {
    pub(crate) fn into_entity(self) -> Option<T> {
        match self {
            EntityResponse::Paged(page) => page.into_first(),
            EntityResponse::Entity(entity) => Some(entity),
        }
    }
}

// ============================================================================
// Sources / Destinations / Transforms
// ============================================================================

/// A source connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Server-assigned id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// User-chosen name
    pub name: String,
    /// Connector kind tag (e.g. "postgresql")
    #[serde(default)]
    pub connector: String,
    /// Connector parameters keyed by server field names
    #[serde(default)]
    pub config: JsonObject,
}

/// A destination connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Server-assigned id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// User-chosen name
    pub name: String,
    /// Connector kind tag (e.g. "snowflake")
    #[serde(default)]
    pub connector: String,
    /// Connector parameters keyed by server field names
    #[serde(default)]
    pub config: JsonObject,
}

/// A transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Server-assigned id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// User-chosen name
    #[serde(default)]
    pub name: String,
    /// Transform kind tag (e.g. "map_filter")
    #[serde(default, alias = "transform")]
    pub transform_type: String,
    /// Transform parameters keyed by server field names
    #[serde(default)]
    pub config: JsonObject,
}

/// Create/update body for sources and destinations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorRequest {
    /// User-chosen name
    pub name: String,
    /// Connector kind tag
    pub connector: String,
    /// Connector parameters
    pub config: JsonObject,
}

/// Create/update body for transforms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformRequest {
    /// User-chosen name
    pub name: String,
    /// Transform kind tag
    pub transform: String,
    /// Transform parameters
    pub config: JsonObject,
}

/// Family-independent view of a source, destination or transform
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorRecord {
    /// Which collection the record came from
    pub family: ConnectorFamily,
    /// Server-assigned id
    pub id: String,
    /// User-chosen name
    pub name: String,
    /// Connector or transform kind tag
    pub kind: String,
    /// Parameters keyed by server field names
    pub config: JsonObject,
}

impl From<Source> for ConnectorRecord {
    fn from(source: Source) -> Self {
        Self {
            family: ConnectorFamily::Source,
            id: source.id,
            name: source.name,
            kind: source.connector,
            config: source.config,
        }
    }
}

impl From<Destination> for ConnectorRecord {
    fn from(destination: Destination) -> Self {
        Self {
            family: ConnectorFamily::Destination,
            id: destination.id,
            name: destination.name,
            kind: destination.connector,
            config: destination.config,
        }
    }
}

impl From<Transform> for ConnectorRecord {
    fn from(transform: Transform) -> Self {
        Self {
            family: ConnectorFamily::Transform,
            id: transform.id,
            name: transform.name,
            kind: transform.transform_type,
            config: transform.config,
        }
    }
}

// ============================================================================
// Pipelines
// ============================================================================

/// Source reference inside a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSource {
    /// Source id
    pub id: String,
    /// Source name
    #[serde(default)]
    pub name: String,
    /// Source connector kind
    #[serde(default)]
    pub connector: String,
    /// Topics the pipeline subscribes to
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topics: Vec<String>,
}

/// Destination reference inside a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDestination {
    /// Destination id
    pub id: String,
    /// Destination name
    #[serde(default)]
    pub name: String,
    /// Destination connector kind
    #[serde(default)]
    pub connector: String,
}

/// A pipeline linking one source to one destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Server-assigned id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// User-chosen name
    pub name: String,
    /// Snapshot tables added to the source after creation
    #[serde(default = "default_true")]
    pub snapshot_new_tables: bool,
    /// Source reference
    pub source: PipelineSource,
    /// Destination reference
    pub destination: PipelineDestination,
    /// Transform ids applied in order
    #[serde(default, deserialize_with = "transform_ids")]
    pub transforms: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Transforms are echoed either as bare ids or as `{id, ...}` objects
fn transform_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TransformRef {
        Id(String),
        Object { id: String },
    }

    let refs = Option::<Vec<TransformRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(refs
        .into_iter()
        .map(|r| match r {
            TransformRef::Id(id) | TransformRef::Object { id } => id,
        })
        .collect())
}

// ============================================================================
// Topics
// ============================================================================

/// Partition count of an existing Kafka topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic name
    #[serde(default)]
    pub topic_id: String,
    /// Number of partitions
    #[serde(default)]
    pub partition_count: i64,
}

/// Body of a topic update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicUpdate {
    /// Requested number of partitions
    pub partition_count: i64,
}

// ============================================================================
// Tags
// ============================================================================

/// A free-standing label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Server-assigned id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Tag name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Resource kinds the tag applies to
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub tag_type: Vec<String>,
    /// Built-in tag
    #[serde(default)]
    pub system: bool,
    /// User-defined tag
    #[serde(default)]
    pub custom: bool,
}

/// Create/update body for tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRequest {
    /// Tag name
    pub name: String,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resource kinds the tag applies to
    #[serde(rename = "type")]
    pub tag_type: Vec<String>,
}
