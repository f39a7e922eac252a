//! Pipeline resource
//!
//! A pipeline only references its source, destination and transforms by id.
//! Deleting it never touches what it references.

use super::timeouts::{timeouts_attribute, TIMEOUTS_ATTRIBUTE};
use super::traits::{Resource, ResourceModel};
use crate::api::{Pipeline, PipelineDestination, PipelineSource, StreamkapClient};
use crate::error::{Error, Result};
use crate::schema::{Attribute, ResourceSchema, Validator};
use crate::types::TYPE_PREFIX;
use crate::value::{AttrType, AttrValue, ResourceData};
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resource type suffix
pub const PIPELINE_RESOURCE: &str = "pipeline";

/// Schema of `streamkap_pipeline`
pub fn pipeline_schema() -> ResourceSchema {
    ResourceSchema::new()
        .with_description("Pipeline streaming one source into one destination")
        .with_attribute(Attribute::computed("id", AttrType::String).describe("Pipeline id"))
        .with_attribute(
            Attribute::required("name", AttrType::String).with_validator(Validator::NotEmpty),
        )
        .with_attribute(
            Attribute::optional("snapshot_new_tables", AttrType::Bool)
                .with_default(true)
                .describe("Snapshot tables added to the source after creation"),
        )
        .with_attribute(
            Attribute::object(
                "source",
                vec![
                    Attribute::required("id", AttrType::String)
                        .with_validator(Validator::NotEmpty),
                    Attribute::optional_computed("name", AttrType::String),
                    Attribute::optional_computed("connector", AttrType::String),
                    Attribute::required("topics", AttrType::List)
                        .with_validator(Validator::NotEmpty)
                        .describe("Topics of the source to stream"),
                ],
            )
            .set_required(),
        )
        .with_attribute(
            Attribute::object(
                "destination",
                vec![
                    Attribute::required("id", AttrType::String)
                        .with_validator(Validator::NotEmpty),
                    Attribute::optional_computed("name", AttrType::String),
                    Attribute::optional_computed("connector", AttrType::String),
                ],
            )
            .set_required(),
        )
        .with_attribute(
            Attribute::optional("transforms", AttrType::List)
                .with_default(json!([]))
                .describe("Transform ids applied in order"),
        )
        .with_attribute(timeouts_attribute())
}

// ============================================================================
// Typed Model
// ============================================================================

fn object_field<'a>(data: &'a ResourceData, name: &str) -> Result<&'a BTreeMap<String, AttrValue>> {
    data.get(name)
        .as_object()
        .ok_or_else(|| Error::attribute(name, "is required"))
}

fn nested_string(fields: &BTreeMap<String, AttrValue>, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(AttrValue::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_nested(fields: &BTreeMap<String, AttrValue>, parent: &str, name: &str) -> Result<String> {
    nested_string(fields, name)
        .ok_or_else(|| Error::attribute(format!("{parent}.{name}"), "is required"))
}

impl ResourceModel for Pipeline {
    fn from_data(data: &ResourceData) -> Result<Self> {
        let name = data
            .get_string("name")
            .ok_or_else(|| Error::attribute("name", "is required"))?;

        let source = object_field(data, "source")?;
        let topics = source
            .get("topics")
            .and_then(AttrValue::as_string_list)
            .ok_or_else(|| Error::attribute("source.topics", "is required"))?;
        let destination = object_field(data, "destination")?;

        let transforms = match data.get("transforms") {
            AttrValue::Null | AttrValue::Unknown => Vec::new(),
            value => value
                .as_string_list()
                .ok_or_else(|| Error::attribute("transforms", "expected list"))?,
        };

        Ok(Pipeline {
            id: data.id().unwrap_or_default(),
            name,
            snapshot_new_tables: data.get("snapshot_new_tables").as_bool().unwrap_or(true),
            source: PipelineSource {
                id: required_nested(source, "source", "id")?,
                name: nested_string(source, "name").unwrap_or_default(),
                connector: nested_string(source, "connector").unwrap_or_default(),
                topics,
            },
            destination: PipelineDestination {
                id: required_nested(destination, "destination", "id")?,
                name: nested_string(destination, "name").unwrap_or_default(),
                connector: nested_string(destination, "connector")
                    .unwrap_or_default(),
            },
            transforms,
        })
    }

    fn to_data(&self) -> ResourceData {
        let opt = |s: &str| AttrValue::from_opt_string((!s.is_empty()).then(|| s.to_string()));

        let source: BTreeMap<String, AttrValue> = [
            ("id".to_string(), AttrValue::from(self.source.id.as_str())),
            ("name".to_string(), opt(&self.source.name)),
            ("connector".to_string(), opt(&self.source.connector)),
            (
                "topics".to_string(),
                AttrValue::string_list(self.source.topics.iter()),
            ),
        ]
        .into_iter()
        .collect();

        let destination: BTreeMap<String, AttrValue> = [
            ("id".to_string(), AttrValue::from(self.destination.id.as_str())),
            ("name".to_string(), opt(&self.destination.name)),
            ("connector".to_string(), opt(&self.destination.connector)),
        ]
        .into_iter()
        .collect();

        ResourceData::new()
            .with("id", opt(&self.id))
            .with("name", self.name.as_str())
            .with("snapshot_new_tables", self.snapshot_new_tables)
            .with("source", AttrValue::Object(source))
            .with("destination", AttrValue::Object(destination))
            .with("transforms", AttrValue::string_list(self.transforms.iter()))
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Lifecycle handler for `streamkap_pipeline`
#[derive(Debug, Clone)]
pub struct PipelineResource {
    client: Arc<StreamkapClient>,
    schema: ResourceSchema,
    type_name: String,
}

impl PipelineResource {
    /// Create a handler using the shared client
    pub fn new(client: Arc<StreamkapClient>) -> Self {
        Self {
            client,
            schema: pipeline_schema(),
            type_name: format!("{TYPE_PREFIX}{PIPELINE_RESOURCE}"),
        }
    }

    /// Find an existing pipeline by name; more than one match is an error
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Pipeline>> {
        let mut matches: Vec<Pipeline> = self
            .client
            .list_pipelines()
            .await?
            .into_iter()
            .filter(|p| p.name == name)
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(Error::attribute(
                "name",
                format!("{n} existing pipelines share this name; import one by id"),
            )),
        }
    }

    /// State from a server pipeline, keeping engine-only attributes of `base`
    fn to_state(&self, base: &ResourceData, pipeline: &Pipeline) -> ResourceData {
        let mut state = pipeline.to_data();
        state.set(TIMEOUTS_ATTRIBUTE, base.get(TIMEOUTS_ATTRIBUTE).clone());
        if state.id().is_none() {
            if let Some(id) = base.id() {
                state.set("id", id);
            }
        }
        state
    }
}

#[async_trait]
impl Resource for PipelineResource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, planned: &ResourceData) -> Result<ResourceData> {
        self.schema.validate(planned)?;
        let pipeline = Pipeline::from_data(planned)?;

        info!(resource = %self.type_name, name = %pipeline.name, "Creating");
        let created = self.client.create_pipeline(&pipeline).await?;
        let state = self.to_state(planned, &created);
        info!(
            resource = %self.type_name,
            id = %state.id().unwrap_or_default(),
            "Created"
        );
        Ok(state)
    }

    async fn read(&self, state: &ResourceData) -> Result<Option<ResourceData>> {
        let found = match state.id() {
            Some(id) => self.client.get_pipeline(&id).await?,
            None => match state.get_string("name") {
                Some(name) => self.find_by_name(&name).await?,
                None => {
                    debug!(resource = %self.type_name, "No id or name, nothing to read");
                    return Ok(None);
                }
            },
        };

        match found {
            Some(pipeline) => Ok(Some(self.to_state(state, &pipeline))),
            None => {
                warn!(resource = %self.type_name, "Pipeline no longer exists, removing from state");
                Ok(None)
            }
        }
    }

    async fn update(&self, prior: &ResourceData, planned: &ResourceData) -> Result<ResourceData> {
        self.schema.validate(planned)?;
        let id = match prior.id() {
            Some(id) => id,
            None => {
                let name = prior.get_string("name").unwrap_or_default();
                self.find_by_name(&name)
                    .await?
                    .map(|p| p.id)
                    .ok_or_else(|| Error::attribute("id", "unknown; import the resource first"))?
            }
        };

        let mut pipeline = Pipeline::from_data(planned)?;
        pipeline.id.clone_from(&id);

        info!(resource = %self.type_name, %id, "Updating");
        let updated = self.client.update_pipeline(&id, &pipeline).await?;
        let base = planned.clone().with("id", id);
        Ok(self.to_state(&base, &updated))
    }

    async fn delete(&self, state: &ResourceData) -> Result<()> {
        let Some(id) = state.id() else {
            debug!(resource = %self.type_name, "No id in state, nothing to delete");
            return Ok(());
        };

        info!(resource = %self.type_name, %id, "Deleting");
        self.client.delete_pipeline(&id).await?;
        info!(resource = %self.type_name, %id, "Deleted");
        Ok(())
    }
}
