//! Tag resource

use super::timeouts::{timeouts_attribute, TIMEOUTS_ATTRIBUTE};
use super::traits::{Resource, ResourceModel};
use crate::api::{StreamkapClient, Tag, TagRequest};
use crate::error::{Error, Result};
use crate::schema::{Attribute, ResourceSchema, Validator};
use crate::types::TYPE_PREFIX;
use crate::value::{AttrType, AttrValue, ResourceData};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resource type suffix
pub const TAG_RESOURCE: &str = "tag";

/// Schema of `streamkap_tag`
pub fn tag_schema() -> ResourceSchema {
    ResourceSchema::new()
        .with_description("Label attached to sources, destinations and pipelines")
        .with_attribute(Attribute::computed("id", AttrType::String))
        .with_attribute(
            Attribute::required("name", AttrType::String).with_validator(Validator::NotEmpty),
        )
        .with_attribute(Attribute::optional("description", AttrType::String))
        .with_attribute(
            Attribute::required("type", AttrType::List)
                .with_validator(Validator::NotEmpty)
                .describe("Resource kinds the tag applies to, e.g. [\"sources\"]"),
        )
        .with_attribute(Attribute::computed("system", AttrType::Bool))
        .with_attribute(Attribute::computed("custom", AttrType::Bool))
        .with_attribute(timeouts_attribute())
}

impl ResourceModel for Tag {
    fn from_data(data: &ResourceData) -> Result<Self> {
        Ok(Tag {
            id: data.id().unwrap_or_default(),
            name: data
                .get_string("name")
                .ok_or_else(|| Error::attribute("name", "is required"))?,
            description: data.get_string("description"),
            tag_type: data.get("type").as_string_list().unwrap_or_default(),
            system: data.get("system").as_bool().unwrap_or_default(),
            custom: data.get("custom").as_bool().unwrap_or_default(),
        })
    }

    fn to_data(&self) -> ResourceData {
        ResourceData::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("description", AttrValue::from_opt_string(self.description.clone()))
            .with("type", AttrValue::string_list(self.tag_type.iter()))
            .with("system", self.system)
            .with("custom", self.custom)
    }
}

impl From<&Tag> for TagRequest {
    fn from(tag: &Tag) -> Self {
        TagRequest {
            name: tag.name.clone(),
            description: tag.description.clone(),
            tag_type: tag.tag_type.clone(),
        }
    }
}

/// Lifecycle handler for `streamkap_tag`
#[derive(Debug, Clone)]
pub struct TagResource {
    client: Arc<StreamkapClient>,
    schema: ResourceSchema,
    type_name: String,
}

impl TagResource {
    /// Create a handler using the shared client
    pub fn new(client: Arc<StreamkapClient>) -> Self {
        Self {
            client,
            schema: tag_schema(),
            type_name: format!("{TYPE_PREFIX}{TAG_RESOURCE}"),
        }
    }

    /// Find an existing tag by name; more than one match is an error
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let mut matches: Vec<Tag> = self
            .client
            .list_tags()
            .await?
            .into_iter()
            .filter(|t| t.name == name)
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(Error::attribute(
                "name",
                format!("{n} existing tags share this name; import one by id"),
            )),
        }
    }

    fn to_state(base: &ResourceData, tag: &Tag) -> ResourceData {
        let mut state = tag
            .to_data()
            .with(TIMEOUTS_ATTRIBUTE, base.get(TIMEOUTS_ATTRIBUTE).clone());
        if tag.id.is_empty() {
            state.set("id", AttrValue::from_opt_string(base.id()));
        }
        state
    }

    async fn resolve_id(&self, state: &ResourceData) -> Result<Option<String>> {
        if let Some(id) = state.id() {
            return Ok(Some(id));
        }
        match state.get_string("name") {
            Some(name) => Ok(self.find_by_name(&name).await?.map(|t| t.id)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Resource for TagResource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, planned: &ResourceData) -> Result<ResourceData> {
        self.schema.validate(planned)?;
        let tag = Tag::from_data(planned)?;

        info!(resource = %self.type_name, name = %tag.name, "Creating");
        let created = self.client.create_tag(&TagRequest::from(&tag)).await?;
        Ok(Self::to_state(planned, &created))
    }

    async fn read(&self, state: &ResourceData) -> Result<Option<ResourceData>> {
        let Some(id) = self.resolve_id(state).await? else {
            debug!(resource = %self.type_name, "No id or matching name, nothing to read");
            return Ok(None);
        };

        match self.client.get_tag(&id).await? {
            Some(tag) => Ok(Some(Self::to_state(&state.clone().with("id", id), &tag))),
            None => {
                warn!(resource = %self.type_name, %id, "Tag no longer exists, removing from state");
                Ok(None)
            }
        }
    }

    async fn update(&self, prior: &ResourceData, planned: &ResourceData) -> Result<ResourceData> {
        self.schema.validate(planned)?;
        let id = self
            .resolve_id(prior)
            .await?
            .ok_or_else(|| Error::attribute("id", "unknown; import the resource first"))?;
        let tag = Tag::from_data(planned)?;

        info!(resource = %self.type_name, %id, "Updating");
        let updated = self.client.update_tag(&id, &TagRequest::from(&tag)).await?;
        Ok(Self::to_state(&planned.clone().with("id", id), &updated))
    }

    async fn delete(&self, state: &ResourceData) -> Result<()> {
        let Some(id) = state.id() else {
            return Ok(());
        };

        info!(resource = %self.type_name, %id, "Deleting");
        self.client.delete_tag(&id).await
    }
}
