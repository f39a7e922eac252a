//! Topic resource
//!
//! Topics are provisioned by their source. The resource only manages the
//! partition count, so create is an update and delete is a no-op.

use super::timeouts::{timeouts_attribute, TIMEOUTS_ATTRIBUTE};
use super::traits::{Resource, ResourceModel};
use crate::api::{StreamkapClient, Topic};
use crate::error::{Error, Result};
use crate::schema::{Attribute, ResourceSchema, Validator};
use crate::types::TYPE_PREFIX;
use crate::value::{AttrType, ResourceData};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resource type suffix
pub const TOPIC_RESOURCE: &str = "topic";

/// Schema of `streamkap_topic`
pub fn topic_schema() -> ResourceSchema {
    ResourceSchema::new()
        .with_description("Partition count of an existing Kafka topic")
        .with_attribute(Attribute::computed("id", AttrType::String).describe("Same as topic_id"))
        .with_attribute(
            Attribute::required("topic_id", AttrType::String)
                .with_validator(Validator::NotEmpty)
                .requires_replace()
                .describe("Topic name"),
        )
        .with_attribute(
            Attribute::required("partition_count", AttrType::Int)
                .with_validator(Validator::IntRange {
                    min: Some(1),
                    max: None,
                })
                .describe("Number of partitions; the server rejects decreases"),
        )
        .with_attribute(timeouts_attribute())
}

impl ResourceModel for Topic {
    fn from_data(data: &ResourceData) -> Result<Self> {
        let topic_id = data
            .get_string("topic_id")
            .or_else(|| data.id())
            .ok_or_else(|| Error::attribute("topic_id", "is required"))?;
        let partition_count = data.get("partition_count").as_i64().unwrap_or_default();
        Ok(Topic {
            topic_id,
            partition_count,
        })
    }

    fn to_data(&self) -> ResourceData {
        ResourceData::new()
            .with("id", self.topic_id.as_str())
            .with("topic_id", self.topic_id.as_str())
            .with("partition_count", self.partition_count)
    }
}

/// Lifecycle handler for `streamkap_topic`
#[derive(Debug, Clone)]
pub struct TopicResource {
    client: Arc<StreamkapClient>,
    schema: ResourceSchema,
    type_name: String,
}

impl TopicResource {
    /// Create a handler using the shared client
    pub fn new(client: Arc<StreamkapClient>) -> Self {
        Self {
            client,
            schema: topic_schema(),
            type_name: format!("{TYPE_PREFIX}{TOPIC_RESOURCE}"),
        }
    }

    async fn apply(&self, planned: &ResourceData) -> Result<ResourceData> {
        self.schema.validate(planned)?;
        let topic = Topic::from_data(planned)?;

        info!(
            resource = %self.type_name,
            topic = %topic.topic_id,
            partitions = topic.partition_count,
            "Setting partition count"
        );
        let updated = self
            .client
            .update_topic(&topic.topic_id, topic.partition_count)
            .await?;

        Ok(updated
            .to_data()
            .with(TIMEOUTS_ATTRIBUTE, planned.get(TIMEOUTS_ATTRIBUTE).clone()))
    }
}

#[async_trait]
impl Resource for TopicResource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, planned: &ResourceData) -> Result<ResourceData> {
        self.apply(planned).await
    }

    async fn read(&self, state: &ResourceData) -> Result<Option<ResourceData>> {
        let Some(topic_id) = state.get_string("topic_id").or_else(|| state.id()) else {
            debug!(resource = %self.type_name, "No topic id, nothing to read");
            return Ok(None);
        };

        match self.client.get_topic(&topic_id).await? {
            Some(topic) => Ok(Some(
                topic
                    .to_data()
                    .with(TIMEOUTS_ATTRIBUTE, state.get(TIMEOUTS_ATTRIBUTE).clone()),
            )),
            None => {
                warn!(resource = %self.type_name, topic = %topic_id, "Topic no longer exists, removing from state");
                Ok(None)
            }
        }
    }

    async fn update(&self, _prior: &ResourceData, planned: &ResourceData) -> Result<ResourceData> {
        self.apply(planned).await
    }

    async fn delete(&self, state: &ResourceData) -> Result<()> {
        debug!(
            resource = %self.type_name,
            topic = %state.get_string("topic_id").unwrap_or_default(),
            "Topics cannot be deleted, dropping from state only"
        );
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<Option<ResourceData>> {
        let state = self.schema.new_model().with("topic_id", id);
        self.read(&state).await
    }
}
