//! Provider registry
//!
//! Owns the shared API client and one handler per resource type, and
//! dispatches engine calls by type name. Plans and states cross this
//! boundary as JSON documents and are decoded against the resource schema.

use crate::api::StreamkapClient;
use crate::config::ResolvedConfig;
use crate::connector::{Connector, ConnectorConfig, ConnectorResource};
use crate::connectors::builtin_connectors;
use crate::error::{Error, Result};
use crate::resources::{
    pipeline_schema, tag_schema, topic_schema, with_timeout, Operation, PipelineResource,
    Resource, TagResource, Timeouts, TopicResource, PIPELINE_RESOURCE, TAG_RESOURCE,
    TOPIC_RESOURCE,
};
use crate::schema::{ResourceSchema, SchemaSnapshot};
use crate::types::{JsonValue, TYPE_PREFIX};
use crate::value::ResourceData;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Every resource handler, keyed by type name
pub struct Provider {
    client: Arc<StreamkapClient>,
    resources: BTreeMap<String, Arc<dyn Resource>>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Provider {
    /// Build the client from resolved settings and register every built-in
    pub fn new(config: &ResolvedConfig) -> Result<Self> {
        info!(host = %config.host, "Configuring provider");
        Self::with_client(Arc::new(StreamkapClient::new(config)))
    }

    /// Register every built-in resource against an existing client
    pub fn with_client(client: Arc<StreamkapClient>) -> Result<Self> {
        let mut provider = Self {
            client: client.clone(),
            resources: BTreeMap::new(),
        };

        for connector in builtin_connectors()? {
            provider.register_connector(connector);
        }
        provider.register(Arc::new(PipelineResource::new(client.clone())));
        provider.register(Arc::new(TopicResource::new(client.clone())));
        provider.register(Arc::new(TagResource::new(client)));

        debug!(count = provider.resources.len(), "Registered resource types");
        Ok(provider)
    }

    /// Add a custom connector definition, replacing a built-in of the same name
    #[must_use]
    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.register_connector(connector);
        self
    }

    /// Add or replace a resource handler
    pub fn register(&mut self, resource: Arc<dyn Resource>) {
        let name = resource.type_name().to_string();
        if self.resources.insert(name.clone(), resource).is_some() {
            debug!(resource = %name, "Replaced resource handler");
        }
    }

    fn register_connector(&mut self, connector: Connector) {
        self.register(Arc::new(ConnectorResource::new(
            Arc::new(connector),
            self.client.clone(),
        )));
    }

    /// Shared API client
    pub fn client(&self) -> &Arc<StreamkapClient> {
        &self.client
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    /// Handler for a type name
    pub fn resource(&self, type_name: &str) -> Result<&Arc<dyn Resource>> {
        self.resources
            .get(type_name)
            .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()))
    }

    /// Schema of a type
    pub fn schema(&self, type_name: &str) -> Result<&ResourceSchema> {
        Ok(self.resource(type_name)?.schema())
    }

    /// Snapshot of every registered schema
    pub fn snapshots(&self) -> BTreeMap<String, SchemaSnapshot> {
        self.resources
            .iter()
            .map(|(name, r)| (name.clone(), r.schema().snapshot()))
            .collect()
    }

    // ========================================================================
    // Plan-time checks
    // ========================================================================

    /// Decode and validate a configuration without calling the API
    pub fn validate(&self, type_name: &str, config: &JsonValue) -> Result<()> {
        let schema = self.schema(type_name)?;
        schema.validate(&schema.decode(config)?)
    }

    /// Attributes whose change forces destroy-then-create
    pub fn requires_replacement(
        &self,
        type_name: &str,
        prior: &JsonValue,
        planned: &JsonValue,
    ) -> Result<Vec<String>> {
        let schema = self.schema(type_name)?;
        Ok(schema.requires_replacement(&schema.decode(prior)?, &schema.decode(planned)?))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn decode(&self, type_name: &str, document: &JsonValue) -> Result<(&Arc<dyn Resource>, ResourceData)> {
        let resource = self.resource(type_name)?;
        let data = resource.schema().decode(document)?;
        Ok((resource, data))
    }

    /// Create a resource and return its new state
    pub async fn create(&self, type_name: &str, planned: &JsonValue) -> Result<JsonValue> {
        let (resource, planned) = self.decode(type_name, planned)?;
        let limit = Timeouts::from_data(&planned)?.create;
        let state = with_timeout(Operation::Create, limit, resource.create(&planned)).await?;
        Ok(state.to_json())
    }

    /// Refresh state; `None` means the resource is gone
    pub async fn read(&self, type_name: &str, state: &JsonValue) -> Result<Option<JsonValue>> {
        let (resource, state) = self.decode(type_name, state)?;
        Ok(resource.read(&state).await?.map(|s| s.to_json()))
    }

    /// Apply a plan to an existing resource
    pub async fn update(
        &self,
        type_name: &str,
        prior: &JsonValue,
        planned: &JsonValue,
    ) -> Result<JsonValue> {
        let (resource, prior) = self.decode(type_name, prior)?;
        let planned = resource.schema().decode(planned)?;
        let limit = Timeouts::from_data(&planned)?.update;
        let state =
            with_timeout(Operation::Update, limit, resource.update(&prior, &planned)).await?;
        Ok(state.to_json())
    }

    /// Delete a resource; one that is already gone counts as deleted
    pub async fn delete(&self, type_name: &str, state: &JsonValue) -> Result<()> {
        let (resource, state) = self.decode(type_name, state)?;
        let limit = Timeouts::from_data(&state)?.delete;
        with_timeout(Operation::Delete, limit, resource.delete(&state)).await
    }

    /// Adopt an existing resource by id
    pub async fn import(&self, type_name: &str, id: &str) -> Result<Option<JsonValue>> {
        let resource = self.resource(type_name)?;
        info!(resource = %type_name, %id, "Importing");
        Ok(resource.import(id).await?.map(|s| s.to_json()))
    }
}

/// Schemas of every built-in type, without building a client
pub fn catalog() -> Result<BTreeMap<String, ResourceSchema>> {
    let mut schemas: BTreeMap<String, ResourceSchema> = builtin_connectors()?
        .into_iter()
        .map(|c| (c.type_name(), c.schema().clone()))
        .collect();
    schemas.insert(format!("{TYPE_PREFIX}{PIPELINE_RESOURCE}"), pipeline_schema());
    schemas.insert(format!("{TYPE_PREFIX}{TOPIC_RESOURCE}"), topic_schema());
    schemas.insert(format!("{TYPE_PREFIX}{TAG_RESOURCE}"), tag_schema());
    Ok(schemas)
}
