//! Generic lifecycle for schema-driven connectors
//!
//! One implementation serves every source, destination and transform
//! variant. The variant only supplies its schema, field mappings and kind
//! tag through [`ConnectorConfig`].

use super::types::ConnectorConfig;
use crate::api::{ConnectorRecord, StreamkapClient};
use crate::drift::reconcile;
use crate::error::{Error, Result};
use crate::resources::Resource;
use crate::schema::ResourceSchema;
use crate::types::JsonObject;
use crate::value::{to_native, ResourceData};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle handler for one connector variant
#[derive(Debug, Clone)]
pub struct ConnectorResource {
    connector: Arc<dyn ConnectorConfig>,
    client: Arc<StreamkapClient>,
    type_name: String,
}

impl ConnectorResource {
    /// Create a handler for `connector` using the shared client
    pub fn new(connector: Arc<dyn ConnectorConfig>, client: Arc<StreamkapClient>) -> Self {
        let type_name = connector.type_name();
        Self {
            connector,
            client,
            type_name,
        }
    }

    /// The variant this handler manages
    pub fn connector(&self) -> &dyn ConnectorConfig {
        self.connector.as_ref()
    }

    /// Outbound config map keyed by server field names
    ///
    /// Null and unknown attributes are left out so the server applies its
    /// own defaults.
    pub fn build_config(&self, planned: &ResourceData) -> JsonObject {
        let mut config = JsonObject::new();
        for mapping in self.connector.field_mappings() {
            if let Some(value) = to_native(planned.get(&mapping.attribute)) {
                config.insert(mapping.key.clone(), value);
            }
        }
        config
    }

    /// Find an existing resource of this variant by name
    ///
    /// Used to recover state when a create succeeded but its response was
    /// lost. More than one match is an error since picking one could adopt
    /// the wrong resource.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ConnectorRecord>> {
        let family = self.connector.family();
        let mut matches: Vec<ConnectorRecord> = self
            .client
            .list_connectors(family)
            .await?
            .into_iter()
            .filter(|r| r.name == name && r.kind == self.connector.kind_code())
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(Error::attribute(
                "name",
                format!("{n} existing {family}s share this name; import one by id"),
            )),
        }
    }

    async fn resolve_id(&self, state: &ResourceData) -> Result<Option<String>> {
        if let Some(id) = state.id() {
            return Ok(Some(id));
        }
        let Some(name) = state.get_string("name") else {
            return Ok(None);
        };

        let found = self.find_by_name(&name).await?;
        if let Some(record) = &found {
            info!(resource = %self.type_name, id = %record.id, "Recovered id by name");
        }
        Ok(found.map(|r| r.id))
    }

    fn required_name(&self, planned: &ResourceData) -> Result<String> {
        planned
            .get_string("name")
            .ok_or_else(|| Error::attribute("name", "is required"))
    }

    /// Fold a server record into the model
    ///
    /// Create and update responses without any config echo what was sent
    /// (`echo_sent`). On read an empty config is taken at face value.
    fn apply_record(
        &self,
        base: &ResourceData,
        record: ConnectorRecord,
        echo_sent: bool,
    ) -> Result<ResourceData> {
        let returned = if echo_sent && record.config.is_empty() {
            self.build_config(base)
        } else {
            record.config
        };
        let mut model = reconcile(
            self.connector.schema(),
            self.connector.field_mappings(),
            base,
            &returned,
        )?;

        if !record.id.is_empty() {
            model.set("id", record.id);
        }
        if !record.name.is_empty() {
            model.set("name", record.name);
        }
        let kind = if record.kind.is_empty() {
            self.connector.kind_code().to_string()
        } else {
            record.kind
        };
        model.set(self.connector.family().kind_attribute(), kind);
        Ok(model)
    }

    fn log_config_keys(&self, config: &JsonObject) {
        let keys: Vec<&str> = config.keys().map(String::as_str).collect();
        debug!(resource = %self.type_name, ?keys, "Config keys");
    }
}

#[async_trait]
impl Resource for ConnectorResource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> &ResourceSchema {
        self.connector.schema()
    }

    async fn create(&self, planned: &ResourceData) -> Result<ResourceData> {
        self.schema().validate(planned)?;
        let name = self.required_name(planned)?;
        let config = self.build_config(planned);
        self.log_config_keys(&config);

        info!(resource = %self.type_name, %name, "Creating");
        let record = self
            .client
            .create_connector(
                self.connector.family(),
                &name,
                self.connector.kind_code(),
                config,
            )
            .await?;

        let state = self.apply_record(planned, record, true)?;
        info!(
            resource = %self.type_name,
            id = %state.id().unwrap_or_default(),
            "Created"
        );
        Ok(state)
    }

    async fn read(&self, state: &ResourceData) -> Result<Option<ResourceData>> {
        let Some(id) = self.resolve_id(state).await? else {
            debug!(resource = %self.type_name, "No id or matching name, nothing to read");
            return Ok(None);
        };

        let Some(record) = self
            .client
            .get_connector(self.connector.family(), &id)
            .await?
        else {
            warn!(resource = %self.type_name, %id, "Resource no longer exists, removing from state");
            return Ok(None);
        };

        if !record.kind.is_empty() && record.kind != self.connector.kind_code() {
            return Err(Error::attribute(
                self.connector.family().kind_attribute(),
                format!(
                    "resource '{id}' is a '{}', not a '{}'",
                    record.kind,
                    self.connector.kind_code()
                ),
            ));
        }

        let base = state.clone().with("id", id);
        self.apply_record(&base, record, false).map(Some)
    }

    async fn update(&self, prior: &ResourceData, planned: &ResourceData) -> Result<ResourceData> {
        let id = self
            .resolve_id(prior)
            .await?
            .ok_or_else(|| Error::attribute("id", "unknown; import the resource first"))?;

        self.schema().validate(planned)?;
        let name = self.required_name(planned)?;
        let config = self.build_config(planned);
        self.log_config_keys(&config);

        info!(resource = %self.type_name, %id, "Updating");
        let record = self
            .client
            .update_connector(
                self.connector.family(),
                &id,
                &name,
                self.connector.kind_code(),
                config,
            )
            .await?;

        let base = planned.clone().with("id", id);
        let state = self.apply_record(&base, record, true)?;
        info!(resource = %self.type_name, "Updated");
        Ok(state)
    }

    async fn delete(&self, state: &ResourceData) -> Result<()> {
        let Some(id) = state.id() else {
            debug!(resource = %self.type_name, "No id in state, nothing to delete");
            return Ok(());
        };

        info!(resource = %self.type_name, %id, "Deleting");
        self.client
            .delete_connector(self.connector.family(), &id)
            .await?;
        info!(resource = %self.type_name, %id, "Deleted");
        Ok(())
    }
}
