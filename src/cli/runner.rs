//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ProviderConfig;
use crate::connector::{load_connector, Connector, ConnectorConfig};
use crate::error::{Error, Result};
use crate::provider::{catalog, Provider};
use crate::schema::ResourceSchema;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Types => self.types(),
            Commands::Schema { type_name } => self.schema(type_name),
            Commands::Snapshot => self.snapshot(),
            Commands::Validate {
                type_name,
                config_json,
                file,
            } => self.validate(type_name, config_json.as_deref(), file.as_deref()),
            Commands::Import { type_name, id } => self.import(type_name, id).await,
            Commands::Read {
                type_name,
                state_json,
                state,
            } => self.read(type_name, state_json.as_deref(), state.as_deref()).await,
            Commands::Delete {
                type_name,
                state_json,
                state,
            } => {
                self.delete(type_name, state_json.as_deref(), state.as_deref())
                    .await
            }
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Custom connector definitions from `--connector`
    fn custom_connectors(&self) -> Result<Vec<Connector>> {
        self.cli.connector.iter().map(load_connector).collect()
    }

    /// Every schema, built-ins plus custom connectors, without credentials
    fn schemas(&self) -> Result<BTreeMap<String, ResourceSchema>> {
        let mut schemas = catalog()?;
        for connector in self.custom_connectors()? {
            schemas.insert(connector.type_name(), connector.schema().clone());
        }
        Ok(schemas)
    }

    /// Resolve provider settings and build the registry
    fn provider(&self) -> Result<Provider> {
        let mut config = match &self.cli.config {
            Some(path) => ProviderConfig::from_file(path)?,
            None => ProviderConfig::default(),
        };
        if let Some(host) = &self.cli.host {
            config = config.with_host(host.clone());
        }
        let resolved = config.with_env().resolve()?;
        debug!(?resolved, "Resolved provider settings");

        let mut provider = Provider::new(&resolved)?;
        for connector in self.custom_connectors()? {
            provider = provider.with_connector(connector);
        }
        Ok(provider)
    }

    /// Load a JSON document from an inline string or a file
    fn load_document(inline: Option<&str>, path: Option<&Path>, what: &str) -> Result<Value> {
        if let Some(json_str) = inline {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid {what} JSON: {e}")));
        }

        let path: PathBuf = path
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::config(format!("No {what} given (inline JSON or file)")))?;
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::config(format!("Failed to read {what} file: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid {what} JSON: {e}")))
    }

    // ========================================================================
    // Offline commands
    // ========================================================================

    /// List resource types
    fn types(&self) -> Result<()> {
        let types: Vec<Value> = self
            .schemas()?
            .into_iter()
            .map(|(name, schema)| {
                json!({
                    "name": name,
                    "description": schema.description,
                    "attributes": schema.attributes.len()
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "TYPES",
            "types": types
        }));
        Ok(())
    }

    /// Print one schema
    fn schema(&self, type_name: &str) -> Result<()> {
        let schemas = self.schemas()?;
        let schema = schemas
            .get(type_name)
            .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()))?;

        self.output_message(&json!({
            "type": "SCHEMA",
            "name": type_name,
            "schema": schema
        }));
        Ok(())
    }

    /// Print snapshots of every schema
    fn snapshot(&self) -> Result<()> {
        let snapshots: BTreeMap<String, _> = self
            .schemas()?
            .into_iter()
            .map(|(name, schema)| (name, schema.snapshot()))
            .collect();

        self.output_message(&json!({
            "type": "SNAPSHOT",
            "snapshots": snapshots
        }));
        Ok(())
    }

    /// Validate a configuration
    fn validate(&self, type_name: &str, inline: Option<&str>, file: Option<&Path>) -> Result<()> {
        let schemas = self.schemas()?;
        let schema = schemas
            .get(type_name)
            .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()))?;
        let document = Self::load_document(inline, file, "configuration")?;

        schema.validate(&schema.decode(&document)?)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Configuration for '{type_name}' is valid")
            }
        }));
        Ok(())
    }

    // ========================================================================
    // API commands
    // ========================================================================

    /// Import by id
    async fn import(&self, type_name: &str, id: &str) -> Result<()> {
        let provider = self.provider()?;
        let state = provider
            .import(type_name, id)
            .await?
            .ok_or_else(|| Error::not_found(type_name, id))?;

        self.output_message(&json!({
            "type": "STATE",
            "resource": type_name,
            "state": state
        }));
        Ok(())
    }

    /// Refresh a state document
    async fn read(&self, type_name: &str, inline: Option<&str>, file: Option<&Path>) -> Result<()> {
        let provider = self.provider()?;
        let state = Self::load_document(inline, file, "state")?;

        let message = match provider.read(type_name, &state).await? {
            Some(state) => json!({
                "type": "STATE",
                "resource": type_name,
                "state": state
            }),
            None => json!({
                "type": "REMOVED",
                "resource": type_name
            }),
        };
        self.output_message(&message);
        Ok(())
    }

    /// Delete from a state document
    async fn delete(&self, type_name: &str, inline: Option<&str>, file: Option<&Path>) -> Result<()> {
        let provider = self.provider()?;
        let state = Self::load_document(inline, file, "state")?;

        provider.delete(type_name, &state).await?;
        self.output_message(&json!({
            "type": "DELETED",
            "resource": type_name
        }));
        Ok(())
    }

    /// Output a message
    ///
    /// State may hold sensitive values the user configured; it is only ever
    /// written to stdout for the caller, never to logs.
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
