//! YAML loader for connector definitions
//!
//! Loads built-in connectors by name and custom definitions by path, and
//! validates both before use.

use super::types::{Connector, ConnectorDefinition};
use crate::connectors;
use crate::error::{Error, Result};
use crate::resources::TIMEOUTS_ATTRIBUTE;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Attribute names every connector schema already defines
const RESERVED: [&str; 5] = ["id", "name", "connector", "transform_type", TIMEOUTS_ATTRIBUTE];

/// Load a connector from a built-in name or a YAML file path
pub fn load_connector(path: impl AsRef<Path>) -> Result<Connector> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = connectors::get_builtin(&path_str) {
            return load_connector_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!(
                "Connector '{}' not found. Built-in connectors: {}. Or provide a path to a YAML file.",
                path.display(),
                connectors::list_builtin().join(", ")
            ))
        } else {
            Error::config(format!(
                "Failed to read connector file '{}': {e}",
                path.display()
            ))
        }
    })?;
    debug!(path = %path.display(), "Loaded connector file");
    load_connector_from_str(&content)
}

/// Load a connector from a YAML string
pub fn load_connector_from_str(yaml: &str) -> Result<Connector> {
    let definition: ConnectorDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse connector YAML: {e}")))?;

    validate_definition(&definition)?;
    Ok(Connector::from_validated(definition))
}

/// Validate a connector definition
pub fn validate_definition(definition: &ConnectorDefinition) -> Result<()> {
    let invalid = |message: String| Error::connector_definition(&definition.name, message);

    if definition.name.is_empty() {
        return Err(Error::connector_definition("", "name cannot be empty"));
    }

    let prefix = format!("{}_", definition.family.prefix());
    if !definition.name.starts_with(&prefix) {
        return Err(invalid(format!("name must start with '{prefix}'")));
    }

    if definition.kind.is_empty() {
        return Err(invalid("kind cannot be empty".to_string()));
    }

    let mut names = HashSet::new();
    let mut keys = HashSet::new();
    for mapped in &definition.attributes {
        let attribute = &mapped.attribute;

        if attribute.name.is_empty() {
            return Err(invalid("attribute name cannot be empty".to_string()));
        }
        if mapped.key.is_empty() {
            return Err(invalid(format!(
                "attribute '{}' has an empty config key",
                attribute.name
            )));
        }
        if RESERVED.contains(&attribute.name.as_str()) {
            return Err(invalid(format!(
                "attribute name '{}' is reserved",
                attribute.name
            )));
        }
        if !names.insert(attribute.name.as_str()) {
            return Err(invalid(format!(
                "duplicate attribute '{}'",
                attribute.name
            )));
        }
        if !keys.insert(mapped.key.as_str()) {
            return Err(invalid(format!("duplicate config key '{}'", mapped.key)));
        }
        if attribute.required && attribute.default.is_some() {
            return Err(invalid(format!(
                "attribute '{}' cannot be required and have a default",
                attribute.name
            )));
        }
        if attribute.default.is_some() && attribute.default_value().is_none() {
            return Err(invalid(format!(
                "default of attribute '{}' is not a valid {}",
                attribute.name, attribute.attr_type
            )));
        }
        if attribute.default.is_some() && !attribute.computed {
            return Err(invalid(format!(
                "attribute '{}' has a default and must be computed",
                attribute.name
            )));
        }
    }

    Ok(())
}
