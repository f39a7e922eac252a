//! Schema-driven connector framework
//!
//! Connector variants are described as data (a YAML definition) and all
//! share the lifecycle in [`ConnectorResource`].
//!
//! # Features
//!
//! - **Definitions as Data**: Family, kind tag and mapped attributes in YAML
//! - **Built-in and Custom**: Built-ins load by name, custom definitions by path
//! - **Generic Lifecycle**: Create, read, update, delete and import for every variant
//! - **Name Recovery**: Reads fall back to a lookup by name when state lost the id

mod lifecycle;
mod loader;
mod types;

pub use lifecycle::ConnectorResource;
pub use loader::{load_connector, load_connector_from_str, validate_definition};
pub use types::{Connector, ConnectorConfig, ConnectorDefinition, MappedAttribute};
