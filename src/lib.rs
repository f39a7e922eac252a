//! # Streamkap Provider
//!
//! Infrastructure-as-Code provider core for Streamkap data-pipeline
//! resources: sources, destinations, transforms, pipelines, topics and tags.
//!
//! ## Features
//!
//! - **Typed API Client**: Token exchange, retries with backoff, idempotent deletes
//! - **Schema-Driven Connectors**: Connector variants are YAML data sharing one lifecycle
//! - **Drift Reconciliation**: Defaults restored, redacted secrets kept, drift reported
//! - **Deadlines**: Per-operation timeouts that cancel in-flight requests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use streamkap_provider::{Provider, ProviderConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ProviderConfig::from_env().resolve()?;
//!     let provider = Provider::new(&config)?;
//!
//!     let state = provider
//!         .create(
//!             "streamkap_source_postgresql",
//!             &serde_json::json!({
//!                 "name": "orders-db",
//!                 "database_hostname": "db.example.com",
//!                 "database_user": "streamkap",
//!                 "database_password": "...",
//!                 "database_dbname": "shop",
//!                 "schema_include_list": "public",
//!                 "table_include_list": "public.orders"
//!             }),
//!         )
//!         .await?;
//!
//!     println!("created {}", state["id"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Provider                               │
//! │   create() / read() / update() / delete() / import() by type    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬─────────────┬────────────┐
//! │  Connector   │  Pipeline/Topic/Tag   │   Schema    │   Drift    │
//! ├──────────────┼───────────────────────┼─────────────┼────────────┤
//! │ YAML defs    │ Typed models          │ Flags       │ Reconcile  │
//! │ Field maps   │ Name recovery         │ Validators  │ Detect     │
//! └──────────────┴───────────────────────┴─────────────┴────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬──────────────────────────┐
//! │  API client  │   HTTP transport      │   Token store            │
//! └──────────────┴───────────────────────┴──────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and classification
pub mod error;

/// Common types and type aliases
pub mod types;

/// Provider configuration
pub mod config;

/// Token acquisition and caching
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Streamkap API wire types and client
pub mod api;

/// Attribute values and conversions
pub mod value;

/// Resource schemas, validation and snapshots
pub mod schema;

/// Drift reconciliation and reporting
pub mod drift;

/// Resource lifecycle trait and hand-written resources
pub mod resources;

/// Schema-driven connector framework
pub mod connector;

/// Built-in connector definitions
pub mod connectors;

/// Resource registry and dispatch
pub mod provider;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

pub use api::StreamkapClient;
pub use config::{ProviderConfig, ResolvedConfig};
pub use connector::{load_connector, load_connector_from_str, ConnectorResource};
pub use provider::{catalog, Provider};
pub use resources::{Operation, Resource};
pub use schema::{ResourceSchema, SchemaSnapshot};
pub use value::{AttrValue, ResourceData};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
