//! Resource schemas
//!
//! Typed attribute schemas shared by every resource kind.
//!
//! # Features
//!
//! - **Attribute Flags**: Required, optional, computed, sensitive and requires-replace
//! - **Defaults**: Declared defaults restored when configuration omits a value
//! - **Validation**: Type checks, `one_of`, integer ranges and non-empty checks with attribute paths
//! - **Snapshots**: Flattened flag tables with backward-compatibility checks

mod snapshot;
mod types;
mod validation;

pub use snapshot::{AttributeFlags, SchemaSnapshot};
pub use types::{Attribute, FieldMapping, ResourceSchema, Validator};
