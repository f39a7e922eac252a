//! Value adapter
//!
//! Bridges the engine's three-valued attribute model (known, null, unknown)
//! and the JSON config maps the API speaks.

mod convert;
mod types;

pub use convert::{coerce, from_native, matches_type, to_native};
pub use types::{AttrType, AttrValue, ResourceData};
