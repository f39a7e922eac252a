//! Folding server responses back into the model
//!
//! After every create, read or update the returned config map is the source
//! of truth for mapped attributes, with two exceptions: sensitive values the
//! user configured are kept as configured, and declared defaults fill in
//! keys the server left out.

use crate::error::Result;
use crate::schema::{FieldMapping, ResourceSchema};
use crate::types::JsonObject;
use crate::value::{from_native, AttrValue, ResourceData};
use tracing::{debug, trace};

/// Rewrite every mapped attribute of `planned` from the returned config
///
/// Attributes without a mapping (`id`, `name`, `timeouts`) are left alone.
pub fn reconcile(
    schema: &ResourceSchema,
    mappings: &[FieldMapping],
    planned: &ResourceData,
    returned: &JsonObject,
) -> Result<ResourceData> {
    let mut model = planned.clone();

    for mapping in mappings {
        let Some(attribute) = schema.attribute(&mapping.attribute) else {
            continue;
        };
        let configured = planned.get(&attribute.name);

        if attribute.sensitive && configured.is_known() {
            trace!(attribute = %attribute.name, "Keeping configured sensitive value");
            continue;
        }

        let observed = from_native(returned, &mapping.key, attribute.attr_type)?;
        let value = if observed.is_null() {
            attribute.default_value().unwrap_or(AttrValue::Null)
        } else {
            observed
        };

        if configured.is_known() && *configured != value {
            debug!(
                attribute = %attribute.name,
                key = %mapping.key,
                "Server value differs from configuration"
            );
        }
        model.set(attribute.name.clone(), value);
    }

    Ok(model)
}
