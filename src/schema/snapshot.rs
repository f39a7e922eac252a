//! Schema snapshots and backward-compatibility checks
//!
//! A snapshot flattens a schema to `path -> flags`. Comparing two snapshots
//! reports changes that would break existing configurations or state.

use super::types::{Attribute, ResourceSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Presence flags of one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFlags {
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
}

impl From<&Attribute> for AttributeFlags {
    fn from(attribute: &Attribute) -> Self {
        Self {
            required: attribute.required,
            optional: attribute.is_optional(),
            computed: attribute.computed,
            sensitive: attribute.sensitive,
        }
    }
}

/// Flattened view of a schema, keyed by dotted attribute path
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaSnapshot {
    pub attributes: BTreeMap<String, AttributeFlags>,
}

impl SchemaSnapshot {
    /// Flags of one attribute path
    pub fn get(&self, path: &str) -> Option<&AttributeFlags> {
        self.attributes.get(path)
    }

    /// Breaking changes going from `previous` to `self`
    ///
    /// Adding attributes is always allowed. Removing a required or computed
    /// attribute, or making an optional one required, is not.
    pub fn breaking_changes(&self, previous: &SchemaSnapshot) -> Vec<String> {
        let mut violations = Vec::new();

        for (path, before) in &previous.attributes {
            match self.attributes.get(path) {
                None if before.required => {
                    violations.push(format!("required attribute '{path}' was removed"));
                }
                None if before.computed => {
                    violations.push(format!("computed attribute '{path}' was removed"));
                }
                Some(after) if before.optional && !before.required && after.required => {
                    violations.push(format!("optional attribute '{path}' became required"));
                }
                _ => {}
            }
        }

        violations
    }

    /// Check if `self` can replace `previous` without breaking users
    pub fn is_compatible_with(&self, previous: &SchemaSnapshot) -> bool {
        self.breaking_changes(previous).is_empty()
    }
}

impl ResourceSchema {
    /// Flatten into a snapshot
    pub fn snapshot(&self) -> SchemaSnapshot {
        let mut attributes = BTreeMap::new();
        collect(&self.attributes, "", &mut attributes);
        SchemaSnapshot { attributes }
    }
}

fn collect(attributes: &[Attribute], prefix: &str, out: &mut BTreeMap<String, AttributeFlags>) {
    for attribute in attributes {
        let path = if prefix.is_empty() {
            attribute.name.clone()
        } else {
            format!("{prefix}.{}", attribute.name)
        };
        out.insert(path.clone(), AttributeFlags::from(attribute));
        collect(&attribute.attributes, &path, out);
    }
}
