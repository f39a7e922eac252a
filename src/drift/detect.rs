//! Drift reporting between a planned and an observed model

use crate::schema::{Attribute, ResourceSchema};
use crate::types::REDACTED;
use crate::value::{AttrValue, ResourceData};
use serde::Serialize;
use std::fmt;

/// One attribute whose observed value differs from the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftEntry {
    /// Dotted attribute path
    pub attribute: String,
    /// Planned value, masked when sensitive
    pub planned: String,
    /// Observed value, masked when sensitive
    pub observed: String,
}

impl fmt::Display for DriftEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.attribute, self.planned, self.observed)
    }
}

/// List attributes whose planned known value differs from the observed one
///
/// Server-only attributes and planned null or unknown values are skipped.
pub fn detect_drift(
    schema: &ResourceSchema,
    planned: &ResourceData,
    observed: &ResourceData,
) -> Vec<DriftEntry> {
    let mut entries = Vec::new();
    for attribute in &schema.attributes {
        compare(
            attribute,
            planned.get(&attribute.name),
            observed.get(&attribute.name),
            &attribute.name,
            &mut entries,
        );
    }
    entries
}

fn compare(
    attribute: &Attribute,
    planned: &AttrValue,
    observed: &AttrValue,
    path: &str,
    entries: &mut Vec<DriftEntry>,
) {
    if attribute.is_computed_only() || !planned.is_known() {
        return;
    }

    if let (AttrValue::Object(want), AttrValue::Object(have)) = (planned, observed) {
        if !attribute.attributes.is_empty() {
            for nested in &attribute.attributes {
                let want = want.get(&nested.name).cloned().unwrap_or_default();
                let have = have.get(&nested.name).cloned().unwrap_or_default();
                compare(
                    nested,
                    &want,
                    &have,
                    &format!("{path}.{}", nested.name),
                    entries,
                );
            }
            return;
        }
    }

    if planned != observed {
        entries.push(DriftEntry {
            attribute: path.to_string(),
            planned: render(attribute, planned),
            observed: render(attribute, observed),
        });
    }
}

fn render(attribute: &Attribute, value: &AttrValue) -> String {
    if attribute.sensitive && value.is_known() {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}
