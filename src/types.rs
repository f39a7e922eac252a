//! Common types used throughout the provider
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type, used for connector config maps
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Prefix of every engine-facing resource type name
pub const TYPE_PREFIX: &str = "streamkap_";

/// Placeholder printed instead of sensitive values
pub const REDACTED: &str = "<sensitive>";

// ============================================================================
// Connector Family
// ============================================================================

/// Which API collection a connector variant lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorFamily {
    /// `/api/sources`
    Source,
    /// `/api/destinations`
    Destination,
    /// `/api/transforms`
    Transform,
}

impl ConnectorFamily {
    /// Name of the computed attribute holding the server kind tag
    pub fn kind_attribute(&self) -> &'static str {
        match self {
            ConnectorFamily::Source | ConnectorFamily::Destination => "connector",
            ConnectorFamily::Transform => "transform_type",
        }
    }

    /// Prefix used for resource names of this family
    pub fn prefix(&self) -> &'static str {
        match self {
            ConnectorFamily::Source => "source",
            ConnectorFamily::Destination => "destination",
            ConnectorFamily::Transform => "transform",
        }
    }
}

impl std::fmt::Display for ConnectorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_serde() {
        let family: ConnectorFamily = serde_json::from_str("\"destination\"").unwrap();
        assert_eq!(family, ConnectorFamily::Destination);

        let json = serde_json::to_string(&ConnectorFamily::Transform).unwrap();
        assert_eq!(json, "\"transform\"");
    }

    #[test]
    fn test_family_kind_attribute() {
        assert_eq!(ConnectorFamily::Source.kind_attribute(), "connector");
        assert_eq!(ConnectorFamily::Destination.kind_attribute(), "connector");
        assert_eq!(ConnectorFamily::Transform.kind_attribute(), "transform_type");
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!(String::new().none_if_empty(), None);
    }
}
