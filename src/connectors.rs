//! Built-in connector definitions embedded in the binary
//!
//! Every definition ships as YAML under `connectors/` so users can pass
//! `--connector source_postgresql` instead of a file path.

use crate::connector::{load_connector_from_str, Connector};
use crate::error::{Result, ResultExt};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in connector YAML definitions
pub static BUILTIN_CONNECTORS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // Sources
        m.insert(
            "source_postgresql",
            include_str!("../connectors/source_postgresql.yaml"),
        );
        m.insert(
            "source_postgres",
            include_str!("../connectors/source_postgresql.yaml"),
        );
        m.insert("source_mysql", include_str!("../connectors/source_mysql.yaml"));
        m.insert(
            "source_mongodb",
            include_str!("../connectors/source_mongodb.yaml"),
        );

        // Destinations
        m.insert(
            "destination_snowflake",
            include_str!("../connectors/destination_snowflake.yaml"),
        );
        m.insert(
            "destination_clickhouse",
            include_str!("../connectors/destination_clickhouse.yaml"),
        );
        m.insert("destination_s3", include_str!("../connectors/destination_s3.yaml"));

        // Transforms
        m.insert(
            "transform_map_filter",
            include_str!("../connectors/transform_map_filter.yaml"),
        );

        m
    });

/// Get a built-in connector by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_CONNECTORS.get(name).copied()
}

/// Check if a connector name is a built-in connector
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_CONNECTORS.contains_key(name)
}

/// List all built-in connector names (primary names only)
pub fn list_builtin() -> Vec<&'static str> {
    vec![
        "source_postgresql",
        "source_mysql",
        "source_mongodb",
        "destination_snowflake",
        "destination_clickhouse",
        "destination_s3",
        "transform_map_filter",
    ]
}

/// Load and validate every built-in definition
pub fn builtin_connectors() -> Result<Vec<Connector>> {
    list_builtin()
        .into_iter()
        .filter_map(|name| get_builtin(name).map(|yaml| (name, yaml)))
        .map(|(name, yaml)| {
            load_connector_from_str(yaml).with_context(|| format!("Built-in connector '{name}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorConfig;
    use crate::types::ConnectorFamily;

    #[test]
    fn test_builtin_connectors_exist() {
        for name in list_builtin() {
            assert!(is_builtin(name), "{name} missing");
        }
        assert!(!is_builtin("source_oracle"));
    }

    #[test]
    fn test_aliases_work() {
        assert_eq!(get_builtin("source_postgres"), get_builtin("source_postgresql"));
    }

    #[test]
    fn test_builtins_pass_validation() {
        let connectors = builtin_connectors().unwrap();
        assert_eq!(connectors.len(), list_builtin().len());

        let names: Vec<&str> = connectors.iter().map(|c| c.resource_name()).collect();
        assert_eq!(names, list_builtin());
    }

    #[test]
    fn test_builtin_families() {
        for connector in builtin_connectors().unwrap() {
            let expected = connector.resource_name().split('_').next().unwrap_or_default();
            assert_eq!(connector.family().prefix(), expected);
        }

        let transform = load_connector_from_str(get_builtin("transform_map_filter").unwrap()).unwrap();
        assert_eq!(transform.family(), ConnectorFamily::Transform);
        assert_eq!(transform.kind_code(), "map_filter");
    }
}
