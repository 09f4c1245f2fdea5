//! Built-in service definitions embedded in the binary
//!
//! This module embeds the supported service models directly into the binary,
//! so every command is available without shipping any YAML next to it.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in service YAML definitions
pub static BUILTIN_SERVICES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // Databases
        m.insert(
            "docdb-elastic",
            include_str!("../services/docdb-elastic.yaml"),
        );

        // Application integration
        m.insert("events", include_str!("../services/eventbridge.yaml"));
        m.insert("eventbridge", include_str!("../services/eventbridge.yaml"));

        m
    });

/// Get a built-in service by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_SERVICES.get(name).copied()
}

/// Check if a name refers to a built-in service
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_SERVICES.contains_key(name)
}

/// List all built-in service names (primary names only)
pub fn list_builtin() -> Vec<&'static str> {
    vec!["docdb-elastic", "events"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_service_from_str;

    #[test]
    fn test_get_builtin() {
        assert!(get_builtin("events").is_some());
        assert!(get_builtin("docdb-elastic").is_some());
        assert!(get_builtin("s3").is_none());
    }

    #[test]
    fn test_alias_points_to_same_model() {
        assert!(is_builtin("eventbridge"));
        assert_eq!(get_builtin("eventbridge"), get_builtin("events"));
    }

    #[test]
    fn test_all_builtins_validate() {
        for name in list_builtin() {
            let yaml = get_builtin(name).unwrap();
            let def = load_service_from_str(yaml)
                .unwrap_or_else(|e| panic!("built-in service '{name}' is invalid: {e}"));
            assert_eq!(def.name, name);
        }
    }
}
