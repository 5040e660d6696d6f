use crate::config::types::*;

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            name: "public".to_string(),
            camel_case_enabled: false,
            introspect: vec![],
        }
    }
}
