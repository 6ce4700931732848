//! JSON Schema for the configuration file.

use super::OvernotchConfig;

/// Where the published schema lives; editors resolve `$schema` against it.
pub const SCHEMA_ID: &str =
    "https://raw.githubusercontent.com/overnotch/overnotch/main/overnotch.schema.json";

/// Generates a JSON Schema for the Overnotch configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(OvernotchConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Generates the schema as pretty-printed JSON.
#[must_use]
pub fn generate_schema_json() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}
