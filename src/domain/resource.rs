//! Declared resources as they arrive from the template.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One declared resource: a type plus an arbitrary property tree.
///
/// The orchestrator never mutates the caller's copy; transforms and
/// reference substitution operate on clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescription {
    /// Declared resource type, e.g. `AWS::DynamoDB::Table`
    #[serde(rename = "Type")]
    pub type_id: String,

    /// Nested property tree handed to the remote creation operation
    #[serde(rename = "Properties", default = "empty_object")]
    pub properties: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ResourceDescription {
    pub fn new(type_id: impl Into<String>, properties: Value) -> Self {
        Self {
            type_id: type_id.into(),
            properties,
        }
    }
}

/// A resource paired with its logical name (the template key).
///
/// Kept as a pair rather than a map entry so the input iteration order
/// survives: pass scheduling follows document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(flatten)]
    pub description: ResourceDescription,
}

impl NamedResource {
    pub fn new(name: impl Into<String>, description: ResourceDescription) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}

/// Per-resource initialization options, consulted after the pass loop
/// has settled (e.g. a path to a JSON seed-document file for tables).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceOptions {
    /// Path to a JSON array of documents to put into the created table
    #[serde(default)]
    pub documents_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_description_deserializes_template_entry() {
        let yaml = r#"
Type: AWS::DynamoDB::Table
Properties:
  TableName: users
  KeySchema:
    - AttributeName: id
      KeyType: HASH
"#;
        let desc: ResourceDescription = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(desc.type_id, "AWS::DynamoDB::Table");
        assert_eq!(desc.properties["TableName"], json!("users"));
    }

    #[test]
    fn test_missing_properties_defaults_to_empty_object() {
        let desc: ResourceDescription =
            serde_yaml::from_str("Type: AWS::SES::ConfigurationSet").unwrap();
        assert!(desc.properties.as_object().unwrap().is_empty());
    }
}
