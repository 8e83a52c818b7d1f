//! Symbolic cross-resource reference substitution.
//!
//! Walks a resource's full description tree looking for two markers:
//!
//! - `{"Fn::GetAtt": ["Name", "Attr"]}` (or the dotted-string form
//!   `"Name.Attr"`): replaced with the named resource's recorded output
//!   attribute. If the resource has no output record yet, or the record
//!   lacks the attribute, the whole resource is deferred to the next pass.
//! - Any object field keyed exactly `RoleARN`: replaced with a fixed
//!   placeholder, unconditionally. The local environment issues no real
//!   roles.
//!
//! The walk is a pure transform: it returns either a fully substituted
//! copy of the tree or the name the resource is still waiting on.

use serde_json::Value;

use crate::adapters::AdapterRegistry;

use super::store::OutputStore;

/// Marker key for an attribute reference.
pub const GET_ATT_MARKER: &str = "Fn::GetAtt";

/// Attribute name that maps to the adapter's per-type ARN attribute.
pub const DEFAULT_ARN_ATTRIBUTE: &str = "Arn";

/// Field key always replaced with [`ROLE_ARN_PLACEHOLDER`].
pub const ROLE_ARN_KEY: &str = "RoleARN";

/// Stand-in role identifier; the target environment does not issue real
/// roles.
pub const ROLE_ARN_PLACEHOLDER: &str = "arn:aws:iam::123456789012:role/localup-placeholder";

/// Result of resolving one resource's description tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A fully substituted copy of the tree
    Resolved(Value),

    /// Some reference could not be satisfied this pass; the walk stops at
    /// the first such reference and the resource is retried wholesale.
    Deferred {
        /// The resource name (or `name.attribute`) still being waited on
        waiting_on: String,
    },
}

/// Substitute every reference in `value` against the current output store.
pub fn resolve_references(
    value: &Value,
    store: &OutputStore,
    registry: &AdapterRegistry,
) -> Resolution {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get(GET_ATT_MARKER) {
                if map.len() == 1 {
                    return resolve_attribute(reference, store, registry);
                }
            }

            let mut resolved = serde_json::Map::with_capacity(map.len());
            for (key, child) in map {
                if key == ROLE_ARN_KEY {
                    resolved.insert(key.clone(), Value::String(ROLE_ARN_PLACEHOLDER.to_string()));
                    continue;
                }
                match resolve_references(child, store, registry) {
                    Resolution::Resolved(child) => {
                        resolved.insert(key.clone(), child);
                    }
                    deferred @ Resolution::Deferred { .. } => return deferred,
                }
            }
            Resolution::Resolved(Value::Object(resolved))
        }
        Value::Array(items) => {
            let mut resolved = Vec::with_capacity(items.len());
            for item in items {
                match resolve_references(item, store, registry) {
                    Resolution::Resolved(item) => resolved.push(item),
                    deferred @ Resolution::Deferred { .. } => return deferred,
                }
            }
            Resolution::Resolved(Value::Array(resolved))
        }
        scalar => Resolution::Resolved(scalar.clone()),
    }
}

/// Resolve one `Fn::GetAtt` reference against the store.
fn resolve_attribute(
    reference: &Value,
    store: &OutputStore,
    registry: &AdapterRegistry,
) -> Resolution {
    let Some((name, attribute)) = parse_reference(reference) else {
        // Malformed markers are left for the remote operation to reject.
        return Resolution::Resolved(Value::Object({
            let mut map = serde_json::Map::new();
            map.insert(GET_ATT_MARKER.to_string(), reference.clone());
            map
        }));
    };

    let Some(record) = store.get(&name) else {
        return Resolution::Deferred { waiting_on: name };
    };

    // "Arn" means whatever the resource's type calls its ARN attribute.
    let attribute = if attribute == DEFAULT_ARN_ATTRIBUTE {
        registry.arn_attribute(&record.type_id).to_string()
    } else {
        attribute
    };

    match record.attribute(&attribute) {
        Some(value) => Resolution::Resolved(value.clone()),
        None => Resolution::Deferred {
            waiting_on: format!("{name}.{attribute}"),
        },
    }
}

/// Accepts `["Name", "Attr"]` and the dotted shorthand `"Name.Attr"`.
fn parse_reference(reference: &Value) -> Option<(String, String)> {
    match reference {
        Value::Array(parts) => match parts.as_slice() {
            [Value::String(name), Value::String(attr)] => {
                Some((name.clone(), attr.clone()))
            }
            _ => None,
        },
        Value::String(dotted) => {
            let (name, attr) = dotted.split_once('.')?;
            Some((name.to_string(), attr.to_string()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::OutputRecord;
    use serde_json::json;

    fn store_with_table() -> OutputStore {
        let mut attrs = serde_json::Map::new();
        attrs.insert("TableArn".to_string(), json!("arn:aws:dynamodb:::table/users"));
        attrs.insert("TableName".to_string(), json!("users"));
        let mut store = OutputStore::new();
        store.insert("UsersTable", OutputRecord::new("AWS::DynamoDB::Table", attrs));
        store
    }

    #[test]
    fn test_attribute_reference_substituted() {
        let registry = AdapterRegistry::builtin();
        let tree = json!({"Source": {"Fn::GetAtt": ["UsersTable", "TableName"]}});
        let resolution = resolve_references(&tree, &store_with_table(), &registry);
        assert_eq!(
            resolution,
            Resolution::Resolved(json!({"Source": "users"}))
        );
    }

    #[test]
    fn test_arn_maps_to_type_specific_attribute() {
        let registry = AdapterRegistry::builtin();
        let tree = json!({"Fn::GetAtt": ["UsersTable", "Arn"]});
        let resolution = resolve_references(&tree, &store_with_table(), &registry);
        assert_eq!(
            resolution,
            Resolution::Resolved(json!("arn:aws:dynamodb:::table/users"))
        );
    }

    #[test]
    fn test_dotted_shorthand() {
        let registry = AdapterRegistry::builtin();
        let tree = json!({"Fn::GetAtt": "UsersTable.TableName"});
        assert_eq!(
            resolve_references(&tree, &store_with_table(), &registry),
            Resolution::Resolved(json!("users"))
        );
    }

    #[test]
    fn test_missing_resource_defers() {
        let registry = AdapterRegistry::builtin();
        let tree = json!({"a": 1, "b": {"Fn::GetAtt": ["Ghost", "Arn"]}});
        assert_eq!(
            resolve_references(&tree, &OutputStore::new(), &registry),
            Resolution::Deferred {
                waiting_on: "Ghost".to_string()
            }
        );
    }

    #[test]
    fn test_missing_attribute_defers() {
        let registry = AdapterRegistry::builtin();
        let tree = json!({"Fn::GetAtt": ["UsersTable", "StreamArn"]});
        assert_eq!(
            resolve_references(&tree, &store_with_table(), &registry),
            Resolution::Deferred {
                waiting_on: "UsersTable.StreamArn".to_string()
            }
        );
    }

    #[test]
    fn test_role_arn_replaced_unconditionally() {
        let registry = AdapterRegistry::builtin();
        let tree = json!({
            "Config": {"RoleARN": {"Fn::GetAtt": ["NeverCreated", "Arn"]}}
        });
        // Even though the nested reference is unresolvable, the RoleARN key
        // short-circuits to the placeholder.
        assert_eq!(
            resolve_references(&tree, &OutputStore::new(), &registry),
            Resolution::Resolved(json!({"Config": {"RoleARN": ROLE_ARN_PLACEHOLDER}}))
        );
    }

    #[test]
    fn test_references_at_depth_inside_arrays() {
        let registry = AdapterRegistry::builtin();
        let tree = json!({
            "Destinations": [
                {"Table": {"Fn::GetAtt": ["UsersTable", "TableName"]}},
                {"Static": "value"}
            ]
        });
        assert_eq!(
            resolve_references(&tree, &store_with_table(), &registry),
            Resolution::Resolved(json!({
                "Destinations": [{"Table": "users"}, {"Static": "value"}]
            }))
        );
    }

    #[test]
    fn test_marker_beside_other_keys_is_not_a_reference() {
        let registry = AdapterRegistry::builtin();
        let tree = json!({"Fn::GetAtt": "UsersTable.TableName", "Extra": 1});
        assert_eq!(
            resolve_references(&tree, &store_with_table(), &registry),
            Resolution::Resolved(tree.clone())
        );
    }
}
