//! Adapter descriptors and the remote-operation seam.
//!
//! An adapter maps a declared resource type to a concrete remote creation
//! operation: which operation to call, how to reshape the declared
//! properties first, how to pull identifying attributes out of the raw
//! response, and which error classification means "already there".
//!
//! The network itself sits behind the [`RemoteClient`] trait so tests can
//! inject a double per run.

pub mod http;
pub mod registry;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use http::HttpRemoteClient;
pub use registry::AdapterRegistry;

/// A remote creation (or seeding) operation: service for endpoint lookup,
/// wire target prefix, and the action name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteOp {
    /// Service key into the endpoint map, e.g. `dynamodb`
    pub service: &'static str,
    /// Target prefix for the JSON wire flavor, e.g. `DynamoDB_20120810`
    pub target: &'static str,
    /// Operation name, e.g. `CreateTable`
    pub action: &'static str,
}

/// Error returned by a remote operation, carrying the classification name
/// adapters match their already-exists kind against.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    /// Classification name, e.g. `ResourceInUseException`
    pub kind: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

/// The callable that actually performs remote operations.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Invoke a remote operation with an already-transformed property tree.
    ///
    /// `client_options` carries adapter-specific connection quirks
    /// (e.g. path-style addressing for buckets).
    async fn invoke(
        &self,
        op: &RemoteOp,
        properties: &Value,
        client_options: &Value,
    ) -> Result<Value, RemoteError>;
}

/// How an adapter reshapes declared properties before the remote call.
#[derive(Clone)]
pub enum Transform {
    /// Deep-merge a static partial object over the declared properties.
    /// Additive: unrelated keys survive.
    Merge(Value),

    /// Hand a deep copy of the declared properties to a pure function and
    /// use its return value verbatim. Used where keys must be renamed,
    /// deleted, or restructured rather than merged.
    Replace(fn(Value) -> Value),
}

impl Transform {
    /// Apply the transform to a clone of the declared properties.
    pub fn apply(&self, properties: &Value) -> Value {
        match self {
            Transform::Merge(overrides) => deep_merge(properties.clone(), overrides),
            Transform::Replace(f) => f(properties.clone()),
        }
    }
}

/// How an adapter pulls output attributes from the raw creation response.
#[derive(Clone)]
pub enum Extract {
    /// The response holds exactly one top-level key; its value is the
    /// attribute map. The common shape.
    SingleKey,

    /// The response itself is the attribute map (no nesting).
    Verbatim,

    /// Adapter-specific extraction: (raw response, final properties) ->
    /// attribute map. Used where the response lacks attributes the caller
    /// needs and they must be synthesized.
    Custom(fn(Value, &Value) -> Map<String, Value>),
}

impl Extract {
    /// Extract the output attribute map from a creation response.
    pub fn attributes(&self, response: Value, final_properties: &Value) -> Map<String, Value> {
        match self {
            Extract::SingleKey => unwrap_single_key(response),
            Extract::Verbatim => match response {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            Extract::Custom(f) => f(response, final_properties),
        }
    }
}

/// Unwrap `{ "TableDescription": {...} }`-style responses down to the
/// inner object. Empty or non-object responses yield an empty map.
pub(crate) fn unwrap_single_key(response: Value) -> Map<String, Value> {
    let Value::Object(mut map) = response else {
        return Map::new();
    };
    let Some(first_key) = map.keys().next().cloned() else {
        return Map::new();
    };
    match map.remove(&first_key) {
        Some(Value::Object(inner)) => inner,
        _ => Map::new(),
    }
}

/// Post-creation initialization an adapter may declare, run by a separate
/// step once the pass loop has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initializer {
    /// Load a JSON document array from `documents_path` and put each
    /// document into the created table.
    SeedDocuments,
}

/// Everything the orchestrator needs to know about one resource type.
/// Registered once at startup, read-only thereafter.
#[derive(Clone)]
pub struct AdapterDescriptor {
    /// Short label for log lines, e.g. `DynamoDB`
    pub label: &'static str,

    /// The creation operation
    pub op: RemoteOp,

    /// Property reshaping applied before the creation call
    pub transform: Transform,

    /// Output attribute extraction applied to the creation response
    pub extract: Extract,

    /// Error classification meaning "already exists" (treated as a skip).
    /// None means every error is fatal for that resource.
    pub already_exists: Option<&'static str>,

    /// Output attribute substituted when a reference asks for `Arn`
    pub arn_attribute: &'static str,

    /// Connection quirks forwarded to the remote client
    pub client_options: Value,

    /// Optional post-creation initialization
    pub initializer: Option<Initializer>,
}

/// Recursively merge `overrides` over `base`. Objects merge key-by-key;
/// anything else is taken from the override side.
pub fn deep_merge(base: Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (Value::Object(mut base_map), Value::Object(override_map)) => {
            for (key, override_value) in override_map {
                let merged = match base_map.remove(key) {
                    Some(existing) => deep_merge(existing, override_value),
                    None => override_value.clone(),
                };
                base_map.insert(key.clone(), merged);
            }
            Value::Object(base_map)
        }
        (_, other) => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_merge_is_additive() {
        let base = json!({"a": 1, "nested": {"keep": true, "replace": 1}});
        let overrides = json!({"nested": {"replace": 2}, "b": 3});
        let merged = deep_merge(base, &overrides);
        assert_eq!(
            merged,
            json!({"a": 1, "nested": {"keep": true, "replace": 2}, "b": 3})
        );
    }

    #[test]
    fn test_merge_transform_leaves_input_untouched() {
        let declared = json!({"TableName": "x"});
        let transform = Transform::Merge(json!({"BillingMode": "PAY_PER_REQUEST"}));
        let out = transform.apply(&declared);
        assert_eq!(out["BillingMode"], json!("PAY_PER_REQUEST"));
        assert_eq!(declared, json!({"TableName": "x"}));
    }

    #[test]
    fn test_single_key_unwrap() {
        let response = json!({"TableDescription": {"TableArn": "arn:x"}});
        let attrs = unwrap_single_key(response);
        assert_eq!(attrs.get("TableArn"), Some(&json!("arn:x")));
    }

    #[test]
    fn test_single_key_unwrap_empty_response() {
        assert!(unwrap_single_key(json!({})).is_empty());
        assert!(unwrap_single_key(json!(null)).is_empty());
        assert!(unwrap_single_key(json!({"Location": "/bucket"})).is_empty());
    }

    #[test]
    fn test_verbatim_extract() {
        let response = json!({"DeliveryStreamARN": "arn:aws:firehose:::x"});
        let attrs = Extract::Verbatim.attributes(response, &json!({}));
        assert_eq!(attrs.get("DeliveryStreamARN"), Some(&json!("arn:aws:firehose:::x")));
    }
}
