//! The built-in adapter table: one descriptor per supported resource type.
//!
//! These encode the per-service quirks the local emulator needs — the same
//! property rewrites the real backends either perform implicitly or never
//! require.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use super::{AdapterDescriptor, Extract, Initializer, RemoteOp, Transform};

/// The table-seeding operation used by [`Initializer::SeedDocuments`].
pub const PUT_ITEM: RemoteOp = RemoteOp {
    service: "dynamodb",
    target: "DynamoDB_20120810",
    action: "PutItem",
};

/// Immutable type -> adapter mapping, built once and passed into the
/// orchestrator. A type with no entry is explicitly unsupported.
pub struct AdapterRegistry {
    adapters: HashMap<&'static str, AdapterDescriptor>,
}

impl AdapterRegistry {
    /// An empty registry, for tests that register their own doubles.
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// The built-in adapters for the five supported resource types.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register(
            "AWS::DynamoDB::Table",
            AdapterDescriptor {
                label: "DynamoDB",
                op: RemoteOp {
                    service: "dynamodb",
                    target: "DynamoDB_20120810",
                    action: "CreateTable",
                },
                transform: Transform::Replace(table_properties),
                extract: Extract::SingleKey,
                already_exists: Some("ResourceInUseException"),
                arn_attribute: "TableArn",
                client_options: json!({}),
                initializer: Some(Initializer::SeedDocuments),
            },
        );

        registry.register(
            "AWS::SES::ConfigurationSet",
            AdapterDescriptor {
                label: "SES",
                op: RemoteOp {
                    service: "ses",
                    target: "SimpleEmailService_20101201",
                    action: "CreateConfigurationSet",
                },
                transform: Transform::Merge(json!({})),
                extract: Extract::SingleKey,
                already_exists: None,
                arn_attribute: "Arn",
                client_options: json!({}),
                initializer: None,
            },
        );

        registry.register(
            "AWS::S3::Bucket",
            AdapterDescriptor {
                label: "S3",
                op: RemoteOp {
                    service: "s3",
                    target: "AmazonS3",
                    action: "CreateBucket",
                },
                transform: Transform::Replace(bucket_properties),
                extract: Extract::Custom(bucket_outputs),
                already_exists: Some("BucketAlreadyExists"),
                arn_attribute: "Arn",
                client_options: json!({"s3ForcePathStyle": true}),
                initializer: None,
            },
        );

        registry.register(
            "AWS::Elasticsearch::Domain",
            AdapterDescriptor {
                label: "ES",
                op: RemoteOp {
                    service: "es",
                    target: "AmazonElasticsearchService",
                    action: "CreateElasticsearchDomain",
                },
                transform: Transform::Replace(domain_properties),
                extract: Extract::SingleKey,
                already_exists: Some("ResourceAlreadyExistsException"),
                arn_attribute: "ARN",
                client_options: json!({}),
                initializer: None,
            },
        );

        registry.register(
            "AWS::KinesisFirehose::DeliveryStream",
            AdapterDescriptor {
                label: "Firehose",
                op: RemoteOp {
                    service: "firehose",
                    target: "Firehose_20150804",
                    action: "CreateDeliveryStream",
                },
                transform: Transform::Merge(json!({})),
                // Unlike most services, Firehose doesn't nest its response
                // inside an object property.
                extract: Extract::Verbatim,
                already_exists: Some("ResourceAlreadyExistsException"),
                arn_attribute: "Arn",
                client_options: json!({}),
                initializer: None,
            },
        );

        registry
    }

    pub fn register(&mut self, type_id: &'static str, adapter: AdapterDescriptor) {
        self.adapters.insert(type_id, adapter);
    }

    /// Look up the adapter for a declared type, or None if the type is
    /// unsupported.
    pub fn get(&self, type_id: &str) -> Option<&AdapterDescriptor> {
        self.adapters.get(type_id)
    }

    /// Resolve the per-type output attribute a reference to `Arn` maps to.
    pub fn arn_attribute(&self, type_id: &str) -> &'static str {
        self.get(type_id)
            .map(|a| a.arn_attribute)
            .unwrap_or(crate::core::resolver::DEFAULT_ARN_ATTRIBUTE)
    }
}

/// "StreamEnabled" is required by the local emulator, but does not exist on
/// the real backend (which infers it from the view type).
fn table_properties(mut properties: Value) -> Value {
    if let Some(obj) = properties.as_object_mut() {
        if let Some(stream_spec) = obj.get("StreamSpecification") {
            let enabled = stream_spec
                .get("StreamViewType")
                .map(|v| !v.is_null())
                .unwrap_or(false);
            obj.insert(
                "StreamSpecification".to_string(),
                json!({"StreamEnabled": enabled}),
            );
        }
    }
    properties
}

/// The create operation takes "Bucket" where templates declare "BucketName".
fn bucket_properties(mut properties: Value) -> Value {
    if let Some(obj) = properties.as_object_mut() {
        if let Some(name) = obj.remove("BucketName") {
            obj.insert("Bucket".to_string(), name);
        }
    }
    properties
}

/// The create response carries no ARN for buckets, so synthesize one from
/// the bucket name.
fn bucket_outputs(response: Value, final_properties: &Value) -> Map<String, Value> {
    let mut attrs = super::unwrap_single_key(response);
    let bucket = final_properties
        .get("Bucket")
        .and_then(Value::as_str)
        .unwrap_or_default();
    attrs.insert("Arn".to_string(), json!(format!("arn:aws:s3:::{bucket}")));
    attrs
}

/// Access policies go over the wire as a JSON string, and the version field
/// must be a string even when declared as a number.
fn domain_properties(mut properties: Value) -> Value {
    if let Some(obj) = properties.as_object_mut() {
        match obj.remove("AccessPolicies") {
            Some(Value::Null) | None => {}
            Some(Value::String(s)) => {
                obj.insert("AccessPolicies".to_string(), Value::String(s));
            }
            Some(policies) => {
                obj.insert(
                    "AccessPolicies".to_string(),
                    Value::String(policies.to_string()),
                );
            }
        }
        if let Some(version) = obj.get("ElasticsearchVersion") {
            if !version.is_string() {
                let as_string = match version {
                    Value::Number(n) => n.to_string(),
                    other => other.to_string(),
                };
                obj.insert(
                    "ElasticsearchVersion".to_string(),
                    Value::String(as_string),
                );
            }
        }
    }
    properties
}
