//! Seed initializer and template-driven flow tests.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use localup::adapters::{AdapterRegistry, RemoteClient, RemoteError, RemoteOp};
use localup::core::{Orchestrator, Template};
use localup::domain::{NamedResource, Outcome, ResourceDescription, ResourceOptions};

/// Records every invocation and always succeeds with an empty response.
#[derive(Clone, Default)]
struct RecordingClient {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingClient {
    fn calls_for(&self, action: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, _)| a == action)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteClient for RecordingClient {
    async fn invoke(
        &self,
        op: &RemoteOp,
        properties: &Value,
        _client_options: &Value,
    ) -> Result<Value, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((op.action.to_string(), properties.clone()));
        Ok(match op.action {
            "CreateTable" => json!({
                "TableDescription": {
                    "TableArn": "arn:aws:dynamodb:local:000000000000:table/users"
                }
            }),
            _ => json!({}),
        })
    }
}

fn seed_file(documents: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{documents}").unwrap();
    file.flush().unwrap();
    file
}

fn users_table() -> NamedResource {
    NamedResource::new(
        "UsersTable",
        ResourceDescription::new("AWS::DynamoDB::Table", json!({"TableName": "users"})),
    )
}

#[tokio::test]
async fn test_documents_put_one_per_item() {
    let file = seed_file(&json!([
        {"id": {"S": "1"}, "name": {"S": "ada"}},
        {"id": {"S": "2"}, "name": {"S": "grace"}}
    ]));
    let client = RecordingClient::default();
    let orchestrator = Orchestrator::new(AdapterRegistry::builtin(), Box::new(client.clone()));

    let options: HashMap<String, ResourceOptions> = [(
        "UsersTable".to_string(),
        ResourceOptions {
            documents_path: Some(file.path().to_string_lossy().into_owned()),
        },
    )]
    .into_iter()
    .collect();

    orchestrator
        .run_initializers(&[users_table()], &options)
        .await
        .unwrap();

    let puts = client.calls_for("PutItem");
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0]["TableName"], json!("users"));
    assert_eq!(puts[0]["Item"]["name"], json!({"S": "ada"}));
}

#[tokio::test]
async fn test_resources_without_options_are_not_seeded() {
    let client = RecordingClient::default();
    let orchestrator = Orchestrator::new(AdapterRegistry::builtin(), Box::new(client.clone()));

    orchestrator
        .run_initializers(&[users_table()], &HashMap::new())
        .await
        .unwrap();

    assert!(client.calls_for("PutItem").is_empty());
}

#[tokio::test]
async fn test_missing_seed_file_propagates() {
    let client = RecordingClient::default();
    let orchestrator = Orchestrator::new(AdapterRegistry::builtin(), Box::new(client));

    let options: HashMap<String, ResourceOptions> = [(
        "UsersTable".to_string(),
        ResourceOptions {
            documents_path: Some("/nonexistent/seed.json".to_string()),
        },
    )]
    .into_iter()
    .collect();

    let result = orchestrator
        .run_initializers(&[users_table()], &options)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_template_drives_a_full_run() {
    let template = Template::from_yaml(
        r#"
service: demo
resources:
  Resources:
    UsersTable:
      Type: AWS::DynamoDB::Table
      Properties:
        TableName: users
    Pipeline:
      Type: AWS::KinesisFirehose::DeliveryStream
      Properties:
        DeliveryStreamName: pipeline
        Destination:
          TableArn:
            Fn::GetAtt: [UsersTable, Arn]
"#,
    )
    .unwrap();

    let client = RecordingClient::default();
    let orchestrator = Orchestrator::new(AdapterRegistry::builtin(), Box::new(client.clone()));
    let report = orchestrator.provision(&template.resources).await;

    assert!(report.outcomes.iter().all(|o| o.outcome == Outcome::Created));
    // Siblings never see same-pass outputs: the stream waits a pass even
    // though the table appears earlier in the same document.
    assert_eq!(report.passes, 2);
    assert_eq!(report.outcome_for("Pipeline").unwrap().pass, 2);

    let streams = client.calls_for("CreateDeliveryStream");
    assert_eq!(
        streams[0]["Destination"]["TableArn"],
        json!("arn:aws:dynamodb:local:000000000000:table/users")
    );
}
