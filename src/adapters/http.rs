//! HTTP remote client speaking the JSON wire flavor local emulators accept.
//!
//! Every operation is a POST to the service's endpoint with an
//! `X-Amz-Target: <target>.<action>` header and the property tree as the
//! JSON body. Errors come back as `{"__type": "...#Kind", "message": ...}`;
//! the fragment after `#` is the classification name adapters match
//! against.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::{RemoteClient, RemoteError, RemoteOp};

/// RemoteClient backed by reqwest, one endpoint per service.
pub struct HttpRemoteClient {
    client: reqwest::Client,
    /// service key -> base URL, e.g. `dynamodb -> http://localhost:4569`
    endpoints: HashMap<String, String>,
    region: String,
}

impl HttpRemoteClient {
    pub fn new(endpoints: HashMap<String, String>, region: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
            region: region.into(),
        }
    }

    /// Emulators don't validate signatures but do parse the region and
    /// service out of the credential scope.
    fn authorization(&self, op: &RemoteOp) -> String {
        format!(
            "AWS4-HMAC-SHA256 Credential=local/19700101/{}/{}/aws4_request",
            self.region, op.service
        )
    }

    fn endpoint_for(&self, op: &RemoteOp) -> Result<&str, RemoteError> {
        self.endpoints
            .get(op.service)
            .map(String::as_str)
            .ok_or_else(|| {
                RemoteError::new(
                    "EndpointNotConfigured",
                    format!("no endpoint configured for service '{}'", op.service),
                )
            })
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn invoke(
        &self,
        op: &RemoteOp,
        properties: &Value,
        client_options: &Value,
    ) -> Result<Value, RemoteError> {
        let endpoint = self.endpoint_for(op)?;

        let mut request = self
            .client
            .post(endpoint)
            .header("X-Amz-Target", format!("{}.{}", op.target, op.action))
            .header("Authorization", self.authorization(op))
            .header("Content-Type", "application/x-amz-json-1.0")
            .json(properties);

        // Path-style addressing quirk: carried in a header the emulator
        // understands rather than a per-service client constructor.
        if client_options
            .get("s3ForcePathStyle")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            request = request.header("X-Force-Path-Style", "true");
        }

        let response = request.send().await.map_err(|e| {
            RemoteError::new("RequestFailed", format!("{}: {e}", op.action))
        })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }

        Err(classify_error(&body, status.as_u16()))
    }
}

/// Decode an error body into its classification name.
fn classify_error(body: &Value, status: u16) -> RemoteError {
    let kind = body
        .get("__type")
        .and_then(Value::as_str)
        .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
        .unwrap_or_else(|| format!("HttpStatus{status}"));

    let message = body
        .get("message")
        .or_else(|| body.get("Message"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    RemoteError::new(kind, message)
}
