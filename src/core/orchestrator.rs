//! The fixed-point creation loop.
//!
//! Each pass sweeps the still-pending resources: references are resolved
//! against the output store as it stood when the pass began, every
//! resolvable resource's creation is dispatched concurrently, and the pass
//! ends only once all dispatched attempts have settled. Deferred resources
//! are retried next pass; newly recorded outputs become visible to that
//! pass's resolution. The loop runs to a fixed point or a hard cap.
//!
//! Resource-level failures are isolated: a failed creation is logged and
//! reported but never aborts the run or its siblings.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{
    registry::PUT_ITEM, AdapterDescriptor, AdapterRegistry, Initializer, RemoteClient,
    RemoteError,
};
use crate::domain::{NamedResource, Outcome, ProvisionReport, ResourceOptions, ResourceOutcome};

use super::resolver::{resolve_references, Resolution};
use super::store::{OutputRecord, OutputStore};

/// Hard cap on passes. Bounds worst-case work at cap x |resources|
/// creation attempts; reference cycles land here rather than spinning.
pub const MAX_PASSES: u32 = 30;

/// How one dispatched creation attempt settled.
enum CreateResult {
    /// Created; the extracted output attributes
    Created(Map<String, Value>),

    /// The remote operation reported the adapter's already-exists kind
    AlreadyExists,
}

/// Drives resource creation against a remote client using a fixed adapter
/// registry. Both are supplied at construction; one orchestrator serves
/// one run or many.
pub struct Orchestrator {
    registry: AdapterRegistry,
    client: Box<dyn RemoteClient>,
}

impl Orchestrator {
    pub fn new(registry: AdapterRegistry, client: Box<dyn RemoteClient>) -> Self {
        Self { registry, client }
    }

    /// Resolve and create every resource in the set.
    ///
    /// Returns a report rather than an error: per-resource failures are
    /// recorded as outcomes, and resources still unresolved at the cap are
    /// reported as such.
    #[instrument(skip_all, fields(resources = resources.len()))]
    pub async fn provision(&self, resources: &[NamedResource]) -> ProvisionReport {
        let started_at = Utc::now();
        let mut store = OutputStore::new();
        let mut outcomes: Vec<ResourceOutcome> = Vec::new();
        let mut pending: Vec<NamedResource> = resources.to_vec();
        let mut waiting_on: HashMap<String, String> = HashMap::new();
        let mut pass = 0u32;

        while !pending.is_empty() && pass < MAX_PASSES {
            pass += 1;
            let mut deferred: Vec<NamedResource> = Vec::new();
            let mut attempts = Vec::new();

            for resource in pending {
                let type_id = resource.description.type_id.clone();

                let Some(adapter) = self.registry.get(&type_id) else {
                    let outcome = ResourceOutcome {
                        name: resource.name,
                        label: type_id.clone(),
                        type_id,
                        pass,
                        outcome: Outcome::Unsupported,
                    };
                    info!("{outcome}");
                    outcomes.push(outcome);
                    continue;
                };

                // Resolution sees the store as it stood at pass start;
                // same-pass siblings never observe each other's outputs.
                match resolve_references(&resource.description.properties, &store, &self.registry)
                {
                    Resolution::Deferred { waiting_on: dep } => {
                        debug!(
                            resource = %resource.name,
                            waiting_on = %dep,
                            pass,
                            "Reference not yet resolvable, deferring"
                        );
                        waiting_on.insert(resource.name.clone(), dep);
                        deferred.push(resource);
                    }
                    Resolution::Resolved(properties) => {
                        let name = resource.name;
                        attempts.push(async move {
                            let result = self.create_resource(adapter, properties).await;
                            (name, type_id, adapter.label, result)
                        });
                    }
                }
            }

            // Barrier: the pass completes only once every dispatched
            // attempt has settled. Outputs recorded here are visible from
            // the next pass onward.
            for (name, type_id, label, result) in join_all(attempts).await {
                let outcome = match result {
                    Ok(CreateResult::Created(attributes)) => {
                        store.insert(&name, OutputRecord::new(&type_id, attributes));
                        Outcome::Created
                    }
                    Ok(CreateResult::AlreadyExists) => Outcome::AlreadyExists,
                    Err(error) => Outcome::Failed {
                        error: error.to_string(),
                    },
                };
                let line = ResourceOutcome {
                    name,
                    type_id,
                    label: label.to_string(),
                    pass,
                    outcome,
                };
                match &line.outcome {
                    Outcome::Failed { .. } => error!("{line}"),
                    _ => info!("{line}"),
                }
                outcomes.push(line);
            }

            pending = deferred;
        }

        // Anything still pending hit the cap without resolving.
        for resource in pending {
            let dep = waiting_on
                .remove(&resource.name)
                .unwrap_or_else(|| "unknown".to_string());
            let outcome = ResourceOutcome {
                name: resource.name,
                label: resource.description.type_id.clone(),
                type_id: resource.description.type_id,
                pass,
                outcome: Outcome::Unresolved { waiting_on: dep },
            };
            warn!("{outcome}");
            outcomes.push(outcome);
        }

        info!(
            passes = pass,
            created = store.len(),
            total = outcomes.len(),
            "Provisioning settled"
        );

        ProvisionReport {
            outcomes,
            outputs: store.into_inner(),
            passes: pass,
            started_at,
            completed_at: Utc::now(),
        }
    }

    /// Transform, invoke, and classify one creation attempt.
    async fn create_resource(
        &self,
        adapter: &AdapterDescriptor,
        properties: Value,
    ) -> Result<CreateResult, RemoteError> {
        let final_properties = adapter.transform.apply(&properties);

        match self
            .client
            .invoke(&adapter.op, &final_properties, &adapter.client_options)
            .await
        {
            Ok(response) => Ok(CreateResult::Created(
                adapter.extract.attributes(response, &final_properties),
            )),
            Err(error)
                if adapter
                    .already_exists
                    .is_some_and(|kind| error.is_kind(kind)) =>
            {
                Ok(CreateResult::AlreadyExists)
            }
            Err(error) => Err(error),
        }
    }

    /// Run post-creation initializers for resources that declare options.
    ///
    /// Runs after [`provision`](Self::provision) has settled every
    /// resource. Unlike creation, initializer failures propagate.
    pub async fn run_initializers(
        &self,
        resources: &[NamedResource],
        options: &HashMap<String, ResourceOptions>,
    ) -> Result<()> {
        for resource in resources {
            let Some(adapter) = self.registry.get(&resource.description.type_id) else {
                continue;
            };
            let Some(initializer) = adapter.initializer else {
                continue;
            };
            let Some(opts) = options.get(&resource.name) else {
                continue;
            };

            match initializer {
                Initializer::SeedDocuments => {
                    if let Some(path) = &opts.documents_path {
                        self.seed_documents(resource, path).await.with_context(|| {
                            format!("Failed to seed documents into '{}'", resource.name)
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Put every document from a JSON array file into a created table.
    async fn seed_documents(&self, resource: &NamedResource, path: &str) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seed file: {path}"))?;
        let documents: Vec<Value> =
            serde_json::from_str(&content).context("Seed file must be a JSON array")?;

        let table_name = resource
            .description
            .properties
            .get("TableName")
            .cloned()
            .with_context(|| format!("Resource '{}' declares no TableName", resource.name))?;

        let no_options = Value::Null;
        let puts = documents.iter().map(|document| {
            let body = json!({"TableName": table_name, "Item": document});
            let no_options = &no_options;
            async move { self.client.invoke(&PUT_ITEM, &body, no_options).await }
        });

        for result in join_all(puts).await {
            result?;
        }

        info!(
            table = %resource.name,
            documents = documents.len(),
            "Seeded table documents"
        );
        Ok(())
    }
}
