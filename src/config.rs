//! Endpoint configuration: default ports, user overrides, and the
//! resolved service -> endpoint map.
//!
//! Sources, highest priority first:
//! 1. The template's `custom.localup` section
//! 2. A YAML config file (`--config`)
//! 3. Built-in defaults (`http://localhost` + the emulator's port table)
//!
//! An explicit per-service `endpoints` entry always wins over anything
//! derived from host + port.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default emulator host.
pub const DEFAULT_HOST: &str = "http://localhost";

/// Region label reported to remote operations that want one.
pub const DEFAULT_REGION: &str = "local";

/// The emulator's default service port table.
fn default_ports() -> HashMap<String, u16> {
    [
        ("dynamodb", 4569),
        ("ses", 4579),
        ("kinesis", 4568),
        ("redshift", 4577),
        ("s3", 4572),
        ("cloudwatch", 4582),
        ("cloudformation", 4581),
        ("ssm", 4583),
        ("sqs", 4576),
        ("sns", 4575),
        ("dynamodbstreams", 4570),
        ("firehose", 4573),
        ("route53", 4580),
        ("es", 4578),
    ]
    .into_iter()
    .map(|(service, port)| (service.to_string(), port))
    .collect()
}

/// Partial config as users write it: every field optional, merged over
/// the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub region: Option<String>,

    /// Per-service port overrides
    #[serde(default)]
    pub ports: HashMap<String, u16>,

    /// Fully explicit per-service endpoints (win over host + port)
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

impl ConfigOverrides {
    /// Load overrides from a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content).context("Failed to parse config YAML")
    }
}

/// Fully resolved configuration. Note only the endpoint map survives
/// resolution; the raw port table is folded in and discarded so it cannot
/// drift out of sync with explicit endpoint overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub region: String,
    /// service key -> endpoint URL
    pub endpoints: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::resolve(&[])
    }
}

impl Config {
    /// Fold override layers (lowest priority first) over the defaults and
    /// resolve the endpoint map.
    pub fn resolve(layers: &[ConfigOverrides]) -> Self {
        let mut host = DEFAULT_HOST.to_string();
        let mut region = DEFAULT_REGION.to_string();
        let mut ports = default_ports();
        let mut explicit: HashMap<String, String> = HashMap::new();

        for layer in layers {
            if let Some(h) = &layer.host {
                host = h.clone();
            }
            if let Some(r) = &layer.region {
                region = r.clone();
            }
            for (service, port) in &layer.ports {
                ports.insert(service.clone(), *port);
            }
            for (service, endpoint) in &layer.endpoints {
                explicit.insert(service.clone(), endpoint.clone());
            }
        }

        let endpoints = ports
            .into_iter()
            .map(|(service, port)| {
                let endpoint = explicit
                    .remove(&service)
                    .unwrap_or_else(|| format!("{host}:{port}"));
                (service, endpoint)
            })
            .collect();

        Self { region, endpoints }
    }

    pub fn endpoint(&self, service: &str) -> Option<&str> {
        self.endpoints.get(service).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.region, "local");
        assert_eq!(config.endpoint("dynamodb"), Some("http://localhost:4569"));
        assert_eq!(config.endpoint("es"), Some("http://localhost:4578"));
        assert_eq!(config.endpoints.len(), 14);
    }

    #[test]
    fn test_port_override_changes_derived_endpoint() {
        let overrides = ConfigOverrides {
            ports: [("dynamodb".to_string(), 9000)].into_iter().collect(),
            ..Default::default()
        };
        let config = Config::resolve(&[overrides]);
        assert_eq!(config.endpoint("dynamodb"), Some("http://localhost:9000"));
        // Unrelated services keep their defaults
        assert_eq!(config.endpoint("s3"), Some("http://localhost:4572"));
    }

    #[test]
    fn test_explicit_endpoint_wins_over_host_and_port() {
        let overrides = ConfigOverrides {
            host: Some("http://emulator".to_string()),
            ports: [("s3".to_string(), 9000)].into_iter().collect(),
            endpoints: [("s3".to_string(), "http://minio:9000".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let config = Config::resolve(&[overrides]);
        assert_eq!(config.endpoint("s3"), Some("http://minio:9000"));
        assert_eq!(config.endpoint("sqs"), Some("http://emulator:4576"));
    }

    #[test]
    fn test_later_layers_take_priority() {
        let file = ConfigOverrides {
            host: Some("http://from-file".to_string()),
            region: Some("file-region".to_string()),
            ..Default::default()
        };
        let template = ConfigOverrides {
            host: Some("http://from-template".to_string()),
            ..Default::default()
        };
        let config = Config::resolve(&[file, template]);
        assert_eq!(config.region, "file-region");
        assert_eq!(config.endpoint("sns"), Some("http://from-template:4575"));
    }

    #[test]
    fn test_overrides_parse_from_yaml() {
        let yaml = "host: http://emulator\nports:\n  firehose: 14573\n";
        let overrides: ConfigOverrides = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(overrides.host.as_deref(), Some("http://emulator"));
        assert_eq!(overrides.ports.get("firehose"), Some(&14573));
    }
}
