//! Declarative resource document loading.
//!
//! Templates are serverless.yml-style YAML: resources live under
//! `resources.Resources.<Name>` with `Type`/`Properties`, and the
//! `custom.localup` section optionally carries endpoint overrides and
//! per-resource seed options. Resource order in the document is the order
//! resources are dispatched within a pass.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_yaml::Value as YamlValue;

use crate::config::ConfigOverrides;
use crate::domain::{NamedResource, ResourceDescription, ResourceOptions};

/// A parsed resource document.
#[derive(Debug, Clone, Default)]
pub struct Template {
    /// Declared resources, in document order
    pub resources: Vec<NamedResource>,

    /// `custom.localup` config overrides, if present
    pub overrides: Option<ConfigOverrides>,

    /// Per-resource initialization options from `custom.localup.seed`
    pub options: HashMap<String, ResourceOptions>,
}

impl Template {
    /// Load a template from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template file: {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a template from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let document: YamlValue =
            serde_yaml::from_str(content).context("Failed to parse template YAML")?;

        let resources = parse_resources(&document)?;
        let custom = document.get("custom").and_then(|c| c.get("localup"));

        let overrides = custom
            .map(|c| {
                serde_yaml::from_value(strip_seed(c.clone()))
                    .context("Failed to parse custom.localup config")
            })
            .transpose()?;

        let options = custom
            .and_then(|c| c.get("seed"))
            .map(|seed| {
                serde_yaml::from_value(seed.clone())
                    .context("Failed to parse custom.localup.seed")
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            resources,
            overrides,
            options,
        })
    }
}

/// Pull `resources.Resources` out of the document, preserving key order.
fn parse_resources(document: &YamlValue) -> Result<Vec<NamedResource>> {
    let Some(entries) = document
        .get("resources")
        .and_then(|r| r.get("Resources"))
        .and_then(YamlValue::as_mapping)
    else {
        return Ok(Vec::new());
    };

    let mut resources = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let name = key
            .as_str()
            .context("Resource names must be strings")?
            .to_string();
        let description: ResourceDescription = serde_yaml::from_value(value.clone())
            .with_context(|| format!("Invalid resource description for '{name}'"))?;
        resources.push(NamedResource::new(name, description));
    }
    Ok(resources)
}

/// The seed section parses separately; drop it before decoding overrides.
fn strip_seed(mut custom: YamlValue) -> YamlValue {
    if let Some(map) = custom.as_mapping_mut() {
        map.remove("seed");
    }
    custom
}
