//! Command-line interface for localup.
//!
//! Provides commands for provisioning a template's resources against the
//! local emulator and for inspecting the resolved endpoint table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{AdapterRegistry, HttpRemoteClient};
use crate::config::{Config, ConfigOverrides};
use crate::core::{Orchestrator, Template};
use crate::domain::Outcome;

/// localup - provisions local emulator resources from a declarative template
#[derive(Parser, Debug)]
#[command(name = "localup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create every resource a template declares
    Up {
        /// Template file (serverless.yml-style YAML)
        template: PathBuf,

        /// Optional config file with host/port/endpoint overrides
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip post-creation seed initializers
        #[arg(long)]
        no_seed: bool,
    },

    /// Print the resolved service -> endpoint table
    Endpoints {
        /// Optional config file with host/port/endpoint overrides
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Up {
                template,
                config,
                no_seed,
            } => up(template, config, no_seed).await,
            Commands::Endpoints { config } => endpoints(config),
        }
    }
}

/// Fold config layers: defaults, then the config file, then the
/// template's custom section.
fn resolve_config(
    config_file: Option<&PathBuf>,
    template_overrides: Option<ConfigOverrides>,
) -> Result<Config> {
    let mut layers = Vec::new();
    if let Some(path) = config_file {
        layers.push(ConfigOverrides::from_file(path)?);
    }
    if let Some(overrides) = template_overrides {
        layers.push(overrides);
    }
    Ok(Config::resolve(&layers))
}

async fn up(template_path: PathBuf, config_file: Option<PathBuf>, no_seed: bool) -> Result<()> {
    let template = Template::from_file(&template_path)?;
    if template.resources.is_empty() {
        println!("Template declares no resources. Nothing to do.");
        return Ok(());
    }

    let config = resolve_config(config_file.as_ref(), template.overrides.clone())?;
    let client = HttpRemoteClient::new(config.endpoints.clone(), config.region.clone());
    let orchestrator = Orchestrator::new(AdapterRegistry::builtin(), Box::new(client));

    let report = orchestrator.provision(&template.resources).await;

    for outcome in &report.outcomes {
        println!("{outcome}");
    }
    println!(
        "{} resource(s) settled in {} pass(es).",
        report.outcomes.len(),
        report.passes
    );

    if !no_seed && !template.options.is_empty() {
        orchestrator
            .run_initializers(&template.resources, &template.options)
            .await
            .context("Seed initialization failed")?;
    }

    // Failed or dropped resources surface in the exit code even though
    // they never abort the run itself.
    let unsettled = report
        .outcomes
        .iter()
        .filter(|o| {
            matches!(
                o.outcome,
                Outcome::Failed { .. } | Outcome::Unresolved { .. }
            )
        })
        .count();
    if unsettled > 0 {
        anyhow::bail!("{unsettled} resource(s) could not be created");
    }

    Ok(())
}

fn endpoints(config_file: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_file.as_ref(), None)?;

    let mut services: Vec<&String> = config.endpoints.keys().collect();
    services.sort();
    for service in services {
        println!(" + {} -- {}", config.endpoints[service], service);
    }
    Ok(())
}
