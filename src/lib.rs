//! localup - provisions cloud resources against a local emulator.
//!
//! Takes a declarative resource document (serverless.yml-style YAML) and
//! creates the declared tables, buckets, domains, and streams against a
//! locally running emulator, resolving cross-resource references as the
//! referenced resources come into existence.
//!
//! # Architecture
//!
//! The engine is a fixed-point iteration over the resource set:
//! - Each pass resolves symbolic references against outputs recorded in
//!   earlier passes, dispatches every resolvable creation concurrently,
//!   and defers the rest.
//! - Already-existing resources are skipped, not failed, so re-running
//!   against a warm emulator is idempotent.
//! - No dependency graph is ever declared; ordering falls out of the
//!   deferral loop.
//!
//! # Modules
//!
//! - `adapters`: per-resource-type descriptors and the remote-client seam
//! - `core`: orchestration (template, resolver, output store, pass loop)
//! - `domain`: data structures (ResourceDescription, Outcome, report)
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Create everything a template declares
//! localup up serverless.yml
//!
//! # Show the resolved service endpoints
//! localup endpoints
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{AdapterRegistry, HttpRemoteClient, RemoteClient, RemoteError, RemoteOp};
pub use config::{Config, ConfigOverrides};
pub use core::{Orchestrator, OutputRecord, OutputStore, Template, MAX_PASSES};
pub use domain::{NamedResource, Outcome, ProvisionReport, ResourceDescription, ResourceOutcome};
