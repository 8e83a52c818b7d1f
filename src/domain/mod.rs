//! Domain types for the localup provisioner.
//!
//! This module contains the core data structures:
//! - ResourceDescription: one declared resource from the template
//! - OutputRecord: recorded attributes of a created resource
//! - Outcome / ProvisionReport: per-resource results of a run

pub mod outcome;
pub mod resource;

// Re-export commonly used types
pub use outcome::{Outcome, ProvisionReport, ResourceOutcome};
pub use resource::{NamedResource, ResourceDescription, ResourceOptions};
