//! Core orchestration logic.
//!
//! This module contains:
//! - Template: declarative resource document loading
//! - OutputStore: recorded outputs of created resources
//! - Resolver: symbolic cross-resource reference substitution
//! - Orchestrator: the fixed-point pass loop

pub mod orchestrator;
pub mod resolver;
pub mod store;
pub mod template;

// Re-export commonly used types
pub use orchestrator::{Orchestrator, MAX_PASSES};
pub use resolver::{Resolution, ROLE_ARN_PLACEHOLDER};
pub use store::{OutputRecord, OutputStore};
pub use template::Template;
