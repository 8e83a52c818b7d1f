//! Per-resource outcomes and the run report.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::store::OutputRecord;

/// How a single resource settled.
///
/// Resource-level failures are isolated: none of these variants fail the
/// run as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Outcome {
    /// The remote creation succeeded and outputs were recorded
    Created,

    /// The remote operation reported the adapter's known conflict kind;
    /// treated as a successful skip, no outputs recorded
    AlreadyExists,

    /// No adapter is registered for the declared type; skipped
    Unsupported,

    /// The remote operation failed with something other than the
    /// already-exists kind
    Failed { error: String },

    /// Still deferred when the pass cap was hit; never created
    Unresolved { waiting_on: String },
}

impl Outcome {
    /// True for outcomes that count as forward progress (created or
    /// already present).
    pub fn is_settled_ok(&self) -> bool {
        matches!(self, Outcome::Created | Outcome::AlreadyExists)
    }
}

/// One line of the run report: a resource, the pass it settled on, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOutcome {
    pub name: String,
    pub type_id: String,
    /// Short service label for log lines, e.g. `DynamoDB`
    pub label: String,
    /// 1-based pass number on which the resource settled
    pub pass: u32,
    pub outcome: Outcome,
}

impl fmt::Display for ResourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Created => {
                write!(f, "{} -- \"{}\" created.", self.label, self.name)
            }
            Outcome::AlreadyExists => {
                write!(
                    f,
                    "{} -- \"{}\" already exists. Skipping...",
                    self.label, self.name
                )
            }
            Outcome::Unsupported => {
                write!(
                    f,
                    "\"{}\" has type {} which is not supported. Skipping...",
                    self.name, self.type_id
                )
            }
            Outcome::Failed { error } => {
                write!(
                    f,
                    "{} -- \"{}\" failed to create: {}",
                    self.label, self.name, error
                )
            }
            Outcome::Unresolved { waiting_on } => {
                write!(
                    f,
                    "\"{}\" never resolved (still waiting on \"{}\"). Giving up.",
                    self.name, waiting_on
                )
            }
        }
    }
}

/// Result of one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionReport {
    /// Per-resource outcomes, in settle order
    pub outcomes: Vec<ResourceOutcome>,

    /// Recorded outputs of every successfully created resource
    pub outputs: HashMap<String, OutputRecord>,

    /// Number of passes executed
    pub passes: u32,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ProvisionReport {
    /// Look up the outcome for a resource by name.
    pub fn outcome_for(&self, name: &str) -> Option<&ResourceOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}
