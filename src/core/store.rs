//! Process-lifetime record of created resources' output attributes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The durable result of one successful creation: the extracted attribute
/// map plus the originating type. Written once, never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub type_id: String,
    pub attributes: Map<String, Value>,
}

impl OutputRecord {
    pub fn new(type_id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            type_id: type_id.into(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Resource name -> OutputRecord. Grows monotonically during one run;
/// never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputStore {
    records: HashMap<String, OutputRecord>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a creation result. First write wins: a name already present
    /// keeps its original record.
    pub fn insert(&mut self, name: impl Into<String>, record: OutputRecord) {
        self.records.entry(name.into()).or_insert(record);
    }

    pub fn get(&self, name: &str) -> Option<&OutputRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, OutputRecord> {
        self.records
    }
}
