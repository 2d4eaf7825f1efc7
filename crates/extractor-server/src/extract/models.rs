//! In-memory shapes of fetched data

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One upstream row. The extractor never looks inside; it only counts rows
/// and hands them to storage unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

/// Records returned by a single fetch, starting at `start_offset`
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub start_offset: u64,
    pub records: Vec<Record>,
}

impl Page {
    pub fn new(start_offset: u64, records: Vec<Record>) -> Self {
        Self {
            start_offset,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// An empty page means the upstream has no rows at or past this offset.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
