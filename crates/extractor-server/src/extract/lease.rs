//! Per-partition run leases
//!
//! Two runs for the same label would overwrite each other's chunks. A run
//! holds the label's lease for its whole duration. The lease does not guard
//! the cursor: there is one cursor object for all labels, so runs for
//! different labels still race on it. Leases live in process memory, so they
//! serialize runs within one server instance only.

use extractor_common::PartitionLabel;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct LeaseRegistry {
    held: Arc<Mutex<HashSet<String>>>,
}

impl LeaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when another run already holds `label`.
    pub fn try_acquire(&self, label: &PartitionLabel) -> Option<PartitionLease> {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        if !held.insert(label.as_str().to_string()) {
            return None;
        }
        debug!(label = %label, "Lease acquired");
        Some(PartitionLease {
            label: label.as_str().to_string(),
            held: self.held.clone(),
        })
    }

    pub fn is_held(&self, label: &PartitionLabel) -> bool {
        self.held
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(label.as_str())
    }
}

/// Released on drop.
#[derive(Debug)]
pub struct PartitionLease {
    label: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl Drop for PartitionLease {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.label);
        debug!(label = %self.label, "Lease released");
    }
}
