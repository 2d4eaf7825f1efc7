//! Persistence of fetched pages as immutable chunk objects

use extractor_common::PartitionLabel;
use std::sync::Arc;
use tracing::{info, instrument};

use super::models::Page;
use crate::storage::{BlobStore, StorageError};

/// Minimum digits of the offset in chunk names (`..._offset_01000.json`).
pub const OFFSET_WIDTH: usize = 5;

const CHUNK_SUFFIX: &str = ".json";

pub struct ChunkWriter {
    store: Arc<dyn BlobStore>,
    prefix: String,
}

impl ChunkWriter {
    pub fn new(store: Arc<dyn BlobStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// `{label}/{prefix}_offset_{offset:05}.json`. Deterministic, so a re-run
    /// over the same offset overwrites instead of duplicating.
    pub fn object_name(&self, label: &PartitionLabel, start_offset: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.name_stem(label),
            start_offset,
            CHUNK_SUFFIX,
            width = OFFSET_WIDTH
        )
    }

    /// Recover the starting offset from a chunk name written for `label`.
    pub fn chunk_offset(&self, label: &PartitionLabel, object_name: &str) -> Option<u64> {
        let digits = object_name
            .strip_prefix(&self.name_stem(label))?
            .strip_suffix(CHUNK_SUFFIX)?;

        if digits.len() < OFFSET_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Serialize `page` as a JSON array and store it under its chunk name.
    /// Returns the name once the object is durable.
    #[instrument(skip(self, page), fields(offset = page.start_offset, records = page.len()))]
    pub async fn write(&self, label: &PartitionLabel, page: &Page) -> Result<String, StorageError> {
        let name = self.object_name(label, page.start_offset);

        let mut body = serde_json::to_vec(&page.records).map_err(|e| StorageError::Write {
            key: name.clone(),
            message: format!("failed to serialize records: {}", e),
        })?;
        body.push(b'\n');

        let upload = self.store.put(&name, body, "application/json").await?;

        info!(object = %name, size = upload.size, checksum = %upload.checksum, "Chunk written");

        Ok(name)
    }

    /// Listing prefix holding every chunk of `label`.
    pub fn label_prefix(label: &PartitionLabel) -> String {
        format!("{}/", label)
    }

    fn name_stem(&self, label: &PartitionLabel) -> String {
        format!("{}{}_offset_", Self::label_prefix(label), self.prefix)
    }
}
