//! Re-announcement sweep
//!
//! A chunk whose announcement failed is still in storage but the cleaning
//! stage never heard of it. This walks every chunk of a label and publishes a
//! job for each one again. Consumers must tolerate duplicates.

use extractor_common::PartitionLabel;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{announcer::JobAnnouncer, chunk::ChunkWriter};
use crate::{
    queue::{QueueConnector, QueueError},
    storage::{BlobStore, StorageError},
};

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReannounceReport {
    /// Chunk objects found under the label
    pub found: usize,
    pub announced: usize,
    pub failed: usize,
}

/// Publish one job per stored chunk of `label`, in offset order.
///
/// Objects under the label prefix that are not chunk names are ignored. A
/// failed publish is counted and the sweep carries on.
#[instrument(skip(store, connector, writer, label), fields(label = %label))]
pub async fn reannounce(
    store: &Arc<dyn BlobStore>,
    connector: &dyn QueueConnector,
    writer: &ChunkWriter,
    label: &PartitionLabel,
) -> Result<ReannounceReport, ReconcileError> {
    let mut chunks: Vec<(u64, String)> = store
        .list(&ChunkWriter::label_prefix(label))
        .await?
        .into_iter()
        .filter_map(|name| writer.chunk_offset(label, &name).map(|offset| (offset, name)))
        .collect();
    chunks.sort();

    let announcer = JobAnnouncer::new(connector.open().await?);
    let mut report = ReannounceReport {
        found: chunks.len(),
        ..ReannounceReport::default()
    };

    for (offset, name) in &chunks {
        match announcer.announce(label, name).await {
            Ok(()) => report.announced += 1,
            Err(e) => {
                warn!(offset, object = %name, error = %e, "Re-announcement failed");
                report.failed += 1;
            },
        }
    }

    if let Err(e) = announcer.close().await {
        warn!(error = %e, "Queue publisher did not close cleanly");
    }

    info!(
        found = report.found,
        announced = report.announced,
        failed = report.failed,
        "Re-announcement sweep finished"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::queue::MemoryQueue;
    use crate::storage::MemoryStore;
    use extractor_common::JobMessage;

    #[tokio::test]
    async fn test_reannounce_in_offset_order_skipping_foreign_objects() {
        let memory = MemoryStore::new();
        memory.insert("2024-06-01/food_inspections_raw_offset_10000.json", "[]").await;
        memory.insert("2024-06-01/food_inspections_raw_offset_02000.json", "[]").await;
        memory.insert("2024-06-01/food_inspections_raw_offset_00000.json", "[]").await;
        memory.insert("2024-06-01/manifest.txt", "x").await;
        memory.insert("2024-06-02/food_inspections_raw_offset_00000.json", "[]").await;

        let store: Arc<dyn BlobStore> = Arc::new(memory);
        let writer = ChunkWriter::new(store.clone(), "food_inspections_raw");
        let queue = MemoryQueue::new();
        let label = PartitionLabel::parse("2024-06-01").unwrap();

        let report = reannounce(&store, &queue, &writer, &label).await.unwrap();
        assert_eq!(
            report,
            ReannounceReport {
                found: 3,
                announced: 3,
                failed: 0
            }
        );

        let filenames: Vec<String> = queue
            .messages()
            .iter()
            .map(|m| JobMessage::from_slice(m).unwrap().filename)
            .collect();
        assert_eq!(
            filenames,
            vec![
                "2024-06-01/food_inspections_raw_offset_00000.json",
                "2024-06-01/food_inspections_raw_offset_02000.json",
                "2024-06-01/food_inspections_raw_offset_10000.json",
            ]
        );
        assert_eq!(queue.sessions(), (1, 1));
    }

    #[tokio::test]
    async fn test_publish_failures_are_counted() {
        let memory = MemoryStore::new();
        memory.insert("2024-06-01/food_inspections_raw_offset_00000.json", "[]").await;
        let store: Arc<dyn BlobStore> = Arc::new(memory);
        let writer = ChunkWriter::new(store.clone(), "food_inspections_raw");
        let queue = MemoryQueue::new();
        queue.fail_publishes(true);

        let label = PartitionLabel::parse("2024-06-01").unwrap();
        let report = reannounce(&store, &queue, &writer, &label).await.unwrap();

        assert_eq!(report.found, 1);
        assert_eq!(report.announced, 0);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_unreachable_queue_is_an_error() {
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        let writer = ChunkWriter::new(store.clone(), "food_inspections_raw");
        let queue = MemoryQueue::new();
        queue.refuse_connections(true);

        let label = PartitionLabel::parse("2024-06-01").unwrap();
        let err = reannounce(&store, &queue, &writer, &label).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Queue(QueueError::Connect(_))));
    }
}
