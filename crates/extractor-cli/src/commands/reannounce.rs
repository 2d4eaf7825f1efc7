//! `extractor reannounce` command implementation

use anyhow::Result;
use extractor_common::PartitionLabel;
use extractor_server::extract::{self, Extractor, ReannounceReport};

/// Publish a job for every stored chunk of `label`.
pub async fn run(extractor: &Extractor, label: &PartitionLabel) -> Result<ReannounceReport> {
    let writer = extractor.chunk_writer();
    let report =
        extract::reannounce(extractor.store(), extractor.queue().as_ref(), &writer, label).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{run as run_cmd, test_support};
    use extractor_server::{queue::MemoryQueue, storage::MemoryStore};

    #[tokio::test]
    async fn test_reannounce_after_publish_outage() {
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        let extractor = test_support::extractor(200, &store, &queue);
        let label = PartitionLabel::parse("2024-06-01").unwrap();

        queue.fail_publishes(true);
        let summary = run_cmd::run(&extractor, 200, label.clone()).await.unwrap();
        assert_eq!(summary.files_written, 2);
        assert!(queue.messages().is_empty());

        queue.fail_publishes(false);
        let report = run(&extractor, &label).await.unwrap();

        assert_eq!(report.found, 2);
        assert_eq!(report.announced, 2);
        assert_eq!(queue.messages().len(), 2);
    }
}
