//! Extraction run driver
//!
//! A run moves through `validate -> read cursor -> loop -> finalize`:
//!
//! 1. The request is validated before anything is touched.
//! 2. The partition lease is taken, storage is checked and the queue opened.
//!    Any failure here ends the run with no side effects.
//! 3. Pages are fetched at `start + i * chunk_size`, written, then announced,
//!    strictly in order. A fetch or write failure ends the loop; a publish
//!    failure is only logged. An empty page means the upstream is exhausted,
//!    and so does a page whose end would not fit in a `u64` offset.
//! 4. The cursor becomes `start + written * chunk_size` and is persisted even
//!    when the loop stopped early, so the next run resumes after the last
//!    durable chunk.

use extractor_common::{PartitionLabel, RunStatus, RunSummary};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    announcer::JobAnnouncer, chunk::ChunkWriter, cursor::CursorStore, fetcher::PageSource,
    lease::LeaseRegistry,
};
use crate::{
    config::ExtractConfig, error::ExtractError, metrics::Metrics, queue::QueueConnector,
    storage::BlobStore,
};

const MISSING_PARAMS: &str = "Missing 'n' or 'date' query parameters";
const BAD_COUNT: &str = "'n' must be a positive integer";

/// Validated trigger parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    /// Upper bound on records requested in this run
    pub n: u64,
    pub label: PartitionLabel,
}

impl ExtractRequest {
    pub fn new(n: u64, label: PartitionLabel) -> Result<Self, ExtractError> {
        if n == 0 {
            return Err(ExtractError::InvalidInput(BAD_COUNT.to_string()));
        }
        Ok(Self { n, label })
    }

    /// Validate raw query values. Missing, non-integer, zero and negative
    /// counts and blank labels are client errors.
    pub fn parse(n: Option<&str>, date: Option<&str>) -> Result<Self, ExtractError> {
        let (Some(n), Some(date)) = (n.filter(|s| !s.is_empty()), date) else {
            return Err(ExtractError::InvalidInput(MISSING_PARAMS.to_string()));
        };

        let label = PartitionLabel::parse(date)
            .map_err(|_| ExtractError::InvalidInput(MISSING_PARAMS.to_string()))?;

        match n.trim().parse::<i64>() {
            Ok(n) if n > 0 => Self::new(n as u64, label),
            _ => Err(ExtractError::InvalidInput(BAD_COUNT.to_string())),
        }
    }
}

/// Owns the collaborators of a run and the success/failure policy
pub struct Extractor {
    config: ExtractConfig,
    store: Arc<dyn BlobStore>,
    queue: Arc<dyn QueueConnector>,
    source: Arc<dyn PageSource>,
    metrics: Arc<Metrics>,
    leases: LeaseRegistry,
}

impl Extractor {
    pub fn new(
        config: ExtractConfig,
        store: Arc<dyn BlobStore>,
        queue: Arc<dyn QueueConnector>,
        source: Arc<dyn PageSource>,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            source,
            metrics: Arc::new(Metrics::new()),
            leases: LeaseRegistry::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn leases(&self) -> &LeaseRegistry {
        &self.leases
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn queue(&self) -> &Arc<dyn QueueConnector> {
        &self.queue
    }

    pub fn cursor(&self) -> CursorStore {
        CursorStore::new(self.store.clone(), self.config.offset_object.clone())
    }

    pub fn chunk_writer(&self) -> ChunkWriter {
        ChunkWriter::new(self.store.clone(), self.config.object_prefix.clone())
    }

    /// Execute one run. Errors only for rejected requests and setup failures;
    /// everything after setup ends in a summary.
    #[instrument(
        skip(self, request),
        fields(run_id = %Uuid::new_v4(), label = %request.label, n = request.n)
    )]
    pub async fn run(&self, request: ExtractRequest) -> Result<RunSummary, ExtractError> {
        let _lease = self
            .leases
            .try_acquire(&request.label)
            .ok_or_else(|| ExtractError::RunInProgress(request.label.to_string()))?;

        let started = Instant::now();

        self.store
            .ensure_ready()
            .await
            .map_err(ExtractError::StorageSetup)?;

        let publisher = self.queue.open().await.map_err(ExtractError::QueueSetup)?;
        let announcer = JobAnnouncer::new(publisher);

        let cursor = self.cursor();
        let starting_offset = cursor.read().await;

        info!(starting_offset, chunk_size = self.config.chunk_size, "Extraction started");

        let files_written = self
            .extract_chunks(&request, starting_offset, &announcer)
            .await;

        // Every written chunk ends at or below u64::MAX.
        let ending_offset = starting_offset
            .saturating_add((files_written as u64).saturating_mul(self.config.chunk_size));

        if let Err(e) = cursor.write(ending_offset).await {
            error!(
                error = %e,
                ending_offset,
                "Failed to persist cursor; the next run will revisit these offsets"
            );
        }

        if let Err(e) = announcer.close().await {
            warn!(error = %e, "Queue publisher did not close cleanly");
        }

        let elapsed = started.elapsed();
        self.metrics.set_last_run_duration(elapsed);

        info!(
            files_written,
            starting_offset,
            ending_offset,
            elapsed_ms = elapsed.as_millis() as u64,
            "Extraction finished"
        );

        Ok(RunSummary {
            status: RunStatus::Success,
            files_written,
            starting_offset,
            ending_offset,
        })
    }

    /// The fetch/write/announce loop. Returns the number of chunks written.
    async fn extract_chunks(
        &self,
        request: &ExtractRequest,
        starting_offset: u64,
        announcer: &JobAnnouncer,
    ) -> usize {
        let chunk_size = self.config.chunk_size;
        let writer = self.chunk_writer();
        let mut written = 0usize;
        let mut requested = 0u64;

        while requested < request.n {
            if requested > 0 && !self.config.pacing_delay.is_zero() {
                tokio::time::sleep(self.config.pacing_delay).await;
            }

            let Some(offset) = starting_offset
                .checked_add(requested)
                .filter(|offset| offset.checked_add(chunk_size).is_some())
            else {
                warn!(starting_offset, requested, "Offset space exhausted, stopping");
                break;
            };

            self.metrics.record_request();
            let page = match self.source.fetch(offset, chunk_size).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(offset, error = %e, "Fetch failed, keeping progress so far");
                    break;
                },
            };

            if page.is_empty() {
                info!(offset, "No more data to fetch");
                break;
            }

            let object_name = match writer.write(&request.label, &page).await {
                Ok(name) => name,
                Err(e) => {
                    warn!(offset, error = %e, "Chunk write failed, keeping progress so far");
                    break;
                },
            };

            written += 1;
            self.metrics.record_rows(page.len() as u64);

            if let Err(e) = announcer.announce(&request.label, &object_name).await {
                error!(
                    object = %object_name,
                    error = %e,
                    "Announcement failed; chunk is stored and can be re-announced"
                );
            }

            requested = requested.saturating_add(chunk_size);
        }

        written
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_valid_input() {
        let request = ExtractRequest::parse(Some("2500"), Some("2024-06-01")).unwrap();
        assert_eq!(request.n, 2500);
        assert_eq!(request.label.as_str(), "2024-06-01");
    }

    #[test]
    fn test_parse_rejects_missing_parameters() {
        for (n, date) in [
            (None, Some("2024-06-01")),
            (Some("10"), None),
            (Some(""), Some("2024-06-01")),
            (Some("10"), Some("")),
            (Some("10"), Some("   ")),
        ] {
            let err = ExtractRequest::parse(n, date).unwrap_err();
            assert_eq!(err.to_string(), MISSING_PARAMS, "n={:?} date={:?}", n, date);
        }
    }

    #[test]
    fn test_parse_rejects_non_positive_counts() {
        for n in ["0", "-5", "ten", "1.5"] {
            let err = ExtractRequest::parse(Some(n), Some("2024-06-01")).unwrap_err();
            assert!(matches!(err, ExtractError::InvalidInput(ref m) if m == BAD_COUNT), "n={}", n);
        }
    }

    #[test]
    fn test_new_rejects_zero() {
        let label = PartitionLabel::parse("2024-06-01").unwrap();
        assert!(ExtractRequest::new(0, label.clone()).is_err());
        assert!(ExtractRequest::new(1, label).is_ok());
    }
}
