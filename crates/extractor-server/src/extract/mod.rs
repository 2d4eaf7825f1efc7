//! Incremental extraction of a paged upstream dataset
//!
//! # Modules
//!
//! - [`fetcher`] - page retrieval from the upstream API
//! - [`chunk`] - chunk object naming and persistence
//! - [`cursor`] - the durable resume point
//! - [`announcer`] - job messages for the cleaning stage
//! - [`lease`] - one run per partition label at a time
//! - [`orchestrator`] - the run loop tying everything together
//! - [`reconcile`] - re-announcing chunks that were never picked up

pub mod announcer;
pub mod chunk;
pub mod cursor;
pub mod fetcher;
pub mod lease;
pub mod models;
pub mod orchestrator;
pub mod reconcile;

pub use announcer::JobAnnouncer;
pub use chunk::ChunkWriter;
pub use cursor::CursorStore;
pub use fetcher::{FetchError, HttpPageFetcher, PageSource};
pub use lease::{LeaseRegistry, PartitionLease};
pub use models::{Page, Record};
pub use orchestrator::{ExtractRequest, Extractor};
pub use reconcile::{reannounce, ReannounceReport, ReconcileError};

use anyhow::Context;
use std::sync::Arc;

use crate::{config::Config, queue::AmqpConnector, storage::S3Store};

/// Wire the production collaborators (S3, AMQP, HTTP) into an [`Extractor`].
pub fn build_extractor(config: &Config) -> anyhow::Result<Extractor> {
    let store = S3Store::new(config.storage.clone());
    let queue = AmqpConnector::new(&config.queue);
    let source =
        HttpPageFetcher::new(&config.extract).context("Failed to build upstream HTTP client")?;

    Ok(Extractor::new(
        config.extract.clone(),
        Arc::new(store),
        Arc::new(queue),
        Arc::new(source),
    ))
}
