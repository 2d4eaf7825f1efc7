//! Shared fixtures for extractor integration tests
//!
//! Everything runs against in-memory storage and queue doubles plus a
//! deterministic upstream dataset, so no external services are needed.

#![allow(dead_code)]

use async_trait::async_trait;
use extractor_common::{JobMessage, PartitionLabel};
use extractor_server::{
    config::ExtractConfig,
    extract::{Extractor, FetchError, Page, PageSource, Record},
    queue::MemoryQueue,
    storage::MemoryStore,
};
use reqwest::StatusCode;
use serde_json::json;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

pub const LABEL: &str = "2024-06-01";

/// Upstream with `total` rows numbered from 0. Offsets listed in `failing`
/// answer with HTTP 503.
#[derive(Debug, Default)]
pub struct Dataset {
    total: u64,
    failing: Mutex<HashSet<u64>>,
    requests: Mutex<Vec<(u64, u64)>>,
}

impl Dataset {
    pub fn new(total: u64) -> Arc<Self> {
        Arc::new(Self {
            total,
            ..Self::default()
        })
    }

    pub fn fail_at(&self, offset: u64) {
        self.failing.lock().unwrap().insert(offset);
    }

    /// `(offset, limit)` of every fetch, in order
    pub fn requests(&self) -> Vec<(u64, u64)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_offsets(&self) -> Vec<u64> {
        self.requests().into_iter().map(|(offset, _)| offset).collect()
    }
}

pub fn row(i: u64) -> Record {
    serde_json::from_value(json!({
        "inspection_id": i.to_string(),
        "dba_name": format!("Restaurant {}", i),
        "results": if i % 3 == 0 { "Fail" } else { "Pass" },
    }))
    .unwrap()
}

#[async_trait]
impl PageSource for Dataset {
    async fn fetch(&self, base_offset: u64, limit: u64) -> Result<Page, FetchError> {
        self.requests.lock().unwrap().push((base_offset, limit));

        if self.failing.lock().unwrap().contains(&base_offset) {
            return Err(FetchError::Status {
                offset: base_offset,
                status: StatusCode::SERVICE_UNAVAILABLE,
            });
        }

        let end = base_offset.saturating_add(limit).min(self.total);
        let records = (base_offset..end).map(row).collect();
        Ok(Page::new(base_offset, records))
    }
}

pub fn extract_config(chunk_size: u64) -> ExtractConfig {
    ExtractConfig {
        chunk_size,
        pacing_delay: Duration::ZERO,
        ..ExtractConfig::default()
    }
}

/// An extractor wired to in-memory doubles that the test keeps handles to
pub struct Harness {
    pub store: MemoryStore,
    pub queue: MemoryQueue,
    pub dataset: Arc<Dataset>,
    pub extractor: Extractor,
}

impl Harness {
    pub fn new(total: u64, chunk_size: u64) -> Self {
        Self::with_config(total, extract_config(chunk_size))
    }

    pub fn with_config(total: u64, config: ExtractConfig) -> Self {
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        let dataset = Dataset::new(total);
        let extractor = Extractor::new(
            config,
            Arc::new(store.clone()),
            Arc::new(queue.clone()),
            dataset.clone(),
        );
        Self {
            store,
            queue,
            dataset,
            extractor,
        }
    }

    pub async fn chunk_keys(&self) -> Vec<String> {
        self.store
            .keys()
            .await
            .into_iter()
            .filter(|k| k.ends_with(".json"))
            .collect()
    }

    pub async fn cursor_value(&self) -> Option<u64> {
        self.extractor.cursor().peek().await.unwrap()
    }

    pub fn announced(&self) -> Vec<JobMessage> {
        self.queue
            .messages()
            .iter()
            .map(|body| JobMessage::from_slice(body).unwrap())
            .collect()
    }
}

pub fn label(raw: &str) -> PartitionLabel {
    PartitionLabel::parse(raw).unwrap()
}

pub fn chunk_name(label: &str, offset: u64) -> String {
    format!("{}/food_inspections_raw_offset_{:05}.json", label, offset)
}
