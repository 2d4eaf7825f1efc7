//! Page retrieval from the upstream tabular API
//!
//! The upstream speaks Socrata-style paging: `?$limit=<n>&$offset=<k>` returns
//! a JSON array of row objects. An empty array means there is nothing left.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use super::models::{Page, Record};
use crate::config::ExtractConfig;

/// Every variant is transient from the run's point of view: the loop stops and
/// keeps what it already wrote.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request for offset {offset} failed: {source}")]
    Request {
        offset: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error("Upstream returned HTTP {status} for offset {offset}")]
    Status { offset: u64, status: StatusCode },

    #[error("Failed to decode page at offset {offset}: {source}")]
    Decode {
        offset: u64,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch up to `limit` records starting at `base_offset`.
    async fn fetch(&self, base_offset: u64, limit: u64) -> Result<Page, FetchError>;
}

/// reqwest-backed [`PageSource`]
pub struct HttpPageFetcher {
    client: Client,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(config: &ExtractConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("extractor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    #[instrument(skip(self), fields(url = %self.base_url))]
    async fn fetch(&self, base_offset: u64, limit: u64) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("$limit", limit), ("$offset", base_offset)])
            .send()
            .await
            .map_err(|source| FetchError::Request {
                offset: base_offset,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                offset: base_offset,
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Request {
            offset: base_offset,
            source,
        })?;

        let records: Vec<Record> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                offset: base_offset,
                source,
            })?;

        debug!(records = records.len(), bytes = body.len(), "Fetched page");

        Ok(Page::new(base_offset, records))
    }
}
