//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function that returns what
//! it did, so `main` only decides how to print it.

pub mod cursor;
pub mod reannounce;
pub mod run;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use extractor_common::PartitionLabel;

/// `date` when given, otherwise `today` as `YYYY-MM-DD`.
pub fn resolve_label(date: Option<&str>, today: NaiveDate) -> Result<PartitionLabel> {
    match date {
        Some(raw) => PartitionLabel::parse(raw).context("Invalid --date"),
        None => Ok(PartitionLabel::parse(&today.format("%Y-%m-%d").to_string())?),
    }
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use extractor_server::{
        config::ExtractConfig,
        extract::{Extractor, FetchError, Page, PageSource, Record},
        queue::MemoryQueue,
        storage::MemoryStore,
    };
    use serde_json::json;
    use std::{sync::Arc, time::Duration};

    /// Upstream with `total` numbered rows.
    pub struct FixedDataset {
        pub total: u64,
    }

    #[async_trait]
    impl PageSource for FixedDataset {
        async fn fetch(&self, base_offset: u64, limit: u64) -> Result<Page, FetchError> {
            let end = (base_offset + limit).min(self.total);
            let records = (base_offset..end)
                .map(|i| serde_json::from_value::<Record>(json!({ "row": i })))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| FetchError::Decode {
                    offset: base_offset,
                    source,
                })?;
            Ok(Page::new(base_offset, records))
        }
    }

    pub fn extractor(total: u64, store: &MemoryStore, queue: &MemoryQueue) -> Extractor {
        let config = ExtractConfig {
            chunk_size: 100,
            pacing_delay: Duration::ZERO,
            ..ExtractConfig::default()
        };
        Extractor::new(
            config,
            Arc::new(store.clone()),
            Arc::new(queue.clone()),
            Arc::new(FixedDataset { total }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_label_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(resolve_label(None, today).unwrap().as_str(), "2024-06-01");
        assert_eq!(
            resolve_label(Some("2023-12-31"), today).unwrap().as_str(),
            "2023-12-31"
        );
        assert!(resolve_label(Some("  "), today).is_err());
    }
}
