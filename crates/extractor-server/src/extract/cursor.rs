//! Durable resume point for extraction runs
//!
//! The checkpoint is one small text object holding the next unfetched offset
//! in decimal. Anything that is not a clean non-negative integer is treated
//! the same as a missing checkpoint.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::storage::{BlobStore, StorageError};

pub struct CursorStore {
    store: Arc<dyn BlobStore>,
    object: String,
}

impl CursorStore {
    pub fn new(store: Arc<dyn BlobStore>, object: impl Into<String>) -> Self {
        Self {
            store,
            object: object.into(),
        }
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    /// Stored offset, or 0 when absent or unreadable.
    pub async fn read(&self) -> u64 {
        self.read_or(0).await
    }

    /// Stored offset, or `fallback` when absent or unreadable. Never fails.
    #[instrument(skip(self), fields(object = %self.object))]
    pub async fn read_or(&self, fallback: u64) -> u64 {
        match self.peek().await {
            Ok(Some(offset)) => {
                debug!(offset, "Loaded cursor");
                offset
            },
            Ok(None) => {
                debug!(fallback, "No usable cursor stored, starting from fallback");
                fallback
            },
            Err(e) => {
                warn!(error = %e, fallback, "Cursor unreadable, starting from fallback");
                fallback
            },
        }
    }

    /// Strict read: `Ok(None)` for a missing or malformed checkpoint, `Err`
    /// only when the store itself fails.
    pub async fn peek(&self) -> Result<Option<u64>, StorageError> {
        let Some(bytes) = self.store.get(&self.object).await? else {
            return Ok(None);
        };

        let parsed = std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| text.trim().parse::<u64>().ok());

        if parsed.is_none() {
            warn!(object = %self.object, "Stored cursor is not a non-negative integer");
        }

        Ok(parsed)
    }

    /// Replace the checkpoint with a single put.
    #[instrument(skip(self), fields(object = %self.object))]
    pub async fn write(&self, offset: u64) -> Result<(), StorageError> {
        self.store
            .put(&self.object, offset.to_string().into_bytes(), "text/plain")
            .await?;
        debug!(offset, "Cursor persisted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn cursor(store: &MemoryStore) -> CursorStore {
        CursorStore::new(Arc::new(store.clone()), "last_offset.txt")
    }

    #[tokio::test]
    async fn test_missing_cursor_uses_fallback() {
        let store = MemoryStore::new();
        assert_eq!(cursor(&store).read().await, 0);
        assert_eq!(cursor(&store).read_or(42).await, 42);
    }

    #[tokio::test]
    async fn test_corrupt_cursor_treated_as_absent() {
        let store = MemoryStore::new();
        for junk in ["", "abc", "-5", "12.5", "3000x"] {
            store.insert("last_offset.txt", junk).await;
            assert_eq!(cursor(&store).read_or(7).await, 7, "value {:?}", junk);
        }
        store.insert("last_offset.txt", vec![0xff, 0xfe]).await;
        assert_eq!(cursor(&store).read().await, 0);
    }

    #[tokio::test]
    async fn test_write_then_read_with_whitespace() {
        let store = MemoryStore::new();
        let cursor = cursor(&store);
        cursor.write(3000).await.unwrap();
        assert_eq!(cursor.read().await, 3000);

        store.insert("last_offset.txt", "  4000\n").await;
        assert_eq!(cursor.read().await, 4000);
    }

    #[tokio::test]
    async fn test_written_value_is_plain_decimal() {
        let store = MemoryStore::new();
        cursor(&store).write(2000).await.unwrap();

        let object = store.object("last_offset.txt").await.unwrap();
        assert_eq!(object.data, b"2000");
        assert_eq!(object.content_type, "text/plain");
    }
}
