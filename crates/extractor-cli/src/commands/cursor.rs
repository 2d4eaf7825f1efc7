//! `extractor cursor` command implementation
//!
//! Manual inspection and repair of the resume point.

use anyhow::{Context, Result};
use extractor_server::extract::CursorStore;
use tracing::warn;

/// Current stored value. `None` when missing or not a valid offset.
pub async fn show(cursor: &CursorStore) -> Result<Option<u64>> {
    cursor
        .peek()
        .await
        .with_context(|| format!("Failed to read cursor object '{}'", cursor.object()))
}

/// Overwrite the cursor. Returns the previous value if there was one.
pub async fn set(cursor: &CursorStore, offset: u64) -> Result<Option<u64>> {
    let previous = show(cursor).await?;
    cursor
        .write(offset)
        .await
        .with_context(|| format!("Failed to write cursor object '{}'", cursor.object()))?;

    warn!(?previous, offset, "Cursor overwritten by hand");
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use extractor_server::storage::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_show_and_set() {
        let store = MemoryStore::new();
        let cursor = CursorStore::new(Arc::new(store.clone()), "last_offset.txt");

        assert_eq!(show(&cursor).await.unwrap(), None);
        assert_eq!(set(&cursor, 2000).await.unwrap(), None);
        assert_eq!(show(&cursor).await.unwrap(), Some(2000));
        assert_eq!(set(&cursor, 0).await.unwrap(), Some(2000));
        assert_eq!(cursor.read().await, 0);
    }

    #[tokio::test]
    async fn test_corrupt_cursor_shows_as_none() {
        let store = MemoryStore::new();
        store.insert("last_offset.txt", "garbage").await;
        let cursor = CursorStore::new(Arc::new(store), "last_offset.txt");

        assert_eq!(show(&cursor).await.unwrap(), None);
    }
}
