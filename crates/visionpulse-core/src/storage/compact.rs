//! Fallback storage tier: a single string-table file
//!
//! Models a low-quota string-only store: every record is held as one
//! compact serialized string inside a single JSON table file, with a
//! hard per-value byte limit. An order of magnitude smaller than the
//! document tier, so it cannot hold large embedded payloads at scale.

use super::{SessionStore, StoreError, StoreResult};
use crate::cache::SessionRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

type StringTable = HashMap<String, String>;

/// Low-capacity string store with a per-value size limit.
#[derive(Debug)]
pub struct CompactStore {
    /// Path of the table file
    file_path: PathBuf,
    /// Maximum serialized record size in bytes
    max_value_bytes: usize,
}

impl CompactStore {
    pub fn new(file_path: impl Into<PathBuf>, max_value_bytes: usize) -> Self {
        Self {
            file_path: file_path.into(),
            max_value_bytes,
        }
    }

    async fn read_table(&self) -> StoreResult<StringTable> {
        let content = match fs::read_to_string(&self.file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StringTable::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(table) => Ok(table),
            Err(e) => {
                // A corrupt table loses everything it held; start fresh
                warn!(
                    "resetting corrupt fallback table {}: {}",
                    self.file_path.display(),
                    e
                );
                Ok(StringTable::new())
            }
        }
    }

    async fn write_table(&self, table: &StringTable) -> StoreResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Unavailable(format!("cannot open {}: {}", parent.display(), e))
            })?;
        }
        fs::write(&self.file_path, serde_json::to_string(table)?).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for CompactStore {
    fn name(&self) -> &'static str {
        "compact"
    }

    async fn put(&self, key: &str, record: &SessionRecord) -> StoreResult<()> {
        let value = serde_json::to_string(record)?;
        if value.len() > self.max_value_bytes {
            return Err(StoreError::QuotaExceeded {
                size: value.len(),
                quota: self.max_value_bytes,
            });
        }

        let mut table = self.read_table().await?;
        table.insert(key.to_string(), value);
        self.write_table(&table).await?;
        debug!("saved session record {} to fallback tier", key);

        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<SessionRecord>> {
        let table = self.read_table().await?;
        let Some(value) = table.get(key) else {
            return Ok(None);
        };

        match serde_json::from_str(value) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("ignoring corrupt fallback record {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut table = self.read_table().await?;
        if table.remove(key).is_some() {
            self.write_table(&table).await?;
            debug!("deleted session record {} from fallback tier", key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CachedImage;
    use tempfile::TempDir;

    fn record_with_payload(payload_len: usize) -> SessionRecord {
        let image = CachedImage::new(
            "img-0",
            format!("data:image/png;base64,{}", "A".repeat(payload_len)),
            "big.png",
            vec![],
        );
        SessionRecord::new("sess-1", &[image])
    }

    #[tokio::test]
    async fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = CompactStore::new(temp.path().join("fallback.json"), 1024 * 1024);

        let record = record_with_payload(16);
        store.put("current", &record).await.unwrap();
        assert_eq!(store.get("current").await.unwrap(), Some(record));

        store.delete("current").await.unwrap();
        assert!(store.get("current").await.unwrap().is_none());
        // Idempotent
        store.delete("current").await.unwrap();
    }

    #[tokio::test]
    async fn test_per_value_limit() {
        let temp = TempDir::new().unwrap();
        let store = CompactStore::new(temp.path().join("fallback.json"), 512);

        let result = store.put("current", &record_with_payload(4096)).await;
        assert!(matches!(result, Err(StoreError::QuotaExceeded { .. })));
    }

    #[tokio::test]
    async fn test_corrupt_table_is_reset() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fallback.json");
        std::fs::write(&path, "garbage").unwrap();

        let store = CompactStore::new(&path, 1024 * 1024);
        assert!(store.get("current").await.unwrap().is_none());

        // Still writable afterwards
        let record = record_with_payload(8);
        store.put("current", &record).await.unwrap();
        assert_eq!(store.get("current").await.unwrap(), Some(record));
    }
}
