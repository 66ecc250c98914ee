//! Primary storage tier: structured JSON documents on disk
//!
//! Stores each record as a pretty-printed JSON file under a base
//! directory. Every call stands alone: the directory is re-checked and
//! the file re-read each time, so the tier self-heals when availability
//! changes between calls.

use super::{SessionStore, StoreError, StoreResult};
use crate::cache::SessionRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// High-capacity structured store, one JSON document per key.
#[derive(Debug)]
pub struct DocumentStore {
    /// Base directory for record files
    base_dir: PathBuf,
    /// Maximum serialized record size in bytes
    quota_bytes: usize,
}

impl DocumentStore {
    pub fn new(base_dir: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        Self {
            base_dir: base_dir.into(),
            quota_bytes,
        }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }

    async fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot open {}: {}", self.base_dir.display(), e))
        })
    }
}

#[async_trait]
impl SessionStore for DocumentStore {
    fn name(&self) -> &'static str {
        "document"
    }

    async fn put(&self, key: &str, record: &SessionRecord) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(record)?;
        if content.len() > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                size: content.len(),
                quota: self.quota_bytes,
            });
        }

        self.ensure_dir().await?;
        let path = self.record_path(key);
        fs::write(&path, content).await?;
        debug!("saved session record {} to {}", key, path.display());

        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<SessionRecord>> {
        let path = self.record_path(key);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                // Corrupt document: remove it and report a miss
                warn!("removing corrupt session document {}: {}", path.display(), e);
                let _ = fs::remove_file(&path).await;
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.record_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("deleted session record {} at {}", key, path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, CachedImage};
    use tempfile::TempDir;

    fn sample_record(n: usize) -> SessionRecord {
        let images: Vec<CachedImage> = (0..n)
            .map(|i| {
                CachedImage::new(
                    format!("img-{i}"),
                    "data:image/png;base64,AA==",
                    format!("photo-{i}.png"),
                    vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0.9, "person", 0)],
                )
            })
            .collect();
        SessionRecord::new("sess-1", &images)
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path(), 1024 * 1024);

        assert!(store.get("current").await.unwrap().is_none());

        let record = sample_record(2);
        store.put("current", &record).await.unwrap();
        assert_eq!(store.get("current").await.unwrap(), Some(record));

        store.delete("current").await.unwrap();
        assert!(store.get("current").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path(), 1024 * 1024);
        store.delete("current").await.unwrap();
        store.delete("current").await.unwrap();
    }

    #[tokio::test]
    async fn test_quota_rejects_oversized_record() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path(), 64);

        let result = store.put("current", &sample_record(3)).await;
        assert!(matches!(result, Err(StoreError::QuotaExceeded { .. })));
        // Nothing was written
        assert!(store.get("current").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_miss() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path(), 1024 * 1024);

        std::fs::write(temp.path().join("current.json"), "{not json").unwrap();
        assert!(store.get("current").await.unwrap().is_none());
        // The corrupt file was removed
        assert!(!temp.path().join("current.json").exists());
    }
}
