//! Two-tier store: primary first, transparent fallback
//!
//! A decorator over two [`SessionStore`] implementations. Selection is
//! stateless and re-evaluated on every call, so a tier that failed once
//! (quota pressure, directory trouble) is retried on the next call.

use super::{SessionStore, StoreResult};
use crate::cache::SessionRecord;
use tracing::warn;

/// Tries the primary tier, falling back to the secondary on failure.
pub struct TieredStore {
    primary: Box<dyn SessionStore>,
    fallback: Box<dyn SessionStore>,
}

impl TieredStore {
    pub fn new(primary: Box<dyn SessionStore>, fallback: Box<dyn SessionStore>) -> Self {
        Self { primary, fallback }
    }

    /// Store the record, preferring the primary tier. The caller never
    /// learns which tier held the write; only both tiers failing
    /// surfaces an error.
    pub async fn put(&self, key: &str, record: &SessionRecord) -> StoreResult<()> {
        match self.primary.put(key, record).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    tier = self.primary.name(),
                    "primary put failed, using fallback: {e}"
                );
                self.fallback.put(key, record).await
            }
        }
    }

    /// Read the record. Exactly one tier's value is authoritative per
    /// call; values are never merged across tiers.
    pub async fn get(&self, key: &str) -> StoreResult<Option<SessionRecord>> {
        match self.primary.get(key).await {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => self.fallback.get(key).await,
            Err(e) => {
                warn!(
                    tier = self.primary.name(),
                    "primary get failed, using fallback: {e}"
                );
                self.fallback.get(key).await
            }
        }
    }

    /// Delete from both tiers unconditionally, so no stale fallback
    /// copy survives a reset. Absence is not an error; both tiers are
    /// always attempted before any failure is reported.
    pub async fn delete(&self, key: &str) -> StoreResult<()> {
        let primary = self.primary.delete(key).await;
        let fallback = self.fallback.delete(key).await;
        if let Err(e) = &primary {
            warn!(tier = self.primary.name(), "primary delete failed: {e}");
        }
        primary.and(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CompactStore, DocumentStore, StoreError};
    use crate::types::CachedImage;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// A tier that is never available.
    struct DownStore;

    #[async_trait]
    impl SessionStore for DownStore {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn put(&self, _key: &str, _record: &SessionRecord) -> StoreResult<()> {
            Err(StoreError::Unavailable("backend disabled".to_string()))
        }

        async fn get(&self, _key: &str) -> StoreResult<Option<SessionRecord>> {
            Err(StoreError::Unavailable("backend disabled".to_string()))
        }

        async fn delete(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("backend disabled".to_string()))
        }
    }

    fn sample_record() -> SessionRecord {
        let image = CachedImage::new("img-0", "data:image/png;base64,AA==", "cat.png", vec![]);
        SessionRecord::new("sess-1", &[image])
    }

    #[tokio::test]
    async fn test_put_prefers_primary() {
        let temp = TempDir::new().unwrap();
        let primary = DocumentStore::new(temp.path().join("records"), 1024 * 1024);
        let fallback = CompactStore::new(temp.path().join("fallback.json"), 1024 * 1024);
        let store = TieredStore::new(Box::new(primary), Box::new(fallback));

        store.put("current", &sample_record()).await.unwrap();

        // Landed on the primary tier, not the fallback
        let primary = DocumentStore::new(temp.path().join("records"), 1024 * 1024);
        assert!(primary.get("current").await.unwrap().is_some());
        let fallback = CompactStore::new(temp.path().join("fallback.json"), 1024 * 1024);
        assert!(fallback.get("current").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_falls_back_when_primary_down() {
        let temp = TempDir::new().unwrap();
        let fallback = CompactStore::new(temp.path().join("fallback.json"), 1024 * 1024);
        let store = TieredStore::new(Box::new(DownStore), Box::new(fallback));

        let record = sample_record();
        store.put("current", &record).await.unwrap();
        assert_eq!(store.get("current").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_both_tiers_failing_propagates() {
        let store = TieredStore::new(Box::new(DownStore), Box::new(DownStore));
        assert!(store.put("current", &sample_record()).await.is_err());
        assert!(store.get("current").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_clears_both_tiers() {
        let temp = TempDir::new().unwrap();
        let primary = DocumentStore::new(temp.path().join("records"), 1024 * 1024);
        let fallback = CompactStore::new(temp.path().join("fallback.json"), 1024 * 1024);

        // Seed both tiers directly
        let record = sample_record();
        primary.put("current", &record).await.unwrap();
        fallback.put("current", &record).await.unwrap();

        let store = TieredStore::new(Box::new(primary), Box::new(fallback));
        store.delete("current").await.unwrap();

        let primary = DocumentStore::new(temp.path().join("records"), 1024 * 1024);
        assert!(primary.get("current").await.unwrap().is_none());
        let fallback = CompactStore::new(temp.path().join("fallback.json"), 1024 * 1024);
        assert!(fallback.get("current").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_attempts_fallback_even_when_primary_fails() {
        let temp = TempDir::new().unwrap();
        let fallback = CompactStore::new(temp.path().join("fallback.json"), 1024 * 1024);
        fallback.put("current", &sample_record()).await.unwrap();

        let store = TieredStore::new(Box::new(DownStore), Box::new(fallback));
        // Primary reports failure, but the fallback copy must be gone
        assert!(store.delete("current").await.is_err());

        let fallback = CompactStore::new(temp.path().join("fallback.json"), 1024 * 1024);
        assert!(fallback.get("current").await.unwrap().is_none());
    }
}
