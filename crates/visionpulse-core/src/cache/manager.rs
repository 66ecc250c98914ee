//! Session cache manager: capacity, freshness, and fallback policy

use super::record::{SCHEMA_VERSION, SessionRecord};
use crate::storage::{CompactStore, DocumentStore, StoreError, StoreResult, TieredStore};
use crate::types::CachedImage;
use chrono::{Duration, Utc};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Fixed logical key: one cached session per profile.
pub(crate) const SESSION_KEY: &str = "current_session";

/// Numeric policy for the session cache.
///
/// The shrinking caps (200, 20, 10) reflect the fallback tier's quota
/// being roughly an order of magnitude smaller than the primary's; they
/// are applied reactively, after a quota rejection, never predictively.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Hard cap on cached images after every save
    pub max_images: usize,
    /// Reduced cap when a tier rejects the payload
    pub fallback_images: usize,
    /// Last-resort cap before the save is abandoned
    pub minimum_images: usize,
    /// Records older than this are treated as absent on load
    pub max_age: Duration,
    /// Primary tier quota in bytes
    pub primary_quota_bytes: usize,
    /// Fallback tier per-value limit in bytes
    pub fallback_quota_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_images: 200,
            fallback_images: 20,
            minimum_images: 10,
            max_age: Duration::hours(24),
            primary_quota_bytes: 64 * 1024 * 1024,
            fallback_quota_bytes: 5 * 1024 * 1024,
        }
    }
}

/// A cached session restored at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSession {
    pub session_id: String,
    pub images: Vec<CachedImage>,
}

/// Translates between domain objects and the persisted record, and
/// owns the capacity/freshness policy. All operations are best-effort:
/// a persistence failure is logged, never raised to the caller.
pub struct SessionCacheManager {
    store: TieredStore,
    config: CacheConfig,
}

impl SessionCacheManager {
    pub fn new(store: TieredStore, config: CacheConfig) -> Self {
        Self { store, config }
    }

    /// Manager over the default on-disk location (`~/.visionpulse/cache`).
    pub fn open_default(config: CacheConfig) -> StoreResult<Self> {
        let base_dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Unavailable("home directory not available".to_string()))?
            .join(".visionpulse")
            .join("cache");
        Ok(Self::at_path(base_dir, config))
    }

    /// Manager with both tiers rooted under `base_dir`.
    pub fn at_path(base_dir: PathBuf, config: CacheConfig) -> Self {
        let primary = DocumentStore::new(base_dir.join("records"), config.primary_quota_bytes);
        let fallback = CompactStore::new(base_dir.join("fallback.json"), config.fallback_quota_bytes);
        Self::new(
            TieredStore::new(Box::new(primary), Box::new(fallback)),
            config,
        )
    }

    /// Persist the session. Never fails the caller: above `max_images`
    /// the oldest images are silently dropped, quota pressure shrinks
    /// the payload through the cap sequence, and anything else is
    /// logged and abandoned (the next successful save heals state).
    pub async fn save(&self, session_id: &str, images: &[CachedImage]) {
        let caps = [
            self.config.max_images,
            self.config.fallback_images,
            self.config.minimum_images,
        ];

        for (attempt, cap) in caps.iter().enumerate() {
            let recent = most_recent(images, *cap);
            let record = SessionRecord::new(session_id, recent);

            match self.store.put(SESSION_KEY, &record).await {
                Ok(()) => {
                    if images.len() > *cap {
                        debug!(
                            kept = recent.len(),
                            dropped = images.len() - recent.len(),
                            "pruned session history on save"
                        );
                    }
                    debug!(images = record.images.len(), "session cache saved");
                    return;
                }
                Err(StoreError::QuotaExceeded { size, quota }) if attempt + 1 < caps.len() => {
                    info!(
                        size,
                        quota,
                        next_cap = caps[attempt + 1],
                        "session record over quota, retrying with fewer images"
                    );
                }
                Err(e) => {
                    warn!("session cache save failed: {e}");
                    return;
                }
            }
        }
    }

    /// Restore the cached session, if a fresh valid one exists.
    ///
    /// Expired and malformed records are both treated as a cache miss;
    /// an expired record additionally clears every tier so it is never
    /// seen again (lazy expiry, no background timer).
    pub async fn load(&self) -> Option<RestoredSession> {
        let record = match self.store.get(SESSION_KEY).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!("session cache load failed: {e}");
                return None;
            }
        };

        if record.version != SCHEMA_VERSION {
            warn!(
                version = record.version,
                "ignoring session record with unknown schema version"
            );
            return None;
        }

        let age = record.age(Utc::now());
        if age > self.config.max_age {
            info!(hours = age.num_hours(), "cached session expired, clearing");
            self.clear().await;
            return None;
        }

        let mut images = Vec::with_capacity(record.images.len());
        for stored in record.images {
            match stored.into_cached_image() {
                Ok(image) => images.push(image),
                Err(e) => {
                    warn!("discarding malformed session record: {e}");
                    return None;
                }
            }
        }

        debug!(
            images = images.len(),
            "restored cached session {}", record.session_id
        );
        Some(RestoredSession {
            session_id: record.session_id,
            images,
        })
    }

    /// Remove the cached session from every tier. Idempotent.
    pub async fn clear(&self) {
        if let Err(e) = self.store.delete(SESSION_KEY).await {
            warn!("session cache clear failed: {e}");
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

/// The most recent `cap` images, in original relative order.
fn most_recent(images: &[CachedImage], cap: usize) -> &[CachedImage] {
    if images.len() > cap {
        &images[images.len() - cap..]
    } else {
        images
    }
}
