//! Session cache and review state for VisionPulse
//!
//! This crate provides the persistence layer for an object-detection
//! review session:
//! - Domain types for reviewed images and their bounding boxes
//! - A tiered storage layer (structured primary backend with a
//!   string-serialized low-quota fallback)
//! - A session cache manager enforcing capacity and freshness policy
//! - An in-memory session coordinator with debounced write-back

pub mod cache;
pub mod metrics;
pub mod session;
pub mod storage;
pub mod types;

pub use cache::{
    CacheConfig, RestoredSession, SCHEMA_VERSION, SessionCacheManager, SessionRecord,
    StoredCachedImage,
};
pub use metrics::{InferenceMetrics, TrueMetrics, true_metrics};
pub use session::SessionCoordinator;
pub use storage::{
    CompactStore, DocumentStore, SessionStore, StoreError, StoreResult, TieredStore,
};
pub use types::{BoundingBox, CachedImage};
