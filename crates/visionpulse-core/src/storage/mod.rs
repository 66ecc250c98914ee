//! Tiered storage backends for the session record
//!
//! Two physically different tiers hide behind one trait: a structured
//! high-quota document store (primary) and a string-serialized
//! low-quota store (fallback). [`TieredStore`] wraps them so callers
//! never learn which tier served an operation.

mod compact;
mod document;
mod tiered;

pub use compact::CompactStore;
pub use document::DocumentStore;
pub use tiered::TieredStore;

use crate::cache::SessionRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be opened at all (missing directory,
    /// permissions, no home dir)
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// The record does not fit within the backend's capacity
    #[error("record of {size} bytes exceeds backend quota of {quota} bytes")]
    QuotaExceeded { size: usize, quota: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One storage tier holding at most one session record per key.
///
/// Implementations re-evaluate availability on every call (no cached
/// open handles), treat deleting an absent key as success, and treat a
/// corrupt stored value as a miss rather than a hard failure.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Short backend name used in log output
    fn name(&self) -> &'static str;

    /// Store the record under `key`, replacing any previous value.
    async fn put(&self, key: &str, record: &SessionRecord) -> StoreResult<()>;

    /// Fetch the record stored under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<SessionRecord>>;

    /// Remove the record stored under `key`. Absence is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}
