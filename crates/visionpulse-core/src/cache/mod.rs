//! Session cache: serialization contract, capacity and freshness policy
//!
//! The manager translates between domain objects and the persisted
//! record, prunes to the configured image caps, applies the lazy 24h
//! expiry, and orchestrates the tiered store. Persistence is
//! best-effort: a failed save degrades to "no durability this time" and
//! never interrupts the caller.

mod manager;
mod record;


pub use manager::{CacheConfig, RestoredSession, SessionCacheManager};
pub use record::{SCHEMA_VERSION, SessionRecord, StoredCachedImage};
