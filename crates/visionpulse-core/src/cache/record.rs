//! Persisted record shape (schema version 1)
//!
//! Instants live as `DateTime<Utc>` in memory; conversion to sortable
//! RFC 3339 strings happens only here, at the storage boundary.

use crate::types::{BoundingBox, CachedImage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema tag written into every record.
pub const SCHEMA_VERSION: u32 = 1;

/// Serialized form of [`CachedImage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCachedImage {
    pub id: String,
    pub image_src: String,
    pub boxes: Vec<BoundingBox>,
    /// Creation instant as an RFC 3339 string
    pub timestamp: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_box_index: Option<usize>,
}

impl From<&CachedImage> for StoredCachedImage {
    fn from(image: &CachedImage) -> Self {
        Self {
            id: image.id.clone(),
            image_src: image.image_src.clone(),
            boxes: image.boxes.clone(),
            timestamp: image.timestamp.to_rfc3339(),
            filename: image.filename.clone(),
            selected_box_index: image.selected_box_index,
        }
    }
}

impl StoredCachedImage {
    /// Decode back into the domain entity. Fails when the stored
    /// timestamp is not a valid RFC 3339 instant.
    pub fn into_cached_image(self) -> Result<CachedImage, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)?.with_timezone(&Utc);
        Ok(CachedImage {
            id: self.id,
            image_src: self.image_src,
            boxes: self.boxes,
            timestamp,
            filename: self.filename,
            selected_box_index: self.selected_box_index,
        })
    }
}

/// The single persisted aggregate for a review session.
///
/// `images` is append-order history; the cache layer never reorders or
/// filters it beyond the documented capacity pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub images: Vec<StoredCachedImage>,
    /// Instant of the last write
    pub saved_at: DateTime<Utc>,
    pub version: u32,
}

impl SessionRecord {
    /// Build a record from `images`, stamped with the current instant.
    pub fn new(session_id: impl Into<String>, images: &[CachedImage]) -> Self {
        Self {
            session_id: session_id.into(),
            images: images.iter().map(StoredCachedImage::from).collect(),
            saved_at: Utc::now(),
            version: SCHEMA_VERSION,
        }
    }

    /// Age of the record relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.saved_at
    }
}
