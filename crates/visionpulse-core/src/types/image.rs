//! A processed image in the session history

use crate::types::BoundingBox;
use chrono::{DateTime, Utc};

/// One reviewed image in the session history.
///
/// The image payload is a self-contained `data:` URL, so a cached
/// session can be restored without re-fetching anything. The in-memory
/// timestamp is a real instant; string conversion happens only at the
/// storage boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedImage {
    /// Opaque identifier issued by the backend on upload
    pub id: String,

    /// Self-contained image payload (`data:<mime>;base64,...`)
    pub image_src: String,

    /// Detections on this image, in detector order plus appended manual boxes
    pub boxes: Vec<BoundingBox>,

    /// Creation instant
    pub timestamp: DateTime<Utc>,

    /// Original filename, for display
    pub filename: String,

    /// Box index to restore UI focus to when this image is shown again
    pub selected_box_index: Option<usize>,
}

impl CachedImage {
    /// Create a new history entry stamped with the current instant.
    pub fn new(
        id: impl Into<String>,
        image_src: impl Into<String>,
        filename: impl Into<String>,
        boxes: Vec<BoundingBox>,
    ) -> Self {
        Self {
            id: id.into(),
            image_src: image_src.into(),
            boxes,
            timestamp: Utc::now(),
            filename: filename.into(),
            selected_box_index: None,
        }
    }

    /// Number of boxes a reviewer has already looked at.
    pub fn verified_count(&self) -> usize {
        self.boxes.iter().filter(|b| b.is_verified).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_has_no_selection() {
        let image = CachedImage::new("img-1", "data:image/png;base64,AA==", "cat.png", vec![]);
        assert!(image.selected_box_index.is_none());
        assert_eq!(image.verified_count(), 0);
    }

    #[test]
    fn test_verified_count() {
        let mut boxes = vec![
            BoundingBox::new(0.0, 0.0, 1.0, 1.0, 0.9, "cat", 15),
            BoundingBox::new(2.0, 2.0, 3.0, 3.0, 0.8, "dog", 16),
        ];
        boxes[0].verify(true);
        let image = CachedImage::new("img-1", "data:image/png;base64,AA==", "pets.png", boxes);
        assert_eq!(image.verified_count(), 1);
    }
}
