//! Bounding box with ground-truth review state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// One detection with its review state.
///
/// The cache round-trips this structure losslessly and performs no
/// interpretation of the geometry. Field names match the backend wire
/// format; unknown wire fields are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge in image pixels
    pub x1: f64,
    /// Top edge in image pixels
    pub y1: f64,
    /// Right edge in image pixels
    pub x2: f64,
    /// Bottom edge in image pixels
    pub y2: f64,

    /// Detector confidence in [0, 1]; 1.0 for manually drawn boxes
    pub confidence: f64,

    /// Class label (e.g. "person")
    pub label: String,

    /// Numeric class id from the detector
    pub class_id: i64,

    /// Unique identifier assigned by the backend (`{image_id}_box_{idx}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_id: Option<String>,

    /// Whether a reviewer has looked at this box
    #[serde(default)]
    pub is_verified: bool,

    /// True positive (the default assumption) or false positive
    #[serde(default = "default_true")]
    pub is_correct: bool,

    /// Drawn by hand during review; represents a recovered miss
    #[serde(default)]
    pub is_manual: bool,

    /// When the box was verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,

    /// Free-form reviewer notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BoundingBox {
    /// Create a detector-produced box, unverified and assumed correct.
    pub fn new(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        confidence: f64,
        label: impl Into<String>,
        class_id: i64,
    ) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            label: label.into(),
            class_id,
            box_id: None,
            is_verified: false,
            is_correct: true,
            is_manual: false,
            verified_at: None,
            notes: None,
        }
    }

    /// Create a manually drawn box. Manual boxes carry full confidence
    /// and count as recovered false negatives until verified.
    pub fn manual(x1: f64, y1: f64, x2: f64, y2: f64, label: impl Into<String>) -> Self {
        Self {
            is_manual: true,
            ..Self::new(x1, y1, x2, y2, 1.0, label, -1)
        }
    }

    /// Record a review decision for this box.
    pub fn verify(&mut self, is_correct: bool) {
        self.is_verified = true;
        self.is_correct = is_correct;
        self.verified_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_defaults() {
        // Minimal backend payload: review fields absent
        let json = r#"{
            "x1": 10.0, "y1": 20.0, "x2": 110.0, "y2": 220.0,
            "confidence": 0.91, "label": "person", "class_id": 0,
            "extra_frontend_field": true
        }"#;
        let bbox: BoundingBox = serde_json::from_str(json).unwrap();
        assert!(!bbox.is_verified);
        assert!(bbox.is_correct);
        assert!(!bbox.is_manual);
        assert!(bbox.box_id.is_none());
    }

    #[test]
    fn test_verify_marks_box() {
        let mut bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0, 0.5, "car", 2);
        bbox.verify(false);
        assert!(bbox.is_verified);
        assert!(!bbox.is_correct);
        assert!(bbox.verified_at.is_some());
    }

    #[test]
    fn test_manual_box() {
        let bbox = BoundingBox::manual(1.0, 2.0, 3.0, 4.0, "dog");
        assert!(bbox.is_manual);
        assert!(!bbox.is_verified);
        assert_eq!(bbox.confidence, 1.0);
    }

    #[test]
    fn test_round_trip() {
        let mut bbox = BoundingBox::new(5.0, 6.0, 7.0, 8.0, 0.77, "cat", 15);
        bbox.box_id = Some("img-1_box_0".to_string());
        bbox.verify(true);

        let json = serde_json::to_string(&bbox).unwrap();
        let decoded: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(bbox, decoded);
    }
}
