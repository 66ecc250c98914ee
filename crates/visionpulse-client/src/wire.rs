//! Wire DTOs matching the backend's JSON

use serde::{Deserialize, Serialize};
use visionpulse_core::{BoundingBox, InferenceMetrics, TrueMetrics};

/// `POST /upload` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub image_id: String,
    pub filename: String,
    /// Size of the stored upload in bytes
    #[serde(default)]
    pub size: u64,
    /// Uploads recorded against this session so far
    #[serde(default)]
    pub session_upload_count: u32,
}

/// `POST /infer/{session_id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceResponse {
    pub session_id: String,
    pub image_id: String,
    pub boxes: Vec<BoundingBox>,
    #[serde(default)]
    pub count: usize,
    pub metrics: InferenceMetrics,
}

/// One reviewed box in a validation batch.
#[derive(Debug, Clone, Serialize)]
pub struct BoxValidation {
    pub box_id: String,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_override: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BoxValidation {
    pub fn new(box_id: impl Into<String>, is_correct: bool) -> Self {
        Self {
            box_id: box_id.into(),
            is_correct,
            confidence_override: None,
            notes: None,
        }
    }
}

/// Batch validation request. The backend caps one batch at 100 entries.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRequest {
    pub validations: Vec<BoxValidation>,
}

/// `POST /validate/{session_id}` response with server-side true metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub metrics: TrueMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_response_decodes_backend_json() {
        let json = r#"{
            "session_id": "sess-1",
            "image_id": "sess-1_1700000000000",
            "boxes": [
                {
                    "x1": 10.5, "y1": 20.5, "x2": 110.0, "y2": 220.0,
                    "confidence": 0.91, "label": "person", "class_id": 0,
                    "box_id": "sess-1_1700000000000_box_0"
                }
            ],
            "count": 1,
            "metrics": { "fps": 12.4, "avg_confidence": 0.91, "box_count": 1 }
        }"#;

        let response: InferenceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.boxes.len(), 1);
        assert_eq!(response.metrics.box_count, 1);
        // Review fields default when absent from the wire
        assert!(!response.boxes[0].is_verified);
        assert!(response.boxes[0].is_correct);
    }

    #[test]
    fn test_validation_request_omits_empty_options() {
        let request = ValidationRequest {
            validations: vec![BoxValidation::new("img-1_box_0", false)],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("confidence_override"));
        assert!(!json.contains("notes"));
    }

    #[test]
    fn test_upload_response_tolerates_missing_counters() {
        let json = r#"{"session_id": "s", "image_id": "i", "filename": "cat.png"}"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.size, 0);
    }
}
