//! True classification metrics derived from reviewed boxes
//!
//! Detector-side metrics (fps, average confidence) are proxies; once a
//! reviewer has verified boxes, real precision/recall/F1 can be computed
//! from the ground truth:
//! - TP: verified box marked correct (manual boxes become TP once verified)
//! - FP: verified detector box marked incorrect (manual boxes never count)
//! - FN: manual box not yet verified

use crate::types::BoundingBox;
use serde::{Deserialize, Serialize};

/// Raw detector metrics reported with each inference call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceMetrics {
    /// Frames per second for the inference call
    pub fps: f64,
    /// Mean detection confidence
    pub avg_confidence: f64,
    /// Number of boxes the detector produced
    pub box_count: usize,
}

/// Classification metrics computed from verified boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueMetrics {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Number of boxes a reviewer has looked at
    pub total_verified: usize,

    /// TP / (TP + FP), rounded to 3 decimals
    pub precision: f64,
    /// TP / (TP + FN), rounded to 3 decimals
    pub recall: f64,
    /// Harmonic mean of precision and recall, rounded to 3 decimals
    pub f1_score: f64,
    /// (FP / total verified) * 100, rounded to 1 decimal
    pub false_positive_rate: f64,

    // Detector metrics carried through for comparison
    pub yolo_avg_confidence: f64,
    pub yolo_box_count: usize,
    pub yolo_fps: f64,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute true metrics for a set of boxes.
///
/// Boxes nobody has verified yet yield all-zero metrics (not an error);
/// the detector numbers are still carried through.
pub fn true_metrics(boxes: &[BoundingBox], detector: &InferenceMetrics) -> TrueMetrics {
    let verified: Vec<&BoundingBox> = boxes.iter().filter(|b| b.is_verified).collect();

    if verified.is_empty() {
        return TrueMetrics {
            true_positives: 0,
            false_positives: 0,
            false_negatives: 0,
            total_verified: 0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            false_positive_rate: 0.0,
            yolo_avg_confidence: detector.avg_confidence,
            yolo_box_count: detector.box_count,
            yolo_fps: detector.fps,
        };
    }

    let true_positives = verified.iter().filter(|b| b.is_correct).count();
    let false_positives = verified
        .iter()
        .filter(|b| !b.is_correct && !b.is_manual)
        .count();
    // Manual boxes awaiting verification are misses the detector made
    let false_negatives = boxes
        .iter()
        .filter(|b| b.is_manual && !b.is_verified)
        .count();
    let total_verified = verified.len();

    let precision = if true_positives + false_positives > 0 {
        true_positives as f64 / (true_positives + false_positives) as f64
    } else {
        0.0
    };

    let recall = if true_positives + false_negatives > 0 {
        true_positives as f64 / (true_positives + false_negatives) as f64
    } else {
        0.0
    };

    let f1_score = if precision + recall > 0.0 {
        2.0 * (precision * recall) / (precision + recall)
    } else {
        0.0
    };

    let false_positive_rate = if total_verified > 0 {
        false_positives as f64 / total_verified as f64 * 100.0
    } else {
        0.0
    };

    TrueMetrics {
        true_positives,
        false_positives,
        false_negatives,
        total_verified,
        precision: round3(precision),
        recall: round3(recall),
        f1_score: round3(f1_score),
        false_positive_rate: round1(false_positive_rate),
        yolo_avg_confidence: detector.avg_confidence,
        yolo_box_count: detector.box_count,
        yolo_fps: detector.fps,
    }
}
