//! Command implementations

use anyhow::{Context, bail};
use std::path::PathBuf;
use tracing::info;
use visionpulse_client::{ApiClient, BoxValidation, ValidationRequest};
use visionpulse_core::{
    CacheConfig, CachedImage, InferenceMetrics, SessionCacheManager, SessionCoordinator,
    true_metrics,
};

/// The backend caps one validation batch at 100 entries.
const MAX_VALIDATION_BATCH: usize = 100;

fn open_coordinator() -> anyhow::Result<SessionCoordinator> {
    let manager = SessionCacheManager::open_default(CacheConfig::default())
        .context("failed to open the session cache")?;
    Ok(SessionCoordinator::new(manager))
}

/// Upload files, run detection on each, and record the results in the
/// cached session.
pub async fn upload(api_url: &str, files: &[PathBuf]) -> anyhow::Result<()> {
    let coordinator = open_coordinator()?;
    coordinator.hydrate().await;

    let client = ApiClient::new(api_url);
    for path in files {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("invalid file name: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        let session_id = coordinator.session_id();
        let (session_id, image, metrics) = client
            .process_image(filename, bytes, session_id.as_deref())
            .await
            .with_context(|| format!("processing {} failed", path.display()))?;

        info!(session_id = %session_id, image_id = %image.id, "image processed");
        println!(
            "{}: {} boxes (avg confidence {:.2}, {:.1} fps)",
            filename,
            image.boxes.len(),
            metrics.avg_confidence,
            metrics.fps
        );
        coordinator.record_image(&session_id, image);
    }

    coordinator.flush().await;
    println!("session now holds {} image(s)", coordinator.image_count());
    Ok(())
}

/// Print the cached session and its review progress.
pub async fn show() -> anyhow::Result<()> {
    let coordinator = open_coordinator()?;
    if !coordinator.hydrate().await {
        println!("no cached session");
        return Ok(());
    }

    let session_id = coordinator.session_id().unwrap_or_default();
    let history = coordinator.history();
    println!("session {session_id}: {} image(s)", history.len());

    for (index, image) in history.iter().enumerate() {
        println!(
            "  [{index}] {} ({}) - {}/{} boxes verified",
            image.id,
            image.filename,
            image.verified_count(),
            image.boxes.len()
        );
        for (box_index, bbox) in image.boxes.iter().enumerate() {
            let status = if !bbox.is_verified {
                "unreviewed"
            } else if bbox.is_correct {
                "correct"
            } else {
                "incorrect"
            };
            println!(
                "        box {box_index}: {} {:.2} ({status})",
                bbox.label, bbox.confidence
            );
        }
        if image.verified_count() > 0 {
            let m = true_metrics(&image.boxes, &InferenceMetrics::default());
            println!(
                "        precision {:.3}  recall {:.3}  f1 {:.3}",
                m.precision, m.recall, m.f1_score
            );
        }
    }
    Ok(())
}

/// Reviewed boxes ready for submission: verified, backend-identified,
/// capped at the batch limit.
fn collect_validations(history: &[CachedImage]) -> Vec<BoxValidation> {
    history
        .iter()
        .flat_map(|image| image.boxes.iter())
        .filter(|bbox| bbox.is_verified)
        .filter_map(|bbox| {
            bbox.box_id
                .as_deref()
                .map(|id| BoxValidation::new(id, bbox.is_correct))
        })
        .take(MAX_VALIDATION_BATCH)
        .collect()
}

/// Submit every reviewed box to the backend and print the true metrics
/// it computes from them.
pub async fn validate(api_url: &str) -> anyhow::Result<()> {
    let coordinator = open_coordinator()?;
    if !coordinator.hydrate().await {
        bail!("no cached session to validate");
    }
    let session_id = coordinator
        .session_id()
        .context("cached session has no id")?;

    let validations = collect_validations(&coordinator.history());
    if validations.is_empty() {
        bail!("no verified boxes to submit");
    }

    let client = ApiClient::new(api_url);
    let response = client
        .validate(&session_id, &ValidationRequest { validations })
        .await
        .context("validation request failed")?;

    let m = response.metrics;
    println!(
        "precision {:.3}  recall {:.3}  f1 {:.3}  ({} TP / {} FP / {} FN)",
        m.precision, m.recall, m.f1_score, m.true_positives, m.false_positives, m.false_negatives
    );
    Ok(())
}

/// Mark one box of one image as reviewed.
pub async fn verify(image: &str, box_index: usize, is_correct: bool) -> anyhow::Result<()> {
    let coordinator = open_coordinator()?;
    if !coordinator.hydrate().await {
        bail!("no cached session to verify against");
    }

    let history = coordinator.history();
    let image_index = match image.parse::<usize>() {
        Ok(index) => index,
        Err(_) => history
            .iter()
            .position(|cached| cached.id == image)
            .with_context(|| format!("no image {image:?} in the session"))?,
    };
    if !coordinator.select_image(image_index) {
        bail!("image index {image_index} is out of range");
    }
    if !coordinator.verify_box(box_index, is_correct) {
        bail!("box index {box_index} is out of range");
    }

    coordinator.flush().await;
    println!(
        "box {box_index} of image {image_index} marked {}",
        if is_correct { "correct" } else { "incorrect" }
    );
    Ok(())
}

/// Drop the cached session from every storage tier.
pub async fn reset() -> anyhow::Result<()> {
    let coordinator = open_coordinator()?;
    coordinator.reset().await;
    println!("session cleared");
    Ok(())
}
