//! The Input Normalizer: turn an arbitrary document page into an OCR-ready
//! JPEG.
//!
//! ```text
//! resolve ──▶ decode ──▶ clamp ──▶ sweep ──▶ write
//! ```
//!
//! Every failure inside this function is fatal to the run; callers must not
//! hand the artifact path to OCR after an `Err`. A sweep that exhausts its
//! quality range is NOT a failure — the artifact is kept and flagged
//! [`BudgetStatus::Exceeded`].

use crate::config::RunConfig;
use crate::error::PrepareError;
use crate::output::{BudgetStatus, NormalizedArtifact};
use crate::pipeline::{compress, decode, input};
use std::path::Path;
use tracing::{debug, info, warn};

/// Prepare the file at `input_path` for OCR, writing the artifact to
/// `config.artifact_path`.
///
/// # Errors
/// * [`PrepareError::FileNotFound`] / [`PrepareError::PermissionDenied`] —
///   the input is unreadable; nothing is written.
/// * [`PrepareError::NotAPdf`] / [`PrepareError::DecodeFailed`] — the input
///   cannot be rendered or decoded.
/// * [`PrepareError::EncodeFailed`] / [`PrepareError::ArtifactWriteFailed`] —
///   the prepared image could not be encoded or written.
pub fn prepare(
    input_path: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<NormalizedArtifact, PrepareError> {
    let input_path = input_path.as_ref();
    let budget = &config.budget;
    let progress = config.progress.as_deref();

    info!("Preparing {} for OCR", input_path.display());

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let source = input::resolve_source(input_path)?;
    if let Some(p) = progress {
        p.on_source_resolved(source.kind == input::SourceKind::Pdf);
    }

    // ── Step 2: Decode to 3-channel pixels ───────────────────────────────
    let image = decode::decode_source(&source, budget.max_dimension)?;
    let (orig_w, orig_h) = image.dimensions();
    if let Some(p) = progress {
        p.on_decoded(orig_w, orig_h);
    }

    // ── Step 3: Dimension clamp ──────────────────────────────────────────
    let image = compress::clamp_dimensions(image, budget.max_dimension);
    let (width, height) = image.dimensions();
    if (width, height) != (orig_w, orig_h) {
        info!(
            "Resized {}x{} → {}x{} (max {} px)",
            orig_w, orig_h, width, height, budget.max_dimension
        );
        if let Some(p) = progress {
            p.on_resized(width, height);
        }
    } else {
        debug!("{}x{} already within bounds, no resize", width, height);
    }

    // ── Step 4: Compression sweep ────────────────────────────────────────
    let outcome = compress::compress_to_budget(&image, budget, progress)?;

    // ── Step 5: Write artifact ───────────────────────────────────────────
    compress::write_artifact(&config.artifact_path, &outcome.bytes)?;

    let artifact = NormalizedArtifact {
        path: config.artifact_path.clone(),
        width,
        height,
        quality: outcome.quality,
        size_kb: outcome.size_kb,
        encode_attempts: outcome.attempts,
        budget: outcome.status,
    };

    match artifact.budget {
        BudgetStatus::WithinBudget => info!(
            "Ready for OCR: {:.1} KB at quality {} ({} attempts)",
            artifact.size_kb, artifact.quality, artifact.encode_attempts
        ),
        BudgetStatus::Exceeded => warn!(
            "Artifact exceeds the {:.1} KB budget ({:.1} KB at quality {}); proceeding anyway",
            budget.max_size_kb, artifact.size_kb, artifact.quality
        ),
    }

    if let Some(p) = progress {
        p.on_artifact_ready(&artifact);
    }

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompressionBudget, RunConfig};
    use image::{Rgb, RgbImage};

    fn config_in(dir: &Path, budget: CompressionBudget) -> RunConfig {
        RunConfig::builder()
            .budget(budget)
            .artifact_path(dir.join("ready_for_ocr.jpg"))
            .output_dir(dir.join("output"))
            .build()
            .unwrap()
    }

    #[test]
    fn missing_input_creates_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), CompressionBudget::default());

        let err = prepare("/nonexistent/path.png", &config).unwrap_err();
        assert!(matches!(err, PrepareError::FileNotFound { .. }));
        assert!(!config.artifact_path.exists());
    }

    #[test]
    fn small_image_keeps_its_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("small.png");
        RgbImage::from_pixel(300, 200, Rgb([200, 200, 200]))
            .save(&source)
            .unwrap();
        let config = config_in(dir.path(), CompressionBudget::default());

        let artifact = prepare(&source, &config).unwrap();
        assert_eq!((artifact.width, artifact.height), (300, 200));
        assert!(artifact.budget.is_within_budget());

        // The artifact on disk agrees with the reported dimensions.
        let written = image::open(&artifact.path).unwrap();
        assert_eq!((written.width(), written.height()), (300, 200));
    }

    #[test]
    fn oversized_image_is_clamped_with_aspect_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("big.png");
        RgbImage::from_pixel(1000, 750, Rgb([230, 230, 230]))
            .save(&source)
            .unwrap();
        let budget = CompressionBudget::builder().max_dimension(500).build().unwrap();
        let config = config_in(dir.path(), budget);

        let artifact = prepare(&source, &config).unwrap();
        assert_eq!((artifact.width, artifact.height), (500, 375));
    }

    #[test]
    fn garbage_input_is_decode_error_and_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.png");
        std::fs::write(&source, b"not a png").unwrap();
        let config = config_in(dir.path(), CompressionBudget::default());

        let err = prepare(&source, &config).unwrap_err();
        assert!(matches!(err, PrepareError::DecodeFailed { .. }));
        assert!(!config.artifact_path.exists());
    }
}
