//! Full run driver: prepare the input, then hand the artifact to the OCR
//! engine and persist whatever it recognizes.
//!
//! Preparation failures are fatal and skip OCR entirely. OCR failures are
//! not: the artifact is already on disk, stays there, and the failure is
//! reported in [`RunReport::ocr_error`] instead of unwinding the run.

use crate::config::RunConfig;
use crate::error::{OcrError, PrepareError};
use crate::ocr::OcrEngine;
use crate::output::{NormalizedArtifact, RunReport, RunStats};
use crate::prepare::prepare;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Prepare `input_path` and run `engine` on the artifact.
///
/// # Returns
/// `Ok(RunReport)` whenever preparation succeeded — even if the OCR engine
/// failed afterwards (check `report.ocr_error`).
///
/// # Errors
/// Returns `Err(PrepareError)` only when no usable artifact could be
/// produced.
pub fn run(
    input_path: impl AsRef<Path>,
    config: &RunConfig,
    engine: &dyn OcrEngine,
) -> Result<RunReport, PrepareError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    let progress = config.progress.as_deref();

    // ── Step 1: Output directory (idempotent) ────────────────────────────
    std::fs::create_dir_all(&config.output_dir).map_err(|source| {
        PrepareError::OutputDirFailed {
            path: config.output_dir.clone(),
            source,
        }
    })?;

    // ── Step 2: Prepare the artifact ─────────────────────────────────────
    let prepare_start = Instant::now();
    let artifact = prepare(input_path, config)?;
    let prepare_ms = prepare_start.elapsed().as_millis() as u64;

    // ── Step 3: Recognize and persist ────────────────────────────────────
    let ocr_start = Instant::now();
    if let Some(p) = progress {
        p.on_ocr_start(engine.name());
    }

    let (results_saved, ocr_error) =
        match recognize_and_persist(engine, &artifact, &config.output_dir) {
            Ok(count) => {
                info!("OCR complete: {} result(s) saved to {}", count, config.output_dir.display());
                if let Some(p) = progress {
                    p.on_ocr_complete(count);
                }
                (count, None)
            }
            Err(e) => {
                warn!(
                    "OCR failed (artifact kept at {}): {}",
                    artifact.path.display(),
                    e
                );
                (0, Some(e.to_string()))
            }
        };
    let ocr_ms = ocr_start.elapsed().as_millis() as u64;

    Ok(RunReport {
        artifact,
        results_saved,
        ocr_error,
        stats: RunStats {
            prepare_ms,
            ocr_ms,
            total_ms: total_start.elapsed().as_millis() as u64,
        },
    })
}

/// Invoke the engine and let each result object persist itself.
fn recognize_and_persist(
    engine: &dyn OcrEngine,
    artifact: &NormalizedArtifact,
    output_dir: &Path,
) -> Result<usize, OcrError> {
    let results = engine.recognize(&artifact.path)?;

    for result in &results {
        let json_path = result.save_to_json(output_dir)?;
        let img_path = result.save_to_img(output_dir)?;
        info!("Saved {} and {}", json_path.display(), img_path.display());
    }

    Ok(results.len())
}
