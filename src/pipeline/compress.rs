//! Compression: bound the dimensions, then walk JPEG quality downward until
//! the encoded size fits the byte budget.
//!
//! ## Why a linear sweep and not binary search?
//!
//! Quality-to-size is roughly monotonic but non-linear, and the budget is a
//! soft target for a downstream model's input limits, not a hard contract.
//! The loop is bounded by ⌈(initial − min) / step⌉ attempts, and because it
//! descends, the first quality that fits is also the highest fitting quality
//! among those checked.
//!
//! ## Why Lanczos?
//!
//! The artifact feeds an OCR model; ringing or blur at text edges costs
//! recognition accuracy. Lanczos3 keeps glyph edges crisp through the
//! downscale.

use crate::config::CompressionBudget;
use crate::error::PrepareError;
use crate::output::BudgetStatus;
use crate::progress::RunProgress;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::path::Path;
use tracing::{debug, warn};

/// Resolution tag stamped into the artifact's JFIF header. Metadata only —
/// pixel dimensions are unaffected.
pub const JPEG_DPI: u16 = 96;

/// What the sweep produced: the winning encode and how it was found.
#[derive(Debug)]
pub struct SweepOutcome {
    /// The kept JPEG bytes.
    pub bytes: Vec<u8>,
    /// Quality of the kept encode.
    pub quality: u8,
    /// Size of the kept encode in kilobytes.
    pub size_kb: f64,
    /// Encode attempts made.
    pub attempts: u32,
    /// Whether the size target was met.
    pub status: BudgetStatus,
}

/// Downscale so both dimensions fit `max_dimension`, preserving aspect
/// ratio. Images already within bounds are returned untouched — never
/// upscaled.
pub fn clamp_dimensions(image: RgbImage, max_dimension: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w <= max_dimension && h <= max_dimension {
        return image;
    }
    DynamicImage::ImageRgb8(image)
        .resize(max_dimension, max_dimension, FilterType::Lanczos3)
        .to_rgb8()
}

/// Encode the image repeatedly at descending quality until it fits the
/// budget, or the floor is reached — in which case the last attempt is kept
/// and the outcome is flagged [`BudgetStatus::Exceeded`].
///
/// Quality values encoded are `initial, initial − step, …` down to (but
/// never at or below) `min_quality`.
pub fn compress_to_budget(
    image: &RgbImage,
    budget: &CompressionBudget,
    progress: Option<&dyn RunProgress>,
) -> Result<SweepOutcome, PrepareError> {
    let mut quality = budget.initial_quality;
    let mut attempts = 0u32;

    loop {
        let bytes = encode_jpeg(image, quality)
            .map_err(|source| PrepareError::EncodeFailed { source })?;
        attempts += 1;
        let size_kb = bytes.len() as f64 / 1024.0;

        debug!(
            "Encode attempt {}: quality {} → {:.1} KB (target {:.1} KB)",
            attempts, quality, size_kb, budget.max_size_kb
        );
        if let Some(p) = progress {
            p.on_encode_attempt(quality, size_kb);
        }

        if size_kb <= budget.max_size_kb {
            return Ok(SweepOutcome {
                bytes,
                quality,
                size_kb,
                attempts,
                status: BudgetStatus::WithinBudget,
            });
        }

        let next = quality.saturating_sub(budget.quality_step);
        if next <= budget.min_quality {
            warn!(
                "Could not compress under {:.1} KB (best: {:.1} KB at quality {}); keeping last attempt",
                budget.max_size_kb, size_kb, quality
            );
            return Ok(SweepOutcome {
                bytes,
                quality,
                size_kb,
                attempts,
                status: BudgetStatus::Exceeded,
            });
        }
        quality = next;
    }
}

/// Write the winning bytes to the artifact path atomically (temp file +
/// rename), creating the parent directory if needed.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), PrepareError> {
    let write_err = |source| PrepareError::ArtifactWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("jpg.tmp");
    std::fs::write(&tmp_path, bytes).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)?;
    Ok(())
}

/// JPEG-encode at the given quality with the fixed 96-DPI JFIF tag.
fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(image)?;
    stamp_jfif_density(&mut buf, JPEG_DPI);
    Ok(buf)
}

/// Overwrite the density fields of the JFIF APP0 segment in place.
///
/// Layout: SOI (2) + APP0 marker (2) + length (2) + "JFIF\0" (5) +
/// version (2) + units (1) + Xdensity (2) + Ydensity (2). Leaves the buffer
/// untouched if the header is not a leading JFIF APP0 segment.
fn stamp_jfif_density(jpeg: &mut [u8], dpi: u16) {
    if jpeg.len() < 18
        || jpeg[0..2] != [0xFF, 0xD8]
        || jpeg[2..4] != [0xFF, 0xE0]
        || &jpeg[6..11] != b"JFIF\0"
    {
        return;
    }
    jpeg[13] = 1; // density unit: dots per inch
    jpeg[14..16].copy_from_slice(&dpi.to_be_bytes());
    jpeg[16..18].copy_from_slice(&dpi.to_be_bytes());
}
