//! Result types produced by preparation and by a full run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether the compression sweep met its size target.
///
/// `Exceeded` is still a success: the last encode attempt was kept and the
/// run proceeds to OCR. Callers that need a hard size guarantee must check
/// this flag rather than rely on the artifact existing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Final encode fits within `max_size_kb`.
    WithinBudget,
    /// Sweep reached `min_quality` without fitting; artifact may be larger
    /// than the target.
    Exceeded,
}

impl BudgetStatus {
    /// True when the artifact honors the size target.
    pub fn is_within_budget(self) -> bool {
        matches!(self, BudgetStatus::WithinBudget)
    }
}

/// The prepared JPEG on disk, plus how it got there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedArtifact {
    /// Where the JPEG was written.
    pub path: PathBuf,
    /// Pixel width after any downscale.
    pub width: u32,
    /// Pixel height after any downscale.
    pub height: u32,
    /// JPEG quality of the kept encode.
    pub quality: u8,
    /// Measured size of the kept encode in kilobytes.
    pub size_kb: f64,
    /// Number of encode attempts the sweep made.
    pub encode_attempts: u32,
    /// Whether the size target was met.
    pub budget: BudgetStatus,
}

/// Wall-clock timings for one run, all in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Resolve + decode + clamp + sweep + artifact write.
    pub prepare_ms: u64,
    /// OCR engine invocation + result persistence. Zero when OCR was skipped.
    pub ocr_ms: u64,
    /// End-to-end duration.
    pub total_ms: u64,
}

/// Everything a full [`crate::run`] produced.
///
/// `ocr_error` being `Some` means the artifact is valid but the downstream
/// engine failed; the run still counts as a success (the artifact is never
/// rolled back).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// The prepared artifact.
    pub artifact: NormalizedArtifact,
    /// How many OCR result objects were persisted to the output directory.
    pub results_saved: usize,
    /// Human-readable description of a non-fatal OCR failure, if any.
    pub ocr_error: Option<String>,
    /// Stage timings.
    pub stats: RunStats,
}
