//! Progress-callback trait for per-stage preparation events.
//!
//! Inject an [`Arc<dyn RunProgress>`] via
//! [`crate::config::RunConfigBuilder::progress`] to receive events as the
//! pipeline moves through its stages. The callback approach keeps the library
//! ignorant of how the host application communicates: the CLI prints status
//! lines, a service could forward events to a channel, tests count them.
//!
//! All methods have default no-op implementations so callers only override
//! what they care about. Implementations must be `Send + Sync`; the pipeline
//! itself is single-threaded, but the config holding the callback may be
//! shared across threads.

use crate::output::NormalizedArtifact;
use std::sync::Arc;

/// Called by the pipeline as it processes the input.
pub trait RunProgress: Send + Sync {
    /// The input resolved to a readable file. `is_pdf` tells which decode
    /// path will run.
    fn on_source_resolved(&self, is_pdf: bool) {
        let _ = is_pdf;
    }

    /// The input decoded into pixels at the given dimensions.
    fn on_decoded(&self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// The image was downscaled to fit the dimension bound.
    /// Not called when the input already fits.
    fn on_resized(&self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// One JPEG encode attempt finished at `quality`, producing `size_kb`.
    fn on_encode_attempt(&self, quality: u8, size_kb: f64) {
        let _ = (quality, size_kb);
    }

    /// The artifact was written to disk.
    fn on_artifact_ready(&self, artifact: &NormalizedArtifact) {
        let _ = artifact;
    }

    /// The OCR engine is about to run.
    fn on_ocr_start(&self, engine: &str) {
        let _ = engine;
    }

    /// The OCR engine returned; `results` result objects were persisted.
    fn on_ocr_complete(&self, results: usize) {
        let _ = results;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl RunProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type ProgressCallback = Arc<dyn RunProgress>;
