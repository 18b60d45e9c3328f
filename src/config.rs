//! Configuration types for OCR preparation.
//!
//! Two structs, two concerns:
//!
//! * [`CompressionBudget`] — the numeric constraints the artifact must meet
//!   (maximum dimension, target size, quality sweep bounds).
//! * [`RunConfig`] — everything a full run needs: the budget plus the artifact
//!   path, the results directory, and an optional progress callback.
//!
//! Both are built via builders with validated `build()`, so an impossible
//! sweep (e.g. `min_quality >= initial_quality`) is rejected before any file
//! is touched.

use crate::error::PrepareError;
use crate::progress::RunProgress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Constraints the prepared JPEG must satisfy.
///
/// Defaults are the limits the downstream OCR model is known to tolerate:
/// 2000 px on the longest side and roughly 400 KB on disk, reached by a
/// descending quality sweep from 95 in steps of 5, never below 10.
///
/// # Example
/// ```rust
/// use ocrprep::CompressionBudget;
///
/// let budget = CompressionBudget::builder()
///     .max_dimension(1600)
///     .max_size_kb(250.0)
///     .build()
///     .unwrap();
/// assert_eq!(budget.max_dimension, 1600);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionBudget {
    /// Maximum width or height of the artifact in pixels. Default: 2000.
    ///
    /// Larger pages are downscaled (aspect ratio preserved); smaller pages
    /// are never upscaled. Also caps the pdfium render size for PDF inputs
    /// so page 1 of an A0 poster cannot exhaust memory.
    pub max_dimension: u32,

    /// Target encoded size in kilobytes. Default: 400.0.
    ///
    /// A soft target: the sweep stops at the first quality that fits, and if
    /// none fits the last attempt is kept with
    /// [`crate::output::BudgetStatus::Exceeded`].
    pub max_size_kb: f64,

    /// Quality of the first JPEG encode attempt (1–100). Default: 95.
    pub initial_quality: u8,

    /// How much the quality drops between attempts. Default: 5.
    pub quality_step: u8,

    /// Floor below which the sweep never encodes. Default: 10.
    ///
    /// Must be strictly below `initial_quality`. Text at quality < 10 is
    /// unreadable to OCR anyway, so descending further only wastes attempts.
    pub min_quality: u8,
}

impl Default for CompressionBudget {
    fn default() -> Self {
        Self {
            max_dimension: 2000,
            max_size_kb: 400.0,
            initial_quality: 95,
            quality_step: 5,
            min_quality: 10,
        }
    }
}

impl CompressionBudget {
    /// Create a new builder for `CompressionBudget`.
    pub fn builder() -> CompressionBudgetBuilder {
        CompressionBudgetBuilder {
            budget: Self::default(),
        }
    }

    /// Hard upper bound on encode attempts the sweep can make:
    /// ⌈(initial − min) / step⌉.
    pub fn max_attempts(&self) -> u32 {
        let span = u32::from(self.initial_quality.saturating_sub(self.min_quality));
        let step = u32::from(self.quality_step.max(1));
        span.div_ceil(step)
    }
}

/// Builder for [`CompressionBudget`].
#[derive(Debug)]
pub struct CompressionBudgetBuilder {
    budget: CompressionBudget,
}

impl CompressionBudgetBuilder {
    pub fn max_dimension(mut self, px: u32) -> Self {
        self.budget.max_dimension = px;
        self
    }

    pub fn max_size_kb(mut self, kb: f64) -> Self {
        self.budget.max_size_kb = kb;
        self
    }

    pub fn initial_quality(mut self, q: u8) -> Self {
        self.budget.initial_quality = q;
        self
    }

    pub fn quality_step(mut self, step: u8) -> Self {
        self.budget.quality_step = step;
        self
    }

    pub fn min_quality(mut self, q: u8) -> Self {
        self.budget.min_quality = q;
        self
    }

    /// Build the budget, validating constraints.
    pub fn build(self) -> Result<CompressionBudget, PrepareError> {
        let b = &self.budget;
        if b.max_dimension == 0 {
            return Err(PrepareError::InvalidBudget(
                "max_dimension must be at least 1 pixel".into(),
            ));
        }
        if !(b.max_size_kb > 0.0) {
            return Err(PrepareError::InvalidBudget(format!(
                "max_size_kb must be positive, got {}",
                b.max_size_kb
            )));
        }
        if b.initial_quality < 1 || b.initial_quality > 100 {
            return Err(PrepareError::InvalidBudget(format!(
                "initial_quality must be 1–100, got {}",
                b.initial_quality
            )));
        }
        if b.quality_step == 0 {
            return Err(PrepareError::InvalidBudget(
                "quality_step must be at least 1".into(),
            ));
        }
        if b.min_quality == 0 {
            return Err(PrepareError::InvalidBudget(
                "min_quality must be at least 1".into(),
            ));
        }
        if b.min_quality >= b.initial_quality {
            return Err(PrepareError::InvalidBudget(format!(
                "min_quality ({}) must be below initial_quality ({})",
                b.min_quality, b.initial_quality
            )));
        }
        Ok(self.budget)
    }
}

/// Configuration for a full prepare-and-recognize run.
///
/// Built via [`RunConfig::builder()`] or [`RunConfig::default()`].
#[derive(Clone)]
pub struct RunConfig {
    /// Compression constraints for the artifact.
    pub budget: CompressionBudget,

    /// Where the prepared JPEG is written. Default: `ready_for_ocr.jpg`.
    ///
    /// Overwritten on every invocation; a fresh run replaces prior output.
    pub artifact_path: PathBuf,

    /// Directory the OCR result files land in. Default: `./output`.
    /// Created if absent.
    pub output_dir: PathBuf,

    /// Optional progress callback for per-stage events.
    pub progress: Option<Arc<dyn RunProgress>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            budget: CompressionBudget::default(),
            artifact_path: PathBuf::from("ready_for_ocr.jpg"),
            output_dir: PathBuf::from("./output"),
            progress: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("budget", &self.budget)
            .field("artifact_path", &self.artifact_path)
            .field("output_dir", &self.output_dir)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn RunProgress>"))
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RunConfig`].
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn budget(mut self, budget: CompressionBudget) -> Self {
        self.config.budget = budget;
        self
    }

    pub fn artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.artifact_path = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn progress(mut self, cb: Arc<dyn RunProgress>) -> Self {
        self.config.progress = Some(cb);
        self
    }

    /// Build the configuration. The budget is assumed already validated if it
    /// came from [`CompressionBudget::builder`]; raw field edits are
    /// re-checked here.
    pub fn build(self) -> Result<RunConfig, PrepareError> {
        let b = self.config.budget.clone();
        CompressionBudgetBuilder { budget: b }.build()?;
        Ok(self.config)
    }
}
