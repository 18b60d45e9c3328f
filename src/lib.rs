//! # ocrprep
//!
//! Prepare a single document page (PDF or raster image) for OCR, then run an
//! external OCR engine on it and save the structured results.
//!
//! ## Why this crate?
//!
//! OCR models have implicit input limits: feed them a 40-megapixel scan or a
//! multi-megabyte upload and accuracy drops or the request is rejected
//! outright. This crate normalises arbitrary input — the first page of a PDF
//! or any common raster image — into a dimension- and size-constrained JPEG
//! the model can actually digest, walking JPEG quality downward until the
//! encoded bytes fit the budget.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input
//!  │
//!  ├─ 1. Resolve   validate the path, classify PDF vs raster
//!  ├─ 2. Decode    rasterise page 1 via pdfium, or decode via the codec
//!  ├─ 3. Clamp     bound both dimensions (Lanczos, aspect preserved)
//!  ├─ 4. Sweep     descending-quality JPEG encode until the size fits
//!  ├─ 5. Artifact  96-DPI JPEG written atomically to a fixed path
//!  └─ 6. OCR       external engine reads the artifact; results saved as
//!                  JSON + annotated image per result object
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocrprep::{run, CommandEngine, RunConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::default();
//!     let engine = CommandEngine::new("paddleocr");
//!     let report = run("input.pdf", &config, &engine)?;
//!     println!(
//!         "artifact: {} ({:.1} KB at quality {})",
//!         report.artifact.path.display(),
//!         report.artifact.size_kb,
//!         report.artifact.quality,
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Use [`prepare`] instead of [`run`] when only the artifact is needed.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocrprep` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ocrprep = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod prepare;
pub mod progress;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CompressionBudget, CompressionBudgetBuilder, RunConfig, RunConfigBuilder};
pub use error::{OcrError, PrepareError};
pub use ocr::command::CommandEngine;
pub use ocr::{OcrEngine, OcrResult, TextRegion};
pub use output::{BudgetStatus, NormalizedArtifact, RunReport, RunStats};
pub use prepare::prepare;
pub use progress::{NoopProgress, ProgressCallback, RunProgress};
pub use run::run;
