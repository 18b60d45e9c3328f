//! Error types for the ocrprep library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PrepareError`] — **Fatal**: the input cannot be turned into an OCR-ready
//!   artifact at all (missing file, corrupt input, disk trouble). Returned as
//!   `Err(PrepareError)` from [`crate::prepare`] and [`crate::run`]; the
//!   driver skips OCR entirely when preparation fails.
//!
//! * [`OcrError`] — **Non-fatal**: the downstream OCR engine misbehaved
//!   (failed to launch, crashed, printed garbage) after a valid artifact was
//!   already written. Stored inside [`crate::output::RunReport`] so the
//!   artifact on disk survives and callers can inspect what went wrong.
//!
//! Budget exhaustion is deliberately NOT an error: the compression sweep
//! keeps its last attempt and reports
//! [`crate::output::BudgetStatus::Exceeded`] on an otherwise successful
//! artifact.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the preparation pipeline.
///
/// Downstream OCR failures use [`OcrError`] and are stored in
/// [`crate::output::RunReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PrepareError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file carries a `.pdf` extension but is not a PDF.
    #[error("file is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The input exists but could not be rendered or decoded into pixels
    /// (corrupt file, unsupported format, renderer failure).
    #[error("failed to decode '{path}': {detail}")]
    DecodeFailed { path: PathBuf, detail: String },

    // ── Preparation errors ────────────────────────────────────────────────
    /// JPEG encoding failed during the compression sweep.
    #[error("JPEG encoding failed: {source}")]
    EncodeFailed {
        #[source]
        source: image::ImageError,
    },

    /// Could not write the prepared artifact to disk.
    #[error("failed to write artifact '{path}': {source}")]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create the results output directory.
    #[error("failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Budget builder validation failed.
    #[error("invalid compression budget: {0}")]
    InvalidBudget(String),
}

/// A non-fatal error from the downstream OCR engine.
///
/// By the time any of these can occur the artifact has already been written;
/// the driver logs the failure and reports it in
/// [`crate::output::RunReport::ocr_error`] without deleting anything.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine process could not be started at all.
    #[error("failed to launch OCR engine '{program}': {source}\nIs it installed and on PATH?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but exited with a non-zero status.
    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The engine's stdout was not the expected JSON region list.
    #[error("could not parse OCR engine output: {detail}")]
    MalformedOutput { detail: String },

    /// A result file (JSON or annotated image) could not be written.
    #[error("failed to write OCR result '{path}': {source}")]
    ResultWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The annotated-image rendering failed.
    #[error("failed to annotate '{path}': {detail}")]
    AnnotateFailed { path: PathBuf, detail: String },
}
