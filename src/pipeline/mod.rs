//! Pipeline stages for OCR preparation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the PDF renderer) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ resolve ──▶ decode ──▶ compress
//! (path)   (exists,    (pdfium |  (clamp + quality
//!           kind)       codec)     sweep → JPEG)
//! ```
//!
//! 1. [`input`]    — validate the user-supplied path and classify it as PDF
//!    or raster by extension
//! 2. [`decode`]   — rasterise page 1 via pdfium, or decode via the image
//!    codec; either way normalise to 3-channel RGB
//! 3. [`compress`] — bound the dimensions, then walk quality downward until
//!    the encoded JPEG fits the byte budget

pub mod compress;
pub mod decode;
pub mod input;
