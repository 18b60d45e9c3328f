//! Decoding: turn the resolved source into an in-memory RGB raster.
//!
//! ## Why render only page 1?
//!
//! The downstream OCR model consumes a single page. Loading only the first
//! page keeps memory bounded no matter how large the document is — later
//! pages are never touched.
//!
//! ## Why cap the render size here?
//!
//! Page sizes vary wildly: an A0 poster rendered at print resolution would
//! produce a five-figure pixel dimension. Both render dimensions are capped
//! at the budget's `max_dimension`, so pdfium never allocates more than
//! roughly `max_dimension²` bytes of pixels and the clamp stage becomes a
//! no-op for PDF inputs.

use crate::error::PrepareError;
use crate::pipeline::input::{ResolvedSource, SourceKind};
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Decode the source into a 3-channel image.
///
/// PDFs go through pdfium (page 1 only, render size capped at
/// `max_dimension`); everything else goes through the image codec with
/// content-based format sniffing. Alpha and other extra channels are
/// discarded.
pub fn decode_source(
    source: &ResolvedSource,
    max_dimension: u32,
) -> Result<RgbImage, PrepareError> {
    let image = match source.kind {
        SourceKind::Pdf => render_first_page(&source.path, max_dimension)?,
        SourceKind::Raster => decode_raster(&source.path)?,
    };

    debug!(
        "Decoded {} → {}x{} px",
        source.path.display(),
        image.width(),
        image.height()
    );

    Ok(image)
}

/// Rasterise page 1 of a PDF via pdfium.
fn render_first_page(pdf_path: &Path, max_dimension: u32) -> Result<RgbImage, PrepareError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| PrepareError::DecodeFailed {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    if pages.len() == 0 {
        return Err(PrepareError::DecodeFailed {
            path: pdf_path.to_path_buf(),
            detail: "document has no pages".into(),
        });
    }

    let page = pages.get(0).map_err(|e| PrepareError::DecodeFailed {
        path: pdf_path.to_path_buf(),
        detail: format!("{:?}", e),
    })?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_dimension as i32)
        .set_maximum_height(max_dimension as i32);

    let bitmap =
        page.render_with_config(&render_config)
            .map_err(|e| PrepareError::DecodeFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    Ok(bitmap.as_image().to_rgb8())
}

/// Decode a raster image via the image codec, sniffing the actual content
/// format rather than trusting the extension.
fn decode_raster(path: &Path) -> Result<RgbImage, PrepareError> {
    let reader = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| PrepareError::DecodeFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let decoded = reader.decode().map_err(|e| PrepareError::DecodeFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    Ok(decoded.to_rgb8())
}
