//! The OCR capability seam.
//!
//! The pipeline's only contract with OCR is "here is a decodable image file
//! at an agreed path" — everything about the model itself is opaque behind
//! [`OcrEngine`]. The shipped implementation ([`command::CommandEngine`])
//! shells out to an external process; tests substitute their own.
//!
//! Results persist themselves: each [`OcrResult`] knows how to emit its own
//! structured-data ([`OcrResult::save_to_json`]) and annotated-image
//! ([`OcrResult::save_to_img`]) representations into the output directory.

pub mod command;

use crate::error::OcrError;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outline color for recognized regions in the annotated image.
const BOX_COLOR: Rgb<u8> = Rgb([220, 20, 60]);

/// An OCR engine the driver can invoke on the prepared artifact.
///
/// Implementations block until recognition completes; there is no retry or
/// timeout at this seam.
pub trait OcrEngine {
    /// Short human-readable engine name for logs and status lines.
    fn name(&self) -> &str;

    /// Recognize text in the image at `image`, returning one result object
    /// per recognized page.
    fn recognize(&self, image: &Path) -> Result<Vec<OcrResult>, OcrError>;
}

/// One recognized text region: the text, the engine's confidence, and the
/// four corners of its quadrilateral in pixel coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRegion {
    pub text: String,
    /// Engine confidence in [0, 1]. Engines that report `score` instead are
    /// accepted as-is.
    #[serde(alias = "score", default)]
    pub confidence: f32,
    /// Corner points, typically top-left → top-right → bottom-right →
    /// bottom-left.
    #[serde(rename = "box")]
    pub bbox: [[f32; 2]; 4],
}

/// Everything the engine recognized on one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// The image the regions refer to.
    pub source: PathBuf,
    pub regions: Vec<TextRegion>,
}

impl OcrResult {
    /// Write this result as pretty-printed JSON into `dir`, returning the
    /// path written.
    pub fn save_to_json(&self, dir: &Path) -> Result<PathBuf, OcrError> {
        let path = dir.join(format!("{}.json", self.stem()));
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            .map_err(|source| OcrError::ResultWriteFailed {
                path: path.clone(),
                source,
            })?;
        std::fs::write(&path, json).map_err(|source| OcrError::ResultWriteFailed {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Draw region outlines on a copy of the source image and write it into
    /// `dir`, returning the path written.
    pub fn save_to_img(&self, dir: &Path) -> Result<PathBuf, OcrError> {
        let mut canvas = image::open(&self.source)
            .map_err(|e| OcrError::AnnotateFailed {
                path: self.source.clone(),
                detail: e.to_string(),
            })?
            .to_rgb8();

        for region in &self.regions {
            draw_quad(&mut canvas, &region.bbox, BOX_COLOR);
        }

        let path = dir.join(format!("{}_annotated.jpg", self.stem()));
        canvas.save(&path).map_err(|e| OcrError::AnnotateFailed {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        Ok(path)
    }

    fn stem(&self) -> String {
        self.source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("result")
            .to_string()
    }
}

/// Outline a quadrilateral by connecting its corners.
fn draw_quad(canvas: &mut RgbImage, quad: &[[f32; 2]; 4], color: Rgb<u8>) {
    for i in 0..4 {
        let from = quad[i];
        let to = quad[(i + 1) % 4];
        draw_segment(canvas, from, to, color);
    }
}

/// Bresenham line, clipped to the canvas.
fn draw_segment(canvas: &mut RgbImage, from: [f32; 2], to: [f32; 2], color: Rgb<u8>) {
    let (w, h) = canvas.dimensions();
    let (mut x0, mut y0) = (from[0].round() as i64, from[1].round() as i64);
    let (x1, y1) = (to[0].round() as i64, to[1].round() as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as u32) < w && (y0 as u32) < h {
            canvas.put_pixel(x0 as u32, y0 as u32, color);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
