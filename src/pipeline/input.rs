//! Input resolution: validate the user-supplied path and classify it.
//!
//! The extension decides which decode path runs — `.pdf` goes to the page
//! renderer, everything else to the image codec. The codec does its own
//! content sniffing later, but PDFs are magic-checked here so a mislabeled
//! file produces a meaningful error rather than a renderer crash.

use crate::error::PrepareError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which decode path the source takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Render page 1 via pdfium.
    Pdf,
    /// Decode via the image codec.
    Raster,
}

/// A validated input: the path exists, is readable, and is classified.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Classify a path by its extension (case-insensitive).
pub fn kind_of(path: &Path) -> SourceKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => SourceKind::Pdf,
        _ => SourceKind::Raster,
    }
}

/// Resolve a local file path, validating existence, readability, and — for
/// PDFs — the `%PDF` magic bytes.
pub fn resolve_source(path: &Path) -> Result<ResolvedSource, PrepareError> {
    if !path.exists() {
        return Err(PrepareError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let kind = kind_of(path);

    // Check read permission by attempting to open
    match std::fs::File::open(path) {
        Ok(mut f) => {
            if kind == SourceKind::Pdf {
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(PrepareError::NotAPdf {
                        path: path.to_path_buf(),
                        magic,
                    });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PrepareError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PrepareError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved source: {} ({:?})", path.display(), kind);
    Ok(ResolvedSource {
        path: path.to_path_buf(),
        kind,
    })
}
