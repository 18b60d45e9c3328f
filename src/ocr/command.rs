//! External-command OCR engine.
//!
//! Runs a user-configured program with the artifact path appended as the
//! final argument and reads recognized regions from its stdout. The wire
//! format is one JSON array of region objects:
//!
//! ```json
//! [
//!   {"text": "Total", "confidence": 0.98, "box": [[10,10],[80,10],[80,30],[10,30]]}
//! ]
//! ```
//!
//! `"score"` is accepted as an alias for `"confidence"`, matching what
//! common OCR toolkits emit. Anything else on stdout, or a non-zero exit,
//! is a non-fatal [`OcrError`] — the prepared artifact survives regardless.

use crate::error::OcrError;
use crate::ocr::{OcrEngine, OcrResult, TextRegion};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// An [`OcrEngine`] that shells out to an external recognition command.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    /// Engine that runs `program <image>`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Engine that runs `program <args…> <image>`.
    pub fn with_args(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a whitespace-separated command line into program + args.
    /// Returns `None` for an empty/blank string.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?.to_string();
        Some(Self {
            program,
            args: parts.map(str::to_string).collect(),
        })
    }
}

impl OcrEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn recognize(&self, image: &Path) -> Result<Vec<OcrResult>, OcrError> {
        info!(
            "Running OCR engine: {} {} {}",
            self.program,
            self.args.join(" "),
            image.display()
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(image)
            .output()
            .map_err(|source| OcrError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let regions = parse_regions(&output.stdout)?;
        debug!("Engine returned {} regions", regions.len());

        Ok(vec![OcrResult {
            source: image.to_path_buf(),
            regions,
        }])
    }
}

/// Parse the engine's stdout into text regions.
pub fn parse_regions(stdout: &[u8]) -> Result<Vec<TextRegion>, OcrError> {
    let text = std::str::from_utf8(stdout).map_err(|e| OcrError::MalformedOutput {
        detail: format!("stdout is not UTF-8: {e}"),
    })?;
    serde_json::from_str(text.trim()).map_err(|e| OcrError::MalformedOutput {
        detail: format!("expected a JSON array of regions: {e}"),
    })
}
