//! CLI binary for ocrprep.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CompressionBudget`/`RunConfig` and prints status lines.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ocrprep::{
    prepare, run, CommandEngine, CompressionBudget, NormalizedArtifact, RunConfig, RunProgress,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Terminal progress callback: per-stage status lines plus an indicatif
/// spinner while the OCR engine runs (the only stage with unpredictable
/// duration).
struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
        })
    }
}

impl RunProgress for CliProgress {
    fn on_source_resolved(&self, is_pdf: bool) {
        if is_pdf {
            eprintln!("{} PDF detected — rendering first page", cyan("◆"));
        } else {
            eprintln!("{} Image input detected", cyan("◆"));
        }
    }

    fn on_decoded(&self, width: u32, height: u32) {
        eprintln!("  {} decoded at {width}x{height} px", dim("·"));
    }

    fn on_resized(&self, width: u32, height: u32) {
        eprintln!("  {} resized to {width}x{height} px", dim("·"));
    }

    fn on_encode_attempt(&self, quality: u8, size_kb: f64) {
        eprintln!(
            "  {} quality {:>3} → {}",
            dim("·"),
            quality,
            dim(&format!("{size_kb:>7.1} KB"))
        );
    }

    fn on_artifact_ready(&self, artifact: &NormalizedArtifact) {
        if artifact.budget.is_within_budget() {
            eprintln!(
                "{} Ready for OCR: {:.1} KB | quality {}",
                green("✓"),
                artifact.size_kb,
                artifact.quality
            );
        } else {
            eprintln!(
                "{} Size target missed — keeping {:.1} KB at quality {} and proceeding",
                cyan("⚠"),
                artifact.size_kb,
                artifact.quality
            );
        }
    }

    fn on_ocr_start(&self, engine: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(format!("Running {engine}…"));
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.spinner.lock().unwrap() = Some(bar);
    }

    fn on_ocr_complete(&self, results: usize) {
        if let Some(bar) = self.spinner.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        eprintln!("{} OCR complete: {} result(s)", green("✓"), results);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Prepare a PDF's first page and run OCR on it
  ocrprep scan.pdf

  # Image input with tighter limits
  ocrprep photo.jpg --max-dimension 1600 --max-size-kb 250

  # Prepare only — no OCR engine needed
  ocrprep scan.pdf --skip-ocr

  # Custom engine and machine-readable report
  ocrprep scan.pdf --ocr-command "paddleocr --lang en" --json

OCR ENGINE CONTRACT:
  The command receives the prepared JPEG path as its final argument and must
  print one JSON array of regions on stdout:
    [{"text": "…", "confidence": 0.97, "box": [[x,y],[x,y],[x,y],[x,y]]}]
  ("score" is accepted as an alias for "confidence".)
  A non-zero exit or unparseable output is reported but does not fail the
  run; the prepared artifact is kept either way.

SETUP:
  PDF input requires the pdfium shared library (libpdfium) to be installed
  where the dynamic loader can find it. Image-only use needs nothing extra.
"#;

/// Prepare a document page for OCR and run an external OCR engine on it.
#[derive(Parser, Debug)]
#[command(
    name = "ocrprep",
    version,
    about = "Prepare a document page (PDF or image) for OCR and run an external OCR engine",
    long_about = "Convert the first page of a PDF, or any common raster image, into a \
dimension- and size-constrained JPEG suitable for an OCR model, then run a configurable \
external OCR command on it and save the structured results.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF or image to prepare.
    input: PathBuf,

    /// Where the prepared JPEG is written (overwritten each run).
    #[arg(long, env = "OCRPREP_PREPARED", default_value = "ready_for_ocr.jpg")]
    prepared: PathBuf,

    /// Directory the OCR result files land in (created if absent).
    #[arg(short, long, env = "OCRPREP_OUTPUT_DIR", default_value = "./output")]
    output_dir: PathBuf,

    /// Maximum artifact width/height in pixels (larger inputs are downscaled).
    #[arg(long, env = "OCRPREP_MAX_DIMENSION", default_value_t = 2000)]
    max_dimension: u32,

    /// Target artifact size in kilobytes (soft limit).
    #[arg(long, env = "OCRPREP_MAX_SIZE_KB", default_value_t = 400.0)]
    max_size_kb: f64,

    /// First JPEG quality attempted (1–100).
    #[arg(long, env = "OCRPREP_INITIAL_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    initial_quality: u8,

    /// Quality decrement between encode attempts.
    #[arg(long, env = "OCRPREP_QUALITY_STEP", default_value_t = 5)]
    quality_step: u8,

    /// Quality floor the sweep never encodes at or below.
    #[arg(long, env = "OCRPREP_MIN_QUALITY", default_value_t = 10)]
    min_quality: u8,

    /// OCR command (program + args; the artifact path is appended).
    #[arg(long, env = "OCRPREP_OCR_COMMAND", default_value = "paddleocr")]
    ocr_command: String,

    /// Prepare the artifact only; skip the OCR invocation.
    #[arg(long, env = "OCRPREP_SKIP_OCR")]
    skip_ocr: bool,

    /// Print the run report as JSON on stdout instead of status lines.
    #[arg(long, env = "OCRPREP_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCRPREP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OCRPREP_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Status lines cover the interactive case; library INFO logs would
    // duplicate them, so they are filtered out unless --verbose.
    let show_status = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_status {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let budget = CompressionBudget::builder()
        .max_dimension(cli.max_dimension)
        .max_size_kb(cli.max_size_kb)
        .initial_quality(cli.initial_quality)
        .quality_step(cli.quality_step)
        .min_quality(cli.min_quality)
        .build()
        .context("Invalid compression budget")?;

    let mut builder = RunConfig::builder()
        .budget(budget)
        .artifact_path(&cli.prepared)
        .output_dir(&cli.output_dir);
    if show_status {
        builder = builder.progress(CliProgress::new() as Arc<dyn RunProgress>);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Prepare-only mode ────────────────────────────────────────────────
    if cli.skip_ocr {
        let artifact = prepare(&cli.input, &config).context("Preparation failed")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&artifact).context("Failed to serialise artifact")?
            );
        } else if !cli.quiet {
            eprintln!(
                "{} Prepared {}",
                green("✔"),
                bold(&artifact.path.display().to_string())
            );
        }
        return Ok(());
    }

    // ── Full run ─────────────────────────────────────────────────────────
    let engine = CommandEngine::from_command_line(&cli.ocr_command)
        .context("--ocr-command must name a program")?;

    let report = run(&cli.input, &config, &engine).context("Preparation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        match &report.ocr_error {
            None => eprintln!(
                "{} Done — {} result(s) in {}  {}",
                green("✔"),
                report.results_saved,
                bold(&cli.output_dir.display().to_string()),
                dim(&format!("{}ms total", report.stats.total_ms)),
            ),
            Some(e) => eprintln!(
                "{} OCR failed: {}\n  artifact kept at {}",
                red("✘"),
                e,
                bold(&report.artifact.path.display().to_string()),
            ),
        }
    }

    Ok(())
}
