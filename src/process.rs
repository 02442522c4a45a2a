//! Batch driver: walk the source, normalize every image, mirror the results.
//!
//! ## Pipeline
//!
//! ```text
//! scan(source)          → sorted file list (destination pruned)
//!   └─ par_iter         → per file: supports? → decode → normalize → write
//! collect (in order)    → ProcessReport
//! report::write_log     → dest/image_process_log.csv
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! normalized/
//! ├── image_process_log.csv
//! ├── IMG_0042_1279x853.jpg        # scaled to 3:2
//! └── day2/
//!     ├── pano_2100x900.png        # scaled to 21:9
//!     └── square.jpg               # copied verbatim (copy_unchanged = true)
//! ```
//!
//! ## Failure Model
//!
//! Per-file problems never abort the batch. They become a
//! [`ProcessingOutcome`] on that file's entry and a warning in the
//! diagnostics. Only a missing source, an unusable destination root, or a
//! log that cannot be written end the run with a [`ProcessError`].
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon). The
//! report keeps discovery order regardless of completion order. Progress
//! events are sent as each file finishes, so their order varies.

use crate::config::{LogConfig, NormalizerConfig};
use crate::imaging::rust_backend::extension_label;
use crate::imaging::{
    AspectRatio, BackendError, ImageBackend, RustBackend, Tolerance, normalize_with_catalog,
};
use crate::naming::{adjusted_output_path, mirrored_path};
use crate::report::{self, ReportError};
use crate::scan::{self, ScanError, SourceFile, Unreadable};
use crate::types::{OutcomeKind, ProcessingOutcome};
use image::DynamicImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Cannot create destination {0}: {1}")]
    CreateDestination(PathBuf, #[source] std::io::Error),
    #[error("Destination must differ from source: {0}")]
    DestinationIsSource(PathBuf),
    #[error("Writing processing log failed: {0}")]
    Log(#[from] ReportError),
}

/// Everything the driver needs for one run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// A single image or a directory walked recursively.
    pub source: PathBuf,
    /// Root of the mirrored output tree; the log is written here too.
    pub dest: PathBuf,
    pub tolerance: Tolerance,
    /// Candidate ratios in tie-break order.
    pub catalog: Vec<AspectRatio>,
    pub copy_unchanged: bool,
    pub log: LogConfig,
    /// Decode and decide only; nothing is written.
    pub dry_run: bool,
}

impl ProcessOptions {
    /// Build options from a resolved config.
    pub fn from_config(
        source: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        config: &NormalizerConfig,
    ) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            tolerance: config.tolerance,
            catalog: config.catalog.ratios.clone(),
            copy_unchanged: config.output.copy_unchanged,
            log: config.log.clone(),
            dry_run: false,
        }
    }
}

/// Progress events, sent as each file finishes.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        total: usize,
    },
    ImageProcessed {
        /// 1-based position in discovery order.
        index: usize,
        total: usize,
        path: PathBuf,
        outcome: ProcessingOutcome,
        output: Option<PathBuf>,
    },
}

/// One source file and what became of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub outcome: ProcessingOutcome,
    /// Written file (or, in a dry run, where it would have been written).
    pub output_path: Option<PathBuf>,
}

/// Per-category outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.changed + self.unchanged + self.skipped + self.failed
    }
}

#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Entries in discovery (sorted path) order.
    pub files: Vec<ProcessedFile>,
    /// Where the processing log was written; `None` for dry runs.
    pub log_path: Option<PathBuf>,
}

impl ProcessReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for file in &self.files {
            match file.outcome.kind() {
                OutcomeKind::Changed => summary.changed += 1,
                OutcomeKind::Unchanged => summary.unchanged += 1,
                OutcomeKind::Skipped => summary.skipped += 1,
                OutcomeKind::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

/// Run a batch with the built-in `image` crate backend.
pub fn process(
    options: &ProcessOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessReport, ProcessError> {
    process_with_backend(&RustBackend::new(), options, events)
}

/// Run a batch using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    options: &ProcessOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessReport, ProcessError> {
    if !options.source.exists() {
        return Err(ScanError::SourceNotFound(options.source.clone()).into());
    }
    if same_location(&options.source, &options.dest) {
        return Err(ProcessError::DestinationIsSource(options.dest.clone()));
    }
    if !options.dry_run {
        std::fs::create_dir_all(&options.dest)
            .map_err(|e| ProcessError::CreateDestination(options.dest.clone(), e))?;
    }

    let scan = scan::scan(&options.source, Some(&options.dest))?;
    let total = scan.files.len() + scan.unreadable.len();
    tracing::debug!(
        source = %options.source.display(),
        files = total,
        "scanned source"
    );

    let notify = |event: ProcessEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };
    notify(ProcessEvent::Started { total });

    let mut files: Vec<ProcessedFile> = scan
        .files
        .par_iter()
        .enumerate()
        .map(|(i, file)| {
            let processed = process_file(backend, options, file);
            if let Some(tx) = &events {
                tx.send(ProcessEvent::ImageProcessed {
                    index: i + 1,
                    total,
                    path: processed.relative_path.clone(),
                    outcome: processed.outcome.clone(),
                    output: processed.output_path.clone(),
                })
                .ok();
            }
            processed
        })
        .collect();

    let offset = files.len();
    for (i, entry) in scan.unreadable.iter().enumerate() {
        let processed = unreadable_entry(&options.source, entry);
        notify(ProcessEvent::ImageProcessed {
            index: offset + i + 1,
            total,
            path: processed.relative_path.clone(),
            outcome: processed.outcome.clone(),
            output: None,
        });
        files.push(processed);
    }
    if offset < files.len() {
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    }

    let log_path = if options.dry_run {
        None
    } else {
        Some(report::write_log(&files, &options.dest, &options.log)?)
    };

    Ok(ProcessReport { files, log_path })
}

fn process_file(
    backend: &impl ImageBackend,
    options: &ProcessOptions,
    file: &SourceFile,
) -> ProcessedFile {
    let (outcome, output_path) = normalize_file(backend, options, file);
    match &outcome {
        outcome if outcome.is_failure() => {
            tracing::warn!(path = %file.path.display(), %outcome, "image not processed");
        }
        ProcessingOutcome::Success { .. } if !options.dry_run => {
            if let Some(out) = &output_path {
                tracing::info!(path = %file.path.display(), output = %out.display(), %outcome, "wrote image");
            }
        }
        _ => {}
    }
    ProcessedFile {
        source_path: file.path.clone(),
        relative_path: file.relative_path.clone(),
        outcome,
        output_path,
    }
}

fn normalize_file(
    backend: &impl ImageBackend,
    options: &ProcessOptions,
    file: &SourceFile,
) -> (ProcessingOutcome, Option<PathBuf>) {
    if !backend.supports(&file.path) {
        return (
            ProcessingOutcome::UnsupportedFormat {
                extension: extension_label(&file.path),
            },
            None,
        );
    }

    let image = match backend.decode(&file.path) {
        Ok(image) => image,
        Err(e) => return (backend_failure(e), None),
    };

    let (adjusted, outcome) =
        match normalize_with_catalog(image, options.tolerance, &options.catalog) {
            Ok(result) => result,
            Err(e) => {
                return (
                    ProcessingOutcome::TransformFailure {
                        reason: e.to_string(),
                    },
                    None,
                );
            }
        };

    match outcome {
        ProcessingOutcome::Success { new, .. } => {
            let out = adjusted_output_path(&options.dest, &file.relative_path, new);
            if options.dry_run {
                return (outcome, Some(out));
            }
            match write_adjusted(backend, &adjusted, &out) {
                Ok(()) => (outcome, Some(out)),
                Err(e) => (backend_failure(e), None),
            }
        }
        ProcessingOutcome::AlreadyConforming { .. } | ProcessingOutcome::NotAdjusted { .. }
            if options.copy_unchanged =>
        {
            let out = mirrored_path(&options.dest, &file.relative_path);
            // A file source inside the destination root mirrors onto itself.
            if options.dry_run || same_location(&file.path, &out) {
                return (outcome, Some(out));
            }
            match copy_verbatim(&file.path, &out) {
                Ok(()) => (outcome, Some(out)),
                Err(e) => (
                    ProcessingOutcome::IoFailure {
                        reason: e.to_string(),
                    },
                    None,
                ),
            }
        }
        outcome => (outcome, None),
    }
}

fn write_adjusted(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    output: &Path,
) -> Result<(), BackendError> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    backend.encode(image, output)
}

fn copy_verbatim(source: &Path, output: &Path) -> std::io::Result<()> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if let Err(e) = std::fs::copy(source, output) {
        std::fs::remove_file(output).ok();
        return Err(e);
    }
    Ok(())
}

fn backend_failure(err: BackendError) -> ProcessingOutcome {
    match err {
        BackendError::Io(e) => ProcessingOutcome::IoFailure {
            reason: e.to_string(),
        },
        BackendError::Decode(reason) => ProcessingOutcome::DecodeFailure { reason },
        BackendError::Encode(reason) => ProcessingOutcome::IoFailure { reason },
        BackendError::UnsupportedFormat(extension) => {
            ProcessingOutcome::UnsupportedFormat { extension }
        }
    }
}

fn unreadable_entry(source: &Path, entry: &Unreadable) -> ProcessedFile {
    tracing::warn!(path = %entry.relative_path.display(), reason = %entry.reason, "unreadable");
    ProcessedFile {
        source_path: source.join(&entry.relative_path),
        relative_path: entry.relative_path.clone(),
        outcome: ProcessingOutcome::IoFailure {
            reason: entry.reason.clone(),
        },
        output_path: None,
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
