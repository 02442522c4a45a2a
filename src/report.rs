//! Processing log writer.
//!
//! One row per source file, in processing order, written to the destination
//! root as CSV (default) or JSON.
//!
//! ## CSV
//!
//! ```text
//! Image Path,Original Dimensions,Chosen Aspect Ratio,New Dimensions,Status
//! shoot/a.jpg,1280x853,3:2,1279x853,Success: scaled to 3:2
//! shoot/b.png,1920x1080,16:9,,Already conforming
//! shoot/d.jpg,1000x700,0:0,,No matching aspect ratio within tolerance
//! shoot/c.gif,,,,Unsupported format: .gif
//! ```
//!
//! New dimensions are only filled in for changed images. A decoded image with
//! no catalog match shows the ratio as `0:0`. Fields containing a comma,
//! quote, or line break are quoted per RFC 4180.
//!
//! ## JSON
//!
//! An array of objects with the same five columns as snake_case keys, plus
//! the structured outcome under `outcome`.

use crate::config::{LogConfig, LogFormat};
use crate::imaging::AspectRatio;
use crate::process::ProcessedFile;
use crate::types::ProcessingOutcome;
use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub const CSV_HEADER: [&str; 5] = [
    "Image Path",
    "Original Dimensions",
    "Chosen Aspect Ratio",
    "New Dimensions",
    "Status",
];

/// One log row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub image_path: String,
    pub original_dimensions: String,
    pub chosen_aspect_ratio: String,
    pub new_dimensions: String,
    pub status: String,
    pub outcome: ProcessingOutcome,
}

impl From<&ProcessedFile> for LogEntry {
    fn from(file: &ProcessedFile) -> Self {
        let outcome = &file.outcome;
        let chosen_aspect_ratio = match outcome {
            ProcessingOutcome::NoMatchingRatio { .. } => AspectRatio::NONE.to_string(),
            _ => outcome.ratio().map(|r| r.to_string()).unwrap_or_default(),
        };
        Self {
            image_path: file.source_path.display().to_string(),
            original_dimensions: outcome
                .original()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            chosen_aspect_ratio,
            new_dimensions: outcome
                .new_dimensions()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            status: outcome.status(),
            outcome: outcome.clone(),
        }
    }
}

impl LogEntry {
    fn csv_fields(&self) -> [&str; 5] {
        [
            self.image_path.as_str(),
            self.original_dimensions.as_str(),
            self.chosen_aspect_ratio.as_str(),
            self.new_dimensions.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn csv_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(csv_field)
        .collect::<Vec<_>>()
        .join(",")
}

/// Render entries as CSV text, header included, `\n` line endings.
pub fn format_csv(entries: &[LogEntry]) -> String {
    let mut out = csv_row(CSV_HEADER);
    out.push('\n');
    for entry in entries {
        out.push_str(&csv_row(entry.csv_fields()));
        out.push('\n');
    }
    out
}

/// Render entries as a pretty-printed JSON array.
pub fn format_json(entries: &[LogEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// Write the log for `files` into `dest_root`, returning its path.
pub fn write_log(
    files: &[ProcessedFile],
    dest_root: &Path,
    config: &LogConfig,
) -> Result<PathBuf, ReportError> {
    let entries: Vec<LogEntry> = files.iter().map(LogEntry::from).collect();
    let content = match config.format {
        LogFormat::Csv => format_csv(&entries),
        LogFormat::Json => format_json(&entries)?,
    };
    let path = dest_root.join(config.file_name());
    std::fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), rows = entries.len(), "wrote processing log");
    Ok(path)
}
