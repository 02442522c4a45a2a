//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Each file leads with its positional index and source-relative path; what
//! happened to it follows on indented context lines. Diagnostics from
//! `tracing` go to stderr and never mix with this listing.
//!
//! # Output Format
//!
//! ```text
//! Normalizing 4 files
//! 001 IMG_0042.jpg
//!     Success: scaled to 3:2 (1280x853 → 1279x853)
//!     → normalized/IMG_0042_1279x853.jpg
//! 002 day2/pano.png
//!     Already conforming (2100x900, 21:9)
//! 003 day2/notes.txt
//!     Unsupported format: .txt
//! 004 day2/broken.jpg
//!     Decode failure: unexpected end of file
//!
//! 1 changed, 1 unchanged, 1 skipped, 1 failed (4 files)
//! Log: normalized/image_process_log.csv
//! ```
//!
//! In a dry run the arrow line reads `→ would write ...`.
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::process::{ProcessEvent, ProcessReport};
use crate::types::ProcessingOutcome;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Status line with the dimensions that explain it.
///
/// ```text
/// Success: cropped to 16:9 (1280x853 → 1280x720)
/// Already conforming (1920x1080, 16:9)
/// No matching aspect ratio within tolerance (1000x700)
/// ```
fn outcome_line(outcome: &ProcessingOutcome) -> String {
    match outcome {
        ProcessingOutcome::Success { original, new, .. } => {
            format!("{} ({} \u{2192} {})", outcome, original, new)
        }
        ProcessingOutcome::AlreadyConforming { original, ratio }
        | ProcessingOutcome::NotAdjusted { original, ratio } => {
            format!("{} ({}, {})", outcome, original, ratio)
        }
        ProcessingOutcome::NoMatchingRatio { original } => format!("{} ({})", outcome, original),
        _ => outcome.to_string(),
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent, dry_run: bool) -> Vec<String> {
    match event {
        ProcessEvent::Started { total } => {
            let noun = if *total == 1 { "file" } else { "files" };
            let verb = if dry_run { "Checking" } else { "Normalizing" };
            vec![format!("{} {} {}", verb, total, noun)]
        }
        ProcessEvent::ImageProcessed {
            index,
            path,
            outcome,
            output,
            ..
        } => {
            let mut lines = vec![
                format!("{} {}", format_index(*index), display_path(path)),
                format!("{}{}", indent(1), outcome_line(outcome)),
            ];
            if let Some(out) = output {
                let prefix = if dry_run { "would write " } else { "" };
                lines.push(format!(
                    "{}\u{2192} {}{}",
                    indent(1),
                    prefix,
                    display_path(out)
                ));
            }
            lines
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format the end-of-run summary.
pub fn format_summary(report: &ProcessReport) -> Vec<String> {
    let summary = report.summary();
    let total = summary.total();
    let mut lines = vec![
        String::new(),
        format!(
            "{} changed, {} unchanged, {} skipped, {} failed ({} {})",
            summary.changed,
            summary.unchanged,
            summary.skipped,
            summary.failed,
            total,
            if total == 1 { "file" } else { "files" }
        ),
    ];
    if let Some(log) = &report.log_path {
        lines.push(format!("Log: {}", display_path(log)));
    }
    lines
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(report: &ProcessReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}
