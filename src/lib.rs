//! # img-normalizer
//!
//! Batch-normalizes photographs to a small catalog of standard aspect ratios.
//! Each image is matched to the nearest catalog ratio, then either scaled or
//! center-cropped to fit it, and the result is written into a mirrored output
//! tree together with a log of what happened to every file.
//!
//! # Architecture
//!
//! ```text
//! scan      source/  →  sorted file list      (walkdir)
//! process   files    →  ProcessReport         (decode → normalize → encode, rayon)
//! report    report   →  image_process_log.csv (or .json)
//! ```
//!
//! The normalization core in [`imaging`] is pure: it takes a decoded buffer
//! plus tolerances and returns a new buffer plus a [`types::ProcessingOutcome`].
//! Everything that touches the filesystem lives in [`process`], [`scan`] and
//! [`report`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Ratio matching, target sizing, nearest-neighbor scale, center crop, codec backend |
//! | [`types`] | `ProcessingOutcome` and `Adjustment`, shared by every stage |
//! | [`scan`] | Walks the source into a sorted file list, pruning the destination |
//! | [`process`] | Batch driver: per-file pipeline, parallel fan-out, progress events |
//! | [`naming`] | `<stem>_<W>x<H>.<ext>` output names and the mirrored tree |
//! | [`report`] | CSV / JSON processing log |
//! | [`config`] | `normalizer.toml` loading, merging, and validation |
//! | [`output`] | Human-facing progress listing and summary |
//! | [`logging`] | `tracing` subscriber setup for diagnostics on stderr |
//!
//! # Design Decisions
//!
//! ## Downscale Only
//!
//! Target dimensions never exceed the original on either axis: one axis is
//! always kept and the other is truncated to match the ratio. No pixel is ever
//! invented, so scaling is a plain nearest-neighbor sample and cropping never
//! needs padding.
//!
//! ## Two Tolerances
//!
//! A ratio tolerance decides which catalog entries are eligible at all
//! (`|w/h - ratio|`). A separate pixel tolerance decides between scaling and
//! cropping: if neither axis moves by more than that many pixels the image is
//! scaled, otherwise it is cropped so content is not visibly squashed.
//!
//! ## Failures Are Data
//!
//! A bad file never stops a batch. Unsupported extensions, corrupt images and
//! unwritable outputs all become outcomes in the log; only a missing source or
//! an unusable destination root ends a run early.

pub mod config;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod process;
pub mod report;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
