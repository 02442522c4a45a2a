//! Output file naming and destination mirroring.
//!
//! A changed image keeps its relative directory and gets its new size spliced
//! into the file name, before the extension:
//!
//! ```text
//! source/day2/IMG_0042.JPG  (1280x853 → 1280x720)
//! dest/day2/IMG_0042_1280x720.JPG
//! ```
//!
//! Unchanged images copied with `output.copy_unchanged` keep their name
//! exactly.

use crate::imaging::Dimensions;
use std::path::{Path, PathBuf};

/// `<stem>_<W>x<H>.<ext>` for a source file name.
///
/// Only the last extension is treated as the extension, and its case is kept:
///
/// - `dawn.jpg` → `dawn_1280x720.jpg`
/// - `scan.2024.PNG` → `scan.2024_1280x720.PNG`
/// - `README` → `README_1280x720`
pub fn output_file_name(source_name: &Path, size: Dimensions) -> String {
    let stem = source_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match source_name.extension() {
        Some(ext) => format!("{}_{}.{}", stem, size, ext.to_string_lossy()),
        None => format!("{}_{}", stem, size),
    }
}

/// Where a file with the given source-relative path lands under `dest_root`.
pub fn mirrored_path(dest_root: &Path, relative_path: &Path) -> PathBuf {
    dest_root.join(relative_path)
}

/// Destination path for a changed image.
pub fn adjusted_output_path(dest_root: &Path, relative_path: &Path, size: Dimensions) -> PathBuf {
    let file_name = relative_path
        .file_name()
        .map(Path::new)
        .unwrap_or(relative_path);
    let dir = relative_path.parent().unwrap_or(Path::new(""));
    dest_root
        .join(dir)
        .join(output_file_name(file_name, size))
}
