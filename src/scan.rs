//! Source discovery.
//!
//! Turns the `--source` argument into the ordered list of files to process.
//!
//! ## Source Shapes
//!
//! ```text
//! photo.jpg                 → [photo.jpg]                   (relative: photo.jpg)
//! shoot/                    → every file below shoot/, sorted (relative to shoot/)
//! ├── a.jpg                     a.jpg
//! ├── notes.txt                 notes.txt   (reported later as unsupported)
//! └── day2/
//!     └── b.png                 day2/b.png
//! ```
//!
//! Every regular file is returned, not only images: the batch driver reports
//! unsupported extensions in the log rather than hiding them.
//!
//! When the destination lives inside the source tree it is pruned from the
//! walk, so a re-run never picks up its own outputs or log.
//!
//! Unreadable entries (permission denied, broken links) do not abort the walk.
//! They are collected in [`Scan::unreadable`] and reported per path.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),
}

/// A file found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path to read from.
    pub path: PathBuf,
    /// Path relative to the source root; mirrored under the destination.
    pub relative_path: PathBuf,
}

/// A path the walk could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unreadable {
    pub relative_path: PathBuf,
    pub reason: String,
}

/// Result of walking a source path.
#[derive(Debug, Default)]
pub struct Scan {
    /// Regular files in sorted path order.
    pub files: Vec<SourceFile>,
    pub unreadable: Vec<Unreadable>,
}

/// Discover all files at `source`, skipping anything under `exclude`.
///
/// A file source yields exactly that file. A directory source is walked
/// recursively in file-name order.
pub fn scan(source: &Path, exclude: Option<&Path>) -> Result<Scan, ScanError> {
    if !source.exists() {
        return Err(ScanError::SourceNotFound(source.to_path_buf()));
    }

    if source.is_file() {
        let name = source
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| source.to_path_buf());
        return Ok(Scan {
            files: vec![SourceFile {
                path: source.to_path_buf(),
                relative_path: name,
            }],
            unreadable: Vec::new(),
        });
    }

    let root = source.canonicalize()?;
    let exclude = exclude
        .and_then(|p| p.canonicalize().ok())
        .filter(|p| p != &root);

    let mut result = Scan::default();
    let walker = WalkDir::new(&root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match &exclude {
            Some(excluded) => !entry.path().starts_with(excluded),
            None => true,
        });

    for entry in walker {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative_path = relative_to(entry.path(), &root);
                result.files.push(SourceFile {
                    path: source.join(&relative_path),
                    relative_path,
                });
            }
            Err(err) => {
                let relative_path = err
                    .path()
                    .map(|p| relative_to(p, &root))
                    .unwrap_or_default();
                tracing::warn!(path = %relative_path.display(), error = %err, "unreadable entry");
                result.unreadable.push(Unreadable {
                    relative_path,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(result)
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
