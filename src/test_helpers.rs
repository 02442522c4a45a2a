//! Shared test utilities for the img-normalizer test suite.
//!
//! Provides synthetic image builders, on-disk fixture writers, and lookup
//! helpers over processing reports.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_test_jpeg(&tmp.path().join("a.jpg"), 1280, 853);
//!
//! let report = process(&options, None).unwrap();
//! let entry = find_entry(&report, "a.jpg");
//! assert!(matches!(entry.outcome, ProcessingOutcome::Success { .. }));
//! ```

use image::{DynamicImage, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

use crate::process::{ProcessReport, ProcessedFile};

// =========================================================================
// In-memory images
// =========================================================================

/// A single-color RGBA8 image.
pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

/// RGB16 image whose pixel at `(x, y)` is `[x, y, 0]`.
///
/// Lets tests read back exactly which source pixel landed where.
pub fn coordinate_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb16(image::ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([x as u16, y as u16, 0])
    }))
}

/// RGB8 gradient, varied enough that codecs cannot collapse it.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// Write a small valid JPEG with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    let img = gradient_rgb(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(
            img.as_bytes(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

/// Write arbitrary bytes, creating parent directories.
pub fn write_bytes(path: &Path, bytes: &[u8]) {
    ensure_parent(path);
    std::fs::write(path, bytes).unwrap();
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}

// =========================================================================
// Report lookups (panic with a clear message on miss)
// =========================================================================

/// Find a report entry by source file name. Panics if not found.
pub fn find_entry<'a>(report: &'a ProcessReport, file_name: &str) -> &'a ProcessedFile {
    report
        .files
        .iter()
        .find(|f| f.relative_path.file_name().is_some_and(|n| n == file_name))
        .unwrap_or_else(|| {
            let names: Vec<String> = report
                .files
                .iter()
                .map(|f| f.relative_path.display().to_string())
                .collect();
            panic!("entry '{file_name}' not found. Available: {names:?}")
        })
}

/// All relative source paths in report order.
pub fn entry_paths(report: &ProcessReport) -> Vec<String> {
    report
        .files
        .iter()
        .map(|f| f.relative_path.to_string_lossy().replace('\\', "/"))
        .collect()
}
