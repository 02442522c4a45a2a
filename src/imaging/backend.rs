//! Image codec backend trait and shared error types.
//!
//! The [`ImageBackend`] trait covers the two operations the batch driver needs
//! from a codec: decode a file into a pixel buffer and encode a buffer back to
//! a file. Everything between those two calls is pure and lives in
//! [`normalize`](super::normalize).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust JPEG, PNG and WebP codecs.

use super::geometry::Dimensions;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

/// Failures reading or writing image files.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Contract violations in the pure pixel transforms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImagingError {
    #[error("target dimensions {0} have a zero side")]
    EmptyTarget(Dimensions),
    #[error("source image has no pixels")]
    EmptySource,
    #[error("crop {requested} does not fit inside {available}")]
    CropTooLarge {
        available: Dimensions,
        requested: Dimensions,
    },
}

/// Trait for image codec backends.
///
/// Implementations must be `Sync`: the batch driver shares one backend across
/// the rayon pool.
pub trait ImageBackend: Sync {
    /// Whether `path` has an extension this backend can decode and encode.
    fn supports(&self, path: &Path) -> bool;

    /// Read and decode an image file.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode `image` to `path`, choosing the format from the extension.
    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), BackendError>;
}
