//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader` with the format fixed by extension |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (RGB8 / L8) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (any 8/16-bit layout) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless, RGB8 / RGBA8) |
//!
//! The format is keyed on the file extension, not sniffed from content: a
//! `.png` that holds JPEG bytes is a decode failure.

use super::backend::{BackendError, ImageBackend};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Extensions with a compiled-in decoder and encoder.
const FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
];

/// Returns the lowercase file extensions this backend handles.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|(ext, _)| *ext)
}

/// Look up the image format for a path by its (case-insensitive) extension.
pub fn format_for_path(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?;
    FORMATS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, format)| *format)
}

/// `.ext` as written on disk, or `(none)`.
pub fn extension_label(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| "(none)".to_string())
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// JPEG has no alpha and no 16-bit support; flatten to 8-bit gray or RGB.
fn jpeg_compatible(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.clone(),
        DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
            DynamicImage::ImageLuma8(image.to_luma8())
        }
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

/// The WebP encoder only accepts 8-bit RGB and RGBA.
fn webp_compatible(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image.clone(),
        _ if image.color().has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

/// PNG handles 8 and 16-bit layouts; float buffers are narrowed to 16-bit.
fn png_compatible(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(image.to_rgb16()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(image.to_rgba16()),
        _ => image.clone(),
    }
}

impl ImageBackend for RustBackend {
    fn supports(&self, path: &Path) -> bool {
        format_for_path(path).is_some()
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        let format = format_for_path(path)
            .ok_or_else(|| BackendError::UnsupportedFormat(extension_label(path)))?;
        let file = File::open(path)?;
        let mut reader = ImageReader::new(BufReader::new(file));
        reader.set_format(format);
        reader.decode().map_err(|e| match e {
            image::ImageError::IoError(io) => BackendError::Io(io),
            other => BackendError::Decode(format!("{}: {}", path.display(), other)),
        })
    }

    /// A failed encode removes whatever it had written to `path`.
    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), BackendError> {
        let format = format_for_path(path)
            .ok_or_else(|| BackendError::UnsupportedFormat(extension_label(path)))?;
        let result = write_encoded(image, format, path);
        if result.is_err() {
            std::fs::remove_file(path).ok();
        }
        result
    }
}

fn write_encoded(image: &DynamicImage, format: ImageFormat, path: &Path) -> Result<(), BackendError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let result = match format {
        ImageFormat::Jpeg => jpeg_compatible(image).write_with_encoder(JpegEncoder::new(&mut writer)),
        ImageFormat::WebP => {
            webp_compatible(image).write_with_encoder(WebPEncoder::new_lossless(&mut writer))
        }
        _ => png_compatible(image).write_with_encoder(PngEncoder::new(&mut writer)),
    };

    result.map_err(|e| match e {
        image::ImageError::IoError(io) => BackendError::Io(io),
        other => BackendError::Encode(format!("{}: {}", path.display(), other)),
    })?;
    std::io::Write::flush(&mut writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{coordinate_image, gradient_rgb, write_test_jpeg};
    use image::GenericImageView;

    #[test]
    fn supported_extensions_cover_jpeg_png_webp() {
        let exts: Vec<&str> = supported_extensions().collect();
        for expected in ["jpg", "jpeg", "png", "webp"] {
            assert!(exts.contains(&expected), "expected {expected}");
        }
        assert!(!exts.contains(&"gif"));
    }

    #[test]
    fn format_lookup_is_case_insensitive() {
        assert_eq!(format_for_path(Path::new("a.JPG")), Some(ImageFormat::Jpeg));
        assert_eq!(format_for_path(Path::new("a.Jpeg")), Some(ImageFormat::Jpeg));
        assert_eq!(format_for_path(Path::new("a.PNG")), Some(ImageFormat::Png));
        assert_eq!(format_for_path(Path::new("a.webp")), Some(ImageFormat::WebP));
        assert_eq!(format_for_path(Path::new("a.tiff")), None);
        assert_eq!(format_for_path(Path::new("README")), None);
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        write_test_jpeg(&path, 200, 150);

        let img = RustBackend::new().decode(&path).unwrap();
        assert_eq!(img.dimensions(), (200, 150));
    }

    #[test]
    fn decode_nonexistent_file_is_io_error() {
        let result = RustBackend::new().decode(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let result = RustBackend::new().decode(&path);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_unsupported_extension() {
        let result = RustBackend::new().decode(Path::new("/tmp/anim.gif"));
        assert!(matches!(result, Err(BackendError::UnsupportedFormat(ext)) if ext == ".gif"));
    }

    #[test]
    fn encode_png_is_lossless() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let img = coordinate_image(33, 21);

        let backend = RustBackend::new();
        backend.encode(&img, &path).unwrap();
        let back = backend.decode(&path).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn encode_webp_lossless_keeps_pixels() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.webp");
        let img = gradient_rgb(40, 30);

        let backend = RustBackend::new();
        backend.encode(&img, &path).unwrap();
        let back = backend.decode(&path).unwrap();
        assert_eq!(back.dimensions(), (40, 30));
        assert_eq!(back.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn encode_jpeg_from_rgba_flattens() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.jpeg");
        let img = DynamicImage::new_rgba8(64, 48);

        let backend = RustBackend::new();
        backend.encode(&img, &path).unwrap();
        assert_eq!(backend.decode(&path).unwrap().dimensions(), (64, 48));
    }

    #[test]
    fn encode_failure_leaves_no_partial_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("wide_70000x1.jpg");
        // JPEG caps each side at 65535.
        let img = DynamicImage::new_luma8(70_000, 1);

        let result = RustBackend::new().encode(&img, &path);
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn encode_into_missing_directory_is_io_error() {
        let result = RustBackend::new().encode(
            &DynamicImage::new_rgb8(4, 4),
            Path::new("/nonexistent/dir/out.png"),
        );
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
