//! Nearest-neighbor resampling.
//!
//! For destination pixel `(x, y)` the source sample is
//! `(floor(x * src_w / dst_w), floor(y * src_h / dst_h))`, copied unmodified.
//! No interpolation, no gamma handling. The mapping is computed in integer
//! arithmetic, so it is exact for any size.
//!
//! This is deliberately not `image::imageops::resize` with
//! `FilterType::Nearest`: that filter samples pixel centers, which picks a
//! different source column for most sizes.

use super::backend::ImagingError;
use super::geometry::Dimensions;
use image::{DynamicImage, ImageBuffer, Pixel};

/// Resample `src` to exactly `target` using nearest-neighbor sampling.
///
/// The channel layout of `src` is preserved. Upscaling is not prevented here;
/// the caller decides the target. A zero target dimension is rejected.
pub fn scale(src: &DynamicImage, target: Dimensions) -> Result<DynamicImage, ImagingError> {
    if target.width == 0 || target.height == 0 {
        return Err(ImagingError::EmptyTarget(target));
    }
    if src.width() == 0 || src.height() == 0 {
        return Err(ImagingError::EmptySource);
    }

    let scaled = match src {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(scale_buffer(buf, target)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(scale_buffer(buf, target)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(scale_buffer(buf, target)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(scale_buffer(buf, target)),
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(scale_buffer(buf, target)),
        DynamicImage::ImageLumaA16(buf) => DynamicImage::ImageLumaA16(scale_buffer(buf, target)),
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(scale_buffer(buf, target)),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(scale_buffer(buf, target)),
        DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb32F(scale_buffer(buf, target)),
        DynamicImage::ImageRgba32F(buf) => DynamicImage::ImageRgba32F(scale_buffer(buf, target)),
        other => DynamicImage::ImageRgba8(scale_buffer(&other.to_rgba8(), target)),
    };
    Ok(scaled)
}

/// Nearest-neighbor resample of a typed buffer. `src` and `target` must both
/// be non-empty.
pub fn scale_buffer<P: Pixel>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    target: Dimensions,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let columns = sample_positions(src.width(), target.width);
    let rows = sample_positions(src.height(), target.height);

    ImageBuffer::from_fn(target.width, target.height, |x, y| {
        *src.get_pixel(columns[x as usize], rows[y as usize])
    })
}

/// Source index for each destination index along one axis.
fn sample_positions(source_len: u32, target_len: u32) -> Vec<u32> {
    let (source_len, target_len) = (source_len as u64, target_len as u64);
    (0..target_len)
        .map(|i| (i * source_len / target_len) as u32)
        .collect()
}
