//! Center cropping.

use super::backend::ImagingError;
use super::geometry::Dimensions;
use image::DynamicImage;

/// Top-left corner of a `target`-sized rectangle centered in `source`.
///
/// Offsets use truncating division, so an odd leftover puts the extra pixel
/// on the right/bottom edge.
pub fn crop_origin(source: Dimensions, target: Dimensions) -> Result<(u32, u32), ImagingError> {
    if target.width > source.width || target.height > source.height {
        return Err(ImagingError::CropTooLarge {
            available: source,
            requested: target,
        });
    }
    Ok((
        (source.width - target.width) / 2,
        (source.height - target.height) / 2,
    ))
}

/// Copy the centered `target`-sized region out of `src`.
///
/// Pixel values and channel layout are unchanged. Asking for a region larger
/// than the source on either axis is an error.
pub fn crop_center(src: &DynamicImage, target: Dimensions) -> Result<DynamicImage, ImagingError> {
    let source = Dimensions::new(src.width(), src.height());
    let (x, y) = crop_origin(source, target)?;
    Ok(src.crop_imm(x, y, target.width, target.height))
}
