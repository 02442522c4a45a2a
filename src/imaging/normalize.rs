//! Aspect-ratio normalization: pick a ratio, pick a size, scale or crop.
//!
//! ## Decision sequence
//!
//! ```text
//! dims ─▶ best catalog ratio within tolerance.ratio ──none──▶ NoMatchingRatio
//!                    │
//!                    ▼
//!          target = largest fit of ratio inside dims ──== dims──▶ AlreadyConforming
//!                    │
//!                    ▼
//!      width/height diffs vs tolerance.pixels
//!          both ≤   ─▶ Scale ─┐
//!          one ≤    ─▶ Crop  ─┼─▶ Success
//!          neither  ─▶ NotAdjusted
//! ```
//!
//! Scaling wins when both axes qualify: it keeps the whole scene and only
//! costs detail.
//!
//! Every branch that does not transform hands the source buffer back
//! untouched, so no encode work is wasted on an identical image.

use super::backend::ImagingError;
use super::crop::crop_center;
use super::geometry::{
    AspectRatio, COMMON_RATIOS, Dimensions, compute_target_dimensions, find_best_aspect_ratio_in,
};
use super::resample::scale;
use crate::types::{Adjustment, ProcessingOutcome};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Bounds for both comparisons the normalizer makes.
///
/// `ratio` is compared against `|w/h - catalog ratio|` when choosing a ratio.
/// `pixels` is compared against how many pixels each axis would lose when
/// choosing between scale and crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tolerance {
    pub ratio: f64,
    pub pixels: u32,
}

impl Tolerance {
    pub fn new(ratio: f64, pixels: u32) -> Self {
        Self { ratio, pixels }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            ratio: 0.05,
            pixels: 100,
        }
    }
}

/// Which transform (if any) brings `original` to `target`.
///
/// `None` means neither axis is within `pixel_tolerance`. A `target` larger
/// than `original` on an axis counts as a zero difference on that axis.
pub fn decide_adjustment(
    original: Dimensions,
    target: Dimensions,
    pixel_tolerance: u32,
) -> Option<Adjustment> {
    let width_diff = original.width.saturating_sub(target.width);
    let height_diff = original.height.saturating_sub(target.height);

    let width_fits = width_diff <= pixel_tolerance;
    let height_fits = height_diff <= pixel_tolerance;

    match (width_fits, height_fits) {
        (true, true) => Some(Adjustment::Scale),
        (true, false) | (false, true) => Some(Adjustment::Crop),
        (false, false) => None,
    }
}

/// Width and height of a decoded image.
pub fn dimensions_of(image: &DynamicImage) -> Dimensions {
    Dimensions::new(image.width(), image.height())
}

/// Normalize `src` against the default catalog.
pub fn normalize(
    src: DynamicImage,
    tolerance: Tolerance,
) -> Result<(DynamicImage, ProcessingOutcome), ImagingError> {
    normalize_with_catalog(src, tolerance, COMMON_RATIOS)
}

/// Normalize `src` against `catalog`, returning the (possibly unchanged)
/// buffer and the outcome.
///
/// Errors only surface contract violations from the transforms, which the
/// decision logic above rules out for any non-empty image.
pub fn normalize_with_catalog(
    src: DynamicImage,
    tolerance: Tolerance,
    catalog: &[AspectRatio],
) -> Result<(DynamicImage, ProcessingOutcome), ImagingError> {
    let original = dimensions_of(&src);

    let Some(ratio) = find_best_aspect_ratio_in(original, tolerance.ratio, catalog) else {
        tracing::debug!(%original, "no catalog ratio within tolerance");
        return Ok((src, ProcessingOutcome::NoMatchingRatio { original }));
    };

    let target = compute_target_dimensions(original, ratio);
    if target == original {
        tracing::debug!(%original, %ratio, "already conforming");
        return Ok((src, ProcessingOutcome::AlreadyConforming { original, ratio }));
    }

    let adjustment = if target.width == 0 || target.height == 0 {
        None
    } else {
        decide_adjustment(original, target, tolerance.pixels)
    };

    let Some(adjustment) = adjustment else {
        tracing::debug!(%original, %ratio, %target, "change exceeds pixel tolerance");
        return Ok((src, ProcessingOutcome::NotAdjusted { original, ratio }));
    };

    tracing::debug!(%original, %ratio, %target, ?adjustment, "adjusting");
    let adjusted = match adjustment {
        Adjustment::Scale => scale(&src, target)?,
        Adjustment::Crop => crop_center(&src, target)?,
    };

    Ok((
        adjusted,
        ProcessingOutcome::Success {
            original,
            ratio,
            new: target,
            adjustment,
        },
    ))
}
