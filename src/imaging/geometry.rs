//! Pure dimension math: aspect-ratio matching and target sizes.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Rounding
//!
//! Target dimensions are truncated toward zero. The products are computed in
//! 64-bit integer arithmetic (`height * w / h`), which equals flooring the real
//! quotient exactly. Going through `f64` would produce off-by-one results on
//! exact matches (`1080.0 * (16.0 / 9.0)` is `1919.999…`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, or `None` for a zero height.
    pub fn ratio_value(self) -> Option<f64> {
        (self.height != 0).then(|| self.width as f64 / self.height as f64)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// A catalog aspect ratio as an integer `width:height` pair.
///
/// Pairs are kept exactly as listed (not reduced), so `16:9` and `32:18` are
/// distinct entries that happen to have the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[u32; 2]", from = "[u32; 2]")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// The `0:0` "no match" marker, used only for display and serialization.
    /// Lookups return `Option<AspectRatio>` instead.
    pub const NONE: AspectRatio = AspectRatio::new(0, 0);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Ratio as a real number, or `None` if either component is zero.
    pub fn value(self) -> Option<f64> {
        (self.width != 0 && self.height != 0).then(|| self.width as f64 / self.height as f64)
    }

    pub fn is_none(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl From<[u32; 2]> for AspectRatio {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<AspectRatio> for [u32; 2] {
    fn from(ratio: AspectRatio) -> Self {
        [ratio.width, ratio.height]
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = String;

    /// Parse `W:H` (also accepts `WxH` and `W/H`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once([':', 'x', '/'])
            .ok_or_else(|| format!("expected W:H, got '{s}'"))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid ratio width '{w}'"))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid ratio height '{h}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("ratio components must be non-zero, got '{s}'"));
        }
        Ok(Self { width, height })
    }
}

/// The default catalog, in tie-break order.
pub const COMMON_RATIOS: &[AspectRatio] = &[
    AspectRatio::new(1, 1),
    AspectRatio::new(4, 3),
    AspectRatio::new(3, 2),
    AspectRatio::new(16, 9),
    AspectRatio::new(21, 9),
    AspectRatio::new(9, 16),
];

/// Largest dimensions with the given aspect ratio that fit inside `original`.
///
/// Each axis is capped by the corresponding original dimension, so the result
/// never exceeds the original on either axis.
///
/// ```
/// # use img_normalizer::imaging::{compute_target_dimensions, AspectRatio, Dimensions};
/// // 1000x500 to 16:9: height stays, width shrinks to 888
/// assert_eq!(
///     compute_target_dimensions(Dimensions::new(1000, 500), AspectRatio::new(16, 9)),
///     Dimensions::new(888, 500)
/// );
/// ```
pub fn compute_target_dimensions(original: Dimensions, ratio: AspectRatio) -> Dimensions {
    if ratio.is_none() {
        return original;
    }
    let (w, h) = (original.width as u64, original.height as u64);
    let (rw, rh) = (ratio.width as u64, ratio.height as u64);

    let candidate_w = w.min(h * rw / rh);
    let candidate_h = h.min(w * rh / rw);

    // Both candidates are bounded by the u32 originals.
    Dimensions {
        width: candidate_w as u32,
        height: candidate_h as u32,
    }
}

/// Closest ratio from [`COMMON_RATIOS`] within `tolerance`.
pub fn find_best_aspect_ratio(original: Dimensions, tolerance: f64) -> Option<AspectRatio> {
    find_best_aspect_ratio_in(original, tolerance, COMMON_RATIOS)
}

/// Closest ratio from `catalog` whose value is within `tolerance` of the
/// image's width/height.
///
/// Distance is `|w/h - ratio|`. The smallest distance wins; on a tie the entry
/// listed first wins. Returns `None` when nothing is eligible, when the image
/// has a zero height, or when `tolerance` is negative or NaN.
pub fn find_best_aspect_ratio_in(
    original: Dimensions,
    tolerance: f64,
    catalog: &[AspectRatio],
) -> Option<AspectRatio> {
    let actual = original.ratio_value()?;

    let mut best: Option<(AspectRatio, f64)> = None;
    for &ratio in catalog {
        let Some(value) = ratio.value() else {
            continue;
        };
        let diff = (actual - value).abs();
        if diff > tolerance || diff.is_nan() || tolerance.is_nan() {
            continue;
        }
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((ratio, diff)),
        }
    }

    best.map(|(ratio, _)| ratio)
}
