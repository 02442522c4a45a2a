//! Image processing: the normalization engine plus its codec backend.
//!
//! | Operation | Module / function |
//! |---|---|
//! | **Ratio match** | [`geometry::find_best_aspect_ratio`] |
//! | **Target size** | [`geometry::compute_target_dimensions`] |
//! | **Scale** | [`resample::scale`] (nearest-neighbor) |
//! | **Crop** | [`crop::crop_center`] |
//! | **Normalize** | [`normalize::normalize`] (decision + dispatch) |
//! | **Decode / encode** | [`RustBackend`] (`image` crate: JPEG, PNG, WebP) |
//!
//! The module is split into:
//! - **Geometry**: Pure functions for dimension math (unit testable)
//! - **Transforms**: Resample and crop, buffer in → new buffer out
//! - **Normalize**: The decision sequence tying geometry to the transforms
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod crop;
pub mod geometry;
pub mod normalize;
pub mod resample;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, ImagingError};
pub use crop::{crop_center, crop_origin};
pub use geometry::{
    AspectRatio, COMMON_RATIOS, Dimensions, compute_target_dimensions, find_best_aspect_ratio,
    find_best_aspect_ratio_in,
};
pub use normalize::{Tolerance, decide_adjustment, dimensions_of, normalize, normalize_with_catalog};
pub use resample::scale;
pub use rust_backend::RustBackend;
