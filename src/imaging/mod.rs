//! Image codec and dimension math.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::ImageReader::into_dimensions` |
//! | **Decode** | `image` crate → RGB8 |
//! | **Resize** | `imageops::resize` (Lanczos3 by default) |
//! | **Encode** | `JpegEncoder` with configurable quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and crop-window math (unit testable)
//! - **Parameters**: Quality and resample filter types
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    CropWindow, calculate_downsample_dimensions, calculate_extended_window,
    calculate_fit_dimensions, pixel_count,
};
pub use params::{Quality, ResampleFilter};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
