//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations the pipeline needs
//! from a codec: probe, decode, resize, and encode. Probing reads only the
//! encoded header so the input guard can refuse an oversized scan before a
//! single pixel is decoded.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) on the `image` crate.

use super::params::{Quality, ResampleFilter};
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of a probe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn pixel_count(self) -> u64 {
        super::calculations::pixel_count(self.width, self.height)
    }
}

/// Trait for image codec backends.
///
/// Implementations must be `Sync` so a single backend can be shared across
/// the batch driver's rayon workers.
pub trait ImageBackend: Sync {
    /// Read pixel dimensions from the encoded header without decoding.
    fn probe(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Fully decode to 8-bit RGB.
    fn decode(&self, bytes: &[u8]) -> Result<RgbImage, BackendError>;

    /// Resample to exactly `width` x `height`, producing a new buffer.
    fn resize(
        &self,
        image: &RgbImage,
        width: u32,
        height: u32,
        filter: ResampleFilter,
    ) -> Result<RgbImage, BackendError>;

    /// Encode as baseline JPEG.
    fn encode_jpeg(&self, image: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError>;
}
