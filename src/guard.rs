//! Input guard: bound per-scan memory before the expensive stages run.
//!
//! Full-resolution contact-sheet scans can reach hundreds of megapixels.
//! The guard looks at the dimensions from the encoded header only and
//! decides, under the configured [`OversizePolicy`], whether the scan may be
//! decoded as-is, must be shrunk after decoding, or must be refused.
//! Under the downsample policy the full scan is still decoded once, so
//! `decode_max_pixels` caps what that policy will take on.
//!
//! The decision is a pure function ([`assess`]) so the ceiling boundary can
//! be tested without allocating real images; [`admit`] carries it out
//! against an [`ImageBackend`].

use crate::config::{GuardConfig, OversizePolicy};
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, calculate_downsample_dimensions,
    calculate_fit_dimensions,
};
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("image is {width}x{height} ({pixel_count} pixels), above the {max_pixels} pixel ceiling")]
    ResourceExceeded {
        width: u32,
        height: u32,
        pixel_count: u64,
        max_pixels: u64,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// What the guard will do with a scan of given dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Decode and use as-is.
    Accept,
    /// Decode, then resample to `(width, height)`.
    Shrink {
        width: u32,
        height: u32,
        /// True when the shrink came from the oversize policy (not just `max_dimension`).
        downsampled: bool,
    },
}

/// A decoded scan that passed the guard.
#[derive(Debug)]
pub struct AdmittedImage {
    pub image: RgbImage,
    /// Dimensions from the header, before any shrink.
    pub original: Dimensions,
    /// True when the oversize policy shrank the scan.
    pub downsampled: bool,
}

/// Decide what to do with a scan of `dims` under `config`. Pure.
///
/// `pixel_count == max_pixels` is accepted; `max_pixels + 1` is rejected or
/// downsampled per policy.
pub fn assess(dims: Dimensions, config: &GuardConfig) -> Result<GuardDecision, GuardError> {
    let pixel_count = dims.pixel_count();
    let source = (dims.width, dims.height);

    let exceeded = |max_pixels: u64| GuardError::ResourceExceeded {
        width: dims.width,
        height: dims.height,
        pixel_count,
        max_pixels,
    };

    let (target, downsampled) = if pixel_count > config.max_pixels {
        match config.oversize {
            OversizePolicy::Reject => return Err(exceeded(config.max_pixels)),
            OversizePolicy::Downsample if pixel_count > config.decode_max_pixels => {
                return Err(exceeded(config.decode_max_pixels));
            }
            OversizePolicy::Downsample => (
                calculate_downsample_dimensions(source, config.downsample_target_pixels),
                true,
            ),
        }
    } else {
        (source, false)
    };

    let target = config
        .max_dimension
        .and_then(|max_edge| calculate_fit_dimensions(target, max_edge))
        .unwrap_or(target);

    if target == source {
        Ok(GuardDecision::Accept)
    } else {
        Ok(GuardDecision::Shrink {
            width: target.0,
            height: target.1,
            downsampled,
        })
    }
}

/// Probe, assess, and decode `bytes`, shrinking once if the decision says so.
///
/// A rejected scan is never decoded.
pub fn admit(
    backend: &impl ImageBackend,
    bytes: &[u8],
    config: &GuardConfig,
) -> Result<AdmittedImage, GuardError> {
    let original = backend.probe(bytes)?;
    let decision = assess(original, config)?;
    tracing::debug!(
        width = original.width,
        height = original.height,
        ?decision,
        "input guard"
    );

    let decoded = backend.decode(bytes)?;
    match decision {
        GuardDecision::Accept => Ok(AdmittedImage {
            image: decoded,
            original,
            downsampled: false,
        }),
        GuardDecision::Shrink {
            width,
            height,
            downsampled,
        } => {
            let image = backend.resize(&decoded, width, height, config.resample)?;
            Ok(AdmittedImage {
                image,
                original,
                downsampled,
            })
        }
    }
}
