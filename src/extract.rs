//! Region extraction: cut each accepted region out of the scan.
//!
//! The crop window keeps the box's horizontal span and extends it downward
//! by `label_extension` (1.2× by default) so the printed label under an
//! artwork comes along with it. The extension is clamped to the bottom of
//! the scan and never reads past any edge.

use crate::detect::CandidateRegion;
use crate::imaging::{CropWindow, calculate_extended_window};
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("crop window for box {width}x{height} at ({x}, {y}) is empty or outside the image")]
    EmptyWindow {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// A classified region with its clamped, label-extended crop window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptedRegion {
    pub region: CandidateRegion,
    pub window: CropWindow,
}

impl AcceptedRegion {
    /// Height of the crop after extension and clamping.
    pub fn extended_height(&self) -> u32 {
        self.window.height
    }
}

/// An owned copy of one artwork's pixels. Later changes to the scan do not
/// reach it.
#[derive(Debug, Clone)]
pub struct CroppedArtwork {
    pub region: AcceptedRegion,
    pub image: RgbImage,
}

/// Compute the crop window for `region` inside an image of `image_dims`.
pub fn plan_crop(
    region: CandidateRegion,
    label_extension: f64,
    image_dims: (u32, u32),
) -> Result<AcceptedRegion, ExtractError> {
    let window = calculate_extended_window(region.bbox(), label_extension, image_dims).ok_or(
        ExtractError::EmptyWindow {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
        },
    )?;
    Ok(AcceptedRegion { region, window })
}

/// Copy the pixels under `accepted.window` out of `image`.
pub fn extract(image: &RgbImage, accepted: AcceptedRegion) -> CroppedArtwork {
    let CropWindow {
        x,
        y,
        width,
        height,
    } = accepted.window;
    let pixels = image::imageops::crop_imm(image, x, y, width, height).to_image();
    CroppedArtwork {
        region: accepted,
        image: pixels,
    }
}

/// Plan and extract every region against the same scan, in order.
pub fn extract_all(
    image: &RgbImage,
    regions: &[CandidateRegion],
    label_extension: f64,
) -> Result<Vec<CroppedArtwork>, ExtractError> {
    regions
        .iter()
        .map(|&region| {
            plan_crop(region, label_extension, image.dimensions()).map(|a| extract(image, a))
        })
        .collect()
}
