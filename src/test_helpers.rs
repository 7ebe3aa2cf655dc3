//! Shared test utilities for the art-crop test suite.
//!
//! Builds synthetic contact sheets in memory so detector, extractor, and
//! pipeline tests never depend on fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut sheet = white_sheet(1200, 900);
//! draw_rect(&mut sheet, 100, 100, 400, 300);
//! let bytes = encode_png(&sheet);
//!
//! let output = process_image(&bytes, "sheet.png", &PipelineConfig::default()).unwrap();
//! assert_eq!(entry_names(output.archive.as_deref().unwrap()), vec!["sheet.png_artwork_1.jpg"]);
//! ```

use image::{Rgb, RgbImage};
use std::io::Cursor;

/// Fill colour for drawn artworks: dark enough to sit well under the default cutoff.
pub const INK: Rgb<u8> = Rgb([40, 40, 40]);

// =========================================================================
// Synthetic sheets
// =========================================================================

/// A uniformly white (background-only) scan.
pub fn white_sheet(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
}

/// Paint a solid dark rectangle. Pixels outside the image are skipped.
pub fn draw_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32) {
    let x_end = (x + width).min(image.width());
    let y_end = (y + height).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, INK);
        }
    }
}

/// A smooth colour ramp, useful where pixel content should be non-uniform.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

// =========================================================================
// Encoding and archive inspection
// =========================================================================

/// Encode as PNG (lossless, so thresholding sees exactly what was drawn).
pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Entry names of a ZIP blob, in stored order.
pub fn entry_names(archive: &[u8]) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}
