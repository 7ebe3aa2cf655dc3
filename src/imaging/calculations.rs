//! Pure calculation functions for image dimensions and crop windows.
//!
//! All functions here are pure and testable without any I/O or images.

/// Pixel count of an image, widened so 16-bit-per-edge scans cannot overflow.
pub fn pixel_count(width: u32, height: u32) -> u64 {
    width as u64 * height as u64
}

/// Dimensions after scaling by `sqrt(target_pixels / pixel_count)`.
///
/// Each edge is floored and kept at least 1 pixel, so the result never
/// exceeds `target_pixels`.
///
/// # Examples
/// ```
/// # use art_crop::imaging::calculate_downsample_dimensions;
/// // 12000x12000 (144 MP) down to a 36 MP budget → 6000x6000
/// assert_eq!(calculate_downsample_dimensions((12_000, 12_000), 36_000_000), (6000, 6000));
/// ```
pub fn calculate_downsample_dimensions(source: (u32, u32), target_pixels: u64) -> (u32, u32) {
    let (w, h) = source;
    let pixels = pixel_count(w, h);
    if pixels <= target_pixels {
        return source;
    }

    let scale = (target_pixels as f64 / pixels as f64).sqrt();
    let scaled_w = ((w as f64 * scale).floor() as u32).max(1);
    let scaled_h = ((h as f64 * scale).floor() as u32).max(1);
    (scaled_w, scaled_h)
}

/// Dimensions that fit inside a `max_edge` square, preserving aspect ratio.
///
/// Returns `None` when the source already fits (shrink only, never enlarge).
pub fn calculate_fit_dimensions(source: (u32, u32), max_edge: u32) -> Option<(u32, u32)> {
    let (w, h) = source;
    let longer = w.max(h);
    if max_edge == 0 || longer <= max_edge {
        return None;
    }

    let ratio = max_edge as f64 / longer as f64;
    if w >= h {
        Some((max_edge, ((h as f64 * ratio).round() as u32).max(1)))
    } else {
        Some((((w as f64 * ratio).round() as u32).max(1), max_edge))
    }
}

/// A clamped crop window in image coordinates (half-open on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Extend a box downward by `factor` to take in a label strip, clamped to the image.
///
/// `extended = floor(height × factor)`, `y_end = min(y + extended, image_height)`.
/// Horizontal bounds are left untouched. Returns `None` when the clamped window
/// is empty or the box does not lie inside the image horizontally.
pub fn calculate_extended_window(
    bbox: (u32, u32, u32, u32),
    factor: f64,
    image: (u32, u32),
) -> Option<CropWindow> {
    let (x, y, w, h) = bbox;
    let (image_w, image_h) = image;

    let extended = (h as f64 * factor).floor() as u64;
    let y_end = (y as u64 + extended).min(image_h as u64);
    let x_end = x as u64 + w as u64;

    if y_end <= y as u64 || w == 0 || x_end > image_w as u64 {
        return None;
    }

    Some(CropWindow {
        x,
        y,
        width: w,
        height: (y_end - y as u64) as u32,
    })
}
