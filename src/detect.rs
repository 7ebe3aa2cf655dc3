//! Region detection: separate artwork from the scanning surface and trace
//! each artwork's outer boundary.
//!
//! ## Light-background assumption
//!
//! Detection thresholds luminance at a fixed cutoff (240 by default): any
//! pixel darker than the cutoff is foreground. This only works for sheets
//! scanned against a near-white surface, and the whole strategy depends on
//! it. The cutoff is a deployment setting, never adapted per image.
//!
//! ## Steps
//!
//! 1. RGB → luma (`image::imageops::grayscale`).
//! 2. Inverted binary threshold into a [`BinaryMask`].
//! 3. Border following (`imageproc::contours::find_contours`), keeping only
//!    outermost borders; holes and anything nested inside them are ignored.
//! 4. Each border is compressed to its corner points, then reduced to an
//!    axis-aligned box and the polygon's enclosed area.
//!
//! Output order is the order the border scan discovers contours in, unless
//! [`RegionOrder::Reading`] asks for a `(y, x)` sort.

use crate::config::{DetectionConfig, RegionOrder};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::point::Point;

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Single-channel foreground/background mask, same size as its source.
#[derive(Debug, Clone)]
pub struct BinaryMask(GrayImage);

impl BinaryMask {
    /// Threshold `image`: luma strictly below `cutoff` is foreground.
    pub fn from_rgb(image: &RgbImage, cutoff: u8) -> Self {
        let mut gray = image::imageops::grayscale(image);
        for px in gray.pixels_mut() {
            *px = Luma([if px.0[0] < cutoff { FOREGROUND } else { BACKGROUND }]);
        }
        Self(gray)
    }

    #[cfg(test)]
    fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == FOREGROUND
    }

    #[cfg(test)]
    fn foreground_count(&self) -> usize {
        self.0.pixels().filter(|p| p.0[0] == FOREGROUND).count()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }
}

/// A traced foreground component, reduced to what classification needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Enclosed polygon area of the traced boundary, not `width × height`.
    pub area: f64,
}

impl CandidateRegion {
    /// `width / height`. Height is never zero for a traced region.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// `(x, y, width, height)`.
    pub fn bbox(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }
}

/// Threshold `image` and trace its outermost foreground boundaries.
///
/// An all-background image yields an empty vector.
pub fn detect_regions(image: &RgbImage, config: &DetectionConfig) -> Vec<CandidateRegion> {
    let mask = BinaryMask::from_rgb(image, config.threshold);
    let mut regions = regions_from_mask(&mask);
    order_regions(&mut regions, config.order);
    regions
}

/// Reorder in place. Discovery order is left untouched.
pub fn order_regions(regions: &mut [CandidateRegion], order: RegionOrder) {
    if order == RegionOrder::Reading {
        regions.sort_by_key(|r| (r.y, r.x));
    }
}

/// Trace external contours of `mask` in discovery order.
///
/// The tracer runs on a copy framed by one background pixel on every side,
/// so shapes touching the image border are traced as outer boundaries too.
/// Points are shifted back into mask coordinates before measuring.
pub fn regions_from_mask(mask: &BinaryMask) -> Vec<CandidateRegion> {
    let padded = framed(mask.as_gray());
    find_contours::<i64>(&padded)
        .into_iter()
        .filter(is_external)
        .filter_map(|contour| {
            let points: Vec<Point<i64>> = contour
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            region_from_points(&compress_runs(&points))
        })
        .collect()
}

fn framed(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::from_pixel(w + 2, h + 2, Luma([BACKGROUND]));
    image::imageops::replace(&mut out, gray, 1, 1);
    out
}

fn is_external(contour: &Contour<i64>) -> bool {
    contour.border_type == BorderType::Outer && contour.parent.is_none()
}

/// Drop boundary points that continue a straight run, keeping only corners.
///
/// The boundary is treated as closed. Box and area are unchanged by this.
pub fn compress_runs(points: &[Point<i64>]) -> Vec<Point<i64>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let incoming = (cur.x - prev.x, cur.y - prev.y);
            let outgoing = (next.x - cur.x, next.y - cur.y);
            incoming != outgoing
        })
        .map(|i| points[i])
        .collect()
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point<i64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() as f64 / 2.0
}

fn region_from_points(points: &[Point<i64>]) -> Option<CandidateRegion> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;

    Some(CandidateRegion {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
        area: polygon_area(points),
    })
}
