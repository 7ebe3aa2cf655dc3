//! Region classification: reject candidates that are unlikely to be artworks.
//!
//! A candidate is accepted only if every predicate holds:
//!
//! | Predicate | Default | Rejects |
//! |---|---|---|
//! | `area > min_area` | 5000 px | dust, speckles, scan noise |
//! | `min_aspect < w/h < max_aspect` | 0.5 – 2.5 | slivers |
//! | `width > min_width && height > min_height` | 100 px | thin border lines with large area |
//!
//! [`classify`] is pure: same inputs, same verdict, no side effects.

use crate::config::ClassifierConfig;
use crate::detect::CandidateRegion;

/// Why a candidate was rejected. The first failing predicate wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooSmallArea,
    AspectOutOfRange,
    BelowMinimumSize,
}

/// Classify a candidate against the configured thresholds.
pub fn classify(region: &CandidateRegion, config: &ClassifierConfig) -> Result<(), Rejection> {
    if !(region.area > config.min_area) {
        return Err(Rejection::TooSmallArea);
    }
    let aspect = region.aspect_ratio();
    if !(aspect > config.min_aspect && aspect < config.max_aspect) {
        return Err(Rejection::AspectOutOfRange);
    }
    if !(region.width > config.min_width && region.height > config.min_height) {
        return Err(Rejection::BelowMinimumSize);
    }
    Ok(())
}

/// Keep accepted candidates, preserving their order.
pub fn accepted_regions(
    candidates: Vec<CandidateRegion>,
    config: &ClassifierConfig,
) -> Vec<CandidateRegion> {
    candidates
        .into_iter()
        .filter(|region| match classify(region, config) {
            Ok(()) => true,
            Err(reason) => {
                tracing::trace!(bbox = ?region.bbox(), area = region.area, ?reason, "rejected");
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(region: &CandidateRegion, config: &ClassifierConfig) -> bool {
        classify(region, config).is_ok()
    }

    fn region(width: u32, height: u32, area: f64) -> CandidateRegion {
        CandidateRegion {
            x: 0,
            y: 0,
            width,
            height,
            area,
        }
    }

    fn defaults() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    #[test]
    fn accepts_typical_artwork() {
        assert!(accepts(&region(400, 300, 119_301.0), &defaults()));
    }

    #[test]
    fn area_threshold_is_strict() {
        assert_eq!(
            classify(&region(200, 200, 5000.0), &defaults()),
            Err(Rejection::TooSmallArea)
        );
        assert!(accepts(&region(200, 200, 5000.5), &defaults()));
    }

    #[test]
    fn aspect_bounds_are_strict() {
        // 0.5 exactly
        assert_eq!(
            classify(&region(150, 300, 40_000.0), &defaults()),
            Err(Rejection::AspectOutOfRange)
        );
        // 2.5 exactly
        assert_eq!(
            classify(&region(500, 200, 90_000.0), &defaults()),
            Err(Rejection::AspectOutOfRange)
        );
        assert!(accepts(&region(499, 200, 90_000.0), &defaults()));
    }

    #[test]
    fn size_floor_is_strict() {
        assert_eq!(
            classify(&region(100, 120, 11_000.0), &defaults()),
            Err(Rejection::BelowMinimumSize)
        );
        assert!(accepts(&region(101, 120, 11_000.0), &defaults()));
    }

    #[test]
    fn small_shape_fails_on_area_first() {
        // 50x40 filled: boundary area 49 * 39
        assert_eq!(
            classify(&region(50, 40, 1911.0), &defaults()),
            Err(Rejection::TooSmallArea)
        );
    }

    #[test]
    fn nan_area_is_rejected() {
        assert!(!accepts(&region(300, 300, f64::NAN), &defaults()));
    }

    #[test]
    fn classification_is_deterministic() {
        let r = region(333, 222, 60_000.0);
        let config = defaults();
        let first = classify(&r, &config);
        for _ in 0..10 {
            assert_eq!(classify(&r, &config), first);
        }
    }

    #[test]
    fn custom_thresholds_apply() {
        let config = ClassifierConfig {
            min_area: 100.0,
            min_width: 10,
            min_height: 10,
            ..defaults()
        };
        assert!(accepts(&region(50, 40, 1911.0), &config));
    }

    #[test]
    fn accepted_regions_preserves_order() {
        let candidates = vec![
            region(400, 300, 119_301.0),
            region(50, 40, 1911.0),
            region(500, 350, 174_151.0),
        ];
        let kept = accepted_regions(candidates, &defaults());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].width, 400);
        assert_eq!(kept[1].width, 500);
    }
}
