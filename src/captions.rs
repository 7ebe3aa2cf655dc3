//! Slide-deck caption pairing.
//!
//! Contact sheets sometimes arrive as slide decks instead of scans: each
//! slide holds pictures with their labels typed in text boxes underneath.
//! This module pairs every picture with the text box that most plausibly
//! captions it and lays the results out as a new deck plan, one picture per
//! slide.
//!
//! The deck is an abstract shape model (positions and sizes in EMU, the
//! native slide-deck unit, 914 400 per inch). Reading and writing actual
//! deck files happens elsewhere; here the model is loaded from JSON.
//!
//! ## Pairing rule
//!
//! A text shape qualifies as the caption of a picture when:
//!
//! - its top edge is strictly below the picture's bottom edge, by less than
//!   [`MAX_VERTICAL_GAP`], and
//! - the horizontal distance between the two centres is less than
//!   [`MAX_HORIZONTAL_GAP`].
//!
//! Among qualifying shapes the one with the smallest
//! `vertical_gap + horizontal_gap` wins (first in document order on a tie).
//! A picture with no qualifying shape is labelled [`UNTITLED`].

use serde::{Deserialize, Serialize};

pub const EMU_PER_INCH: i64 = 914_400;

/// Exclusive upper bound on the gap between picture bottom and caption top.
pub const MAX_VERTICAL_GAP: i64 = 1_500_000;

/// Exclusive upper bound on the distance between picture and caption centres.
pub const MAX_HORIZONTAL_GAP: i64 = 300_000;

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Picture,
    Text,
}

/// One positioned shape on a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shape {
    pub kind: ShapeKind,
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    /// Text content; ignored for pictures.
    #[serde(default)]
    pub text: String,
    /// Optional identifier carried through to the plan (e.g. the image file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Shape {
    pub fn bottom(&self) -> i64 {
        self.top.saturating_add(self.height)
    }

    /// Twice the horizontal centre, keeping centre arithmetic in integers.
    /// Widened so any pair of i64 coordinates is representable.
    fn doubled_center_x(&self) -> i128 {
        2 * i128::from(self.left) + i128::from(self.width)
    }

    pub fn is_picture(&self) -> bool {
        self.kind == ShapeKind::Picture
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Slide {
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Deck {
    #[serde(default)]
    pub slides: Vec<Slide>,
}

// =============================================================================
// Pairing
// =============================================================================

/// Combined distance from `picture` to `text`, or `None` when `text` does
/// not qualify as its caption.
///
/// The value is doubled (`2 × vertical + 2 × horizontal`) so half-EMU centre
/// offsets compare exactly; ordering is unaffected.
pub fn caption_distance(picture: &Shape, text: &Shape) -> Option<i64> {
    let vertical =
        i128::from(text.top) - (i128::from(picture.top) + i128::from(picture.height));
    if vertical <= 0 || vertical >= i128::from(MAX_VERTICAL_GAP) {
        return None;
    }
    let doubled_horizontal = (text.doubled_center_x() - picture.doubled_center_x()).abs();
    if doubled_horizontal >= 2 * i128::from(MAX_HORIZONTAL_GAP) {
        return None;
    }
    i64::try_from(2 * vertical + doubled_horizontal).ok()
}

/// The text shape on the same slide that best captions `picture`.
pub fn nearest_caption<'a>(picture: &Shape, shapes: &'a [Shape]) -> Option<&'a Shape> {
    shapes
        .iter()
        .filter(|s| s.kind == ShapeKind::Text)
        .filter_map(|s| caption_distance(picture, s).map(|d| (d, s)))
        .min_by_key(|(d, _)| *d)
        .map(|(_, s)| s)
}

/// Resolved label for `picture`: the nearest caption's trimmed text, or
/// [`UNTITLED`] when there is none or it is blank.
pub fn caption_label(picture: &Shape, shapes: &[Shape]) -> String {
    nearest_caption(picture, shapes)
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string()
}

// =============================================================================
// Layout plan
// =============================================================================

/// Geometry of the generated slides, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckLayout {
    pub picture_width: i64,
    pub left: i64,
    pub top: i64,
    pub caption_gap: i64,
    pub caption_height: i64,
}

impl Default for DeckLayout {
    fn default() -> Self {
        Self {
            picture_width: 6 * EMU_PER_INCH,
            left: EMU_PER_INCH,
            top: EMU_PER_INCH / 2,
            caption_gap: EMU_PER_INCH / 5,
            caption_height: EMU_PER_INCH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// One output slide: a scaled picture with its label underneath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlidePlan {
    /// 1-based slide the picture came from.
    pub source_slide: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_name: Option<String>,
    pub picture: Placement,
    pub caption: Placement,
    pub label: String,
}

/// Height after scaling `picture` to `width`, preserving its aspect ratio.
pub fn scaled_height(picture: &Shape, width: i64) -> i64 {
    if picture.width <= 0 {
        return picture.height.max(0);
    }
    let scaled = i128::from(picture.height) * i128::from(width) / i128::from(picture.width);
    scaled.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn plan_slide(
    source_slide: usize,
    picture: &Shape,
    shapes: &[Shape],
    layout: &DeckLayout,
) -> SlidePlan {
    let picture_box = Placement {
        left: layout.left,
        top: layout.top,
        width: layout.picture_width,
        height: scaled_height(picture, layout.picture_width),
    };
    let caption_box = Placement {
        left: layout.left,
        top: picture_box
            .top
            .saturating_add(picture_box.height)
            .saturating_add(layout.caption_gap),
        width: layout.picture_width,
        height: layout.caption_height,
    };
    SlidePlan {
        source_slide,
        picture_name: picture.name.clone(),
        picture: picture_box,
        caption: caption_box,
        label: caption_label(picture, shapes),
    }
}

/// One slide per picture, in deck order, each paired with its caption.
pub fn plan_deck(deck: &Deck, layout: &DeckLayout) -> Vec<SlidePlan> {
    let plans: Vec<SlidePlan> = deck
        .slides
        .iter()
        .enumerate()
        .flat_map(|(i, slide)| {
            slide
                .shapes
                .iter()
                .filter(|s| s.is_picture())
                .map(move |p| plan_slide(i + 1, p, &slide.shapes, layout))
        })
        .collect();

    let untitled = plans.iter().filter(|p| p.label == UNTITLED).count();
    tracing::debug!(
        slides = deck.slides.len(),
        pictures = plans.len(),
        untitled,
        "planned caption deck"
    );
    plans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture(left: i64, top: i64, width: i64, height: i64) -> Shape {
        Shape {
            kind: ShapeKind::Picture,
            left,
            top,
            width,
            height,
            text: String::new(),
            name: None,
        }
    }

    fn text(left: i64, top: i64, width: i64, label: &str) -> Shape {
        Shape {
            kind: ShapeKind::Text,
            left,
            top,
            width,
            height: 300_000,
            text: label.to_string(),
            name: None,
        }
    }

    // =========================================================================
    // caption_distance
    // =========================================================================

    #[test]
    fn text_just_below_qualifies() {
        let pic = picture(1_000_000, 1_000_000, 2_000_000, 2_000_000);
        let caption = text(1_000_000, 3_100_000, 2_000_000, "Dawn");
        // vertical 100_000, centres aligned
        assert_eq!(caption_distance(&pic, &caption), Some(200_000));
    }

    #[test]
    fn touching_text_does_not_qualify() {
        let pic = picture(0, 0, 1_000_000, 1_000_000);
        assert_eq!(caption_distance(&pic, &text(0, 1_000_000, 1_000_000, "x")), None);
    }

    #[test]
    fn text_above_does_not_qualify() {
        let pic = picture(0, 1_000_000, 1_000_000, 1_000_000);
        assert_eq!(caption_distance(&pic, &text(0, 0, 1_000_000, "x")), None);
    }

    #[test]
    fn vertical_gap_bound_is_exclusive() {
        let pic = picture(0, 0, 1_000_000, 1_000_000);
        let at_bound = text(0, 1_000_000 + MAX_VERTICAL_GAP, 1_000_000, "x");
        let inside = text(0, 1_000_000 + MAX_VERTICAL_GAP - 1, 1_000_000, "x");
        assert_eq!(caption_distance(&pic, &at_bound), None);
        assert!(caption_distance(&pic, &inside).is_some());
    }

    #[test]
    fn horizontal_gap_bound_is_exclusive() {
        let pic = picture(0, 0, 1_000_000, 1_000_000);
        let at_bound = text(MAX_HORIZONTAL_GAP, 1_100_000, 1_000_000, "x");
        let inside = text(MAX_HORIZONTAL_GAP - 1, 1_100_000, 1_000_000, "x");
        assert_eq!(caption_distance(&pic, &at_bound), None);
        assert!(caption_distance(&pic, &inside).is_some());
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let pic = picture(i64::MAX, i64::MAX, i64::MAX, i64::MAX);
        assert_eq!(caption_distance(&pic, &text(i64::MIN, i64::MIN, i64::MAX, "x")), None);

        let low = picture(i64::MIN, 0, i64::MAX, 1_000_000);
        assert_eq!(caption_distance(&low, &text(i64::MAX, 1_100_000, i64::MAX, "x")), None);

        let tall = picture(0, 0, 1, i64::MAX);
        let plans = plan_deck(
            &Deck {
                slides: vec![Slide { shapes: vec![tall] }],
            },
            &DeckLayout::default(),
        );
        assert_eq!(plans[0].picture.height, i64::MAX);
        assert_eq!(plans[0].caption.top, i64::MAX);
    }

    #[test]
    fn half_emu_centre_offsets_compare_exactly() {
        let pic = picture(0, 0, 1_000_001, 1_000_000);
        // centres differ by 299_999.5
        let caption = text(300_000, 1_100_000, 1_000_000, "x");
        assert!(caption_distance(&pic, &caption).is_some());
    }

    // =========================================================================
    // nearest_caption / caption_label
    // =========================================================================

    #[test]
    fn picks_smallest_combined_gap() {
        let pic = picture(0, 0, 2_000_000, 2_000_000);
        let shapes = vec![
            text(0, 2_800_000, 2_000_000, "far"),
            text(100_000, 2_200_000, 2_000_000, "near"),
            text(0, 2_400_000, 2_000_000, "middle"),
        ];
        assert_eq!(nearest_caption(&pic, &shapes).unwrap().text, "near");
    }

    #[test]
    fn ignores_other_pictures() {
        let pic = picture(0, 0, 1_000_000, 1_000_000);
        let shapes = vec![pic.clone(), picture(0, 1_100_000, 1_000_000, 1_000_000)];
        assert!(nearest_caption(&pic, &shapes).is_none());
    }

    #[test]
    fn tie_goes_to_first_shape() {
        let pic = picture(0, 0, 1_000_000, 1_000_000);
        let shapes = vec![
            text(100_000, 1_100_000, 1_000_000, "right"),
            text(-100_000, 1_100_000, 1_000_000, "left"),
        ];
        assert_eq!(caption_label(&pic, &shapes), "right");
    }

    #[test]
    fn no_candidate_is_untitled() {
        let pic = picture(0, 0, 1_000_000, 1_000_000);
        let shapes = vec![text(5_000_000, 1_100_000, 1_000_000, "elsewhere")];
        assert_eq!(caption_label(&pic, &shapes), UNTITLED);
    }

    #[test]
    fn blank_caption_is_untitled() {
        let pic = picture(0, 0, 1_000_000, 1_000_000);
        let shapes = vec![text(0, 1_100_000, 1_000_000, "   ")];
        assert_eq!(caption_label(&pic, &shapes), UNTITLED);
    }

    #[test]
    fn label_is_trimmed() {
        let pic = picture(0, 0, 1_000_000, 1_000_000);
        let shapes = vec![text(0, 1_100_000, 1_000_000, "  Still Life, 1954\n")];
        assert_eq!(caption_label(&pic, &shapes), "Still Life, 1954");
    }

    // =========================================================================
    // plan_deck
    // =========================================================================

    #[test]
    fn scaled_height_preserves_aspect() {
        let pic = picture(0, 0, 2_000_000, 1_000_000);
        assert_eq!(scaled_height(&pic, 5_486_400), 2_743_200);
    }

    #[test]
    fn scaled_height_with_zero_width() {
        let pic = picture(0, 0, 0, 500);
        assert_eq!(scaled_height(&pic, 5_486_400), 500);
    }

    #[test]
    fn default_layout_in_emu() {
        let layout = DeckLayout::default();
        assert_eq!(layout.picture_width, 5_486_400);
        assert_eq!(layout.left, 914_400);
        assert_eq!(layout.top, 457_200);
        assert_eq!(layout.caption_gap, 182_880);
    }

    #[test]
    fn one_plan_per_picture_in_deck_order() {
        let deck = Deck {
            slides: vec![
                Slide {
                    shapes: vec![
                        picture(0, 0, 1_000_000, 1_000_000),
                        text(0, 1_100_000, 1_000_000, "A"),
                        picture(3_000_000, 0, 1_000_000, 1_000_000),
                        text(3_000_000, 1_100_000, 1_000_000, "B"),
                    ],
                },
                Slide { shapes: vec![] },
                Slide {
                    shapes: vec![
                        text(0, 1_100_000, 1_000_000, "caption on slide 3"),
                        picture(8_000_000, 0, 1_000_000, 1_000_000),
                    ],
                },
            ],
        };

        let plans = plan_deck(&deck, &DeckLayout::default());
        let labels: Vec<&str> = plans.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", UNTITLED]);
        assert_eq!(plans[2].source_slide, 3);
    }

    #[test]
    fn captions_never_cross_slides() {
        let deck = Deck {
            slides: vec![
                Slide {
                    shapes: vec![picture(0, 0, 1_000_000, 1_000_000)],
                },
                Slide {
                    shapes: vec![text(0, 1_100_000, 1_000_000, "other slide")],
                },
            ],
        };
        let plans = plan_deck(&deck, &DeckLayout::default());
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].label, UNTITLED);
    }

    #[test]
    fn caption_box_sits_below_picture() {
        let deck = Deck {
            slides: vec![Slide {
                shapes: vec![picture(0, 0, 4_000_000, 3_000_000)],
            }],
        };
        let plan = &plan_deck(&deck, &DeckLayout::default())[0];
        assert_eq!(plan.picture.height, 4_114_800);
        assert_eq!(plan.caption.top, 457_200 + 4_114_800 + 182_880);
        assert_eq!(plan.caption.left, plan.picture.left);
        assert_eq!(plan.caption.height, 914_400);
    }

    #[test]
    fn deck_parses_from_json() {
        let json = r#"{
            "slides": [{
                "shapes": [
                    {"kind": "picture", "left": 0, "top": 0, "width": 100, "height": 80, "name": "img1.png"},
                    {"kind": "text", "left": 0, "top": 90, "width": 100, "height": 20, "text": "Label"}
                ]
            }]
        }"#;
        let deck: Deck = serde_json::from_str(json).unwrap();
        assert_eq!(deck.slides[0].shapes.len(), 2);
        assert_eq!(deck.slides[0].shapes[0].name.as_deref(), Some("img1.png"));

        let plans = plan_deck(&deck, &DeckLayout::default());
        assert_eq!(plans[0].label, "Label");
        assert_eq!(plans[0].picture_name.as_deref(), Some("img1.png"));
    }

    #[test]
    fn unknown_shape_field_rejected() {
        let json = r#"{"kind": "text", "left": 0, "top": 0, "width": 1, "height": 1, "colour": "red"}"#;
        assert!(serde_json::from_str::<Shape>(json).is_err());
    }
}
