//! Margin/boundary evaluation.

use crate::extract::PageInput;
use crate::model::{
    ContentBox, MarginSpec, Margins, PageGeometry, Rect, TargetMargins, Violation, ViolationKind,
};

/// Limits that content boxes must respect, tolerance included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginBox {
    pub left_bound: f32,
    pub right_bound: f32,
    /// Lower limit for `y0`
    pub bottom_bound: f32,
    /// Upper limit for `y1`
    pub top_bound: f32,
}

impl MarginBox {
    pub fn new(spec: &MarginSpec, geometry: &PageGeometry) -> Self {
        let eps = spec.tolerance;
        Self {
            left_bound: spec.left - eps,
            right_bound: geometry.width - spec.right + eps,
            bottom_bound: spec.bottom - eps,
            top_bound: geometry.height - spec.top + eps,
        }
    }

    /// Whether the rectangle crosses any bound.
    pub fn violated_by(&self, rect: &Rect) -> bool {
        rect.x0 < self.left_bound
            || rect.x1 > self.right_bound
            || rect.y0 < self.bottom_bound
            || rect.y1 > self.top_bound
    }
}

/// Result of checking a page's content against the margins.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsReport {
    pub text_in_bounds: bool,
    pub images_in_bounds: bool,
    /// First offending word and image, when either check failed
    pub violation: Option<Violation>,
}

impl BoundsReport {
    pub fn inside_borders(&self) -> bool {
        self.text_in_bounds && self.images_in_bounds
    }
}

/// Check words and images against the margin box. Blocks are ignored.
pub fn evaluate(input: &PageInput, spec: &MarginSpec) -> BoundsReport {
    let margin_box = MarginBox::new(spec, &input.geometry);

    // `find` stops at the first violation of each kind
    let bad_word = input.words().find(|b| margin_box.violated_by(&b.rect));
    let bad_image = input.images().find(|b| margin_box.violated_by(&b.rect));

    let kind = match (bad_word, bad_image) {
        (None, None) => None,
        (Some(_), None) => Some(ViolationKind::Text),
        (None, Some(_)) => Some(ViolationKind::Image),
        (Some(_), Some(_)) => Some(ViolationKind::TextAndImage),
    };
    let violation = kind.map(|kind| Violation {
        kind,
        text_box: bad_word.map(|b| b.rect),
        text: bad_word.and_then(|b| b.text.clone()),
        image_box: bad_image.map(|b| b.rect),
    });

    if let Some(v) = &violation {
        log::debug!(
            "Page {}: {:?} outside margins (word {:?}, image {:?})",
            input.geometry.page_number,
            v.kind,
            v.text,
            v.image_box
        );
    }

    BoundsReport {
        text_in_bounds: bad_word.is_none(),
        images_in_bounds: bad_image.is_none(),
        violation,
    }
}

/// Distance from the outermost content to each page edge, clamped at zero.
///
/// A page without content reports its full height for top and bottom and its
/// full width for left and right.
pub fn observed_margins(input: &PageInput) -> Margins {
    margins_of(&input.geometry, &input.boxes)
}

fn margins_of(geometry: &PageGeometry, boxes: &[ContentBox]) -> Margins {
    let initial = Margins::new(
        geometry.height,
        geometry.height,
        geometry.width,
        geometry.width,
    );
    let m = boxes.iter().fold(initial, |m, b| Margins {
        top: m.top.min(b.rect.y0),
        bottom: m.bottom.min(geometry.height - b.rect.y1),
        left: m.left.min(b.rect.x0),
        right: m.right.min(geometry.width - b.rect.x1),
    });
    Margins::new(
        m.top.max(0.0),
        m.bottom.max(0.0),
        m.left.max(0.0),
        m.right.max(0.0),
    )
}

/// Whether every observed side is within `tolerance` points of its target.
pub fn matches_target(observed: &Margins, target: &TargetMargins, tolerance: f32) -> bool {
    let target = target.to_points();
    (observed.top - target.top).abs() <= tolerance
        && (observed.bottom - target.bottom).abs() <= tolerance
        && (observed.left - target.left).abs() <= tolerance
        && (observed.right - target.right).abs() <= tolerance
}
