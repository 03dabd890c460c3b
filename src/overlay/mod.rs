//! Margin-guide overlays for pages that break the margins.
//!
//! [`annotations_for`] decides what to draw; [`compose`] writes the
//! annotated copy of the document.

mod compositor;

pub use compositor::{compose, overlay_stream};

use crate::model::{DocumentAnalysis, MarginSpec, PageAnalysis, Rect, ViolationKind};

/// Stroke color of a margin guide, chosen by what broke the margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeColor {
    /// Text outside the margins
    Red,
    /// Images outside the margins
    Green,
    /// Both
    Orange,
}

impl StrokeColor {
    pub fn for_violation(kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::Text => StrokeColor::Red,
            ViolationKind::Image => StrokeColor::Green,
            ViolationKind::TextAndImage => StrokeColor::Orange,
        }
    }

    /// DeviceRGB components.
    pub fn rgb(&self) -> (f32, f32, f32) {
        match self {
            StrokeColor::Red => (1.0, 0.0, 0.0),
            StrokeColor::Green => (0.0, 1.0, 0.0),
            StrokeColor::Orange => (1.0, 0.5, 0.0),
        }
    }
}

/// One margin guide to draw on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAnnotation {
    pub page_number: u32,
    /// Guide rectangle in display space (top-left origin, points)
    pub rect: Rect,
    pub color: StrokeColor,
}

/// Guides for every analysed page that is not inside the margins. Failed
/// pages get none.
pub fn annotations_for(analysis: &DocumentAnalysis, spec: &MarginSpec) -> Vec<OverlayAnnotation> {
    analysis
        .pages()
        .iter()
        .filter(|page| !page.is_failed() && !page.inside_borders())
        .map(|page| OverlayAnnotation {
            page_number: page.page_number(),
            rect: spec.guide_rect(&page.geometry()),
            color: StrokeColor::for_violation(violation_kind(page)),
        })
        .collect()
}

fn violation_kind(page: &PageAnalysis) -> ViolationKind {
    if let Some(violation) = page.violation() {
        return violation.kind;
    }
    match (page.text_in_bounds(), page.images_in_bounds()) {
        (false, true) => ViolationKind::Text,
        (true, false) => ViolationKind::Image,
        _ => ViolationKind::TextAndImage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditOptions, Auditor};
    use crate::extract::{MemorySource, RawPage};

    #[test]
    fn test_annotations_only_for_violations() {
        let source = MemorySource::new(vec![
            RawPage::letter(1).with_word("inside", 150.0, 150.0, 200.0, 162.0),
            RawPage::letter(2).with_word("edge", 5.0, 150.0, 40.0, 162.0),
            RawPage::letter(3)
                .with_word("inside", 150.0, 150.0, 200.0, 162.0)
                .with_image(0.0, 0.0, 600.0, 100.0),
            RawPage::letter(4)
                .with_word("edge", 5.0, 150.0, 40.0, 162.0)
                .with_image(0.0, 0.0, 600.0, 100.0),
            RawPage::new(5, -1.0, 792.0),
        ]);
        let spec = MarginSpec::default();
        let analysis = Auditor::new(AuditOptions::new().with_margins(spec))
            .unwrap()
            .audit(&source)
            .unwrap();

        let annotations = annotations_for(&analysis, &spec);
        let pages: Vec<u32> = annotations.iter().map(|a| a.page_number).collect();
        assert_eq!(pages, vec![2, 3, 4]);
        assert_eq!(annotations[0].color, StrokeColor::Red);
        assert_eq!(annotations[1].color, StrokeColor::Green);
        assert_eq!(annotations[2].color, StrokeColor::Orange);
        assert_eq!(annotations[0].rect, Rect::new(108.0, 72.0, 540.0, 720.0));
    }

    #[test]
    fn test_colors() {
        assert_eq!(StrokeColor::Red.rgb(), (1.0, 0.0, 0.0));
        assert_eq!(StrokeColor::Green.rgb(), (0.0, 1.0, 0.0));
        assert_eq!(
            StrokeColor::for_violation(ViolationKind::TextAndImage),
            StrokeColor::Orange
        );
    }
}
