//! Per-page audit results.

use serde::{Deserialize, Serialize};

use super::geometry::{Orientation, PageGeometry, Rect};
use super::margins::Margins;

/// How a printed page number is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageNumberKind {
    Digit,
    Roman,
}

/// Where a printed page number was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageNumberLocation {
    Top,
    Bottom,
    #[default]
    None,
}

/// Result of the page-number search on one page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageNumberDetection {
    pub found: bool,
    /// The matched text, cleaned of surrounding dots, dashes and spaces
    pub value: Option<String>,
    pub kind: Option<PageNumberKind>,
    pub location: PageNumberLocation,
    /// Width of the winning band, in inches
    pub band_width: Option<f32>,
}

impl PageNumberDetection {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn found(
        value: impl Into<String>,
        kind: PageNumberKind,
        location: PageNumberLocation,
        band_width: f32,
    ) -> Self {
        Self {
            found: true,
            value: Some(value.into()),
            kind: Some(kind),
            location,
            band_width: Some(band_width),
        }
    }

    /// The detected number as an integer, for digit page numbers.
    pub fn numeric_value(&self) -> Option<u32> {
        match self.kind {
            Some(PageNumberKind::Digit) => self.value.as_deref()?.parse().ok(),
            _ => None,
        }
    }
}

/// Best-effort single/double-sided layout guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Single,
    Double,
    #[default]
    Unknown,
}

/// Which content kinds broke the margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Text,
    Image,
    TextAndImage,
}

/// First offending boxes on a page that failed the margin check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_box: Option<Rect>,
    /// Text of the offending word
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_box: Option<Rect>,
}

/// A latitude/longitude pair found in the page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoTag {
    pub latitude: String,
    pub longitude: String,
}

/// Independent signals computed for one page, before aggregation.
#[derive(Debug, Clone)]
pub struct PageSignals {
    pub geometry: PageGeometry,
    pub margins: Margins,
    pub text_in_bounds: bool,
    pub images_in_bounds: bool,
    pub violation: Option<Violation>,
    pub is_blank: bool,
    pub side: Side,
    pub text_percentage: f32,
    pub page_number_detection: PageNumberDetection,
    pub geo_tag_matches: Vec<GeoTag>,
    pub matches_target_margins: Option<bool>,
}

/// The audit record for one page. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageAnalysis {
    page_number: u32,
    width: f32,
    height: f32,
    rotation: u16,
    margins: Margins,
    inside_borders: bool,
    text_in_bounds: bool,
    images_in_bounds: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    violation: Option<Violation>,
    is_blank: bool,
    orientation: Orientation,
    side: Side,
    text_percentage: f32,
    page_number_detection: PageNumberDetection,
    geo_tag_matches: Vec<GeoTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches_target_margins: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    flagged: bool,
}

impl PageAnalysis {
    /// Merge the page's signals. `flagged` is derived here and nowhere else.
    pub(crate) fn from_signals(signals: PageSignals) -> Self {
        let inside_borders = signals.text_in_bounds && signals.images_in_bounds;
        let margins = Margins {
            top: signals.margins.top.max(0.0),
            bottom: signals.margins.bottom.max(0.0),
            left: signals.margins.left.max(0.0),
            right: signals.margins.right.max(0.0),
        };
        Self {
            page_number: signals.geometry.page_number,
            width: signals.geometry.width,
            height: signals.geometry.height,
            rotation: signals.geometry.rotation,
            margins,
            inside_borders,
            text_in_bounds: signals.text_in_bounds,
            images_in_bounds: signals.images_in_bounds,
            violation: signals.violation,
            is_blank: signals.is_blank,
            orientation: signals.geometry.orientation(),
            side: signals.side,
            text_percentage: signals.text_percentage.clamp(0.0, 100.0),
            page_number_detection: signals.page_number_detection,
            geo_tag_matches: signals.geo_tag_matches,
            matches_target_margins: signals.matches_target_margins,
            error: None,
            flagged: flag(signals.is_blank, inside_borders),
        }
    }

    /// Record for a page whose analysis failed. It is treated as outside the
    /// margins so that it gets flagged for review.
    pub(crate) fn failed(page_number: u32, reason: impl Into<String>) -> Self {
        let is_blank = false;
        let inside_borders = false;
        Self {
            page_number,
            width: 0.0,
            height: 0.0,
            rotation: 0,
            margins: Margins::default(),
            inside_borders,
            text_in_bounds: false,
            images_in_bounds: false,
            violation: None,
            is_blank,
            orientation: Orientation::Portrait,
            side: Side::Unknown,
            text_percentage: 0.0,
            page_number_detection: PageNumberDetection::not_found(),
            geo_tag_matches: Vec::new(),
            matches_target_margins: None,
            error: Some(reason.into()),
            flagged: flag(is_blank, inside_borders),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Visible page size in points.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn margins(&self) -> &Margins {
        &self.margins
    }

    pub fn inside_borders(&self) -> bool {
        self.inside_borders
    }

    pub fn text_in_bounds(&self) -> bool {
        self.text_in_bounds
    }

    pub fn images_in_bounds(&self) -> bool {
        self.images_in_bounds
    }

    pub fn violation(&self) -> Option<&Violation> {
        self.violation.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.is_blank
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn text_percentage(&self) -> f32 {
        self.text_percentage
    }

    pub fn page_number_detection(&self) -> &PageNumberDetection {
        &self.page_number_detection
    }

    pub fn is_page_numbered(&self) -> bool {
        self.page_number_detection.found
    }

    pub fn geo_tag_matches(&self) -> &[GeoTag] {
        &self.geo_tag_matches
    }

    pub fn matches_target_margins(&self) -> Option<bool> {
        self.matches_target_margins
    }

    /// Failure reason, when the page could not be analysed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn flagged(&self) -> bool {
        self.flagged
    }

    /// Geometry of the page as analysed.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.page_number, self.width, self.height, self.rotation)
    }
}

/// A page needs review when it is blank or breaks the margins.
fn flag(is_blank: bool, inside_borders: bool) -> bool {
    is_blank || !inside_borders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(is_blank: bool, text_ok: bool, images_ok: bool) -> PageSignals {
        PageSignals {
            geometry: PageGeometry::letter(1),
            margins: Margins::new(72.0, 72.0, 108.0, 72.0),
            text_in_bounds: text_ok,
            images_in_bounds: images_ok,
            violation: None,
            is_blank,
            side: Side::Unknown,
            text_percentage: 12.5,
            page_number_detection: PageNumberDetection::not_found(),
            geo_tag_matches: Vec::new(),
            matches_target_margins: None,
        }
    }

    #[test]
    fn test_flagged_truth_table() {
        for is_blank in [false, true] {
            for inside in [false, true] {
                let page = PageAnalysis::from_signals(signals(is_blank, inside, true));
                assert_eq!(page.inside_borders(), inside);
                assert_eq!(page.flagged(), is_blank || !inside);
            }
        }
    }

    #[test]
    fn test_inside_borders_needs_both_kinds() {
        let page = PageAnalysis::from_signals(signals(false, true, false));
        assert!(!page.inside_borders());
        assert!(page.flagged());
    }

    #[test]
    fn test_negative_margins_clamped() {
        let mut s = signals(false, true, true);
        s.margins.left = -4.0;
        s.text_percentage = 140.0;
        let page = PageAnalysis::from_signals(s);
        assert_eq!(page.margins().left, 0.0);
        assert_eq!(page.text_percentage(), 100.0);
    }

    #[test]
    fn test_failed_page_is_flagged() {
        let page = PageAnalysis::failed(3, "no MediaBox");
        assert!(page.is_failed());
        assert!(page.flagged());
        assert_eq!(page.error(), Some("no MediaBox"));
    }

    #[test]
    fn test_numeric_value() {
        let d = PageNumberDetection::found("12", PageNumberKind::Digit, PageNumberLocation::Top, 0.6);
        assert_eq!(d.numeric_value(), Some(12));
        let r = PageNumberDetection::found("iv", PageNumberKind::Roman, PageNumberLocation::Bottom, 0.6);
        assert_eq!(r.numeric_value(), None);
    }
}
