//! Page classification: blank pages, orientation, side, text density.

use crate::extract::PageInput;
use crate::model::{Margins, Orientation, PageGeometry, Side};

/// Classification signals for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub is_blank: bool,
    pub orientation: Orientation,
    pub side: Side,
    pub text_percentage: f32,
}

/// Classify a page given its observed margins.
pub fn classify(input: &PageInput, margins: &Margins, tolerance: f32) -> Classification {
    Classification {
        is_blank: is_blank(input),
        orientation: input.geometry.orientation(),
        side: side(&input.geometry, margins, tolerance),
        text_percentage: text_percentage(input),
    }
}

/// Whether a page is effectively blank.
///
/// A page is blank when any of these hold:
/// - at most two visible characters, no images and no tables;
/// - the visible text is nothing but digits (a lone page number);
/// - the text is whitespace only;
/// - there are no words and no images at all.
pub fn is_blank(input: &PageInput) -> bool {
    let stripped = input.text.trim();
    let images = input.image_count();

    let nearly_empty =
        stripped.chars().count() <= 2 && images == 0 && input.table_count == 0;
    let digits_only = !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit());
    let whitespace_only = !input.text.is_empty() && stripped.is_empty();
    let no_content = input.word_count() == 0 && images == 0;

    nearly_empty || digits_only || whitespace_only || no_content
}

/// Single/double-sided layout guess from the observed side margins.
pub fn side(geometry: &PageGeometry, margins: &Margins, tolerance: f32) -> Side {
    if (margins.left - margins.right).abs() <= tolerance {
        Side::Single
    } else if geometry.page_number % 2 == 0 && margins.left - margins.right > tolerance {
        Side::Double
    } else {
        Side::Unknown
    }
}

/// Share of the page covered by content, in percent.
///
/// Sums the areas of text blocks and images; word boxes stand in for blocks
/// when the backend reported none.
pub fn text_percentage(input: &PageInput) -> f32 {
    let page_area = input.geometry.area();
    if page_area <= 0.0 {
        return 0.0;
    }
    let use_blocks = input.has_blocks();
    let covered: f32 = input
        .boxes
        .iter()
        .filter(|b| b.is_image() || if use_blocks { b.is_block() } else { b.is_word() })
        .map(|b| b.rect.area())
        .sum();
    (covered / page_area * 100.0).clamp(0.0, 100.0)
}

/// Character count of the stripped text per page area, in percent, rounded
/// to four decimals.
///
/// Older reports used this measure; it is not stored on page results.
pub fn legacy_text_density(input: &PageInput) -> f32 {
    let page_area = input.geometry.area();
    if page_area <= 0.0 {
        return 0.0;
    }
    let chars = input.text.trim().chars().count() as f64;
    let density = chars / page_area as f64 * 100.0;
    ((density * 10_000.0).round() / 10_000.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{adapt, RawPage};

    fn input(raw: RawPage) -> PageInput {
        adapt(&raw).unwrap()
    }

    #[test]
    fn test_no_words_no_images_is_blank() {
        assert!(is_blank(&input(RawPage::letter(1))));
        // Stray text without word boxes still counts as blank
        assert!(is_blank(&input(
            RawPage::letter(1).with_text("orphaned text layer")
        )));
    }

    #[test]
    fn test_page_number_only_is_blank() {
        let page = RawPage::letter(1)
            .with_word("142", 300.0, 740.0, 318.0, 752.0)
            .with_text("142");
        assert!(is_blank(&input(page)));
    }

    #[test]
    fn test_whitespace_text_is_blank() {
        let page = RawPage::letter(1)
            .with_word("x", 300.0, 300.0, 306.0, 312.0)
            .with_text(" \n\n ");
        assert!(is_blank(&input(page)));
    }

    #[test]
    fn test_short_text_with_image_is_not_blank() {
        let page = RawPage::letter(1)
            .with_word("Fig", 100.0, 100.0, 120.0, 112.0)
            .with_image(100.0, 120.0, 400.0, 400.0)
            .with_text("A");
        assert!(!is_blank(&input(page)));
    }

    #[test]
    fn test_short_text_with_table_is_not_blank() {
        let page = RawPage::letter(1)
            .with_word("ok", 100.0, 100.0, 120.0, 112.0)
            .with_table_count(1);
        assert!(!is_blank(&input(page)));
    }

    #[test]
    fn test_body_text_is_not_blank() {
        let page = RawPage::letter(1).with_word("Introduction", 108.0, 100.0, 200.0, 112.0);
        assert!(!is_blank(&input(page)));
    }

    #[test]
    fn test_side() {
        let odd = PageGeometry::letter(3);
        let even = PageGeometry::letter(4);
        let equal = Margins::new(72.0, 72.0, 90.0, 91.0);
        let wide_left = Margins::new(72.0, 72.0, 108.0, 72.0);

        assert_eq!(side(&odd, &equal, 2.0), Side::Single);
        assert_eq!(side(&even, &wide_left, 2.0), Side::Double);
        assert_eq!(side(&odd, &wide_left, 2.0), Side::Unknown);
    }

    #[test]
    fn test_text_percentage_prefers_blocks() {
        let page = RawPage::new(1, 100.0, 100.0)
            .with_word("a", 10.0, 10.0, 20.0, 20.0)
            .with_block(10.0, 10.0, 60.0, 60.0)
            .with_image(70.0, 70.0, 80.0, 80.0);
        let pct = text_percentage(&input(page));
        assert!((pct - 26.0).abs() < 1e-3);
    }

    #[test]
    fn test_text_percentage_falls_back_to_words() {
        let page = RawPage::new(1, 100.0, 100.0).with_word("a", 0.0, 0.0, 10.0, 10.0);
        assert!((text_percentage(&input(page)) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_text_percentage_clamped() {
        let page = RawPage::new(1, 100.0, 100.0)
            .with_image(0.0, 0.0, 100.0, 100.0)
            .with_image(0.0, 0.0, 100.0, 100.0);
        assert_eq!(text_percentage(&input(page)), 100.0);
    }

    #[test]
    fn test_legacy_text_density() {
        let page = RawPage::new(1, 100.0, 100.0).with_text("  abcde  ");
        assert!((legacy_text_density(&input(page)) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_orientation() {
        let landscape = input(RawPage::new(1, 792.0, 612.0));
        let c = classify(&landscape, &Margins::default(), 2.0);
        assert_eq!(c.orientation, Orientation::Landscape);
    }
}
