//! Printed page-number detection.
//!
//! Searches margin bands along the top and bottom edges, tightest first, for
//! a word that reads as a plausible page number. The first band holding a
//! candidate wins.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::extract::PageInput;
use crate::model::{ContentBox, PageNumberDetection, PageNumberKind, PageNumberLocation};

use super::options::{BandEdge, MarginBand};

/// How far a digit page number may drift from the expected number.
const MAX_NUMBER_DRIFT: i64 = 10;

/// Slack above the page count for digit page numbers.
const PAGE_COUNT_SLACK: u64 = 10;

/// Widest word box (points) accepted as a digit page number.
const MAX_NUMBER_WIDTH: f32 = 100.0;

/// Longest accepted Roman numeral.
const MAX_ROMAN_LEN: usize = 4;

fn roman_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$")
            .expect("valid roman numeral pattern")
    })
}

/// Normalize a word for matching: NFKC, then strip surrounding dots, dashes
/// and spaces.
pub fn clean_word(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    normalized
        .trim_matches(|c: char| c == '.' || c == '-' || c.is_whitespace())
        .to_string()
}

/// Whether the cleaned text is a Roman numeral of at most four letters.
pub fn is_roman_numeral(cleaned: &str) -> bool {
    !cleaned.is_empty() && cleaned.len() <= MAX_ROMAN_LEN && roman_pattern().is_match(cleaned)
}

/// Locates printed page numbers on pages of one document.
#[derive(Debug, Clone)]
pub struct PageNumberLocator {
    bands: Vec<MarginBand>,
    total_pages: u32,
    first_printed_page: u32,
}

impl PageNumberLocator {
    pub fn new(bands: Vec<MarginBand>, total_pages: u32, first_printed_page: u32) -> Self {
        Self {
            bands,
            total_pages,
            first_printed_page,
        }
    }

    pub fn bands(&self) -> &[MarginBand] {
        &self.bands
    }

    /// Printed number expected on a page; may be zero or negative before the
    /// first numbered page.
    pub fn expected_number(&self, page_index: u32) -> i64 {
        page_index as i64 - self.first_printed_page as i64 + 1
    }

    /// Search the page's bands in order.
    pub fn locate(&self, input: &PageInput) -> PageNumberDetection {
        let page_index = input.geometry.page_number;
        for band in &self.bands {
            for word in input.words() {
                let Some((value, kind)) = self.candidate(word, page_index) else {
                    continue;
                };
                if in_band(word, band, input.geometry.height) {
                    let location = match band.edge {
                        BandEdge::Top => PageNumberLocation::Top,
                        BandEdge::Bottom => PageNumberLocation::Bottom,
                    };
                    log::debug!(
                        "Page {}: page number {:?} in {:?} band of {}in",
                        page_index,
                        value,
                        band.edge,
                        band.width
                    );
                    return PageNumberDetection::found(value, kind, location, band.width);
                }
            }
        }
        PageNumberDetection::not_found()
    }

    /// The cleaned text and kind if the word reads as a page number.
    fn candidate(&self, word: &ContentBox, page_index: u32) -> Option<(String, PageNumberKind)> {
        let cleaned = clean_word(word.text());
        if cleaned.is_empty() {
            return None;
        }

        if cleaned.chars().all(|c| c.is_ascii_digit()) {
            let number: u64 = cleaned.parse().ok()?;
            let in_range = number <= self.total_pages as u64 + PAGE_COUNT_SLACK;
            let near_expected =
                (number as i64 - self.expected_number(page_index)).abs() <= MAX_NUMBER_DRIFT;
            let narrow = word.rect.width() <= MAX_NUMBER_WIDTH;
            return (in_range && near_expected && narrow)
                .then(|| (cleaned, PageNumberKind::Digit));
        }

        is_roman_numeral(&cleaned).then(|| (cleaned, PageNumberKind::Roman))
    }
}

/// Whether a word sits in the band. Positions are measured from the top of
/// the page.
fn in_band(word: &ContentBox, band: &MarginBand, page_height: f32) -> bool {
    let band_height = band.height_points();
    match band.edge {
        BandEdge::Bottom => word.rect.y0 >= page_height - band_height,
        BandEdge::Top => word.rect.y0 <= band_height,
    }
}
