//! Compliance aggregation.
//!
//! Joins the per-page signals into [`PageAnalysis`] records and the records
//! into a [`DocumentAnalysis`]. Nothing is recomputed here.

use crate::error::{Error, Result};
use crate::model::{
    DocumentAnalysis, DocumentSummary, Metadata, Orientation, PageAnalysis, PageNumberLocation,
    PageSignals,
};

/// Build the record for one page.
pub fn build_page(signals: PageSignals) -> PageAnalysis {
    PageAnalysis::from_signals(signals)
}

/// Build the document result from page records numbered 1..N in order.
///
/// `targets_supplied` controls whether the summary tallies target-margin
/// matches.
pub fn assemble_document(
    metadata: Metadata,
    pages: Vec<PageAnalysis>,
    targets_supplied: bool,
) -> Result<DocumentAnalysis> {
    for (i, page) in pages.iter().enumerate() {
        let expected = i as u32 + 1;
        if page.page_number() != expected {
            return Err(Error::PageSequence(format!(
                "expected page {} at position {}, found page {}",
                expected,
                i,
                page.page_number()
            )));
        }
    }

    let summary = summarize(&pages, targets_supplied);
    log::info!(
        "Audited {} pages: {} flagged, {} blank, {} failed",
        summary.page_count,
        summary.flagged_pages.len(),
        summary.blank_pages.len(),
        summary.failed_pages.len()
    );
    Ok(DocumentAnalysis::from_parts(metadata, pages, summary))
}

/// Document-level counts. Failed pages only appear in the flagged and failed
/// lists.
pub fn summarize(pages: &[PageAnalysis], targets_supplied: bool) -> DocumentSummary {
    let mut summary = DocumentSummary {
        page_count: pages.len() as u32,
        target_margin_matches: targets_supplied.then_some(0),
        ..Default::default()
    };

    for page in pages {
        let n = page.page_number();
        if page.flagged() {
            summary.flagged_pages.push(n);
        }
        if page.is_failed() {
            summary.failed_pages.push(n);
            continue;
        }
        if page.is_blank() {
            summary.blank_pages.push(n);
        }
        if !page.inside_borders() {
            summary.out_of_bounds_pages.push(n);
        }
        match page.orientation() {
            Orientation::Portrait => summary.portrait_count += 1,
            Orientation::Landscape => summary.landscape_count += 1,
        }

        let detection = page.page_number_detection();
        if detection.found {
            summary.numbered_pages += 1;
            match detection.location {
                PageNumberLocation::Top => summary.page_numbers_top += 1,
                PageNumberLocation::Bottom => summary.page_numbers_bottom += 1,
                PageNumberLocation::None => {}
            }
            if let Some(width) = detection.band_width {
                *summary
                    .band_distribution
                    .entry(format!("{:.1}", width))
                    .or_insert(0) += 1;
            }
        }

        if let (Some(count), Some(true)) =
            (summary.target_margin_matches.as_mut(), page.matches_target_margins())
        {
            *count += 1;
        }
    }
    summary
}

impl DocumentAnalysis {
    /// Assemble a document result; see [`assemble_document`].
    pub fn assemble(
        metadata: Metadata,
        pages: Vec<PageAnalysis>,
        targets_supplied: bool,
    ) -> Result<DocumentAnalysis> {
        assemble_document(metadata, pages, targets_supplied)
    }
}
