//! Document-level types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::analysis::PageAnalysis;

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,

    /// Whether the document is encrypted
    pub encrypted: bool,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }
}

/// Document-level counts derived from the per-page analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Total number of pages
    pub page_count: u32,

    /// Pages needing review (blank or outside the margins)
    pub flagged_pages: Vec<u32>,

    /// Pages classified as blank
    pub blank_pages: Vec<u32>,

    /// Pages with content outside the margin box
    pub out_of_bounds_pages: Vec<u32>,

    /// Pages whose analysis failed
    pub failed_pages: Vec<u32>,

    /// Portrait pages
    pub portrait_count: u32,

    /// Landscape pages
    pub landscape_count: u32,

    /// Pages with a detected printed page number
    pub numbered_pages: u32,

    /// Page numbers found in a top band
    pub page_numbers_top: u32,

    /// Page numbers found in a bottom band
    pub page_numbers_bottom: u32,

    /// Winning band width (inches, one decimal) -> number of pages
    pub band_distribution: BTreeMap<String, u32>,

    /// Pages matching the caller's target margins, when targets were given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_margin_matches: Option<u32>,
}

impl DocumentSummary {
    /// Pages without a detected page number (failed pages excluded).
    pub fn unnumbered_pages(&self) -> u32 {
        self.page_count
            .saturating_sub(self.numbered_pages)
            .saturating_sub(self.failed_pages.len() as u32)
    }
}

/// The audit result for a whole document.
///
/// Pages are stored in page-number order, numbered 1..N without gaps.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    metadata: Metadata,
    pages: Vec<PageAnalysis>,
    summary: DocumentSummary,
}

impl DocumentAnalysis {
    /// Built by [`crate::audit::aggregate::assemble_document`], which checks
    /// page ordering and computes the summary.
    pub(crate) fn from_parts(
        metadata: Metadata,
        pages: Vec<PageAnalysis>,
        summary: DocumentSummary,
    ) -> Self {
        Self {
            metadata,
            pages,
            summary,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn pages(&self) -> &[PageAnalysis] {
        &self.pages
    }

    pub fn summary(&self) -> &DocumentSummary {
        &self.summary
    }

    /// Get a page by number (1-indexed).
    pub fn page(&self, page_number: u32) -> Option<&PageAnalysis> {
        if page_number == 0 {
            return None;
        }
        self.pages.get((page_number - 1) as usize)
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn flagged_pages(&self) -> &[u32] {
        &self.summary.flagged_pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Take ownership of the page analyses.
    pub fn into_pages(self) -> Vec<PageAnalysis> {
        self.pages
    }
}
