//! Per-page records handed to a persistence layer.
//!
//! Each page of a document becomes one [`PageRecord`], keyed by
//! `(document_id, page_number, service)`. Stores implement [`ResultSink`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    DocumentAnalysis, GeoTag, Margins, Orientation, PageAnalysis, PageNumberDetection, Side,
};

/// The stored view of one page's audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDetails {
    pub margins: Margins,
    pub is_blank: bool,
    pub side: Side,
    pub is_page_numbered: bool,
    pub page_number_detection: PageNumberDetection,
    pub geo_tag_matches: Vec<GeoTag>,
    pub orientation: Orientation,
    pub text_percentage: f32,
    pub inside_borders: bool,
    pub flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches_target_margins: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&PageAnalysis> for PageDetails {
    fn from(page: &PageAnalysis) -> Self {
        Self {
            margins: *page.margins(),
            is_blank: page.is_blank(),
            side: page.side(),
            is_page_numbered: page.is_page_numbered(),
            page_number_detection: page.page_number_detection().clone(),
            geo_tag_matches: page.geo_tag_matches().to_vec(),
            orientation: page.orientation(),
            text_percentage: page.text_percentage(),
            inside_borders: page.inside_borders(),
            flagged: page.flagged(),
            matches_target_margins: page.matches_target_margins(),
            error: page.error().map(str::to_string),
        }
    }
}

/// Page number -> details for every page of a document.
pub fn details_by_page(analysis: &DocumentAnalysis) -> BTreeMap<u32, PageDetails> {
    analysis
        .pages()
        .iter()
        .map(|page| (page.page_number(), PageDetails::from(page)))
        .collect()
}

/// One stored page result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub document_id: String,
    pub page_number: u32,
    /// Name of the service that produced the record
    pub service: String,
    pub details: PageDetails,
}

impl PageRecord {
    /// Unique key of the record.
    pub fn key(&self) -> (String, u32, String) {
        (
            self.document_id.clone(),
            self.page_number,
            self.service.clone(),
        )
    }
}

/// Records for every page of a document, in page order.
pub fn records_for(
    document_id: &str,
    service: &str,
    analysis: &DocumentAnalysis,
) -> Vec<PageRecord> {
    analysis
        .pages()
        .iter()
        .map(|page| PageRecord {
            document_id: document_id.to_string(),
            page_number: page.page_number(),
            service: service.to_string(),
            details: PageDetails::from(page),
        })
        .collect()
}

/// Destination for page records.
pub trait ResultSink {
    /// Store one record. Storing a key twice is an error.
    fn store(&mut self, record: PageRecord) -> Result<()>;

    /// Store records in order, stopping at the first failure.
    fn store_all(&mut self, records: Vec<PageRecord>) -> Result<()> {
        for record in records {
            self.store(record)?;
        }
        Ok(())
    }
}

/// In-memory [`ResultSink`].
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: BTreeMap<(String, u32, String), PageRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, document_id: &str, page_number: u32, service: &str) -> Option<&PageRecord> {
        self.records
            .get(&(document_id.to_string(), page_number, service.to_string()))
    }

    /// All records in key order.
    pub fn records(&self) -> impl Iterator<Item = &PageRecord> {
        self.records.values()
    }
}

impl ResultSink for MemorySink {
    fn store(&mut self, record: PageRecord) -> Result<()> {
        let key = record.key();
        if self.records.contains_key(&key) {
            return Err(Error::Serialization(format!(
                "duplicate record for document {} page {} service {}",
                key.0, key.1, key.2
            )));
        }
        self.records.insert(key, record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditOptions, Auditor};
    use crate::extract::{MemorySource, RawPage};

    fn analysis() -> DocumentAnalysis {
        let source = MemorySource::new(vec![
            RawPage::letter(1).with_word("Located at 40.7128, -74.0060", 150.0, 150.0, 400.0, 162.0),
            RawPage::letter(2).with_word("edge", 5.0, 150.0, 40.0, 162.0),
        ]);
        Auditor::new(AuditOptions::new())
            .unwrap()
            .audit(&source)
            .unwrap()
    }

    #[test]
    fn test_details_by_page() {
        let details = details_by_page(&analysis());
        assert_eq!(details.len(), 2);
        assert_eq!(details[&1].geo_tag_matches.len(), 1);
        assert!(details[&1].inside_borders);
        assert!(!details[&2].inside_borders);
        assert!(details[&2].flagged);
        assert!(!details[&2].is_page_numbered);
    }

    #[test]
    fn test_memory_sink_stores_records() {
        let mut sink = MemorySink::new();
        sink.store_all(records_for("doc-1", "pagecheck", &analysis()))
            .unwrap();
        assert_eq!(sink.len(), 2);
        assert!(sink.get("doc-1", 2, "pagecheck").unwrap().details.flagged);
        assert!(sink.get("doc-1", 2, "other").is_none());
    }

    #[test]
    fn test_memory_sink_rejects_duplicates() {
        let analysis = analysis();
        let mut sink = MemorySink::new();
        sink.store_all(records_for("doc-1", "pagecheck", &analysis))
            .unwrap();

        let err = sink
            .store_all(records_for("doc-1", "pagecheck", &analysis))
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));

        // Same pages under another service are distinct keys
        sink.store_all(records_for("doc-1", "review", &analysis))
            .unwrap();
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn test_details_json_field_names() {
        let details = details_by_page(&analysis());
        let json = serde_json::to_value(&details[&1]).unwrap();
        for field in [
            "margins",
            "is_blank",
            "side",
            "is_page_numbered",
            "page_number_detection",
            "geo_tag_matches",
            "orientation",
            "text_percentage",
            "inside_borders",
            "flagged",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert!(json.get("error").is_none());
    }
}
