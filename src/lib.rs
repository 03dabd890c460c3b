//! # pagecheck
//!
//! Page layout compliance auditing for PDF documents.
//!
//! Every page is checked against required margins, classified (blank,
//! orientation, single/double-sided layout, content coverage) and searched
//! for a printed page number. Pages that break the margins get a colored
//! margin guide in an annotated copy of the document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagecheck::{analyze_file, MarginSpec};
//!
//! fn main() -> pagecheck::Result<()> {
//!     let margins = MarginSpec::from_inches(1.5, 1.0, 1.0, 1.0);
//!     let (analysis, annotated) = analyze_file("thesis.pdf", Some(margins))?;
//!
//!     for page in analysis.pages() {
//!         if page.flagged() {
//!             println!("page {} needs review", page.page_number());
//!         }
//!     }
//!     std::fs::write("thesis.annotated.pdf", annotated.into_inner())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Margin checks**: text and images checked separately, with tolerance
//! - **Blank page detection**: including pages that only carry a page number
//! - **Page numbers**: digits and Roman numerals in top and bottom bands
//! - **Annotated output**: margin guides drawn on violating pages only
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod audit;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod overlay;
pub mod report;

pub use audit::{AuditOptions, Auditor, BandEdge, ErrorMode, MarginBand};
pub use detect::{detect_header, detect_header_from_path, is_pdf_bytes, PdfHeader};
pub use error::{Error, Result};
pub use extract::{LopdfBackend, MemorySource, PageSource, RawPage};
pub use model::{
    DocumentAnalysis, DocumentSummary, GeoTag, MarginSpec, Margins, Metadata, Orientation,
    PageAnalysis, PageNumberDetection, PageNumberKind, PageNumberLocation, Rect, Side,
    TargetMargins, Violation, ViolationKind,
};
pub use overlay::{annotations_for, compose, OverlayAnnotation, StrokeColor};
pub use report::{JsonFormat, MemorySink, PageDetails, PageRecord, ResultSink};

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Where to read a document from.
pub enum DocumentRef {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Reader(Box<dyn Read>),
}

impl DocumentRef {
    fn open(self) -> Result<LopdfBackend> {
        match self {
            DocumentRef::Path(path) => LopdfBackend::load_file(path),
            DocumentRef::Bytes(data) => LopdfBackend::load_bytes(&data),
            DocumentRef::Reader(reader) => LopdfBackend::load_reader(reader),
        }
    }
}

impl From<PathBuf> for DocumentRef {
    fn from(path: PathBuf) -> Self {
        DocumentRef::Path(path)
    }
}

impl From<&Path> for DocumentRef {
    fn from(path: &Path) -> Self {
        DocumentRef::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for DocumentRef {
    fn from(data: Vec<u8>) -> Self {
        DocumentRef::Bytes(data)
    }
}

/// Audit a document and produce its annotated copy.
///
/// `margins` defaults to [`MarginSpec::default`] (1.5in left, 1in elsewhere).
///
/// # Example
///
/// ```no_run
/// use pagecheck::{analyze, DocumentRef};
///
/// let data = std::fs::read("report.pdf").unwrap();
/// let (analysis, _annotated) = analyze(DocumentRef::Bytes(data), None).unwrap();
/// println!("flagged: {:?}", analysis.flagged_pages());
/// ```
pub fn analyze(
    document: DocumentRef,
    margins: Option<MarginSpec>,
) -> Result<(DocumentAnalysis, Cursor<Vec<u8>>)> {
    let mut options = AuditOptions::new().with_overlay(true);
    if let Some(margins) = margins {
        options = options.with_margins(margins);
    }
    let output = Pagecheck::with_options(options).audit(document)?;
    let annotated = output
        .annotated
        .ok_or_else(|| Error::Overlay("annotated document was not produced".to_string()))?;
    Ok((output.analysis, annotated))
}

/// Audit a PDF file.
///
/// # Example
///
/// ```no_run
/// use pagecheck::analyze_file;
///
/// let (analysis, _) = analyze_file("document.pdf", None).unwrap();
/// println!("Pages: {}", analysis.page_count());
/// ```
pub fn analyze_file<P: AsRef<Path>>(
    path: P,
    margins: Option<MarginSpec>,
) -> Result<(DocumentAnalysis, Cursor<Vec<u8>>)> {
    analyze(DocumentRef::Path(path.as_ref().to_path_buf()), margins)
}

/// Audit a PDF held in memory.
pub fn analyze_bytes(
    data: &[u8],
    margins: Option<MarginSpec>,
) -> Result<(DocumentAnalysis, Cursor<Vec<u8>>)> {
    analyze(DocumentRef::Bytes(data.to_vec()), margins)
}

/// Audit a PDF read from any reader.
pub fn analyze_reader<R: Read + 'static>(
    reader: R,
    margins: Option<MarginSpec>,
) -> Result<(DocumentAnalysis, Cursor<Vec<u8>>)> {
    analyze(DocumentRef::Reader(Box::new(reader)), margins)
}

/// Builder for auditing PDF documents.
///
/// # Example
///
/// ```no_run
/// use pagecheck::{MarginSpec, Pagecheck, TargetMargins};
///
/// let output = Pagecheck::new()
///     .with_margins(MarginSpec::from_inches(1.5, 1.0, 1.0, 1.0))
///     .with_target_margins(TargetMargins::new(1.5, 1.0, 1.0, 1.0))
///     .with_first_printed_page(3)
///     .strict()
///     .audit_file("thesis.pdf")?;
/// println!("{}", output.to_json(pagecheck::JsonFormat::Pretty)?);
/// # Ok::<(), pagecheck::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pagecheck {
    options: AuditOptions,
}

impl Pagecheck {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing options.
    pub fn with_options(options: AuditOptions) -> Self {
        Self { options }
    }

    /// Set the required margins.
    pub fn with_margins(mut self, margins: MarginSpec) -> Self {
        self.options = self.options.with_margins(margins);
        self
    }

    /// Compare observed margins with target margins (inches).
    pub fn with_target_margins(mut self, target: TargetMargins) -> Self {
        self.options = self.options.with_target_margins(target);
        self
    }

    /// Page index that carries printed number 1.
    pub fn with_first_printed_page(mut self, page: u32) -> Self {
        self.options = self.options.with_first_printed_page(page);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Abort on the first page failure.
    pub fn strict(mut self) -> Self {
        self.options = self.options.strict();
        self
    }

    /// Skip producing the annotated document.
    pub fn without_overlay(mut self) -> Self {
        self.options = self.options.with_overlay(false);
        self
    }

    pub fn options(&self) -> &AuditOptions {
        &self.options
    }

    /// Audit a document.
    pub fn audit(&self, document: impl Into<DocumentRef>) -> Result<AuditOutput> {
        let auditor = Auditor::new(self.options.clone())?;
        let backend = document.into().open()?;
        let analysis = auditor.audit(&backend)?;

        let annotated = if self.options.overlay {
            let annotations = annotations_for(&analysis, &self.options.margins);
            Some(compose(&backend, &annotations)?)
        } else {
            None
        };

        Ok(AuditOutput {
            analysis,
            annotated,
            service_name: self.options.service_name.clone(),
        })
    }

    /// Audit a PDF file.
    pub fn audit_file<P: AsRef<Path>>(&self, path: P) -> Result<AuditOutput> {
        self.audit(path.as_ref())
    }

    /// Audit a PDF held in memory.
    pub fn audit_bytes(&self, data: &[u8]) -> Result<AuditOutput> {
        self.audit(data.to_vec())
    }
}

/// Result of auditing a document.
pub struct AuditOutput {
    /// The audit results
    pub analysis: DocumentAnalysis,
    /// Annotated copy of the document, when overlays are enabled
    pub annotated: Option<Cursor<Vec<u8>>>,
    service_name: String,
}

impl AuditOutput {
    pub fn analysis(&self) -> &DocumentAnalysis {
        &self.analysis
    }

    /// Convert the analysis to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        report::to_json(&self.analysis, format)
    }

    /// Persistence records for every page, tagged with the configured
    /// service name.
    pub fn records(&self, document_id: &str) -> Vec<PageRecord> {
        report::records_for(document_id, &self.service_name, &self.analysis)
    }

    /// Write the annotated document to a file.
    pub fn write_annotated<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        match &self.annotated {
            Some(cursor) => {
                std::fs::write(path, cursor.get_ref())?;
                Ok(())
            }
            None => Err(Error::Overlay(
                "overlays were disabled for this audit".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagecheck_builder() {
        let builder = Pagecheck::new()
            .with_margins(MarginSpec::uniform(36.0))
            .with_first_printed_page(5)
            .strict()
            .sequential();

        assert_eq!(builder.options().margins, MarginSpec::uniform(36.0));
        assert_eq!(builder.options().first_printed_page, 5);
        assert!(matches!(builder.options().error_mode, ErrorMode::Strict));
        assert!(!builder.options().parallel);
        assert!(builder.options().overlay);
    }

    #[test]
    fn test_pagecheck_builder_default() {
        let builder = Pagecheck::default();
        assert!(matches!(builder.options().error_mode, ErrorMode::Lenient));
        assert!(builder.options().target_margins.is_none());
    }

    #[test]
    fn test_without_overlay() {
        assert!(!Pagecheck::new().without_overlay().options().overlay);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_analyze_bytes_empty_data() {
        let result = analyze_bytes(&[], None);
        assert!(matches!(result, Err(Error::InputAcquisition(_))));
    }

    #[test]
    fn test_analyze_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(analyze_bytes(&data, None).is_err());
    }

    #[test]
    fn test_analyze_rejects_bad_margins_before_reading() {
        let result = analyze_bytes(b"not a pdf", Some(MarginSpec::uniform(f32::NAN)));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_analyze_missing_file() {
        let result = analyze_file("/nonexistent/definitely/missing.pdf", None);
        assert!(matches!(result, Err(Error::InputAcquisition(_))));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "device unavailable"))
        }
    }

    #[test]
    fn test_analyze_failing_reader() {
        let result = analyze_reader(FailingReader, None);
        assert!(matches!(
            result,
            Err(Error::InputAcquisition(msg)) if msg.contains("device unavailable")
        ));
    }
}
