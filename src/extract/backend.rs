//! Extraction backends.
//!
//! [`PageSource`] is the seam between the audit and whatever reads the PDF.
//! [`LopdfBackend`] is the bundled implementation; [`MemorySource`] serves
//! pre-extracted pages.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::{detect_header, detect_header_from_path};
use crate::error::{Error, Result};
use crate::model::{CoordinateOrigin, Metadata, PageFrame};

use super::adapter::normalize_rotation;
use super::blocks::{group_into_blocks, group_into_lines, page_text};
use super::content::{get_number, inherited, ContentInterpreter};
use super::raw::RawPage;
use super::tables::TableDetector;

/// Source of raw per-page extraction results.
///
/// Implementations must be `Sync` to be audited in parallel.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Document metadata.
    fn metadata(&self) -> Metadata;

    /// Raw extraction output for one page (1-indexed).
    fn raw_page(&self, page_number: u32) -> Result<RawPage>;

    /// Visible `(width, height)` of a page, read without extracting its
    /// content. `None` when the size is not known up front or not usable.
    fn page_size(&self, page_number: u32) -> Option<(f32, f32)> {
        let _ = page_number;
        None
    }
}

/// [`PageSource`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    tables: TableDetector,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect_header_from_path(path).map_err(acquisition_error)?;
        let doc = LopdfDocument::load(path).map_err(|e| acquisition_error(e.into()))?;
        Self::checked(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        detect_header(data).map_err(acquisition_error)?;
        let doc = LopdfDocument::load_mem(data)
            .map_err(|e| Error::InputAcquisition(format!("cannot parse document: {}", e)))?;
        Self::checked(doc)
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| acquisition_error(e.into()))?;
        Self::load_bytes(&data)
    }

    /// Encrypted documents cannot be audited.
    fn checked(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::InputAcquisition("document is encrypted".to_string()));
        }
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text may not be readable");
        }
        let pages = doc.get_pages();
        Self {
            doc,
            pages,
            tables: TableDetector::new(),
        }
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Give up the backend and keep the document, e.g. for annotation.
    pub fn into_document(self) -> LopdfDocument {
        self.doc
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Object id of a page (1-indexed).
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        self.pages
            .get(&page_number)
            .copied()
            .ok_or(Error::PageOutOfRange(page_number, self.pages.len() as u32))
    }

    /// MediaBox `[x0, y0, x1, y1]`, normalized so that x0 <= x1 and y0 <= y1.
    fn media_box(&self, page_number: u32, page_id: ObjectId) -> [f32; 4] {
        let values: Option<Vec<f32>> = inherited(&self.doc, page_id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .map(|arr| arr.iter().filter_map(get_number).collect());
        match values.as_deref() {
            Some([x0, y0, x1, y1]) => [x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)],
            _ => {
                log::warn!("Page {}: no usable MediaBox, assuming US Letter", page_number);
                [0.0, 0.0, 612.0, 792.0]
            }
        }
    }

    /// Mapping between native and display space for a page.
    pub fn page_frame(&self, page_number: u32) -> Result<PageFrame> {
        let page_id = self.page_id(page_number)?;
        let rotation = self.rotation(page_id);
        let rotation = normalize_rotation(rotation).ok_or_else(|| Error::MalformedPage {
            page: page_number,
            reason: format!("rotation {} is not a multiple of 90", rotation),
        })?;
        Ok(PageFrame::new(self.media_box(page_number, page_id), rotation))
    }

    fn rotation(&self, page_id: ObjectId) -> i32 {
        match inherited(&self.doc, page_id, b"Rotate") {
            Some(Object::Integer(r)) => *r as i32,
            Some(Object::Real(r)) => *r as i32,
            _ => 0,
        }
    }
}

impl PageSource for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.version());
        metadata.page_count = self.page_count();
        metadata.encrypted = self.doc.is_encrypted();

        let info = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|o| o.as_reference().ok())
            .and_then(|id| self.doc.get_dictionary(id).ok());
        if let Some(info) = info {
            metadata.title = get_string_from_dict(info, b"Title");
            metadata.author = get_string_from_dict(info, b"Author");
            metadata.subject = get_string_from_dict(info, b"Subject");
            metadata.creator = get_string_from_dict(info, b"Creator");
            metadata.producer = get_string_from_dict(info, b"Producer");
            metadata.created =
                get_string_from_dict(info, b"CreationDate").and_then(|s| parse_pdf_date(&s));
            metadata.modified =
                get_string_from_dict(info, b"ModDate").and_then(|s| parse_pdf_date(&s));
        }
        metadata
    }

    fn page_size(&self, page_number: u32) -> Option<(f32, f32)> {
        self.page_frame(page_number).ok().map(|frame| frame.display_size())
    }

    fn raw_page(&self, page_number: u32) -> Result<RawPage> {
        let page_id = self.page_id(page_number)?;
        let [x0, y0, x1, y1] = self.media_box(page_number, page_id);

        let content = ContentInterpreter::new(&self.doc)
            .interpret_page(page_id)
            .map_err(|e| e.into_page_error(page_number))?;

        let words = content.runs.iter().flat_map(|run| run.words()).collect();
        let table_count = self.tables.detect(&content.runs).len() as u32;
        let lines = group_into_lines(content.runs);
        let text = page_text(&lines);
        let blocks = group_into_blocks(lines)
            .iter()
            .filter_map(|block| block.bbox())
            .collect();

        log::debug!(
            "Page {}: {} images, {} tables",
            page_number,
            content.images.len(),
            table_count
        );

        Ok(RawPage {
            page_number,
            width: x1 - x0,
            height: y1 - y0,
            rotation: self.rotation(page_id),
            origin: CoordinateOrigin::BottomLeft,
            media_origin: (x0, y0),
            words,
            images: content.images,
            blocks,
            text: Some(text),
            table_count,
        })
    }
}

/// Pre-extracted pages held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<RawPage>,
    metadata: Metadata,
}

impl MemorySource {
    /// Pages are renumbered 1..N in the given order.
    pub fn new(pages: Vec<RawPage>) -> Self {
        let mut source = Self::default();
        for page in pages {
            source.push(page);
        }
        source
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Append a page, numbering it after the existing ones.
    pub fn push(&mut self, mut page: RawPage) {
        page.page_number = self.pages.len() as u32 + 1;
        self.pages.push(page);
    }
}

impl PageSource for MemorySource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = self.metadata.clone();
        metadata.page_count = self.page_count();
        metadata
    }

    fn raw_page(&self, page_number: u32) -> Result<RawPage> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .cloned()
            .ok_or(Error::PageOutOfRange(page_number, self.page_count()))
    }

    fn page_size(&self, page_number: u32) -> Option<(f32, f32)> {
        let page = self.pages.get(page_number.checked_sub(1)? as usize)?;
        match (page.origin, normalize_rotation(page.rotation)?) {
            (CoordinateOrigin::BottomLeft, 90 | 270) => Some((page.height, page.width)),
            _ => Some((page.width, page.height)),
        }
    }
}

/// Every loading failure, I/O included, is an input acquisition error.
fn acquisition_error(err: Error) -> Error {
    match err {
        Error::InputAcquisition(_) => err,
        other => Error::InputAcquisition(other.to_string()),
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(super::content::decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let field = |range: std::ops::Range<usize>, default: u32| {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };
    let month = field(4..6, 1);
    let day = field(6..8, 1);
    let hour = field(8..10, 0);
    let minute = field(10..12, 0);
    let second = field(12..14, 0);

    let naive = chrono::NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;

    // Offset: Z, or +HH'mm / -HH'mm
    let offset_secs = match s.get(14..15) {
        Some(sign @ ("+" | "-")) => {
            let hours: i32 = s.get(15..17).and_then(|v| v.parse().ok()).unwrap_or(0);
            let minutes: i32 = s.get(18..20).and_then(|v| v.parse().ok()).unwrap_or(0);
            let secs = hours * 3600 + minutes * 60;
            if sign == "-" {
                -secs
            } else {
                secs
            }
        }
        _ => 0,
    };
    let utc = naive - chrono::Duration::seconds(offset_secs as i64);
    Some(chrono::DateTime::from_naive_utc_and_offset(utc, chrono::Utc))
}
