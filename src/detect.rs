//! PDF header detection.
//!
//! Used to fail fast on inputs that are not PDFs before the whole document is
//! loaded and parsed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Readers accept a header anywhere in the first kilobyte.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Information from a PDF file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// Version from the header, e.g. "1.7"
    pub version: String,
    /// Byte offset of `%PDF-`; non-zero when junk precedes the header
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Find and validate the PDF header in the leading bytes of a document.
///
/// # Example
/// ```
/// use pagecheck::detect::detect_header;
///
/// let header = detect_header(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
/// assert_eq!(header.version, "1.7");
/// ```
pub fn detect_header(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(version_bytes) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version, offset })
}

/// Read the start of a file and validate its PDF header.
pub fn detect_header_from_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(HEADER_SEARCH_WINDOW + VERSION_LEN);
    file.take((HEADER_SEARCH_WINDOW + PDF_MAGIC.len() + VERSION_LEN) as u64)
        .read_to_end(&mut head)?;
    detect_header(&head)
}

/// Whether the bytes start like a PDF document.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_header(data).is_ok()
}

/// Versions look like "1.4" or "2.0".
fn is_valid_version(bytes: &[u8]) -> bool {
    matches!(bytes, [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_header() {
        let header = detect_header(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(header.version, "1.7");
        assert_eq!(header.offset, 0);
        assert_eq!(header.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_header_after_junk() {
        let header = detect_header(b"\r\n\r\n%PDF-2.0\n").unwrap();
        assert_eq!(header.version, "2.0");
        assert_eq!(header.offset, 4);
    }

    #[test]
    fn test_not_a_pdf() {
        assert!(matches!(
            detect_header(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(detect_header(b"%PDF"), Err(Error::UnknownFormat)));
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }

    #[test]
    fn test_bad_version() {
        assert!(matches!(
            detect_header(b"%PDF-x.y\n"),
            Err(Error::UnsupportedVersion(v)) if v == "x.y"
        ));
    }

    #[test]
    fn test_detect_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4\n1 0 obj\n").unwrap();
        let header = detect_header_from_path(file.path()).unwrap();
        assert_eq!(header.version, "1.4");
    }
}
