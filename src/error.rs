//! Error types for pagecheck.

use std::io;
use thiserror::Error;

/// Result type alias for pagecheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while auditing a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The document could not be opened or read. Fatal: no page is processed.
    #[error("Cannot read document: {0}")]
    InputAcquisition(String),

    /// Invalid margin specification or audit options. Fatal.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A page's raw geometry is unusable (zero or negative size, bad rotation).
    #[error("Malformed page {page}: {reason}")]
    MalformedPage { page: u32, reason: String },

    /// Analysis of a single page failed.
    #[error("Analysis of page {page} failed: {reason}")]
    PageAnalysis { page: u32, reason: String },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Page results do not form the sequence 1..N.
    #[error("Invalid page sequence: {0}")]
    PageSequence(String),

    /// Results could not be serialized or stored.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The annotated document could not be produced.
    #[error("Overlay error: {0}")]
    Overlay(String),
}

impl Error {
    /// Whether this error aborts a whole run rather than a single page.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::MalformedPage { .. } | Error::PageAnalysis { .. })
    }

    /// Wrap a page-level failure as a [`Error::PageAnalysis`] for `page`.
    pub fn into_page_error(self, page: u32) -> Error {
        match self {
            Error::PageAnalysis { .. } => self,
            Error::MalformedPage { page, reason } => Error::PageAnalysis { page, reason },
            other => Error::PageAnalysis {
                page,
                reason: other.to_string(),
            },
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => {
                Error::InputAcquisition("document is encrypted".to_string())
            }
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
