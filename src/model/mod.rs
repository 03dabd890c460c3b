//! Data model for page audits.
//!
//! Geometry and content boxes come out of extraction; [`PageAnalysis`] and
//! [`DocumentAnalysis`] are the audit results. Results are built once by the
//! aggregator and only exposed through read accessors afterwards.

mod analysis;
mod document;
mod geometry;
mod margins;

pub use analysis::{
    GeoTag, PageAnalysis, PageNumberDetection, PageNumberKind, PageNumberLocation, PageSignals,
    Side, Violation, ViolationKind,
};
pub use document::{DocumentAnalysis, DocumentSummary, Metadata};
pub use geometry::{
    inches_to_points, points_to_inches, ContentBox, ContentKind, CoordinateOrigin, Orientation,
    PageFrame, PageGeometry, Rect, POINTS_PER_INCH,
};
pub use margins::{MarginSpec, Margins, TargetMargins, DEFAULT_TOLERANCE};
