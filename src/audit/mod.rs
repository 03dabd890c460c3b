//! Page layout auditing.
//!
//! The pieces run in this order for every page: margin evaluation
//! ([`bounds`]), classification ([`classify`]), page-number search
//! ([`locator`]) and coordinate scanning ([`geotag`]). [`aggregate`] merges
//! their outputs and [`Auditor`] drives the whole document.

pub mod aggregate;
pub mod bounds;
pub mod classify;
pub mod geotag;
pub mod locator;
pub mod options;
pub mod runner;

pub use aggregate::{assemble_document, build_page, summarize};
pub use bounds::{evaluate, matches_target, observed_margins, BoundsReport, MarginBox};
pub use classify::{classify, is_blank, legacy_text_density, text_percentage, Classification};
pub use geotag::geo_tag_matches;
pub use locator::{clean_word, is_roman_numeral, PageNumberLocator};
pub use options::{AuditOptions, BandEdge, ErrorMode, MarginBand};
pub use runner::Auditor;
