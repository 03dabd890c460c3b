//! Page extraction: reading PDFs into normalized per-page content boxes.

pub mod adapter;
pub mod backend;
pub mod blocks;
pub mod content;
pub mod raw;
pub mod tables;

pub use adapter::{adapt, PageInput};
pub use backend::{LopdfBackend, MemorySource, PageSource};
pub use raw::{RawPage, RawWord};
