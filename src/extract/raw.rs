//! Raw per-page extraction output, before normalization.

use serde::{Deserialize, Serialize};

use crate::model::CoordinateOrigin;

/// A word reported by an extraction backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWord {
    pub text: String,
    /// `[x0, y0, x1, y1]` in the page's declared convention
    pub bbox: [f32; 4],
}

/// Everything a backend reports for one page.
///
/// For [`CoordinateOrigin::TopLeft`] pages, `width`/`height` are the visible
/// size and boxes are already in display space. For
/// [`CoordinateOrigin::BottomLeft`] pages, `width`/`height` are the MediaBox
/// size, `media_origin` its lower-left corner, and boxes are in native PDF
/// space; rotation is applied during adaptation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    pub page_number: u32,
    pub width: f32,
    pub height: f32,
    /// `/Rotate` in degrees, any multiple of 90 (may be negative)
    pub rotation: i32,
    pub origin: CoordinateOrigin,
    pub media_origin: (f32, f32),
    pub words: Vec<RawWord>,
    pub images: Vec<[f32; 4]>,
    pub blocks: Vec<[f32; 4]>,
    /// Full extracted text; rebuilt from words when absent
    pub text: Option<String>,
    /// Number of table-like regions found on the page
    pub table_count: u32,
}

impl RawPage {
    /// An empty top-left page.
    pub fn new(page_number: u32, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            rotation: 0,
            origin: CoordinateOrigin::TopLeft,
            media_origin: (0.0, 0.0),
            words: Vec::new(),
            images: Vec::new(),
            blocks: Vec::new(),
            text: None,
            table_count: 0,
        }
    }

    /// An empty US Letter page.
    pub fn letter(page_number: u32) -> Self {
        Self::new(page_number, 612.0, 792.0)
    }

    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_origin(mut self, origin: CoordinateOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_media_origin(mut self, x: f32, y: f32) -> Self {
        self.media_origin = (x, y);
        self
    }

    pub fn with_word(mut self, text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.words.push(RawWord {
            text: text.into(),
            bbox: [x0, y0, x1, y1],
        });
        self
    }

    pub fn with_image(mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.images.push([x0, y0, x1, y1]);
        self
    }

    pub fn with_block(mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.blocks.push([x0, y0, x1, y1]);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_table_count(mut self, count: u32) -> Self {
        self.table_count = count;
        self
    }
}
