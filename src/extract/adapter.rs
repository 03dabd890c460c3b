//! Page primitive adapter.
//!
//! Normalizes a [`RawPage`] into a [`PageInput`]: visible page geometry plus
//! content boxes in display space (top-left origin, y growing downward),
//! whatever convention the backend used.

use crate::error::{Error, Result};
use crate::model::{ContentBox, CoordinateOrigin, PageFrame, PageGeometry, Rect};

use super::raw::RawPage;

/// Canonical input to every per-page analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInput {
    pub geometry: PageGeometry,
    /// Words first, then images, then blocks, each in backend order
    pub boxes: Vec<ContentBox>,
    pub text: String,
    pub table_count: u32,
}

impl PageInput {
    pub fn words(&self) -> impl Iterator<Item = &ContentBox> {
        self.boxes.iter().filter(|b| b.is_word())
    }

    pub fn images(&self) -> impl Iterator<Item = &ContentBox> {
        self.boxes.iter().filter(|b| b.is_image())
    }

    pub fn blocks(&self) -> impl Iterator<Item = &ContentBox> {
        self.boxes.iter().filter(|b| b.is_block())
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    pub fn image_count(&self) -> usize {
        self.images().count()
    }

    pub fn has_blocks(&self) -> bool {
        self.blocks().next().is_some()
    }
}

/// Normalize one raw page.
pub fn adapt(raw: &RawPage) -> Result<PageInput> {
    let page = raw.page_number;
    let malformed = |reason: String| Error::MalformedPage { page, reason };

    if !raw.width.is_finite() || raw.width <= 0.0 {
        return Err(malformed(format!("width is {}", raw.width)));
    }
    if !raw.height.is_finite() || raw.height <= 0.0 {
        return Err(malformed(format!("height is {}", raw.height)));
    }
    let rotation = normalize_rotation(raw.rotation)
        .ok_or_else(|| malformed(format!("rotation {} is not a multiple of 90", raw.rotation)))?;

    let frame = match raw.origin {
        CoordinateOrigin::TopLeft => None,
        CoordinateOrigin::BottomLeft => {
            let (ox, oy) = raw.media_origin;
            Some(PageFrame::new(
                [ox, oy, ox + raw.width, oy + raw.height],
                rotation,
            ))
        }
    };
    let geometry = match &frame {
        Some(frame) => {
            let (width, height) = frame.display_size();
            PageGeometry::new(page, width, height, rotation)
        }
        None => PageGeometry::new(page, raw.width, raw.height, rotation),
    };
    let to_display = |b: &[f32; 4]| match &frame {
        Some(frame) => frame.rect_to_display(b[0], b[1], b[2], b[3]),
        None => Rect::new(b[0], b[1], b[2], b[3]),
    };

    let mut boxes = Vec::with_capacity(raw.words.len() + raw.images.len() + raw.blocks.len());
    for word in &raw.words {
        let rect = to_display(&word.bbox);
        if !rect.is_finite() {
            log::warn!("Page {}: skipping word with non-finite box", page);
            continue;
        }
        boxes.push(ContentBox::word(word.text.clone(), rect));
    }
    for image in &raw.images {
        let rect = to_display(image);
        if !rect.is_finite() {
            log::warn!("Page {}: skipping image with non-finite box", page);
            continue;
        }
        boxes.push(ContentBox::image(rect));
    }
    for block in &raw.blocks {
        let rect = to_display(block);
        if rect.is_finite() {
            boxes.push(ContentBox::block(rect));
        }
    }

    let text = match &raw.text {
        Some(text) => text.clone(),
        None => raw
            .words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    };

    Ok(PageInput {
        geometry,
        boxes,
        text,
        table_count: raw.table_count,
    })
}

/// Fold any multiple of 90 into 0, 90, 180 or 270.
pub fn normalize_rotation(rotation: i32) -> Option<u16> {
    if rotation % 90 != 0 {
        return None;
    }
    Some(rotation.rem_euclid(360) as u16)
}
