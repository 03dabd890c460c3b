//! Page geometry and content boxes.
//!
//! All rectangles in this module use display space: origin at the top-left
//! corner of the visible page, y increasing downward, units in points.

use serde::{Deserialize, Serialize};

/// Points per inch (PDF user space unit).
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert inches to points.
pub fn inches_to_points(inches: f32) -> f32 {
    inches * POINTS_PER_INCH
}

/// Convert points to inches.
pub fn points_to_inches(points: f32) -> f32 {
    points / POINTS_PER_INCH
}

/// An axis-aligned rectangle in display space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge (distance from the page top)
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge (distance from the page top)
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle, swapping corners so that `x0 <= x1` and `y0 <= y1`.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Create a rectangle from its top-left corner and size.
    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether all four coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape iff wider than tall. Square pages are portrait.
    pub fn from_dimensions(width: f32, height: f32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visible page geometry after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Visible width in points
    pub width: f32,
    /// Visible height in points
    pub height: f32,
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,
}

impl PageGeometry {
    pub fn new(page_number: u32, width: f32, height: f32, rotation: u16) -> Self {
        Self {
            page_number,
            width,
            height,
            rotation,
        }
    }

    /// US Letter page (8.5 x 11 inches), unrotated.
    pub fn letter(page_number: u32) -> Self {
        Self::new(page_number, 612.0, 792.0, 0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_dimensions(self.width, self.height)
    }

    /// The full page as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// What a content box was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Word,
    Image,
    Block,
}

/// Bounding box of a word, image, or text block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBox {
    pub kind: ContentKind,
    pub rect: Rect,
    /// Word text (words only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBox {
    pub fn word(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            kind: ContentKind::Word,
            rect,
            text: Some(text.into()),
        }
    }

    pub fn image(rect: Rect) -> Self {
        Self {
            kind: ContentKind::Image,
            rect,
            text: None,
        }
    }

    pub fn block(rect: Rect) -> Self {
        Self {
            kind: ContentKind::Block,
            rect,
            text: None,
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == ContentKind::Word
    }

    pub fn is_image(&self) -> bool {
        self.kind == ContentKind::Image
    }

    pub fn is_block(&self) -> bool {
        self.kind == ContentKind::Block
    }

    /// Word text, or an empty string for non-word boxes.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Coordinate convention of raw extraction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrigin {
    /// Display space: top-left origin, y down, rotation already applied.
    #[default]
    TopLeft,
    /// Native PDF space: bottom-left origin of the MediaBox, y up, unrotated.
    BottomLeft,
}

/// Transform between native PDF space and display space for one page.
///
/// Native points are offset from the MediaBox origin, rotated clockwise by
/// `/Rotate`, then y-flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    origin_x: f32,
    origin_y: f32,
    native_width: f32,
    native_height: f32,
    rotation: u16,
}

impl PageFrame {
    /// Build a frame from a MediaBox `[x0, y0, x1, y1]` and a rotation that is
    /// already normalized to 0, 90, 180, or 270.
    pub fn new(media_box: [f32; 4], rotation: u16) -> Self {
        let [x0, y0, x1, y1] = media_box;
        Self {
            origin_x: x0.min(x1),
            origin_y: y0.min(y1),
            native_width: (x1 - x0).abs(),
            native_height: (y1 - y0).abs(),
            rotation,
        }
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    /// Visible (width, height) after rotation.
    pub fn display_size(&self) -> (f32, f32) {
        match self.rotation {
            90 | 270 => (self.native_height, self.native_width),
            _ => (self.native_width, self.native_height),
        }
    }

    /// Native PDF point to display point.
    pub fn to_display(&self, x: f32, y: f32) -> (f32, f32) {
        let px = x - self.origin_x;
        let py = y - self.origin_y;
        let (rx, ry) = match self.rotation {
            90 => (py, self.native_width - px),
            180 => (self.native_width - px, self.native_height - py),
            270 => (self.native_height - py, px),
            _ => (px, py),
        };
        let (_, display_height) = self.display_size();
        (rx, display_height - ry)
    }

    /// Display point back to native PDF space.
    pub fn to_native(&self, x: f32, y: f32) -> (f32, f32) {
        let (_, display_height) = self.display_size();
        let rx = x;
        let ry = display_height - y;
        let (px, py) = match self.rotation {
            90 => (self.native_width - ry, rx),
            180 => (self.native_width - rx, self.native_height - ry),
            270 => (ry, self.native_height - rx),
            _ => (rx, ry),
        };
        (px + self.origin_x, py + self.origin_y)
    }

    /// Native rectangle (any two opposite corners) to a display rectangle.
    pub fn rect_to_display(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        let (ax, ay) = self.to_display(x0, y0);
        let (bx, by) = self.to_display(x1, y1);
        Rect::new(ax, ay, bx, by)
    }

    /// Display rectangle to native `[x0, y0, x1, y1]` with `x0 <= x1`, `y0 <= y1`.
    pub fn rect_to_native(&self, rect: &Rect) -> [f32; 4] {
        let (ax, ay) = self.to_native(rect.x0, rect.y0);
        let (bx, by) = self.to_native(rect.x1, rect.y1);
        [ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)]
    }
}
