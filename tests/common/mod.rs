//! In-memory PDF fixtures built with lopdf.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};

/// One page of a fixture document.
pub struct TestPage {
    pub content: String,
    pub rotate: Option<i64>,
}

impl TestPage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            rotate: None,
        }
    }

    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn rotated(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

/// Text operator at a native position.
pub fn text_at(x: f32, y: f32, size: f32, text: &str) -> String {
    format!("BT /F1 {} Tf {} {} Td ({}) Tj ET\n", size, x, y, text)
}

/// Draws the shared image XObject over a native rectangle.
pub fn image_at(x: f32, y: f32, width: f32, height: f32) -> String {
    format!("q {} 0 0 {} {} {} cm /Im1 Do Q\n", width, height, x, y)
}

/// US Letter document with a Helvetica font `/F1` and a 1x1 image `/Im1`
/// shared by all pages.
pub fn build_pdf(pages: &[TestPage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0],
    ));

    let mut kids = Vec::new();
    for page in pages {
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            page.content.clone().into_bytes(),
        ));
        let mut dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if let Some(rotate) = page.rotate {
            dict.set("Rotate", rotate);
        }
        kids.push(Object::Reference(doc.add_object(dict)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => dictionary! { "Im1" => image_id },
            },
        }),
    );
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Fixture"),
        "CreationDate" => Object::string_literal("D:20240115103045"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
