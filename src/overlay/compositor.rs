//! Writes margin guides into a copy of the original document.

use std::io::Cursor;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::extract::LopdfBackend;

use super::{OverlayAnnotation, StrokeColor};

/// Produce the annotated document.
///
/// Every page is kept in its original order. Pages with an annotation get
/// their original content wrapped in `q`/`Q` followed by the guide stream;
/// all other pages are untouched.
pub fn compose(
    backend: &LopdfBackend,
    annotations: &[OverlayAnnotation],
) -> Result<Cursor<Vec<u8>>> {
    let mut doc = backend.raw_doc().clone();

    for annotation in annotations {
        let page_id = backend.page_id(annotation.page_number)?;
        let frame = backend.page_frame(annotation.page_number)?;
        let native = frame.rect_to_native(&annotation.rect);
        annotate_page(&mut doc, page_id, native, annotation.color)
            .map_err(|e| Error::Overlay(format!("page {}: {}", annotation.page_number, e)))?;
        log::debug!(
            "Page {}: margin guide drawn ({:?})",
            annotation.page_number,
            annotation.color
        );
    }

    let mut out = Cursor::new(Vec::new());
    doc.save_to(&mut out)
        .map_err(|e| Error::Overlay(format!("cannot write annotated document: {}", e)))?;
    out.set_position(0);
    Ok(out)
}

/// Content stream drawing a 1pt rectangle outline. `rect` is in native
/// space as `[x0, y0, x1, y1]`.
pub fn overlay_stream(rect: [f32; 4], color: StrokeColor) -> String {
    let [x0, y0, x1, y1] = rect;
    let (r, g, b) = color.rgb();
    format!(
        "q {} {} {} RG 1 w {:.3} {:.3} {:.3} {:.3} re S Q\n",
        r,
        g,
        b,
        x0,
        y0,
        x1 - x0,
        y1 - y0
    )
}

fn annotate_page(
    doc: &mut LopdfDocument,
    page_id: ObjectId,
    rect: [f32; 4],
    color: StrokeColor,
) -> std::result::Result<(), lopdf::Error> {
    let existing = existing_contents(doc, page_id)?;

    let push_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let pop_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    let guide_id = doc.add_object(Stream::new(
        Dictionary::new(),
        overlay_stream(rect, color).into_bytes(),
    ));

    let mut contents = Vec::with_capacity(existing.len() + 3);
    contents.push(Object::Reference(push_id));
    contents.extend(existing);
    contents.push(Object::Reference(pop_id));
    contents.push(Object::Reference(guide_id));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// The page's content streams as a list of references. An inline stream is
/// moved into its own object.
fn existing_contents(
    doc: &mut LopdfDocument,
    page_id: ObjectId,
) -> std::result::Result<Vec<Object>, lopdf::Error> {
    let contents = doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();
    let refs = match contents {
        Some(Object::Reference(id)) => match doc.get_object(id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(id)],
        },
        Some(Object::Array(items)) => items,
        Some(Object::Stream(stream)) => vec![Object::Reference(doc.add_object(stream))],
        _ => Vec::new(),
    };
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;
    use lopdf::dictionary;

    /// Three-page document; page 2 is rotated.
    fn three_pages() -> LopdfDocument {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for i in 1..=3 {
            let content = format!("BT /F1 12 Tf 100 700 Td (Page {}) Tj ET", i);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if i == 2 {
                page.set("Rotate", 90);
            }
            kids.push(doc.add_object(page).into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 3,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn contents_of(doc: &LopdfDocument, page_number: u32) -> Object {
        let page_id = doc.get_pages()[&page_number];
        doc.get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .clone()
    }

    #[test]
    fn test_overlay_stream() {
        let stream = overlay_stream([108.0, 72.0, 540.0, 720.0], StrokeColor::Red);
        assert_eq!(
            stream,
            "q 1 0 0 RG 1 w 108.000 72.000 432.000 648.000 re S Q\n"
        );
    }

    #[test]
    fn test_compose_keeps_pages_and_order() {
        let backend = LopdfBackend::from_document(three_pages());
        let annotations = vec![OverlayAnnotation {
            page_number: 2,
            rect: Rect::new(72.0, 72.0, 720.0, 540.0),
            color: StrokeColor::Green,
        }];

        let out = compose(&backend, &annotations).unwrap();
        let doc = LopdfDocument::load_mem(out.get_ref()).unwrap();
        assert_eq!(doc.get_pages().len(), 3);

        // Untouched pages keep their single content stream
        assert!(matches!(contents_of(&doc, 1), Object::Reference(_)));
        assert!(matches!(contents_of(&doc, 3), Object::Reference(_)));

        let Object::Array(streams) = contents_of(&doc, 2) else {
            panic!("page 2 contents should be an array");
        };
        assert_eq!(streams.len(), 4);
        let read = |obj: &Object| {
            let id = obj.as_reference().unwrap();
            doc.get_object(id).unwrap().as_stream().unwrap().content.clone()
        };
        assert_eq!(read(&streams[0]), b"q\n");
        assert!(String::from_utf8(read(&streams[1])).unwrap().contains("(Page 2)"));
        assert_eq!(read(&streams[2]), b"\nQ\n");
        let guide = String::from_utf8(read(&streams[3])).unwrap();
        assert!(guide.contains("0 1 0 RG"));
        assert!(guide.ends_with("re S Q\n"));
    }

    #[test]
    fn test_rotated_page_maps_back_to_native() {
        let backend = LopdfBackend::from_document(three_pages());
        let frame = backend.page_frame(2).unwrap();
        assert_eq!(frame.display_size(), (792.0, 612.0));

        // Full display page maps onto the full MediaBox
        let native = frame.rect_to_native(&Rect::new(0.0, 0.0, 792.0, 612.0));
        assert_eq!(native, [0.0, 0.0, 612.0, 792.0]);
    }

    #[test]
    fn test_compose_without_annotations() {
        let backend = LopdfBackend::from_document(three_pages());
        let out = compose(&backend, &[]).unwrap();
        assert_eq!(out.position(), 0);
        let doc = LopdfDocument::load_mem(out.get_ref()).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }
}
