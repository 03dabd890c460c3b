//! End-to-end audits of generated PDF documents.

mod common;

use std::io::Cursor;

use common::{build_pdf, image_at, text_at, TestPage};
use lopdf::{Document, Object};
use pagecheck::{
    analyze, analyze_bytes, analyze_file, analyze_reader, DocumentRef, Error, LopdfBackend,
    MarginSpec, Orientation, PageSource, Pagecheck, ViolationKind,
};

/// Five pages: clean, image in the margin, text in the margin, empty,
/// rotated landscape.
fn fixture() -> Vec<u8> {
    let body = text_at(150.0, 600.0, 12.0, "Chapter one begins here");
    build_pdf(&[
        TestPage::new(body.clone()),
        TestPage::new(format!("{}{}", body, image_at(0.0, 0.0, 600.0, 100.0))),
        TestPage::new(text_at(20.0, 600.0, 12.0, "Margin note")),
        TestPage::empty(),
        TestPage::new(text_at(150.0, 300.0, 12.0, "Sideways table")).rotated(90),
    ])
}

fn contents_of(doc: &Document, page_number: u32) -> Object {
    let page_id = doc.get_pages()[&page_number];
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"Contents")
        .unwrap()
        .clone()
}

#[test]
fn test_analyze_bytes_end_to_end() {
    let (analysis, _) = analyze_bytes(&fixture(), None).unwrap();
    assert_eq!(analysis.page_count(), 5);
    assert_eq!(analysis.metadata().title.as_deref(), Some("Fixture"));
    assert!(analysis.metadata().created.is_some());

    let clean = analysis.page(1).unwrap();
    assert!(clean.inside_borders());
    assert!(!clean.is_blank());
    assert!(!clean.flagged());

    let image = analysis.page(2).unwrap();
    assert!(image.text_in_bounds());
    assert!(!image.images_in_bounds());
    assert_eq!(image.violation().unwrap().kind, ViolationKind::Image);

    let text = analysis.page(3).unwrap();
    assert!(!text.text_in_bounds());
    assert_eq!(
        text.violation().and_then(|v| v.text.as_deref()),
        Some("Margin")
    );

    assert!(analysis.page(4).unwrap().is_blank());

    let rotated = analysis.page(5).unwrap();
    assert_eq!(rotated.orientation(), Orientation::Landscape);
    assert_eq!(rotated.dimensions(), (792.0, 612.0));
    assert!(rotated.inside_borders());

    assert_eq!(analysis.flagged_pages(), &[2, 3, 4]);
    assert_eq!(analysis.summary().landscape_count, 1);
}

#[test]
fn test_observed_margins_from_content_stream() {
    let pdf = build_pdf(&[TestPage::new(text_at(150.0, 600.0, 10.0, "Hello"))]);
    let (analysis, _) = analyze_bytes(&pdf, None).unwrap();
    let margins = analysis.page(1).unwrap().margins();

    // Word box spans y - 0.2 * size .. y + 0.8 * size in native space
    assert!((margins.left - 150.0).abs() < 0.01);
    assert!((margins.top - (792.0 - 608.0)).abs() < 0.01);
    assert!((margins.bottom - 598.0).abs() < 0.01);
    assert!((margins.right - (612.0 - 175.0)).abs() < 0.01);
}

#[test]
fn test_annotated_output_marks_only_violating_pages() {
    let (_, annotated) = analyze_bytes(&fixture(), None).unwrap();
    let doc = Document::load_mem(annotated.get_ref()).unwrap();
    assert_eq!(doc.get_pages().len(), 5);

    for page in [1, 4, 5] {
        assert!(
            matches!(contents_of(&doc, page), Object::Reference(_)),
            "page {page} should be untouched"
        );
    }
    for (page, color) in [(2, "0 1 0 RG"), (3, "1 0 0 RG")] {
        let Object::Array(streams) = contents_of(&doc, page) else {
            panic!("page {page} should be annotated");
        };
        let guide_id = streams.last().unwrap().as_reference().unwrap();
        let guide = doc.get_object(guide_id).unwrap().as_stream().unwrap();
        let guide = String::from_utf8(guide.content.clone()).unwrap();
        assert!(guide.contains(color), "page {page}: {guide}");
        // Default guide: 1.5in left, 1in elsewhere, drawn in native space
        assert!(guide.contains("108.000 72.000 432.000 648.000 re"));
    }
}

#[test]
fn test_annotated_output_is_reanalysable() {
    let (first, annotated) = analyze_bytes(&fixture(), None).unwrap();
    let (second, _) = analyze(DocumentRef::Bytes(annotated.into_inner()), None).unwrap();

    assert_eq!(second.page_count(), first.page_count());
    assert_eq!(second.summary().blank_pages, first.summary().blank_pages);
    assert_eq!(
        second.summary().out_of_bounds_pages,
        first.summary().out_of_bounds_pages
    );
}

#[test]
fn test_custom_margins() {
    // Narrow margins admit the margin note on page 3
    let spec = MarginSpec::uniform(18.0);
    let (analysis, _) = analyze_bytes(&fixture(), Some(spec)).unwrap();
    assert!(analysis.page(3).unwrap().inside_borders());
    assert!(!analysis.page(2).unwrap().inside_borders());
}

#[test]
fn test_page_number_in_footer() {
    let body = text_at(150.0, 600.0, 12.0, "Body text");
    let pages: Vec<TestPage> = (1..=3)
        .map(|i| TestPage::new(format!("{}{}", body, text_at(300.0, 30.0, 10.0, &i.to_string()))))
        .collect();
    let (analysis, _) = analyze_bytes(&build_pdf(&pages), None).unwrap();

    for page in analysis.pages() {
        let detection = page.page_number_detection();
        assert!(detection.found, "page {}", page.page_number());
        assert_eq!(detection.numeric_value(), Some(page.page_number()));
        assert_eq!(detection.band_width, Some(0.6));
    }
    assert_eq!(analysis.summary().page_numbers_bottom, 3);
}

#[test]
fn test_analyze_file_and_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.pdf");
    std::fs::write(&path, fixture()).unwrap();

    let (from_file, _) = analyze_file(&path, None).unwrap();
    let (from_reader, _) = analyze_reader(Cursor::new(fixture()), None).unwrap();
    assert_eq!(from_file.pages(), from_reader.pages());
}

#[test]
fn test_builder_without_overlay() {
    let output = Pagecheck::new()
        .sequential()
        .without_overlay()
        .audit_bytes(&fixture())
        .unwrap();
    assert!(output.annotated.is_none());
    assert!(matches!(
        output.write_annotated("/tmp/never-written.pdf"),
        Err(Error::Overlay(_))
    ));

    let records = output.records("fixture-1");
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.service == "pagecheck"));
    assert!(records[1].details.flagged);
}

#[test]
fn test_backend_metadata_and_frames() {
    let backend = LopdfBackend::load_bytes(&fixture()).unwrap();
    assert_eq!(backend.page_count(), 5);
    assert_eq!(backend.metadata().page_count, 5);
    assert_eq!(backend.page_frame(5).unwrap().display_size(), (792.0, 612.0));
    assert!(matches!(
        backend.raw_page(6),
        Err(Error::PageOutOfRange(6, 5))
    ));
}

#[test]
fn test_corrupt_input_is_rejected() {
    let mut pdf = fixture();
    pdf.truncate(40);
    assert!(matches!(
        analyze_bytes(&pdf, None),
        Err(Error::InputAcquisition(_))
    ));
}
