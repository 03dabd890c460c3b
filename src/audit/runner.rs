//! Document audit driver.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::extract::{adapt, PageInput, PageSource};
use crate::model::{DocumentAnalysis, PageAnalysis, PageGeometry, PageSignals};

use super::aggregate::{assemble_document, build_page};
use super::bounds::{evaluate, matches_target, observed_margins};
use super::classify::classify;
use super::geotag::geo_tag_matches;
use super::locator::PageNumberLocator;
use super::options::{AuditOptions, ErrorMode};

/// Runs the per-page analyses over a document and assembles the result.
#[derive(Debug, Clone)]
pub struct Auditor {
    options: AuditOptions,
}

impl Auditor {
    /// Create an auditor. Invalid options are rejected here, before any page
    /// is read.
    pub fn new(options: AuditOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &AuditOptions {
        &self.options
    }

    /// Audit every page of a document.
    pub fn audit<S: PageSource + Sync>(&self, source: &S) -> Result<DocumentAnalysis> {
        let page_count = source.page_count();
        self.check_page_sizes(source, page_count)?;
        let locator = self.locator(page_count);
        log::info!(
            "Auditing {} pages ({})",
            page_count,
            if self.options.parallel {
                "parallel"
            } else {
                "sequential"
            }
        );

        let mut pages = Vec::with_capacity(page_count as usize);
        if self.options.parallel {
            let mut slots: Vec<Option<Result<PageAnalysis>>> =
                (0..page_count).map(|_| None).collect();
            slots.par_iter_mut().enumerate().for_each(|(i, slot)| {
                *slot = Some(self.process(source, &locator, i as u32 + 1));
            });
            for (i, slot) in slots.into_iter().enumerate() {
                let result = slot.unwrap_or_else(|| {
                    Err(Error::PageAnalysis {
                        page: i as u32 + 1,
                        reason: "page was not processed".to_string(),
                    })
                });
                pages.push(self.settle(i as u32 + 1, result)?);
            }
        } else {
            for page_number in 1..=page_count {
                let result = self.process(source, &locator, page_number);
                pages.push(self.settle(page_number, result)?);
            }
        }

        assemble_document(
            source.metadata(),
            pages,
            self.options.target_margins.is_some(),
        )
    }

    /// Analyse one normalized page.
    pub fn analyze_page(
        &self,
        input: &PageInput,
        locator: &PageNumberLocator,
    ) -> Result<PageAnalysis> {
        let spec = &self.options.margins;
        spec.check_fits(&input.geometry)?;

        let bounds = evaluate(input, spec);
        let margins = observed_margins(input);
        let classification = classify(input, &margins, spec.tolerance);
        let matches_target_margins = self
            .options
            .target_margins
            .as_ref()
            .map(|target| matches_target(&margins, target, spec.tolerance));

        Ok(build_page(PageSignals {
            geometry: input.geometry,
            margins,
            text_in_bounds: bounds.text_in_bounds,
            images_in_bounds: bounds.images_in_bounds,
            violation: bounds.violation,
            is_blank: classification.is_blank,
            side: classification.side,
            text_percentage: classification.text_percentage,
            page_number_detection: locator.locate(input),
            geo_tag_matches: geo_tag_matches(&input.text),
            matches_target_margins,
        }))
    }

    /// Page-number locator configured for a document of `page_count` pages.
    pub fn locator(&self, page_count: u32) -> PageNumberLocator {
        PageNumberLocator::new(
            self.options.bands.clone(),
            page_count,
            self.options.first_printed_page,
        )
    }

    /// Reject margins that cannot fit some page, before any content is
    /// extracted. Pages with unusable sizes are left to per-page handling.
    fn check_page_sizes<S: PageSource>(&self, source: &S, page_count: u32) -> Result<()> {
        for page_number in 1..=page_count {
            let Some((width, height)) = source.page_size(page_number) else {
                continue;
            };
            if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
                continue;
            }
            self.options
                .margins
                .check_fits(&PageGeometry::new(page_number, width, height, 0))?;
        }
        Ok(())
    }

    fn process<S: PageSource>(
        &self,
        source: &S,
        locator: &PageNumberLocator,
        page_number: u32,
    ) -> Result<PageAnalysis> {
        let raw = source.raw_page(page_number)?;
        let input = adapt(&raw)?;
        self.analyze_page(&input, locator)
    }

    /// Apply the error mode to one page's outcome.
    fn settle(&self, page_number: u32, result: Result<PageAnalysis>) -> Result<PageAnalysis> {
        match result {
            Ok(page) => Ok(page),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => match self.options.error_mode {
                ErrorMode::Strict => Err(e.into_page_error(page_number)),
                ErrorMode::Lenient => {
                    log::warn!("Page {} failed: {}", page_number, e);
                    Ok(PageAnalysis::failed(page_number, e.to_string()))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::extract::{MemorySource, RawPage};
    use crate::model::{CoordinateOrigin, MarginSpec, Metadata};

    fn body_page() -> RawPage {
        RawPage::letter(1).with_word("Body", 120.0, 100.0, 200.0, 112.0)
    }

    #[test]
    fn test_lenient_records_failed_page() {
        let source = MemorySource::new(vec![body_page(), RawPage::new(2, 0.0, 792.0), body_page()]);
        let auditor = Auditor::new(AuditOptions::new()).unwrap();
        let doc = auditor.audit(&source).unwrap();

        assert_eq!(doc.page_count(), 3);
        let failed = doc.page(2).unwrap();
        assert!(failed.is_failed());
        assert!(failed.flagged());
        assert_eq!(doc.summary().failed_pages, vec![2]);
        assert!(!doc.page(3).unwrap().is_failed());
    }

    #[test]
    fn test_strict_aborts() {
        let source = MemorySource::new(vec![body_page(), RawPage::new(2, 0.0, 792.0)]);
        let auditor = Auditor::new(AuditOptions::new().strict().sequential()).unwrap();
        assert!(matches!(
            auditor.audit(&source),
            Err(Error::PageAnalysis { page: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_options_rejected_up_front() {
        let options = AuditOptions::new().with_margins(MarginSpec::uniform(-5.0));
        assert!(matches!(Auditor::new(options), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_margins_wider_than_page_are_fatal() {
        let source = MemorySource::new(vec![RawPage::new(1, 100.0, 100.0)]);
        let auditor = Auditor::new(AuditOptions::new()).unwrap();
        assert!(matches!(auditor.audit(&source), Err(Error::Configuration(_))));
    }

    /// Counts extractions so tests can tell when pages were read.
    struct CountingSource {
        inner: MemorySource,
        extracted: AtomicUsize,
    }

    impl PageSource for CountingSource {
        fn page_count(&self) -> u32 {
            self.inner.page_count()
        }

        fn metadata(&self) -> Metadata {
            self.inner.metadata()
        }

        fn raw_page(&self, page_number: u32) -> Result<RawPage> {
            self.extracted.fetch_add(1, Ordering::SeqCst);
            self.inner.raw_page(page_number)
        }

        fn page_size(&self, page_number: u32) -> Option<(f32, f32)> {
            self.inner.page_size(page_number)
        }
    }

    #[test]
    fn test_margins_checked_before_extraction() {
        let source = CountingSource {
            inner: MemorySource::new(vec![body_page(), body_page(), RawPage::new(3, 100.0, 100.0)]),
            extracted: AtomicUsize::new(0),
        };
        let auditor = Auditor::new(AuditOptions::new()).unwrap();

        let err = auditor.audit(&source).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("page 3")));
        assert_eq!(source.extracted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rotated_page_size_checked_in_display_space() {
        // 700 x 300 MediaBox rotated to 300 x 700: the 1.5in + 1in side
        // margins (180pt) fit the width, 144pt fits the height
        let page = RawPage::new(1, 700.0, 300.0)
            .with_rotation(90)
            .with_origin(CoordinateOrigin::BottomLeft);
        let source = MemorySource::new(vec![page]);
        assert_eq!(source.page_size(1), Some((300.0, 700.0)));

        let auditor = Auditor::new(AuditOptions::new().sequential()).unwrap();
        assert!(auditor.audit(&source).is_ok());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pages: Vec<RawPage> = (1..=12)
            .map(|i| {
                let page = body_page();
                if i % 3 == 0 {
                    page.with_image(0.0, 0.0, 50.0, 50.0)
                } else {
                    page
                }
            })
            .collect();
        let source = MemorySource::new(pages);

        let parallel = Auditor::new(AuditOptions::new()).unwrap().audit(&source).unwrap();
        let sequential = Auditor::new(AuditOptions::new().sequential())
            .unwrap()
            .audit(&source)
            .unwrap();

        assert_eq!(parallel.pages(), sequential.pages());
        assert_eq!(parallel.flagged_pages(), &[3, 6, 9, 12]);
    }
}
