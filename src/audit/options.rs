//! Audit options and configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{inches_to_points, MarginSpec, TargetMargins};

/// Which page edge a margin band hugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandEdge {
    Top,
    Bottom,
}

/// A strip along the top or bottom edge searched for a printed page number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginBand {
    /// Band height in inches
    pub width: f32,
    pub edge: BandEdge,
}

impl MarginBand {
    pub fn new(width: f32, edge: BandEdge) -> Self {
        Self { width, edge }
    }

    pub fn bottom(width: f32) -> Self {
        Self::new(width, BandEdge::Bottom)
    }

    pub fn top(width: f32) -> Self {
        Self::new(width, BandEdge::Top)
    }

    /// Band height in points.
    pub fn height_points(&self) -> f32 {
        inches_to_points(self.width)
    }

    /// Bands tightest first, bottom before top at each width.
    pub fn default_bands() -> Vec<MarginBand> {
        [0.6, 1.1, 1.3]
            .into_iter()
            .flat_map(|w| [MarginBand::bottom(w), MarginBand::top(w)])
            .collect()
    }
}

/// How page-level failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Abort the run on the first failing page.
    Strict,
    /// Record the failure on the page and continue.
    #[default]
    Lenient,
}

/// Options for auditing a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditOptions {
    /// Required margins and tolerance
    pub margins: MarginSpec,

    /// Margins to compare observed margins against, in inches
    pub target_margins: Option<TargetMargins>,

    /// Page index (1-based) that carries printed number 1
    pub first_printed_page: u32,

    /// Page-number search bands, evaluated in order
    pub bands: Vec<MarginBand>,

    /// Whether to analyse pages in parallel
    pub parallel: bool,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to produce the annotated document
    pub overlay: bool,

    /// Service name stamped on persisted records
    pub service_name: String,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            margins: MarginSpec::default(),
            target_margins: None,
            first_printed_page: 1,
            bands: MarginBand::default_bands(),
            parallel: true,
            error_mode: ErrorMode::Lenient,
            overlay: true,
            service_name: "pagecheck".to_string(),
        }
    }
}

impl AuditOptions {
    /// Create new audit options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let options: AuditOptions = serde_json::from_str(&data).map_err(|e| {
            Error::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Set the required margins.
    pub fn with_margins(mut self, margins: MarginSpec) -> Self {
        self.margins = margins;
        self
    }

    /// Compare observed margins against these targets.
    pub fn with_target_margins(mut self, target: TargetMargins) -> Self {
        self.target_margins = Some(target);
        self
    }

    /// Set the page that carries printed number 1.
    pub fn with_first_printed_page(mut self, page: u32) -> Self {
        self.first_printed_page = page;
        self
    }

    /// Replace the page-number search bands.
    pub fn with_bands(mut self, bands: Vec<MarginBand>) -> Self {
        self.bands = bands;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Abort on the first failing page.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable the annotated output document.
    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Check the options before any page is processed.
    pub fn validate(&self) -> Result<()> {
        self.margins.validate()?;
        if self.bands.is_empty() {
            return Err(Error::Configuration(
                "at least one page-number band is required".to_string(),
            ));
        }
        for band in &self.bands {
            if !band.width.is_finite() || band.width <= 0.0 {
                return Err(Error::Configuration(format!(
                    "band width must be positive, got {}",
                    band.width
                )));
            }
        }
        if let Some(target) = &self.target_margins {
            let sides = [target.left, target.top, target.right, target.bottom];
            if sides.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(Error::Configuration(
                    "target margins must be finite and non-negative".to_string(),
                ));
            }
        }
        if self.first_printed_page == 0 {
            return Err(Error::Configuration(
                "first printed page is 1-based".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_bands_order() {
        let bands = MarginBand::default_bands();
        let expected = [
            (0.6, BandEdge::Bottom),
            (0.6, BandEdge::Top),
            (1.1, BandEdge::Bottom),
            (1.1, BandEdge::Top),
            (1.3, BandEdge::Bottom),
            (1.3, BandEdge::Top),
        ];
        assert_eq!(bands.len(), expected.len());
        for (band, (width, edge)) in bands.iter().zip(expected) {
            assert_eq!(band.width, width);
            assert_eq!(band.edge, edge);
        }
    }

    #[test]
    fn test_builder() {
        let options = AuditOptions::new()
            .sequential()
            .strict()
            .with_first_printed_page(3)
            .with_overlay(false);
        assert!(!options.parallel);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.first_printed_page, 3);
        assert!(!options.overlay);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_bands() {
        let options = AuditOptions::new().with_bands(Vec::new());
        assert!(matches!(options.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_negative_margin() {
        let options = AuditOptions::new().with_margins(MarginSpec::new(72.0, -1.0, 72.0, 72.0));
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_from_json_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"first_printed_page": 5, "error_mode": "strict", "margins": {{"left": 72.0}}}}"#
        )
        .unwrap();

        let options = AuditOptions::from_json_file(file.path()).unwrap();
        assert_eq!(options.first_printed_page, 5);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.margins.left, 72.0);
        assert_eq!(options.margins.top, 72.0);
        assert_eq!(options.bands.len(), 6);
        assert!(options.parallel);
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            AuditOptions::from_json_file(file.path()),
            Err(Error::Configuration(_))
        ));
    }
}
