//! Margin specifications and observed margins.

use serde::{Deserialize, Serialize};

use super::geometry::{inches_to_points, PageGeometry, Rect};
use crate::error::{Error, Result};

/// Default measurement tolerance in points.
pub const DEFAULT_TOLERANCE: f32 = 2.0;

/// Required margins, in points, plus a tolerance absorbing rounding in
/// extracted coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginSpec {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    /// Tolerance (epsilon) in points
    pub tolerance: f32,
}

impl MarginSpec {
    /// Create a margin spec in points with the default tolerance.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Create a margin spec from inches.
    pub fn from_inches(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(
            inches_to_points(left),
            inches_to_points(top),
            inches_to_points(right),
            inches_to_points(bottom),
        )
    }

    /// The same margin on every side, in points.
    pub fn uniform(points: f32) -> Self {
        Self::new(points, points, points, points)
    }

    /// Set the tolerance in points.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check that every value is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let sides = [
            ("left", self.left),
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in sides {
            if !value.is_finite() {
                return Err(Error::Configuration(format!(
                    "{name} margin is not a finite number"
                )));
            }
            if value < 0.0 {
                return Err(Error::Configuration(format!(
                    "{name} margin is negative ({value})"
                )));
            }
        }
        Ok(())
    }

    /// Check that the margins leave room on a page of the given geometry.
    pub fn check_fits(&self, geometry: &PageGeometry) -> Result<()> {
        if self.left + self.right > geometry.width {
            return Err(Error::Configuration(format!(
                "left + right margins ({} pt) exceed the width of page {} ({} pt)",
                self.left + self.right,
                geometry.page_number,
                geometry.width
            )));
        }
        if self.top + self.bottom > geometry.height {
            return Err(Error::Configuration(format!(
                "top + bottom margins ({} pt) exceed the height of page {} ({} pt)",
                self.top + self.bottom,
                geometry.page_number,
                geometry.height
            )));
        }
        Ok(())
    }

    /// The guide rectangle inside the margins, without tolerance.
    pub fn guide_rect(&self, geometry: &PageGeometry) -> Rect {
        Rect::new(
            self.left,
            self.top,
            geometry.width - self.right,
            geometry.height - self.bottom,
        )
    }
}

impl Default for MarginSpec {
    /// 1.5in binding margin on the left, 1in elsewhere.
    fn default() -> Self {
        Self::from_inches(1.5, 1.0, 1.0, 1.0)
    }
}

/// Margins observed on a page: distance from the outermost content to each
/// page edge, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub fn new(top: f32, bottom: f32, left: f32, right: f32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }
}

/// Target margins supplied by a caller, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetMargins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl TargetMargins {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Target margins in points.
    pub fn to_points(&self) -> Margins {
        Margins {
            top: inches_to_points(self.top),
            bottom: inches_to_points(self.bottom),
            left: inches_to_points(self.left),
            right: inches_to_points(self.right),
        }
    }

    /// Parse `"L,T,R,B"` (inches).
    pub fn parse(s: &str) -> Result<Self> {
        let values: Vec<f32> = s
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Configuration(format!("invalid target margins '{s}': {e}")))?;

        match values.as_slice() {
            [left, top, right, bottom] => Ok(Self::new(*left, *top, *right, *bottom)),
            _ => Err(Error::Configuration(format!(
                "target margins need four values (left,top,right,bottom), got '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_margin_spec() {
        let spec = MarginSpec::default();
        assert!((spec.left - 108.0).abs() < 1e-4);
        assert!((spec.top - 72.0).abs() < 1e-4);
        assert!((spec.tolerance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let spec = MarginSpec::new(-1.0, 72.0, 72.0, 72.0);
        assert!(matches!(spec.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let spec = MarginSpec::uniform(72.0).with_tolerance(f32::NAN);
        assert!(matches!(spec.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_check_fits() {
        let page = PageGeometry::new(1, 200.0, 100.0, 0);
        assert!(MarginSpec::uniform(40.0).check_fits(&page).is_ok());
        assert!(MarginSpec::uniform(60.0).check_fits(&page).is_err());
    }

    #[test]
    fn test_target_margins_parse() {
        let t = TargetMargins::parse("1.5, 1, 1, 1").unwrap();
        assert_eq!(t, TargetMargins::new(1.5, 1.0, 1.0, 1.0));
        assert!((t.to_points().left - 108.0).abs() < 1e-4);

        assert!(TargetMargins::parse("1,2,3").is_err());
        assert!(TargetMargins::parse("a,b,c,d").is_err());
    }

    #[test]
    fn test_guide_rect() {
        let page = PageGeometry::letter(1);
        let rect = MarginSpec::default().guide_rect(&page);
        assert!((rect.x0 - 108.0).abs() < 1e-4);
        assert!((rect.x1 - 540.0).abs() < 1e-4);
        assert!((rect.y1 - 720.0).abs() < 1e-4);
    }
}
