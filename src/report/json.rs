//! JSON rendering of audit results.

use crate::error::{Error, Result};
use crate::model::DocumentAnalysis;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document analysis to JSON.
pub fn to_json(analysis: &DocumentAnalysis, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(analysis),
        JsonFormat::Compact => serde_json::to_string(analysis),
    };

    result.map_err(|e| Error::Serialization(format!("JSON serialization error: {}", e)))
}

/// Pretty-printed JSON.
pub fn to_json_pretty(analysis: &DocumentAnalysis) -> Result<String> {
    to_json(analysis, JsonFormat::Pretty)
}
