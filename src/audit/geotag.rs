//! Latitude/longitude pairs printed in page text.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::GeoTag;

fn lat_lon_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([-+]?\d{1,2}\.\d+),\s*([-+]?\d{1,3}\.\d+)").expect("valid lat/lon pattern")
    })
}

/// All non-overlapping `lat, lon` pairs in the text, in order.
pub fn geo_tag_matches(text: &str) -> Vec<GeoTag> {
    lat_lon_pattern()
        .captures_iter(text)
        .map(|caps| GeoTag {
            latitude: caps[1].to_string(),
            longitude: caps[2].to_string(),
        })
        .collect()
}
