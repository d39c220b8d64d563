//! Canonical value helpers.
//!
//! The canonical tree is a `serde_json::Value`; the crate enables
//! `preserve_order`, so object members keep the order the canonicalizer
//! inserted them in (struct declaration order). Canonical *text* is the
//! pretty-printed rendering with 2-space indentation, stable across runs
//! and across the two sides of a comparison.
//!
//! Member keys that arise from set- or map-typed struct fields carry a
//! private marker prefix so path filtering can recognize them; the marker
//! is stripped from the final text and must never reach callers.

use serde_json::Value;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Private marker prefixed to object-member keys whose value came from an
/// unordered container field. A private-use codepoint, so fixture content
/// will not collide with it.
pub const MARKER: &str = "\u{e000}";

/// Canonical text of a tree: pretty JSON, markers stripped.
pub fn canonical_text(value: &Value) -> String {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| String::from("null"));
    strip_marker(&text)
}

/// Single-line rendering used inside diff messages.
pub fn compact_text(value: &Value) -> String {
    let text = value.to_string();
    strip_marker(&text)
}

/// Remove every occurrence of the container marker.
pub fn strip_marker(text: &str) -> String {
    text.replace(MARKER, "")
}

/// True for objects and arrays; rejected values of composite shape get a
/// pretty snippet in diagnostics, primitives and nulls do not.
pub fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Fixed timestamp pattern: month-name day, 4-digit year, 12-hour clock
/// with milliseconds and AM/PM. Instants are rendered at UTC so equal
/// instants always produce equal text.
const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[month repr:short] [day padding:none], [year] [hour repr:12 padding:zero]:[minute]:[second].[subsecond digits:3] [period case:upper]"
);

/// Render a timestamp with the fixed canonical pattern.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    let utc = ts.to_offset(UtcOffset::UTC);
    utc.format(&TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| utc.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn pretty_text_uses_two_space_indentation() {
        let v = json!({"a": 1, "b": [true, null]});
        assert_eq!(
            canonical_text(&v),
            "{\n  \"a\": 1,\n  \"b\": [\n    true,\n    null\n  ]\n}"
        );
    }

    #[test]
    fn marker_is_stripped_from_text() {
        let mut m = serde_json::Map::new();
        m.insert(format!("{MARKER}items"), json!([1, 2]));
        let v = Value::Object(m);
        let text = canonical_text(&v);
        assert!(text.contains("\"items\""));
        assert!(!text.contains(MARKER));
    }

    #[test]
    fn timestamp_pattern() {
        let ts = datetime!(2011-01-02 12:55:03.123 UTC);
        assert_eq!(format_timestamp(ts), "Jan 2, 2011 12:55:03.123 PM");
    }

    #[test]
    fn timestamp_morning_is_zero_padded() {
        let ts = datetime!(2026-08-28 03:05:09.120 UTC);
        assert_eq!(format_timestamp(ts), "Aug 28, 2026 03:05:09.120 AM");
    }

    #[test]
    fn equal_instants_render_equal_text() {
        let utc = datetime!(2020-06-01 10:00:00.000 UTC);
        let shifted = utc.to_offset(time::macros::offset!(+5:30));
        assert_eq!(format_timestamp(utc), format_timestamp(shifted));
    }

    #[test]
    fn composite_detection() {
        assert!(is_composite(&json!({"a": 1})));
        assert!(is_composite(&json!([1])));
        assert!(!is_composite(&json!("s")));
        assert!(!is_composite(&json!(null)));
    }
}
