//! Structural comparison of canonical texts.
//!
//! Both sides arrive as canonical text, are re-parsed, and compared
//! node by node. Object member order is irrelevant (canonicalization
//! already fixed it, and the diff must not depend on it); array order is
//! significant, because sequences are ordered and unordered containers
//! were sorted before they got here.
//!
//! Differences are reported as `$`-rooted dotted paths, every difference
//! on its own line.

use serde_json::Value;

use crate::value::compact_text;

/// Compare two canonical texts. `None` means they describe the same
/// canonical tree; otherwise the report lists every difference found.
pub fn compare_canonical(expected: &str, actual: &str) -> Option<String> {
    let expected = match serde_json::from_str::<Value>(expected) {
        Ok(v) => v,
        Err(err) => return Some(format!("invalid canonical text: {err}")),
    };
    let actual = match serde_json::from_str::<Value>(actual) {
        Ok(v) => v,
        Err(err) => return Some(format!("invalid canonical text: {err}")),
    };

    let mut diffs = Vec::new();
    compare("$", &expected, &actual, &mut diffs);
    if diffs.is_empty() {
        None
    } else {
        Some(diffs.join("\n"))
    }
}

fn compare(path: &str, expected: &Value, actual: &Value, diffs: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(e), Value::Object(a)) => {
            for (key, ev) in e {
                match a.get(key) {
                    Some(av) => compare(&format!("{path}.{key}"), ev, av, diffs),
                    None => diffs.push(format!("{path}: missing member {key:?}")),
                }
            }
            for key in a.keys() {
                if !e.contains_key(key) {
                    diffs.push(format!("{path}: unexpected member {key:?}"));
                }
            }
        }
        (Value::Array(e), Value::Array(a)) => {
            if e.len() != a.len() {
                diffs.push(format!(
                    "{path}: array length was {}, expected {}",
                    a.len(),
                    e.len()
                ));
            }
            for (i, (ev, av)) in e.iter().zip(a.iter()).enumerate() {
                compare(&format!("{path}[{i}]"), ev, av, diffs);
            }
        }
        _ => {
            if expected != actual {
                diffs.push(format!(
                    "{path}: expected {} but was {}",
                    compact_text(expected),
                    compact_text(actual)
                ));
            }
        }
    }
}
