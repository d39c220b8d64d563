//! Field-path rules.
//!
//! A path is a dotted string with optional element indexes, e.g.
//! `address.street` or `children[2].name`. Paths are used two ways:
//! - pruning subtrees from both sides' canonical trees (ignored paths and
//!   path-matcher paths are suppressed from the generic diff)
//! - locating the live value a path-level matcher is evaluated against
//!
//! Pruning distributes over arrays: applying `a.b` where `a` resolved to
//! an array applies `b` to every element. This is what makes ignoring a
//! field *inside* a set or map work, and is the reason unordered-container
//! members carry the private key marker.

use serde_json::Value;

use crate::errors::{ShapeError, ShapeResult};
use crate::reflect::{Reflect, Shape};
use crate::value::MARKER;

/// One parsed path segment: a member name with an optional element index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub index: Option<usize>,
}

/// A parsed field-path expression.
#[derive(Debug, Clone)]
pub struct PathExpr {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parse a dotted path. Fails on empty paths, empty segments, and
    /// malformed index suffixes.
    pub fn parse(raw: &str) -> ShapeResult<Self> {
        if raw.is_empty() {
            return Err(ShapeError::invalid_path(raw, "path is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(ShapeError::invalid_path(raw, "empty segment"));
            }
            let segment = match part.find('[') {
                None => Segment {
                    name: part.to_string(),
                    index: None,
                },
                Some(open) => {
                    let name = &part[..open];
                    if name.is_empty() {
                        return Err(ShapeError::invalid_path(raw, "index without member name"));
                    }
                    let Some(digits) = part[open + 1..].strip_suffix(']') else {
                        return Err(ShapeError::invalid_path(raw, "unterminated index"));
                    };
                    let index = digits.parse::<usize>().map_err(|_| {
                        ShapeError::invalid_path(raw, format!("invalid index `{digits}`"))
                    })?;
                    Segment {
                        name: name.to_string(),
                        index: Some(index),
                    }
                }
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

// ---------------------------------------------------------------------------
// Canonical-tree pruning
// ---------------------------------------------------------------------------

/// Remove every listed path from the canonical tree. Paths that do not
/// resolve are a silent no-op (ignoring a field that does not exist is
/// not an error).
pub fn filter_paths(value: &mut Value, paths: &[&PathExpr]) {
    for path in paths {
        prune(value, path.segments());
    }
}

fn prune(value: &mut Value, segments: &[Segment]) {
    let Some((seg, rest)) = segments.split_first() else {
        return;
    };
    match value {
        // Distribute over array elements (sets, maps, lists of structs).
        Value::Array(items) => {
            for item in items {
                prune(item, segments);
            }
        }
        Value::Object(map) => {
            let Some(key) = member_key(map, &seg.name) else {
                return;
            };
            match seg.index {
                None => {
                    if rest.is_empty() {
                        map.shift_remove(&key);
                    } else if let Some(child) = map.get_mut(&key) {
                        prune(child, rest);
                    }
                }
                Some(i) => {
                    if let Some(Value::Array(items)) = map.get_mut(&key) {
                        if let Some(element) = items.get_mut(i) {
                            if rest.is_empty() {
                                // Null the element instead of removing it so
                                // array arity stays comparable on both sides.
                                *element = Value::Null;
                            } else {
                                prune(element, rest);
                            }
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn member_key(map: &serde_json::Map<String, Value>, name: &str) -> Option<String> {
    if map.contains_key(name) {
        return Some(name.to_string());
    }
    let marked = format!("{MARKER}{name}");
    map.contains_key(&marked).then_some(marked)
}

// ---------------------------------------------------------------------------
// Live-graph lookup
// ---------------------------------------------------------------------------

/// Resolve `expr` against the live fixture graph and invoke `f` with the
/// value found there, or `None` when the path does not resolve. The
/// reference is only valid for the duration of the call.
pub fn with_value_at(root: &dyn Reflect, expr: &PathExpr, f: &mut dyn FnMut(Option<&dyn Reflect>)) {
    descend(root, expr.segments(), f);
}

fn descend(v: &dyn Reflect, segments: &[Segment], f: &mut dyn FnMut(Option<&dyn Reflect>)) {
    let Some((seg, rest)) = segments.split_first() else {
        f(Some(v));
        return;
    };
    v.with_shape(&mut |shape| match shape {
        Shape::Delegate(inner) => descend(inner, segments, f),
        Shape::Optional(Some(inner)) => descend(inner, segments, f),
        Shape::Struct(fields) => match fields.iter().find(|field| field.name == seg.name) {
            None => f(None),
            Some(field) => match seg.index {
                None => descend(field.value, rest, f),
                Some(i) => element_at(field.value, i, rest, f),
            },
        },
        _ => f(None),
    });
}

fn element_at(v: &dyn Reflect, i: usize, rest: &[Segment], f: &mut dyn FnMut(Option<&dyn Reflect>)) {
    v.with_shape(&mut |shape| match shape {
        Shape::Delegate(inner) => element_at(inner, i, rest, f),
        Shape::Seq(items) | Shape::Set(items) => match items.get(i) {
            Some(element) => descend(*element, rest, f),
            None => f(None),
        },
        _ => f(None),
    });
}
