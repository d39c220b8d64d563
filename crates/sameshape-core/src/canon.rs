//! Canonicalization of fixture graphs.
//!
//! Walks a [`Reflect`] graph and produces the canonical tree, applying in
//! precedence order per value:
//! 1. field-name patterns and type ignore rules (the value vanishes)
//! 2. type-level matcher interception on the actual side
//! 3. unordered-container normalization (sets and maps sort by canonical
//!    text, so iteration order never leaks into the output)
//! 4. the fixed timestamp pattern
//! 5. single-element-array encoding for presence wrappers
//! 6. reference-aware encoding for cycle-flagged types
//! 7. struct members in declaration order
//!
//! A rejection by an intercepted type matcher short-circuits the whole
//! pass as `Err(MatcherRejection)`.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde_json::{Map, Number, Value};

use crate::cycle::referenced_cycle_types;
use crate::paths::filter_paths;
use crate::reflect::{identity, is_unordered, runtime_type, Field, ObjectId, Reflect, Shape};
use crate::registry::{MatcherRegistry, MatcherRejection, ValueMatcher};
use crate::value::{canonical_text, format_timestamp, is_composite, MARKER};

/// Which side of the comparison a pass serves.
///
/// Type-level matchers are only *intercepted* on the actual side; the
/// expected side treats their types as ignored so both sides uniformly
/// omit accepted slots. `Plain` disables interception entirely and is
/// used for diagnostics snippets and matcher descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Expected,
    Actual,
    Plain,
}

/// One canonicalization pass. Reference-identity state is scoped to the
/// pass and must not be reused across calls.
pub struct Canonicalizer<'a> {
    registry: &'a MatcherRegistry,
    cycle_types: &'a HashSet<TypeId>,
    side: Side,
    seen: HashMap<ObjectId, usize>,
    next_ref: usize,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(registry: &'a MatcherRegistry, cycle_types: &'a HashSet<TypeId>, side: Side) -> Self {
        Self {
            registry,
            cycle_types,
            side,
            seen: HashMap::new(),
            next_ref: 0,
        }
    }

    /// Canonicalize one value. `Ok(None)` means the value is excluded at
    /// this position: ignored type, ignored field name, or accepted by an
    /// intercepted matcher. Struct members omit excluded values; sequence
    /// positions render them as `null`.
    pub fn canonicalize(&mut self, v: &dyn Reflect) -> Result<Option<Value>, MatcherRejection> {
        let mut out = Ok(None);
        v.with_shape(&mut |shape| out = self.canon_shape(v, shape));
        out
    }

    fn canon_shape(
        &mut self,
        v: &dyn Reflect,
        shape: Shape<'_>,
    ) -> Result<Option<Value>, MatcherRejection> {
        // Smart pointers are transparent; every rule applies to the target.
        if let Shape::Delegate(inner) = shape {
            return self.canonicalize(inner);
        }

        let tid = runtime_type(v);

        if self.registry.is_type_ignored(tid)
            || (self.side == Side::Expected && self.registry.has_type_matcher(tid))
        {
            return Ok(None);
        }

        if self.side == Side::Actual {
            if let Some(matcher) = self.registry.matcher_for_type(tid) {
                if matcher.matches(v) {
                    return Ok(None);
                }
                return Err(self.reject(v, matcher));
            }
        }

        if self.cycle_types.contains(&tid) {
            let id = identity(v);
            if let Some(n) = self.seen.get(&id) {
                return Ok(Some(Value::String(format!("0x{n:x}"))));
            }
            self.next_ref += 1;
            self.seen.insert(id, self.next_ref);
        }

        match shape {
            Shape::Null => Ok(Some(Value::Null)),
            Shape::Bool(b) => Ok(Some(Value::Bool(b))),
            Shape::Int(i) => Ok(Some(Value::Number(i.into()))),
            Shape::UInt(u) => Ok(Some(Value::Number(u.into()))),
            Shape::Float(x) => Ok(Some(
                Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null),
            )),
            Shape::Str(s) => Ok(Some(Value::String(s.to_string()))),
            Shape::Timestamp(ts) => Ok(Some(Value::String(format_timestamp(ts)))),
            Shape::Optional(opt) => self.canon_optional(opt),
            Shape::Seq(items) => self.canon_seq(items),
            Shape::Set(items) => self.canon_set(items),
            Shape::Map(entries) => self.canon_map(entries),
            Shape::Struct(fields) => self.canon_struct(fields),
            Shape::Delegate(inner) => self.canonicalize(inner),
        }
    }

    /// Presence wrappers stay visible as a single-element array so the
    /// diff shows present-vs-absent instead of collapsing into the inner
    /// value's shape.
    fn canon_optional(
        &mut self,
        opt: Option<&dyn Reflect>,
    ) -> Result<Option<Value>, MatcherRejection> {
        let inner = match opt {
            None => Value::Null,
            Some(v) => self.canonicalize(v)?.unwrap_or(Value::Null),
        };
        Ok(Some(Value::Array(vec![inner])))
    }

    fn canon_seq(&mut self, items: Vec<&dyn Reflect>) -> Result<Option<Value>, MatcherRejection> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(self.canonicalize(item)?.unwrap_or(Value::Null));
        }
        Ok(Some(Value::Array(out)))
    }

    /// Each element is canonicalized in a nested pass, then elements are
    /// sorted by their canonical text. Elements with identical canonical
    /// text collapse to one, matching set semantics under ignore rules.
    fn canon_set(&mut self, items: Vec<&dyn Reflect>) -> Result<Option<Value>, MatcherRejection> {
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            let mut nested = Canonicalizer::new(self.registry, self.cycle_types, self.side);
            let val = nested.canonicalize(item)?.unwrap_or(Value::Null);
            keyed.push((canonical_text(&val), val));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        Ok(Some(Value::Array(
            keyed.into_iter().map(|(_, val)| val).collect(),
        )))
    }

    /// Entries are grouped by the concatenation of key and value canonical
    /// text and emitted in sorted-group order. When every key has a
    /// primitive display form the compact `{key: value}` encoding is used;
    /// any composite key forces the flat alternating `[key, value, ...]`
    /// encoding, since object member names must be text.
    fn canon_map(
        &mut self,
        entries: Vec<(&dyn Reflect, &dyn Reflect)>,
    ) -> Result<Option<Value>, MatcherRejection> {
        struct Row {
            group: String,
            display: Option<String>,
            key: Value,
            value: Value,
        }

        let mut rows = Vec::with_capacity(entries.len());
        for (k, v) in entries {
            let mut nested = Canonicalizer::new(self.registry, self.cycle_types, self.side);
            let key = nested.canonicalize(k)?.unwrap_or(Value::Null);
            let mut nested = Canonicalizer::new(self.registry, self.cycle_types, self.side);
            let value = nested.canonicalize(v)?.unwrap_or(Value::Null);
            rows.push(Row {
                group: format!("{}{}", canonical_text(&key), canonical_text(&value)),
                display: key_display(k),
                key,
                value,
            });
        }

        let all_primitive = rows.iter().all(|row| row.display.is_some());
        let sorted = rows.into_iter().sorted_by(|a, b| a.group.cmp(&b.group));

        let mut out = Vec::new();
        if all_primitive {
            for row in sorted {
                let mut member = Map::new();
                member.insert(
                    row.display.unwrap_or_else(|| String::from("null")),
                    row.value,
                );
                out.push(Value::Object(member));
            }
        } else {
            for row in sorted {
                out.push(row.key);
                out.push(row.value);
            }
        }
        Ok(Some(Value::Array(out)))
    }

    fn canon_struct(&mut self, fields: Vec<Field<'_>>) -> Result<Option<Value>, MatcherRejection> {
        let mut map = Map::new();
        for field in fields {
            if self.registry.is_field_name_ignored(field.name) {
                continue;
            }
            let Some(value) = self.canonicalize(field.value)? else {
                continue;
            };
            let key = if is_unordered(field.value) {
                format!("{MARKER}{}", field.name)
            } else {
                field.name.to_string()
            };
            map.insert(key, value);
        }
        Ok(Some(Value::Object(map)))
    }

    fn reject(&self, v: &dyn Reflect, matcher: &dyn ValueMatcher) -> MatcherRejection {
        MatcherRejection {
            subject: v.type_label().to_string(),
            description: matcher.description(),
            mismatch: matcher.describe_mismatch(v),
            snippet: self.snippet_of(v),
        }
    }

    /// Pretty canonical form of a rejected value, for the diagnostic.
    /// Interception is disabled in this pass; primitives and nulls get no
    /// snippet.
    fn snippet_of(&self, v: &dyn Reflect) -> Option<String> {
        let mut plain = Canonicalizer::new(self.registry, self.cycle_types, Side::Plain);
        match plain.canonicalize(v) {
            Ok(Some(val)) if is_composite(&val) => Some(canonical_text(&val)),
            _ => None,
        }
    }
}

/// Display form of a map key, when the key is primitive enough to become
/// an object member name. Composite keys have none.
fn key_display(v: &dyn Reflect) -> Option<String> {
    let mut out = None;
    v.with_shape(&mut |shape| {
        out = match shape {
            Shape::Str(s) => Some(s.to_string()),
            Shape::Bool(b) => Some(b.to_string()),
            Shape::Int(i) => Some(i.to_string()),
            Shape::UInt(u) => Some(u.to_string()),
            Shape::Float(x) => Some(x.to_string()),
            Shape::Null => Some(String::from("null")),
            Shape::Delegate(inner) => key_display(inner),
            _ => None,
        };
    });
    out
}

/// Canonical text of one comparison side: canonicalize the root, prune
/// every filtered path, render. A `None` root (or a fully excluded root)
/// renders as `null`.
pub fn side_canonical_text(
    registry: &MatcherRegistry,
    cycle_types: &HashSet<TypeId>,
    side: Side,
    root: Option<&dyn Reflect>,
) -> Result<String, MatcherRejection> {
    let mut value = match root {
        None => Value::Null,
        Some(v) => Canonicalizer::new(registry, cycle_types, side)
            .canonicalize(v)?
            .unwrap_or(Value::Null),
    };
    filter_paths(&mut value, &registry.filtered_paths());
    Ok(canonical_text(&value))
}

/// Canonical text of a value with no rules applied: used by matcher
/// descriptions and mismatch texts.
pub fn plain_canonical_text(v: &dyn Reflect) -> String {
    let registry = MatcherRegistry::new();
    let cycles = referenced_cycle_types(Some(v));
    match Canonicalizer::new(&registry, &cycles, Side::Plain).canonicalize(v) {
        Ok(Some(val)) => canonical_text(&val),
        _ => String::from("null"),
    }
}
