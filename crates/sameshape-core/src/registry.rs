//! Matcher registry: the rule store consulted by the canonicalizer (type
//! interception, ignore rules) and by the facade (path-level matchers).
//!
//! Requirements:
//! - stable ordering for lookups and iteration (`BTreeMap`/`BTreeSet`,
//!   registration order for type rules)
//! - no global mutable state; one registry is owned by one comparison
//!
//! The registry stores rules only; it never evaluates anything itself.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::paths::PathExpr;
use crate::reflect::{Reflect, TypeKey};

/// A custom predicate applied to a reflected value in place of the
/// generic canonical comparison.
pub trait ValueMatcher {
    /// Does the value satisfy the predicate?
    fn matches(&self, value: &dyn Reflect) -> bool;

    /// What the matcher requires, e.g. `"kiwi"` or `a non-empty string`.
    /// Rendered in `describe()` output after `and <subject> `.
    fn description(&self) -> String;

    /// Why the value failed, e.g. `was "banana"`.
    fn describe_mismatch(&self, value: &dyn Reflect) -> String {
        format!("was {}", crate::canon::plain_canonical_text(value))
    }
}

/// The failure signal raised when a bound custom matcher rejects a value.
///
/// Replaces the original exception-as-control-flow: canonicalization
/// threads `Result<_, MatcherRejection>` through its recursion and
/// short-circuits on the first rejection. All fields are owned so nothing
/// borrows from the aborted pass.
#[derive(Debug, Clone, Serialize)]
pub struct MatcherRejection {
    /// The type label or field path that owned the matcher.
    pub subject: String,
    /// The matcher's own description (what was required).
    pub description: String,
    /// The matcher's mismatch description (what was found).
    pub mismatch: String,
    /// Pretty canonical form of the rejected value, when composite.
    pub snippet: Option<String>,
}

impl MatcherRejection {
    /// The diagnostic message: `<subject> <mismatch>` plus the snippet on
    /// its own line when present. External consumers assert on this exact
    /// trailing text.
    pub fn message(&self) -> String {
        match &self.snippet {
            Some(snippet) => format!("{} {}\n{}", self.subject, self.mismatch, snippet),
            None => format!("{} {}", self.subject, self.mismatch),
        }
    }
}

struct PathRule {
    expr: PathExpr,
    matcher: Box<dyn ValueMatcher>,
}

/// Rule store for one comparison.
#[derive(Default)]
pub struct MatcherRegistry {
    ignored_paths: BTreeSet<String>,
    ignored_path_exprs: Vec<PathExpr>,
    path_matchers: BTreeMap<String, PathRule>,
    ignored_types: Vec<TypeKey>,
    type_matchers: Vec<(TypeKey, Box<dyn ValueMatcher>)>,
    name_patterns: Vec<Box<dyn Fn(&str) -> bool>>,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the subtree at `path` on both sides of the comparison.
    pub fn ignore_path(&mut self, expr: PathExpr) {
        if self.ignored_paths.insert(expr.raw().to_string()) {
            self.ignored_path_exprs.push(expr);
        }
    }

    /// Suppress every value of the given runtime type, everywhere.
    pub fn ignore_type(&mut self, key: TypeKey) {
        if !self.ignored_types.iter().any(|k| k.id == key.id) {
            self.ignored_types.push(key);
        }
    }

    /// Suppress every struct field whose name satisfies the predicate.
    pub fn ignore_field_names(&mut self, pattern: impl Fn(&str) -> bool + 'static) {
        self.name_patterns.push(Box::new(pattern));
    }

    /// Bind a matcher to a field path. A later binding for the same path
    /// replaces the earlier one.
    pub fn set_path_matcher(&mut self, expr: PathExpr, matcher: Box<dyn ValueMatcher>) {
        self.path_matchers
            .insert(expr.raw().to_string(), PathRule { expr, matcher });
    }

    /// Bind a matcher to a runtime type. A later binding for the same type
    /// replaces the earlier one.
    pub fn set_type_matcher(&mut self, key: TypeKey, matcher: Box<dyn ValueMatcher>) {
        if let Some(slot) = self.type_matchers.iter_mut().find(|(k, _)| k.id == key.id) {
            slot.1 = matcher;
        } else {
            self.type_matchers.push((key, matcher));
        }
    }

    pub fn matcher_for_path(&self, path: &str) -> Option<&dyn ValueMatcher> {
        self.path_matchers.get(path).map(|r| r.matcher.as_ref())
    }

    pub fn matcher_for_type(&self, id: TypeId) -> Option<&dyn ValueMatcher> {
        self.type_matchers
            .iter()
            .find(|(k, _)| k.id == id)
            .map(|(_, m)| m.as_ref())
    }

    pub fn is_type_ignored(&self, id: TypeId) -> bool {
        self.ignored_types.iter().any(|k| k.id == id)
    }

    pub fn has_type_matcher(&self, id: TypeId) -> bool {
        self.type_matchers.iter().any(|(k, _)| k.id == id)
    }

    pub fn is_field_name_ignored(&self, name: &str) -> bool {
        self.name_patterns.iter().any(|p| p(name))
    }

    /// Path matchers in lexicographic path order (deterministic
    /// evaluation and description order).
    pub fn path_matchers(&self) -> impl Iterator<Item = (&PathExpr, &dyn ValueMatcher)> {
        self.path_matchers
            .values()
            .map(|r| (&r.expr, r.matcher.as_ref()))
    }

    /// Type matchers in registration order.
    pub fn type_matchers(&self) -> impl Iterator<Item = (&TypeKey, &dyn ValueMatcher)> {
        self.type_matchers.iter().map(|(k, m)| (k, m.as_ref()))
    }

    /// Every path whose subtree is suppressed from the generic diff:
    /// explicitly ignored paths plus all path-matcher paths.
    pub fn filtered_paths(&self) -> Vec<&PathExpr> {
        self.ignored_path_exprs
            .iter()
            .chain(self.path_matchers.values().map(|r| &r.expr))
            .collect()
    }
}
