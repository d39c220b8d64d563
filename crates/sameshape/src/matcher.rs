//! The comparison facade.
//!
//! A [`ShapeMatcher`] owns the expected fixture and the rule registry,
//! and is configured fluently before its first evaluation. Configuration
//! misuse (malformed paths, mutation after the first evaluation) is a
//! programming error and panics; comparison outcomes are values.

use std::any::Any;
use std::cell::Cell;

use serde::Serialize;

use sameshape_core::canon::{side_canonical_text, Canonicalizer, Side};
use sameshape_core::cycle::referenced_cycle_types;
use sameshape_core::diff::compare_canonical;
use sameshape_core::paths::{with_value_at, PathExpr};
use sameshape_core::reflect::{Absent, Reflect, TypeKey};
use sameshape_core::registry::{MatcherRegistry, MatcherRejection, ValueMatcher};
use sameshape_core::value::{canonical_text, is_composite};

/// Outcome of one evaluation.
#[derive(Debug)]
pub enum Verdict {
    Match,
    Mismatch(MismatchReport),
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match)
    }
}

/// Everything a failed evaluation has to say. `comparison_failure` is
/// true for structural mismatches where both canonical texts exist (and
/// for null-vs-value), false when a custom matcher rejected a value
/// before any comparison happened.
#[derive(Debug, Clone, Serialize)]
pub struct MismatchReport {
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub comparison_failure: bool,
}

/// Deep-equality matcher over canonical forms.
pub struct ShapeMatcher {
    expected: Option<Box<dyn Reflect>>,
    registry: MatcherRegistry,
    frozen: Cell<bool>,
}

/// Match against the canonical form of `expected`.
pub fn same_shape_as(expected: impl Reflect) -> ShapeMatcher {
    ShapeMatcher {
        expected: Some(Box::new(expected)),
        registry: MatcherRegistry::new(),
        frozen: Cell::new(false),
    }
}

/// Match only a null actual.
pub fn same_shape_as_null() -> ShapeMatcher {
    ShapeMatcher {
        expected: None,
        registry: MatcherRegistry::new(),
        frozen: Cell::new(false),
    }
}

impl ShapeMatcher {
    /// Suppress the subtree at `path` on both sides.
    ///
    /// # Panics
    /// On a malformed path, or after the first evaluation.
    pub fn ignoring_path(mut self, path: &str) -> Self {
        self.assert_unfrozen();
        self.registry.ignore_path(parse_path(path));
        self
    }

    /// Suppress every value of type `T`, everywhere.
    ///
    /// # Panics
    /// After the first evaluation.
    pub fn ignoring_type<T: Any>(mut self) -> Self {
        self.assert_unfrozen();
        self.registry.ignore_type(TypeKey::of::<T>());
        self
    }

    /// Suppress every struct field whose name satisfies the predicate.
    ///
    /// # Panics
    /// After the first evaluation.
    pub fn ignoring_fields(mut self, pattern: impl Fn(&str) -> bool + 'static) -> Self {
        self.assert_unfrozen();
        self.registry.ignore_field_names(pattern);
        self
    }

    /// Replace generic comparison at `path` with `matcher`, evaluated
    /// against the live actual value found there.
    ///
    /// # Panics
    /// On a malformed path, or after the first evaluation.
    pub fn with_path(mut self, path: &str, matcher: impl ValueMatcher + 'static) -> Self {
        self.assert_unfrozen();
        self.registry
            .set_path_matcher(parse_path(path), Box::new(matcher));
        self
    }

    /// Replace generic comparison of every value of type `T` with
    /// `matcher`. Every occurrence on the actual side must satisfy it.
    ///
    /// # Panics
    /// After the first evaluation.
    pub fn with_type<T: Any>(mut self, matcher: impl ValueMatcher + 'static) -> Self {
        self.assert_unfrozen();
        self.registry
            .set_type_matcher(TypeKey::of::<T>(), Box::new(matcher));
        self
    }

    fn assert_unfrozen(&self) {
        if self.frozen.get() {
            panic!("matcher configuration is frozen after the first evaluation");
        }
    }

    /// Evaluate against an actual value (`None` is the null actual).
    /// Freezes the configuration.
    pub fn evaluate(&self, actual: Option<&dyn Reflect>) -> Verdict {
        self.frozen.set(true);

        // Cycle-flagged types are the union over both graphs, so a cyclic
        // side compares against an acyclic one with the same encoding.
        let mut cycles = referenced_cycle_types(self.expected.as_deref());
        cycles.extend(referenced_cycle_types(actual));

        // Path-level matchers judge the live actual graph first. An
        // unresolvable path presents the absent sentinel to the matcher.
        for (expr, matcher) in self.registry.path_matchers() {
            let mut rejection = None;
            match actual {
                Some(root) => with_value_at(root, expr, &mut |found| {
                    let value = found.unwrap_or(&Absent);
                    if !matcher.matches(value) {
                        rejection = Some(self.path_rejection(&cycles, expr, matcher, value));
                    }
                }),
                None => {
                    if !matcher.matches(&Absent) {
                        rejection = Some(self.path_rejection(&cycles, expr, matcher, &Absent));
                    }
                }
            }
            if let Some(rejection) = rejection {
                return Verdict::Mismatch(MismatchReport {
                    message: rejection.message(),
                    expected: None,
                    actual: None,
                    comparison_failure: false,
                });
            }
        }

        // The expected side never intercepts, so this pass cannot reject;
        // a rejection here would be an engine bug, reported as-is.
        let expected_text = match side_canonical_text(
            &self.registry,
            &cycles,
            Side::Expected,
            self.expected.as_deref(),
        ) {
            Ok(text) => text,
            Err(rejection) => {
                return Verdict::Mismatch(MismatchReport {
                    message: rejection.message(),
                    expected: None,
                    actual: None,
                    comparison_failure: false,
                })
            }
        };

        let Some(actual_root) = actual else {
            if expected_text == "null" {
                return Verdict::Match;
            }
            return Verdict::Mismatch(MismatchReport {
                message: String::from("actual was null"),
                expected: Some(expected_text),
                actual: None,
                comparison_failure: true,
            });
        };

        let actual_text = match side_canonical_text(
            &self.registry,
            &cycles,
            Side::Actual,
            Some(actual_root),
        ) {
            Ok(text) => text,
            Err(rejection) => {
                return Verdict::Mismatch(MismatchReport {
                    message: rejection.message(),
                    expected: None,
                    actual: None,
                    comparison_failure: false,
                })
            }
        };

        match compare_canonical(&expected_text, &actual_text) {
            None => Verdict::Match,
            Some(report) => Verdict::Mismatch(MismatchReport {
                message: report,
                expected: Some(expected_text),
                actual: Some(actual_text),
                comparison_failure: true,
            }),
        }
    }

    /// What this matcher requires: the filtered expected canonical text,
    /// plus one `and <path-or-type> <description>` line per custom
    /// matcher. Paths come in lexicographic order, types in registration
    /// order. Documentation of the configuration, not of any outcome.
    pub fn describe(&self) -> String {
        let cycles = referenced_cycle_types(self.expected.as_deref());
        let mut out = side_canonical_text(
            &self.registry,
            &cycles,
            Side::Expected,
            self.expected.as_deref(),
        )
        .unwrap_or_else(|rejection| rejection.message());
        for (expr, matcher) in self.registry.path_matchers() {
            out.push_str(&format!("\nand {} {}", expr.raw(), matcher.description()));
        }
        for (key, matcher) in self.registry.type_matchers() {
            out.push_str(&format!("\nand {} {}", key.label, matcher.description()));
        }
        out
    }

    fn path_rejection(
        &self,
        cycles: &std::collections::HashSet<std::any::TypeId>,
        expr: &PathExpr,
        matcher: &dyn ValueMatcher,
        value: &dyn Reflect,
    ) -> MatcherRejection {
        let mut plain = Canonicalizer::new(&self.registry, cycles, Side::Plain);
        let snippet = match plain.canonicalize(value) {
            Ok(Some(v)) if is_composite(&v) => Some(canonical_text(&v)),
            _ => None,
        };
        MatcherRejection {
            subject: expr.raw().to_string(),
            description: matcher.description(),
            mismatch: matcher.describe_mismatch(value),
            snippet,
        }
    }
}

fn parse_path(path: &str) -> PathExpr {
    match PathExpr::parse(path) {
        Ok(expr) => expr,
        Err(err) => panic!("{err}"),
    }
}
