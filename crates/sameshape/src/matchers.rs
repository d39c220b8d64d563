//! Built-in value matchers.
//!
//! Everything here judges the reflected value, not its place in the
//! comparison; binding to a path or a type happens on the
//! [`ShapeMatcher`](crate::ShapeMatcher).

use std::any::Any;

use sameshape_core::canon::plain_canonical_text;
use sameshape_core::reflect::{downcast_ref, Reflect, Shape};
use sameshape_core::registry::ValueMatcher;

/// Matches values whose canonical form equals that of `expected`.
pub fn equal_to(expected: impl Reflect) -> EqualTo {
    EqualTo {
        expected: Box::new(expected),
    }
}

pub struct EqualTo {
    expected: Box<dyn Reflect>,
}

impl ValueMatcher for EqualTo {
    fn matches(&self, value: &dyn Reflect) -> bool {
        plain_canonical_text(value) == plain_canonical_text(self.expected.as_ref())
    }

    fn description(&self) -> String {
        plain_canonical_text(self.expected.as_ref())
    }
}

/// Matches any present, non-null value.
pub fn not_null() -> NotNull {
    NotNull
}

pub struct NotNull;

impl ValueMatcher for NotNull {
    fn matches(&self, value: &dyn Reflect) -> bool {
        let mut null = false;
        probe_null(value, &mut null);
        !null
    }

    fn description(&self) -> String {
        String::from("a non-null value")
    }
}

fn probe_null(value: &dyn Reflect, out: &mut bool) {
    value.with_shape(&mut |shape| match shape {
        Shape::Null => *out = true,
        Shape::Optional(None) => *out = true,
        Shape::Delegate(inner) | Shape::Optional(Some(inner)) => probe_null(inner, out),
        _ => {}
    });
}

/// Matches string-shaped values with at least one character.
pub fn non_empty_string() -> NonEmptyString {
    NonEmptyString
}

pub struct NonEmptyString;

impl ValueMatcher for NonEmptyString {
    fn matches(&self, value: &dyn Reflect) -> bool {
        let mut ok = false;
        probe_str(value, &mut ok);
        ok
    }

    fn description(&self) -> String {
        String::from("a non-empty string")
    }
}

fn probe_str(value: &dyn Reflect, out: &mut bool) {
    value.with_shape(&mut |shape| match shape {
        Shape::Str(s) => *out = !s.is_empty(),
        Shape::Delegate(inner) | Shape::Optional(Some(inner)) => probe_str(inner, out),
        _ => {}
    });
}

/// Matches values that downcast to `T` and satisfy the predicate.
/// Anything of a different runtime type fails.
pub fn typed<T: Any>(
    description: impl Into<String>,
    predicate: impl Fn(&T) -> bool + 'static,
) -> Typed<T> {
    Typed {
        description: description.into(),
        predicate: Box::new(predicate),
    }
}

pub struct Typed<T> {
    description: String,
    predicate: Box<dyn Fn(&T) -> bool>,
}

impl<T: Any> ValueMatcher for Typed<T> {
    fn matches(&self, value: &dyn Reflect) -> bool {
        downcast_ref::<T>(value).is_some_and(|v| (self.predicate)(v))
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// Matches values whose canonical text satisfies the predicate.
pub fn satisfies(
    description: impl Into<String>,
    predicate: impl Fn(&str) -> bool + 'static,
) -> Satisfies {
    Satisfies {
        description: description.into(),
        predicate: Box::new(predicate),
    }
}

pub struct Satisfies {
    description: String,
    predicate: Box<dyn Fn(&str) -> bool>,
}

impl ValueMatcher for Satisfies {
    fn matches(&self, value: &dyn Reflect) -> bool {
        (self.predicate)(&plain_canonical_text(value))
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}
