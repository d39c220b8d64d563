//! sameshape
//!
//! Deep-equality assertions for test fixtures. Both sides of a
//! comparison are rendered to a deterministic canonical text (unordered
//! containers sorted, timestamps fixed, smart pointers flattened), then
//! diffed structurally, so a failure names the exact path that differs
//! instead of dumping two `Debug` strings.
//!
//! ```
//! use sameshape::{assert_that, same_shape_as};
//!
//! struct Address {
//!     street: String,
//!     number: u32,
//! }
//! sameshape::reflect_struct!(Address { street, number });
//!
//! let expected = Address { street: "High Street".into(), number: 12 };
//! let actual = Address { street: "High Street".into(), number: 12 };
//! assert_that(&actual, &same_shape_as(expected));
//! ```
//!
//! Comparisons are configured fluently: ignore a path or a whole type,
//! or replace the generic comparison at a path or type with a custom
//! [`ValueMatcher`]. See [`ShapeMatcher`] for the full surface.

mod matcher;
pub mod matchers;

pub use matcher::{same_shape_as, same_shape_as_null, MismatchReport, ShapeMatcher, Verdict};

pub use sameshape_core::reflect::{downcast_ref, Field, Reflect, Shape, TypeKey};
pub use sameshape_core::registry::ValueMatcher;
pub use sameshape_core::{reflect_enum, reflect_struct, ShapeError, ShapeResult};

/// Assert that `actual` satisfies the matcher.
///
/// # Panics
/// On mismatch, with a message carrying the matcher's description and
/// the diagnostic:
///
/// ```text
/// Expected: <canonical expected text, plus configured matcher lines>
///      but: <mismatch message>
/// ```
pub fn assert_that(actual: &dyn Reflect, matcher: &ShapeMatcher) {
    assert_that_nullable(Some(actual), matcher);
}

/// [`assert_that`] for actuals that may be null.
pub fn assert_that_nullable(actual: Option<&dyn Reflect>, matcher: &ShapeMatcher) {
    if let Verdict::Mismatch(report) = matcher.evaluate(actual) {
        panic!("\nExpected: {}\n     but: {}", matcher.describe(), report.message);
    }
}
