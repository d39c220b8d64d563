//! Null actuals and absent optional fields.

mod common;

use std::panic::catch_unwind;

use common::parent;
use sameshape::{
    assert_that, assert_that_nullable, same_shape_as, same_shape_as_null, Reflect, Verdict,
};

#[test]
fn null_actual_matches_null_expectation() {
    assert_that_nullable(None, &same_shape_as_null());
}

#[test]
fn null_actual_against_a_value_reports_actual_was_null() {
    let matcher = same_shape_as(parent("p", "a", 1));
    let Verdict::Mismatch(report) = matcher.evaluate(None) else {
        panic!("must mismatch");
    };
    assert_eq!(report.message, "actual was null");
    assert!(report.comparison_failure);
    assert!(report.expected.is_some());
    assert!(report.actual.is_none());
}

#[test]
fn assertion_message_ends_with_actual_was_null() {
    let result = catch_unwind(|| {
        assert_that_nullable(None, &same_shape_as(parent("p", "a", 1)));
    });
    let payload = result.expect_err("assertion must panic");
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert!(
        message.ends_with("but: actual was null"),
        "unexpected message: {message}"
    );
}

#[test]
fn a_value_never_matches_the_null_expectation() {
    let actual = parent("p", "a", 1);
    let Verdict::Mismatch(report) =
        same_shape_as_null().evaluate(Some(&actual as &dyn Reflect))
    else {
        panic!("must mismatch");
    };
    assert!(report.message.starts_with("$: expected null but was"));
}

#[test]
fn absent_optional_field_diffs_inside_the_presence_wrapper() {
    struct Profile {
        nickname: Option<String>,
    }
    sameshape::reflect_struct!(Profile { nickname });

    let expected = Profile {
        nickname: Some("kiwi".to_string()),
    };
    let actual = Profile { nickname: None };
    let Verdict::Mismatch(report) =
        same_shape_as(expected).evaluate(Some(&actual as &dyn Reflect))
    else {
        panic!("must mismatch");
    };
    assert_eq!(
        report.message,
        "$.nickname[0]: expected \"kiwi\" but was null"
    );
}

#[test]
fn equal_absent_optionals_match() {
    struct Profile {
        nickname: Option<String>,
    }
    sameshape::reflect_struct!(Profile { nickname });

    let expected = Profile { nickname: None };
    let actual = Profile { nickname: None };
    assert_that(&actual, &same_shape_as(expected));
}
