//! Ignore rules: by path, by type, by field-name predicate, and their
//! interaction with unordered containers.

mod common;

use std::collections::HashSet;

use common::parent;
use sameshape::{assert_that, same_shape_as, Reflect, Verdict};

#[test]
fn ignored_path_makes_a_differing_field_irrelevant() {
    let expected = parent("p", "apple", 1);
    let actual = parent("p", "banana", 1);
    assert_that(&actual, &same_shape_as(expected).ignoring_path("child.name"));
}

#[test]
fn ignored_type_vanishes_everywhere() {
    let expected = parent("p", "a", 1);
    let actual = parent("p", "a", 99);
    assert_that(&actual, &same_shape_as(expected).ignoring_type::<i32>());
}

#[test]
fn ignored_field_names_apply_to_every_struct() {
    let expected = parent("p", "a", 1);
    let actual = parent("p", "a", 99);
    assert_that(
        &actual,
        &same_shape_as(expected).ignoring_fields(|name| name == "grade"),
    );
}

#[test]
fn ignoring_one_path_does_not_hide_other_differences() {
    let expected = parent("p", "apple", 1);
    let actual = parent("q", "banana", 1);
    let matcher = same_shape_as(expected).ignoring_path("child.name");
    let Verdict::Mismatch(report) = matcher.evaluate(Some(&actual as &dyn Reflect)) else {
        panic!("title still differs");
    };
    assert_eq!(report.message, "$.title: expected \"p\" but was \"q\"");
}

#[test]
fn ignored_path_distributes_into_set_elements() {
    #[derive(Hash, PartialEq, Eq)]
    struct Item {
        id: String,
        score: i32,
    }
    sameshape::reflect_struct!(Item { id, score });

    struct Bag {
        items: HashSet<Item>,
    }
    sameshape::reflect_struct!(Bag { items });

    fn bag(scores: [i32; 2]) -> Bag {
        let mut items = HashSet::new();
        items.insert(Item {
            id: "a".to_string(),
            score: scores[0],
        });
        items.insert(Item {
            id: "b".to_string(),
            score: scores[1],
        });
        Bag { items }
    }

    let expected = bag([1, 2]);
    let actual = bag([9, 8]);
    assert_that(&actual, &same_shape_as(expected).ignoring_path("items.score"));
}

#[test]
fn missing_ignored_path_is_not_an_error() {
    let expected = parent("p", "a", 1);
    let actual = parent("p", "a", 1);
    assert_that(&actual, &same_shape_as(expected).ignoring_path("no.such.field"));
}
