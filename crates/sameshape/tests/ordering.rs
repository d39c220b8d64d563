//! Order-independence and idempotence of the canonical form.

use std::collections::{BTreeSet, HashMap, HashSet};

use proptest::prelude::*;
use sameshape::{same_shape_as, Reflect};
use sameshape_core::canon::plain_canonical_text;
use sameshape_core::value::canonical_text;

struct Inventory {
    counts: HashMap<String, i32>,
}
sameshape::reflect_struct!(Inventory { counts });

proptest! {
    #[test]
    fn set_canonical_text_does_not_depend_on_the_container(
        words in prop::collection::vec("[a-z]{1,8}", 0..12),
    ) {
        let hashed: HashSet<String> = words.iter().cloned().collect();
        let ordered: BTreeSet<String> = words.iter().cloned().collect();
        prop_assert_eq!(
            plain_canonical_text(&hashed),
            plain_canonical_text(&ordered)
        );
    }

    #[test]
    fn map_canonical_text_does_not_depend_on_the_container(
        pairs in prop::collection::btree_map("[a-z]{1,6}", 0i32..100, 0..10),
    ) {
        let hashed: HashMap<String, i32> = pairs.clone().into_iter().collect();
        prop_assert_eq!(
            plain_canonical_text(&hashed),
            plain_canonical_text(&pairs)
        );
    }

    #[test]
    fn canonical_text_is_idempotent(
        words in prop::collection::vec("[a-z]{1,8}", 0..12),
    ) {
        let set: HashSet<String> = words.into_iter().collect();
        let text = plain_canonical_text(&set);
        let reparsed: serde_json::Value =
            serde_json::from_str(&text).expect("canonical text is valid JSON");
        prop_assert_eq!(canonical_text(&reparsed), text);
    }

    #[test]
    fn equal_map_content_always_matches(
        pairs in prop::collection::btree_map("[a-z]{1,6}", 0i32..100, 0..10),
    ) {
        let expected = Inventory { counts: pairs.clone().into_iter().collect() };
        let actual = Inventory { counts: pairs.into_iter().collect() };
        let matcher = same_shape_as(expected);
        prop_assert!(matcher.evaluate(Some(&actual as &dyn Reflect)).is_match());
    }
}

#[test]
fn timestamps_compare_by_instant_not_offset() {
    use time::macros::{datetime, offset};

    struct Event {
        at: time::OffsetDateTime,
    }
    sameshape::reflect_struct!(Event { at });

    let expected = Event {
        at: datetime!(2020-06-01 10:00:00.000 UTC),
    };
    let actual = Event {
        at: datetime!(2020-06-01 10:00:00.000 UTC).to_offset(offset!(+2)),
    };
    let matcher = same_shape_as(expected);
    assert!(matcher.evaluate(Some(&actual as &dyn Reflect)).is_match());
}

#[test]
fn both_sides_render_identical_text_for_identical_content() {
    let mut a = HashSet::new();
    let mut b = HashSet::new();
    for word in ["cherry", "apple", "date", "banana"] {
        a.insert(word.to_string());
    }
    for word in ["banana", "date", "apple", "cherry"] {
        b.insert(word.to_string());
    }
    assert_eq!(plain_canonical_text(&a), plain_canonical_text(&b));
}
