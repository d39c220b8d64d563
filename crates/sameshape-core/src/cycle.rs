//! Cycle detection over fixture graphs.
//!
//! Runs ahead of canonicalization and reports the set of runtime types
//! that participate in a reference cycle reachable from the root. The
//! canonicalizer switches those types to reference-aware encoding.
//!
//! Purely advisory: no side effects, recomputed fresh for every
//! comparison because the two sides are independent graphs each call.

use std::any::TypeId;
use std::collections::HashSet;

use crate::reflect::{identity, runtime_type, ObjectId, Reflect, Shape};

/// Types with at least one reference cycle reachable from `root`.
///
/// Standard DFS coloring: a back-edge into a value still on the active
/// path closes a cycle, and that value's type is recorded. Completed
/// values are never re-walked, so shared acyclic subgraphs cost linear
/// time and a finite graph always terminates, including self-references.
pub fn referenced_cycle_types(root: Option<&dyn Reflect>) -> HashSet<TypeId> {
    let mut detector = Detector::default();
    if let Some(v) = root {
        detector.walk(v);
    }
    detector.cyclic
}

#[derive(Default)]
struct Detector {
    on_path: HashSet<ObjectId>,
    done: HashSet<ObjectId>,
    cyclic: HashSet<TypeId>,
}

impl Detector {
    fn walk(&mut self, v: &dyn Reflect) {
        v.with_shape(&mut |shape| self.walk_shape(v, shape));
    }

    fn walk_shape(&mut self, v: &dyn Reflect, shape: Shape<'_>) {
        match shape {
            Shape::Struct(fields) => {
                let id = identity(v);
                if self.on_path.contains(&id) {
                    self.cyclic.insert(runtime_type(v));
                    return;
                }
                if self.done.contains(&id) {
                    return;
                }
                self.on_path.insert(id);
                for field in &fields {
                    self.walk(field.value);
                }
                self.on_path.remove(&id);
                self.done.insert(id);
            }
            Shape::Delegate(inner) => self.walk(inner),
            Shape::Optional(Some(inner)) => self.walk(inner),
            Shape::Seq(items) | Shape::Set(items) => {
                for item in items {
                    self.walk(item);
                }
            }
            Shape::Map(entries) => {
                for (k, val) in entries {
                    self.walk(k);
                    self.walk(val);
                }
            }
            // Value-typed leaves.
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Node {
        name: String,
        next: Option<Rc<RefCell<Node>>>,
    }
    crate::reflect_struct!(Node { name, next });

    struct Holder {
        left: Rc<Node>,
        right: Rc<Node>,
    }
    crate::reflect_struct!(Holder { left, right });

    fn node(name: &str) -> Node {
        Node {
            name: name.to_string(),
            next: None,
        }
    }

    #[test]
    fn acyclic_graph_reports_nothing() {
        let n = node("leaf");
        assert!(referenced_cycle_types(Some(&n)).is_empty());
        assert!(referenced_cycle_types(None).is_empty());
    }

    #[test]
    fn self_reference_is_detected() {
        let a = Rc::new(RefCell::new(node("a")));
        a.borrow_mut().next = Some(Rc::clone(&a));

        let types = referenced_cycle_types(Some(&a));
        assert!(types.contains(&TypeId::of::<Node>()));

        // break the cycle so the Rc can drop
        a.borrow_mut().next = None;
    }

    #[test]
    fn mutual_reference_is_detected() {
        let a = Rc::new(RefCell::new(node("a")));
        let b = Rc::new(RefCell::new(node("b")));
        a.borrow_mut().next = Some(Rc::clone(&b));
        b.borrow_mut().next = Some(Rc::clone(&a));

        let types = referenced_cycle_types(Some(&a));
        assert!(types.contains(&TypeId::of::<Node>()));

        a.borrow_mut().next = None;
        b.borrow_mut().next = None;
    }

    #[test]
    fn cycle_behind_a_first_field_is_still_detected() {
        struct Ring {
            next: Option<Rc<RefCell<Ring>>>,
        }
        crate::reflect_struct!(Ring { next });

        struct Inner {
            ring: Rc<RefCell<Ring>>,
        }
        crate::reflect_struct!(Inner { ring });

        struct Outer {
            inner: Inner,
        }
        crate::reflect_struct!(Outer { inner });

        let ring = Rc::new(RefCell::new(Ring { next: None }));
        ring.borrow_mut().next = Some(Rc::clone(&ring));
        // `outer.inner` shares `outer`'s address; the walk must still
        // descend through it and find the ring.
        let outer = Outer {
            inner: Inner {
                ring: Rc::clone(&ring),
            },
        };

        let types = referenced_cycle_types(Some(&outer));
        assert!(types.contains(&TypeId::of::<Ring>()));
        assert!(!types.contains(&TypeId::of::<Inner>()));
        assert!(!types.contains(&TypeId::of::<Outer>()));

        ring.borrow_mut().next = None;
    }

    #[test]
    fn shared_diamond_is_not_a_cycle() {
        let shared = Rc::new(node("shared"));
        let h = Holder {
            left: Rc::clone(&shared),
            right: shared,
        };
        assert!(referenced_cycle_types(Some(&h)).is_empty());
    }
}
