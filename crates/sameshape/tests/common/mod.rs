//! Shared fixtures.

#![allow(dead_code)]

pub struct Child {
    pub name: String,
    pub grade: i32,
}
sameshape::reflect_struct!(Child { name, grade });

pub struct Parent {
    pub title: String,
    pub child: Child,
}
sameshape::reflect_struct!(Parent { title, child });

pub fn parent(title: &str, child_name: &str, grade: i32) -> Parent {
    Parent {
        title: title.to_string(),
        child: Child {
            name: child_name.to_string(),
            grade,
        },
    }
}
