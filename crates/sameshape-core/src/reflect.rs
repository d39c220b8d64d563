//! Reflection surface for fixture graphs.
//!
//! Java's original walked objects reflectively through Gson. Rust has no
//! ambient reflection, so the engine defines an explicit visitor trait:
//! every value that takes part in a comparison implements [`Reflect`] and
//! exposes its structure as a [`Shape`].
//!
//! Requirements:
//! - interior-mutability types (`RefCell`) must be able to surface
//!   references that only live for the duration of a borrow guard, hence
//!   the continuation-passing `with_shape` instead of a returned borrow
//! - smart pointers delegate, so `Rc` clones of one allocation share
//!   object identity and cyclic fixtures stay expressible
//! - runtime type identity comes from the `Any` supertrait
//!
//! Fixture structs and fieldless enums get one-line implementations via
//! [`reflect_struct!`](crate::reflect_struct) and
//! [`reflect_enum!`](crate::reflect_enum).

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use time::OffsetDateTime;

/// A value that can be canonicalized and compared.
pub trait Reflect: Any {
    /// Invoke `f` with this value's shape. The shape (and every reference
    /// inside it) is only valid for the duration of the call.
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>));

    /// Simple type name used in diagnostics, e.g. `String` or `Child`.
    fn type_label(&self) -> &'static str;
}

/// One level of a value's structure.
pub enum Shape<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'a str),
    /// A date/time instant, rendered with the engine's fixed pattern.
    Timestamp(OffsetDateTime),
    /// Presence wrapper. Canonicalizes as a single-element array so
    /// presence/absence stays visible in the diff.
    Optional(Option<&'a dyn Reflect>),
    /// Ordered sequence; element order is significant.
    Seq(Vec<&'a dyn Reflect>),
    /// Unordered set; canonical order is by element canonical text.
    Set(Vec<&'a dyn Reflect>),
    /// Unordered map; canonical order is by entry canonical text.
    Map(Vec<(&'a dyn Reflect, &'a dyn Reflect)>),
    /// Named fields in declaration order.
    Struct(Vec<Field<'a>>),
    /// Smart-pointer pass-through; rules and identity apply to the target.
    Delegate(&'a dyn Reflect),
}

/// A named struct member.
pub struct Field<'a> {
    pub name: &'static str,
    pub value: &'a dyn Reflect,
}

/// A runtime type identifier plus its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeKey {
    pub id: TypeId,
    pub label: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            label: simple_type_name::<T>(),
        }
    }
}

/// Last path segment of a type name, generics stripped:
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec`.
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Runtime type of a value behind the trait object.
pub fn runtime_type(v: &dyn Reflect) -> TypeId {
    v.type_id()
}

/// Downcast a reflected value to a concrete type.
pub fn downcast_ref<T: Any>(v: &dyn Reflect) -> Option<&T> {
    let any: &dyn Any = v;
    any.downcast_ref::<T>()
}

/// Object identity for one canonicalization pass. Must not be retained
/// across passes.
pub(crate) type ObjectId = (usize, TypeId);

/// Identity of the (delegate-resolved) value: its address paired with
/// its runtime type. The address alone is not enough, since a struct and
/// its first field occupy the same address.
pub(crate) fn identity(v: &dyn Reflect) -> ObjectId {
    (v as *const dyn Reflect as *const () as usize, v.type_id())
}

/// True if the value (through delegates) is a set- or map-like container.
pub(crate) fn is_unordered(v: &dyn Reflect) -> bool {
    let mut out = false;
    v.with_shape(&mut |shape| {
        out = match shape {
            Shape::Set(_) | Shape::Map(_) => true,
            Shape::Delegate(inner) => is_unordered(inner),
            _ => false,
        }
    });
    out
}

/// Stand-in for an absent value: the target of an unresolvable matcher
/// path, or a null actual. Canonicalizes to `null`.
pub struct Absent;

impl Reflect for Absent {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Null);
    }

    fn type_label(&self) -> &'static str {
        "null"
    }
}

// ---------------------------------------------------------------------------
// Standard implementations
// ---------------------------------------------------------------------------

macro_rules! reflect_int {
    ($($ty:ty),*) => {
        $(impl Reflect for $ty {
            fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
                f(Shape::Int(i64::from(*self)));
            }
            fn type_label(&self) -> &'static str {
                simple_type_name::<$ty>()
            }
        })*
    };
}

macro_rules! reflect_uint {
    ($($ty:ty),*) => {
        $(impl Reflect for $ty {
            fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
                f(Shape::UInt(u64::from(*self)));
            }
            fn type_label(&self) -> &'static str {
                simple_type_name::<$ty>()
            }
        })*
    };
}

reflect_int!(i8, i16, i32, i64);
reflect_uint!(u8, u16, u32, u64);

impl Reflect for isize {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Int(*self as i64));
    }
    fn type_label(&self) -> &'static str {
        "isize"
    }
}

impl Reflect for usize {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::UInt(*self as u64));
    }
    fn type_label(&self) -> &'static str {
        "usize"
    }
}

impl Reflect for f32 {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Float(f64::from(*self)));
    }
    fn type_label(&self) -> &'static str {
        "f32"
    }
}

impl Reflect for f64 {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Float(*self));
    }
    fn type_label(&self) -> &'static str {
        "f64"
    }
}

impl Reflect for bool {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Bool(*self));
    }
    fn type_label(&self) -> &'static str {
        "bool"
    }
}

impl Reflect for char {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        let s = self.to_string();
        f(Shape::Str(&s));
    }
    fn type_label(&self) -> &'static str {
        "char"
    }
}

impl Reflect for String {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Str(self.as_str()));
    }
    fn type_label(&self) -> &'static str {
        "String"
    }
}

impl Reflect for &'static str {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Str(self));
    }
    fn type_label(&self) -> &'static str {
        "str"
    }
}

impl Reflect for OffsetDateTime {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Timestamp(*self));
    }
    fn type_label(&self) -> &'static str {
        "OffsetDateTime"
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Optional(self.as_ref().map(|v| v as &dyn Reflect)));
    }
    fn type_label(&self) -> &'static str {
        "Option"
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Seq(self.iter().map(|v| v as &dyn Reflect).collect()));
    }
    fn type_label(&self) -> &'static str {
        "Vec"
    }
}

impl<T: Reflect> Reflect for HashSet<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Set(self.iter().map(|v| v as &dyn Reflect).collect()));
    }
    fn type_label(&self) -> &'static str {
        "HashSet"
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Set(self.iter().map(|v| v as &dyn Reflect).collect()));
    }
    fn type_label(&self) -> &'static str {
        "BTreeSet"
    }
}

impl<K: Reflect, V: Reflect> Reflect for HashMap<K, V> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Map(
            self.iter()
                .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect))
                .collect(),
        ));
    }
    fn type_label(&self) -> &'static str {
        "HashMap"
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Map(
            self.iter()
                .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect))
                .collect(),
        ));
    }
    fn type_label(&self) -> &'static str {
        "BTreeMap"
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Delegate(&**self));
    }
    fn type_label(&self) -> &'static str {
        "Box"
    }
}

impl<T: Reflect> Reflect for Rc<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Delegate(&**self));
    }
    fn type_label(&self) -> &'static str {
        "Rc"
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        f(Shape::Delegate(&**self));
    }
    fn type_label(&self) -> &'static str {
        "Arc"
    }
}

impl<T: Reflect> Reflect for RefCell<T> {
    /// Panics if the cell is mutably borrowed, which would be concurrent
    /// mutation during an evaluation and is outside the usage contract.
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        let inner = self.borrow();
        f(Shape::Delegate(&*inner));
    }
    fn type_label(&self) -> &'static str {
        "RefCell"
    }
}

impl<T: Reflect> Reflect for std::rc::Weak<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        match self.upgrade() {
            Some(strong) => f(Shape::Delegate(&*strong)),
            None => f(Shape::Null),
        }
    }
    fn type_label(&self) -> &'static str {
        "Weak"
    }
}

impl<T: Reflect> Reflect for std::sync::Weak<T> {
    fn with_shape(&self, f: &mut dyn FnMut(Shape<'_>)) {
        match self.upgrade() {
            Some(strong) => f(Shape::Delegate(&*strong)),
            None => f(Shape::Null),
        }
    }
    fn type_label(&self) -> &'static str {
        "Weak"
    }
}

// ---------------------------------------------------------------------------
// Fixture macros
// ---------------------------------------------------------------------------

/// Implement [`Reflect`] for a struct, exposing the listed fields in
/// declaration order.
///
/// ```
/// struct Child {
///     name: String,
///     grade: i32,
/// }
/// sameshape_core::reflect_struct!(Child { name, grade });
/// ```
#[macro_export]
macro_rules! reflect_struct {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn with_shape(&self, f: &mut dyn ::core::ops::FnMut($crate::reflect::Shape<'_>)) {
                f($crate::reflect::Shape::Struct(::std::vec![
                    $($crate::reflect::Field {
                        name: stringify!($field),
                        value: &self.$field,
                    },)*
                ]));
            }

            fn type_label(&self) -> &'static str {
                stringify!($ty)
            }
        }
    };
}

/// Implement [`Reflect`] for a fieldless enum; values canonicalize as
/// their variant name (the Gson enum encoding).
#[macro_export]
macro_rules! reflect_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn with_shape(&self, f: &mut dyn ::core::ops::FnMut($crate::reflect::Shape<'_>)) {
                let name = match self {
                    $(Self::$variant => stringify!($variant),)+
                };
                f($crate::reflect::Shape::Str(name));
            }

            fn type_label(&self) -> &'static str {
                stringify!($ty)
            }
        }
    };
}
