//! sameshape-core
//!
//! The engine behind the `sameshape` deep-equality assertions:
//! - `Reflect` visitor surface over arbitrary fixture graphs
//! - deterministic canonicalization with exclusion and interception rules
//! - cycle detection and reference-aware encoding
//! - path rules (ignore / custom-matcher lookup)
//! - structural diffing of canonical texts
//!
//! Design notes:
//! - Everything here is a pure, synchronous computation over in-memory
//!   graphs. The crate performs no I/O and reads no environment.
//! - Canonical text is pretty-printed JSON with 2-space indentation;
//!   identical logical content always renders identical text, regardless
//!   of iteration order of unordered containers.
//! - Recoverable comparison outcomes are values (reports, rejections),
//!   never panics crossing the public boundary.

pub mod canon;
pub mod cycle;
pub mod diff;
pub mod errors;
pub mod paths;
pub mod reflect;
pub mod registry;
pub mod value;

pub use crate::errors::{ShapeError, ShapeResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::canon::{plain_canonical_text, side_canonical_text, Canonicalizer, Side};
    pub use crate::cycle::referenced_cycle_types;
    pub use crate::diff::compare_canonical;
    pub use crate::paths::PathExpr;
    pub use crate::reflect::{downcast_ref, Field, Reflect, Shape, TypeKey};
    pub use crate::registry::{MatcherRegistry, MatcherRejection, ValueMatcher};
    pub use crate::value::canonical_text;
    pub use crate::{ShapeError, ShapeResult};
}
