//! Error types for sameshape-core.
//!
//! Only programming misuse surfaces as a `ShapeError` (invalid path
//! expressions, broken configuration). Comparison outcomes (matcher
//! rejections, structural mismatches, malformed canonical text) are
//! ordinary values carried in reports.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Core error type.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// A caller-supplied argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant was violated.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// A field-path expression could not be parsed.
    #[error("invalid path expression `{path}`: {detail}")]
    InvalidPath { path: String, detail: String },
}

impl ShapeError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn invalid_path(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
