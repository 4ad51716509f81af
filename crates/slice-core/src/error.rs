//! Error types for slice-core operations.
//!
//! The [`Error`] enum covers failures when *constructing* core data:
//! zero-sized images or volumes, buffers whose length does not match the
//! declared shape, non-positive voxel spacing and singular orientation
//! matrices. Read accessors never fail; they return sentinels such as
//! [`crate::Bounds::invalid`] instead.
//!
//! # Usage
//!
//! ```rust
//! use slice_core::{Error, Image2D};
//!
//! let err = Image2D::from_data(2, 2, 4, vec![0.0; 3]).unwrap_err();
//! assert!(matches!(err, Error::DataLength { expected: 16, got: 3 }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building core data types.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid image or volume dimensions.
    ///
    /// Returned when any extent is zero or the buffer size would overflow.
    #[error("invalid dimensions: {dims:?} ({reason})")]
    InvalidDimensions {
        /// Requested dimensions
        dims: Vec<usize>,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Sample buffer length does not match the declared shape.
    #[error("data length mismatch: expected {expected} samples, got {got}")]
    DataLength {
        /// Expected number of samples
        expected: usize,
        /// Actual number of samples
        got: usize,
    },

    /// Geometry that cannot describe a valid voxel grid or plane.
    ///
    /// Non-positive spacing, non-finite origins and singular direction
    /// matrices end up here.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Image dimensions don't match for the operation.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First image width
        a_width: u32,
        /// First image height
        a_height: u32,
        /// Second image width
        b_width: u32,
        /// Second image height
        b_height: u32,
    },

    /// A lookup table was created without entries.
    #[error("lookup table '{0}' has no entries")]
    EmptyTable(String),
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(dims: &[usize], reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            dims: dims.to_vec(),
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidGeometry`] error.
    #[inline]
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Returns `true` if this is a geometry-related error.
    #[inline]
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Self::InvalidGeometry(_) | Self::InvalidDimensions { .. })
    }
}

/// Checks that no extent is zero and that the element count fits in `usize`.
pub(crate) fn checked_len(dims: &[usize], components: usize) -> Result<usize> {
    if dims.iter().any(|&d| d == 0) || components == 0 {
        return Err(Error::invalid_dimensions(dims, "extents must be > 0"));
    }
    dims.iter()
        .try_fold(components, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| Error::invalid_dimensions(dims, "buffer size overflows"))
}
