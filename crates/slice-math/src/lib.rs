//! # slice-math
//!
//! Math utilities for slice-view reformatting.
//!
//! This crate provides the geometric primitives used to place 2D slice
//! planes inside 3D patient space:
//!
//! - [`Vec3`] - 3D vectors for RAS positions, directions and spacings
//! - [`Mat4`] - 4x4 affine matrices (`IJKToRAS`, `SliceToRAS`, `XYToRAS`...)
//! - Interpolation utilities ([`inverse_lerp`], [`clamp`], [`saturate`], [`nearly_equal`])
//!
//! # Design
//!
//! This crate wraps [`glam`] double-precision types. World coordinates are
//! millimetres, so everything is `f64`. Matrices use **column vectors**:
//!
//! ```text
//! ras = xy_to_ras * xy
//! ```
//!
//! # Usage
//!
//! ```rust
//! use slice_math::{Mat4, Vec3};
//!
//! // Slice plane spanned by -X and +Y, normal +Z, centred at the origin
//! let slice_to_ras = Mat4::from_axes(
//!     Vec3::new(-1.0, 0.0, 0.0),
//!     Vec3::new(0.0, 1.0, 0.0),
//!     Vec3::new(0.0, 0.0, 1.0),
//!     Vec3::ZERO,
//! );
//!
//! let p = slice_to_ras.transform_point(Vec3::new(10.0, 0.0, 0.0));
//! assert_eq!(p, Vec3::new(-10.0, 0.0, 0.0));
//! ```
//!
//! # Dependencies
//!
//! - [`glam`] - Fast SIMD-accelerated math
//!
//! # Used By
//!
//! - `slice-core` - volume geometry
//! - `slice-ops` - reslicing
//! - `slice-scene` - slice node offsets
//! - `slice-logic` - slice plane bookkeeping

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod interp;
mod mat4;
mod vec3;

pub use interp::*;
pub use mat4::*;
pub use vec3::*;

/// Re-export glam types for direct use
pub mod glam {
    pub use ::glam::{DMat4 as GlamDMat4, DVec3 as GlamDVec3, DVec4 as GlamDVec4};
}
