//! # slice-core
//!
//! Core types for slice-view compositing.
//!
//! This crate provides the foundational data types shared by every other
//! crate of the workspace:
//!
//! - [`Volume`] - 3D scalar/vector voxel grid positioned in RAS space
//! - [`Image2D`] - 2D float image (RGBA after colour mapping)
//! - [`PolyData`] - points, lines and polygons for annotations and meshes
//! - [`LookupTable`] - scalar/label to RGBA colour tables
//! - [`Bounds`] - axis-aligned min/max box with an explicit invalid state
//! - [`TimeStamp`] - process-wide monotonic modification times
//!
//! ## Crate Structure
//!
//! ```text
//! slice-math (vectors, matrices)
//!    ^
//!    |
//! slice-core (this crate)
//!    ^
//!    |
//!    +-- slice-ops (reslice, colour mapping, compositing, glyphs)
//!    +-- slice-scene (scene graph nodes, observers)
//!    +-- slice-logic (slice pipeline controller)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bounds;
pub mod error;
pub mod image;
pub mod lut;
pub mod polydata;
pub mod timestamp;
pub mod volume;

pub use bounds::*;
pub use error::*;
pub use image::*;
pub use lut::*;
pub use polydata::*;
pub use timestamp::*;
pub use volume::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bounds::Bounds;
    pub use crate::error::{Error, Result};
    pub use crate::image::Image2D;
    pub use crate::lut::LookupTable;
    pub use crate::polydata::PolyData;
    pub use crate::timestamp::TimeStamp;
    pub use crate::volume::Volume;
    pub use slice_math::{Mat4, Vec3};
}
