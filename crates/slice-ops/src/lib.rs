//! # slice-ops
//!
//! Pure image operations of the slice pipeline.
//!
//! Every function here is a deterministic transformation of its inputs:
//! nothing is cached and nothing is mutated in place.
//!
//! # Modules
//!
//! - [`reslice`] - Resample a 3D volume onto a 2D pixel grid
//! - [`colormap`] - Window/level and label lookup to RGBA
//! - [`composite`] - Back-to-front opacity blending of layer images
//! - [`glyph`] - Line glyphs for vector volumes
//!
//! # Example
//!
//! ```rust
//! use slice_core::Volume;
//! use slice_math::Mat4;
//! use slice_ops::reslice::{reslice, Interpolation, ResliceGrid};
//!
//! let vol = Volume::from_fn([8, 8, 1], 1, |i, _, _, _| i as f32).unwrap();
//! // Pixel (x, y) samples voxel (x, y, 0)
//! let grid = ResliceGrid::new(Mat4::IDENTITY, 8, 8).unwrap();
//! let slice = reslice(&vol, &grid, Interpolation::Nearest).unwrap();
//! assert_eq!(slice.pixel(5, 2), &[5.0, 1.0]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod colormap;
pub mod composite;
pub mod glyph;
mod parallel;
pub mod reslice;

pub use colormap::WindowLevel;
pub use error::{OpsError, OpsResult};
pub use reslice::{Interpolation, ResliceGrid};
