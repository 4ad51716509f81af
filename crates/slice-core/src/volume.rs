//! 3D voxel volumes positioned in patient (RAS) space.
//!
//! A [`Volume`] is a regular voxel grid with one or more float components
//! per voxel, plus the geometry that places it in the world: origin (RAS
//! position of voxel `(0, 0, 0)`), spacing (mm per voxel step) and the
//! three IJK axis directions.
//!
//! # Memory Layout
//!
//! Components are interleaved, I varies fastest:
//!
//! ```text
//! index = ((k * dim_j + j) * dim_i + i) * components + c
//! ```
//!
//! # Example
//!
//! ```rust
//! use slice_core::Volume;
//! use slice_math::Vec3;
//!
//! let vol = Volume::from_fn([4, 4, 2], 1, |i, j, k, _| (i + j + k) as f32)
//!     .unwrap()
//!     .with_spacing(Vec3::new(0.5, 0.5, 2.0))
//!     .unwrap();
//! assert_eq!(vol.voxel(3, 3, 1, 0), 7.0);
//! assert_eq!(vol.ras_bounds().dimensions(), Vec3::new(2.0, 2.0, 4.0));
//! ```

use crate::error::checked_len;
use crate::{Bounds, Error, Result};
use rayon::prelude::*;
use slice_math::{GEOMETRY_EPSILON, Mat4, Vec3};
use std::sync::Arc;

/// Regular voxel grid with RAS placement.
#[derive(Debug, Clone)]
pub struct Volume {
    scalars: Arc<Vec<f32>>,
    dimensions: [usize; 3],
    components: usize,
    origin: Vec3,
    spacing: Vec3,
    directions: [Vec3; 3],
}

impl Volume {
    /// Creates a volume at the RAS origin with unit spacing and identity directions.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] for a zero extent or component count and
    /// [`Error::DataLength`] if `scalars` has the wrong length.
    pub fn new(dimensions: [usize; 3], components: usize, scalars: Vec<f32>) -> Result<Self> {
        let expected = checked_len(&dimensions, components)?;
        if scalars.len() != expected {
            return Err(Error::DataLength {
                expected,
                got: scalars.len(),
            });
        }
        Ok(Self {
            scalars: Arc::new(scalars),
            dimensions,
            components,
            origin: Vec3::ZERO,
            spacing: Vec3::ONE,
            directions: [Vec3::X, Vec3::Y, Vec3::Z],
        })
    }

    /// Creates a volume by evaluating `f(i, j, k, component)` for every sample.
    pub fn from_fn(
        dimensions: [usize; 3],
        components: usize,
        f: impl Fn(usize, usize, usize, usize) -> f32,
    ) -> Result<Self> {
        let len = checked_len(&dimensions, components)?;
        let mut scalars = Vec::with_capacity(len);
        for k in 0..dimensions[2] {
            for j in 0..dimensions[1] {
                for i in 0..dimensions[0] {
                    for c in 0..components {
                        scalars.push(f(i, j, k, c));
                    }
                }
            }
        }
        Self::new(dimensions, components, scalars)
    }

    /// Sets the voxel spacing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`] unless every component is finite and > 0.
    pub fn with_spacing(mut self, spacing: Vec3) -> Result<Self> {
        if !spacing.is_finite() || spacing.min_element() <= 0.0 {
            return Err(Error::invalid_geometry(format!(
                "spacing must be positive, got {:?}",
                spacing.to_array()
            )));
        }
        self.spacing = spacing;
        Ok(self)
    }

    /// Sets the RAS position of voxel `(0, 0, 0)`.
    pub fn with_origin(mut self, origin: Vec3) -> Result<Self> {
        if !origin.is_finite() {
            return Err(Error::invalid_geometry("origin must be finite"));
        }
        self.origin = origin;
        Ok(self)
    }

    /// Sets the IJK axis directions (normalized on the way in).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`] for zero-length or coplanar directions.
    pub fn with_directions(mut self, directions: [Vec3; 3]) -> Result<Self> {
        let mut unit = [Vec3::ZERO; 3];
        for (dst, src) in unit.iter_mut().zip(directions) {
            *dst = src
                .try_normalize()
                .ok_or_else(|| Error::invalid_geometry("zero-length direction"))?;
        }
        if unit[0].cross(unit[1]).dot(unit[2]).abs() < GEOMETRY_EPSILON {
            return Err(Error::invalid_geometry("directions are coplanar"));
        }
        self.directions = unit;
        Ok(self)
    }

    /// Voxel counts along I, J, K.
    #[inline]
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// Components per voxel (1 for scalar volumes, 3 for vector fields).
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Voxel spacing in millimetres.
    #[inline]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// RAS position of voxel `(0, 0, 0)`.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit IJK axis directions in RAS.
    #[inline]
    pub fn directions(&self) -> [Vec3; 3] {
        self.directions
    }

    /// All samples.
    #[inline]
    pub fn scalars(&self) -> &[f32] {
        &self.scalars
    }

    /// True when both volumes share one sample buffer.
    #[inline]
    pub fn shares_scalars(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.scalars, &other.scalars)
    }

    /// Sample at integer index `(i, j, k)`, component `c`.
    ///
    /// # Panics
    ///
    /// Panics if the index lies outside the grid.
    #[inline]
    pub fn voxel(&self, i: usize, j: usize, k: usize, c: usize) -> f32 {
        let [di, dj, _] = self.dimensions;
        self.scalars[((k * dj + j) * di + i) * self.components + c]
    }

    /// Maps continuous IJK indices to RAS millimetres.
    pub fn ijk_to_ras(&self) -> Mat4 {
        Mat4::from_axes(
            self.directions[0] * self.spacing.x,
            self.directions[1] * self.spacing.y,
            self.directions[2] * self.spacing.z,
            self.origin,
        )
    }

    /// Maps RAS millimetres to continuous IJK indices.
    ///
    /// Returns `None` if the geometry is singular.
    pub fn ras_to_ijk(&self) -> Option<Mat4> {
        self.ijk_to_ras().inverse()
    }

    /// IJK box spanning the voxel edges: `-0.5 ..= dim - 0.5` on each axis.
    pub fn ijk_bounds(&self) -> Bounds {
        let [di, dj, dk] = self.dimensions;
        Bounds::from_corners(
            Vec3::splat(-0.5),
            Vec3::new(di as f64 - 0.5, dj as f64 - 0.5, dk as f64 - 0.5),
        )
    }

    /// Axis-aligned RAS box around the transformed voxel-edge corners.
    pub fn ras_bounds(&self) -> Bounds {
        let ijk_to_ras = self.ijk_to_ras();
        Bounds::from_points(self.ijk_bounds().corners().map(|c| ijk_to_ras.transform_point(c)))
    }

    /// Minimum and maximum sample of component `c`, ignoring NaN.
    ///
    /// Returns `(0.0, 0.0)` if `c` is out of range or every sample is NaN.
    pub fn scalar_range(&self, c: usize) -> (f32, f32) {
        if c >= self.components {
            return (0.0, 0.0);
        }
        let (lo, hi) = self
            .scalars
            .par_chunks(self.components)
            .map(|px| px[c])
            .filter(|v| !v.is_nan())
            .fold(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |(lo, hi), v| (lo.min(v), hi.max(v)),
            )
            .reduce(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            );
        if lo > hi { (0.0, 0.0) } else { (lo, hi) }
    }
}

impl PartialEq for Volume {
    /// Equal by value: geometry and samples; a shared buffer short-circuits the sample compare.
    fn eq(&self, other: &Self) -> bool {
        self.dimensions == other.dimensions
            && self.components == other.components
            && self.origin == other.origin
            && self.spacing == other.spacing
            && self.directions == other.directions
            && (self.shares_scalars(other) || self.scalars == other.scalars)
    }
}
