//! Volume reslicing.
//!
//! Resamples a [`Volume`] onto a 2D pixel grid. The grid is described by a
//! single affine `XYToIJK` matrix: pixel `(x, y)` of the output samples the
//! volume at continuous index `XYToIJK * (x, y, 0, 1)`.
//!
//! # Output layout
//!
//! The output image has `components + 1` channels: the interpolated voxel
//! components followed by a coverage channel that is `1.0` where the sample
//! point lies inside the voxel-edge box of the volume and `0.0` outside.
//! Outside samples have all components set to `0.0`.
//!
//! ```text
//! scalar volume:  [value, coverage]
//! vector volume:  [vx, vy, vz, coverage]
//! ```
//!
//! # Interpolation
//!
//! - [`Interpolation::Nearest`] - closest voxel; required for label maps
//! - [`Interpolation::Linear`] - trilinear; neighbours beyond the last voxel
//!   are clamped to the border so the outermost half voxel is still covered

use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};
use slice_core::{Image2D, Volume};
use slice_math::{Mat4, Vec3, clamp};
use tracing::{debug, trace};

/// Sampling kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    /// Closest voxel.
    Nearest,
    /// Trilinear.
    #[default]
    Linear,
}

/// Target pixel grid of a reslice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResliceGrid {
    xy_to_ijk: Mat4,
    width: u32,
    height: u32,
}

impl ResliceGrid {
    /// Creates a grid.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidDimensions`] for an empty grid,
    /// [`OpsError::InvalidParameter`] for a non-finite matrix.
    pub fn new(xy_to_ijk: Mat4, width: u32, height: u32) -> OpsResult<Self> {
        if width == 0 || height == 0 {
            return Err(OpsError::InvalidDimensions(format!(
                "reslice grid must be non-empty, got {}x{}",
                width, height
            )));
        }
        if !xy_to_ijk.is_finite() {
            return Err(OpsError::InvalidParameter("XYToIJK is not finite".into()));
        }
        Ok(Self {
            xy_to_ijk,
            width,
            height,
        })
    }

    /// Pixel to continuous-index transform.
    pub fn xy_to_ijk(&self) -> &Mat4 {
        &self.xy_to_ijk
    }

    /// Output width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Continuous index sampled by pixel `(x, y)`.
    #[inline]
    pub fn ijk_at(&self, x: f64, y: f64) -> Vec3 {
        self.xy_to_ijk.transform_point(Vec3::new(x, y, 0.0))
    }
}

/// Resamples `volume` on `grid`.
///
/// Never modifies `volume`. Equal inputs produce bit-identical output.
pub fn reslice(volume: &Volume, grid: &ResliceGrid, interpolation: Interpolation) -> OpsResult<Image2D> {
    let (w, h) = (grid.width as usize, grid.height as usize);
    let comps = volume.components();
    let channels = comps + 1;
    debug!(width = w, height = h, components = comps, ?interpolation, "reslice");

    let mut dst = vec![0.0f32; w * h * channels];
    let sampler = Sampler::new(volume);

    for_each_row(&mut dst, w * channels, |y, row| {
        for x in 0..w {
            let ijk = grid.ijk_at(x as f64, y as f64);
            let px = &mut row[x * channels..(x + 1) * channels];
            let inside = match interpolation {
                Interpolation::Nearest => sampler.nearest(ijk, &mut px[..comps]),
                Interpolation::Linear => sampler.trilinear(ijk, &mut px[..comps]),
            };
            px[comps] = if inside { 1.0 } else { 0.0 };
        }
    });

    trace!(samples = dst.len(), "reslice done");
    Ok(Image2D::from_data(grid.width, grid.height, channels as u32, dst)?)
}

/// Samples one continuous index; true if it lies inside the volume.
///
/// `out` receives `volume.components()` values (zeros when outside).
pub fn sample(volume: &Volume, ijk: Vec3, interpolation: Interpolation, out: &mut [f32]) -> bool {
    let sampler = Sampler::new(volume);
    match interpolation {
        Interpolation::Nearest => sampler.nearest(ijk, out),
        Interpolation::Linear => sampler.trilinear(ijk, out),
    }
}

struct Sampler<'a> {
    volume: &'a Volume,
    dims: [usize; 3],
}

impl<'a> Sampler<'a> {
    fn new(volume: &'a Volume) -> Self {
        Self {
            volume,
            dims: volume.dimensions(),
        }
    }

    /// Inside the voxel-edge box `[-0.5, dim - 0.5)` on every axis.
    #[inline]
    fn contains(&self, ijk: Vec3) -> bool {
        (0..3).all(|a| {
            let v = ijk[a];
            v.is_finite() && v >= -0.5 && v < self.dims[a] as f64 - 0.5
        })
    }

    fn nearest(&self, ijk: Vec3, out: &mut [f32]) -> bool {
        if !self.contains(ijk) {
            out.fill(0.0);
            return false;
        }
        let idx = |a: usize| ((ijk[a] + 0.5).floor() as usize).min(self.dims[a] - 1);
        let (i, j, k) = (idx(0), idx(1), idx(2));
        for (c, o) in out.iter_mut().enumerate() {
            *o = self.volume.voxel(i, j, k, c);
        }
        true
    }

    fn trilinear(&self, ijk: Vec3, out: &mut [f32]) -> bool {
        if !self.contains(ijk) {
            out.fill(0.0);
            return false;
        }
        // Per-axis lower index and weight, clamped to the border voxels
        let axis = |a: usize| -> (usize, usize, f64) {
            let max = (self.dims[a] - 1) as f64;
            let v = clamp(ijk[a], 0.0, max);
            let lo = v.floor();
            let hi = (lo + 1.0).min(max);
            (lo as usize, hi as usize, v - lo)
        };
        let (i0, i1, fx) = axis(0);
        let (j0, j1, fy) = axis(1);
        let (k0, k1, fz) = axis(2);

        let vol = self.volume;
        for (c, o) in out.iter_mut().enumerate() {
            let v = |i, j, k| vol.voxel(i, j, k, c) as f64;
            let c00 = v(i0, j0, k0) * (1.0 - fx) + v(i1, j0, k0) * fx;
            let c10 = v(i0, j1, k0) * (1.0 - fx) + v(i1, j1, k0) * fx;
            let c01 = v(i0, j0, k1) * (1.0 - fx) + v(i1, j0, k1) * fx;
            let c11 = v(i0, j1, k1) * (1.0 - fx) + v(i1, j1, k1) * fx;
            let c0 = c00 * (1.0 - fy) + c10 * fy;
            let c1 = c01 * (1.0 - fy) + c11 * fy;
            *o = (c0 * (1.0 - fz) + c1 * fz) as f32;
        }
        true
    }
}
