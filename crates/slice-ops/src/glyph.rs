//! Line glyphs for vector volumes.
//!
//! A 3-component volume is treated as a vector field in RAS. On a regular
//! lattice of the output pixel grid, each covered sample emits one line
//! segment centred on the pixel and oriented along the in-plane projection
//! of the vector. Points are in pixel (XY) coordinates with `z = 0`, and each
//! point carries the vector magnitude as its scalar.

use crate::reslice::{sample, Interpolation, ResliceGrid};
use crate::{OpsError, OpsResult};
use slice_core::{PolyData, Volume};
use slice_math::Vec3;
use tracing::debug;

/// Glyph lattice and sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphParams {
    /// Pixels between lattice samples.
    pub spacing: u32,
    /// Glyph length in pixels per unit of projected vector length.
    pub scale: f64,
    /// RAS displacement of one pixel step along x.
    pub x_axis: Vec3,
    /// RAS displacement of one pixel step along y.
    pub y_axis: Vec3,
}

impl GlyphParams {
    fn validate(&self) -> OpsResult<()> {
        if self.spacing == 0 {
            return Err(OpsError::InvalidParameter("glyph spacing must be > 0".into()));
        }
        if !self.scale.is_finite() {
            return Err(OpsError::InvalidParameter("glyph scale must be finite".into()));
        }
        Ok(())
    }

    /// Projects a RAS vector into pixel units on the grid.
    fn project(&self, v: Vec3) -> (f64, f64) {
        let px = |axis: Vec3| {
            let len2 = axis.length_squared();
            if len2 > 0.0 { v.dot(axis) / len2 } else { 0.0 }
        };
        (px(self.x_axis), px(self.y_axis))
    }
}

/// Generates line glyphs; `None` unless `volume` has three components.
///
/// Lattice samples start half a spacing in from the grid corner. Samples
/// outside the volume or with a zero vector are skipped.
pub fn line_glyphs(volume: &Volume, grid: &ResliceGrid, params: &GlyphParams) -> OpsResult<Option<PolyData>> {
    if volume.components() != 3 {
        return Ok(None);
    }
    params.validate()?;

    let step = params.spacing as usize;
    let start = (params.spacing / 2) as usize;
    let mut poly = PolyData::new();
    let mut scalars = Vec::new();
    let mut v = [0.0f32; 3];

    for y in (start..grid.height() as usize).step_by(step) {
        for x in (start..grid.width() as usize).step_by(step) {
            let (fx, fy) = (x as f64, y as f64);
            if !sample(volume, grid.ijk_at(fx, fy), Interpolation::Linear, &mut v) {
                continue;
            }
            let vec = Vec3::new(v[0] as f64, v[1] as f64, v[2] as f64);
            let magnitude = vec.length();
            if magnitude <= 0.0 {
                continue;
            }
            let (dx, dy) = params.project(vec);
            let half = 0.5 * params.scale;
            let a = poly.push_point(Vec3::new(fx - dx * half, fy - dy * half, 0.0));
            let b = poly.push_point(Vec3::new(fx + dx * half, fy + dy * half, 0.0));
            poly.push_line(a, b);
            scalars.extend([magnitude as f32, magnitude as f32]);
        }
    }

    debug!(glyphs = poly.lines().len(), spacing = params.spacing, "line_glyphs");
    poly.set_scalars(scalars);
    Ok(Some(poly))
}
