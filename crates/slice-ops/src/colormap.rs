//! Colour mapping of resliced layers to RGBA.
//!
//! Input images come from [`reslice`](crate::reslice::reslice) and carry a
//! trailing coverage channel. The coverage becomes the alpha of the output,
//! so pixels outside the source volume are always fully transparent.
//!
//! - [`window_level`] - grey ramp (or per-channel RGB for 3-component data)
//! - [`map_scalars`] - window/level through a colour table
//! - [`map_labels`] - discrete label colours; label 0 is transparent

use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};
use slice_core::{Image2D, LookupTable, RGBA};
use slice_math::saturate;
use tracing::debug;

/// Linear intensity window.
///
/// Values at or below `level - window / 2` map to 0, values at or above
/// `level + window / 2` map to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowLevel {
    /// Width of the intensity window.
    pub window: f64,
    /// Centre of the intensity window.
    pub level: f64,
}

impl Default for WindowLevel {
    fn default() -> Self {
        Self {
            window: 256.0,
            level: 128.0,
        }
    }
}

impl WindowLevel {
    /// Creates a window; non-positive widths are rejected.
    pub fn new(window: f64, level: f64) -> OpsResult<Self> {
        if !window.is_finite() || window <= 0.0 || !level.is_finite() {
            return Err(OpsError::InvalidParameter(format!(
                "window must be positive and finite, got window={} level={}",
                window, level
            )));
        }
        Ok(Self { window, level })
    }

    /// Window spanning `[min, max]`; a flat range gets a unit window.
    pub fn from_range(min: f64, max: f64) -> Self {
        let window = (max - min).max(1.0);
        Self {
            window,
            level: (min + max) * 0.5,
        }
    }

    /// Lower edge.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.level - self.window * 0.5
    }

    /// Upper edge.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.level + self.window * 0.5
    }

    /// Maps `value` into `[0, 1]`.
    #[inline]
    pub fn apply(&self, value: f64) -> f32 {
        saturate((value - self.lower()) / self.window) as f32
    }
}

fn components_of(src: &Image2D) -> OpsResult<usize> {
    let channels = src.channels() as usize;
    if channels < 2 {
        return Err(OpsError::InvalidParameter(format!(
            "expected value channels plus coverage, got {} channel(s)",
            channels
        )));
    }
    Ok(channels - 1)
}

/// Maps every pixel with `f(values, coverage)` into a new RGBA image.
fn map_pixels<F>(src: &Image2D, f: F) -> OpsResult<Image2D>
where
    F: Fn(&[f32], f32) -> [f32; 4] + Sync + Send,
{
    let comps = components_of(src)?;
    let channels = comps + 1;
    let w = src.width() as usize;
    let data = src.data();
    let mut dst = vec![0.0f32; src.pixel_count() * RGBA as usize];

    for_each_row(&mut dst, w * 4, |y, row| {
        let src_row = &data[y * w * channels..(y + 1) * w * channels];
        for (px, out) in src_row.chunks_exact(channels).zip(row.chunks_exact_mut(4)) {
            out.copy_from_slice(&f(&px[..comps], px[comps]));
        }
    });

    Ok(Image2D::from_data(src.width(), src.height(), RGBA, dst)?)
}

/// Grey (or RGB for 3-component input) ramp with alpha from coverage.
///
/// Inputs with two or more than three components use the first one.
pub fn window_level(src: &Image2D, wl: WindowLevel) -> OpsResult<Image2D> {
    let comps = components_of(src)?;
    debug!(window = wl.window, level = wl.level, components = comps, "window_level");
    map_pixels(src, move |v, cov| {
        if comps == 3 {
            [
                wl.apply(v[0] as f64),
                wl.apply(v[1] as f64),
                wl.apply(v[2] as f64),
                cov,
            ]
        } else {
            let g = wl.apply(v[0] as f64);
            [g, g, g, cov]
        }
    })
}

/// Windowed first component through `lut`.
///
/// The table is addressed over `[wl.lower(), wl.upper()]` regardless of its own range.
pub fn map_scalars(src: &Image2D, wl: WindowLevel, lut: &LookupTable) -> OpsResult<Image2D> {
    debug!(table = lut.name(), window = wl.window, level = wl.level, "map_scalars");
    let lut = lut.clone().with_range((wl.lower(), wl.upper()));
    map_pixels(src, move |v, cov| {
        let mut c = lut.map_scalar(v[0] as f64);
        c[3] *= cov;
        c
    })
}

/// Discrete label colours; unknown labels and label 0 are transparent.
pub fn map_labels(src: &Image2D, lut: &LookupTable) -> OpsResult<Image2D> {
    debug!(table = lut.name(), entries = lut.len(), "map_labels");
    map_pixels(src, |v, cov| {
        let mut c = lut.map_label(v[0]);
        c[3] *= cov;
        c
    })
}
