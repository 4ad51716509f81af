//! Vector glyph overlays for the background and foreground layers.

use crate::layer::LayerKey;
use crate::traits::GeometryProvider;
use crate::LogicResult;
use slice_core::{LookupTable, PolyData};
use slice_math::Vec3;
use slice_ops::glyph::{line_glyphs, GlyphParams};
use slice_ops::ResliceGrid;
use slice_scene::{LayerRole, ResolvedVolume};
use tracing::{debug, trace, warn};

/// Entries in the magnitude colour table.
pub const GLYPH_COLORS: usize = 256;

/// Glyph geometry of one layer, cached like [`LayerReslicer`](crate::LayerReslicer).
///
/// Only 3-component volumes produce glyphs.
#[derive(Debug, Clone)]
pub struct GlyphLayer {
    role: LayerRole,
    spacing: u32,
    scale: f64,
    key: Option<LayerKey>,
    output: Option<(PolyData, LookupTable)>,
}

impl GlyphLayer {
    /// Empty glyph layer.
    pub fn new(role: LayerRole, spacing: u32, scale: f64) -> Self {
        Self {
            role,
            spacing,
            scale,
            key: None,
            output: None,
        }
    }

    /// Layer this glyph set belongs to.
    pub fn role(&self) -> LayerRole {
        self.role
    }

    /// Glyph mesh in pixel coordinates.
    pub fn poly_data(&self) -> Option<&PolyData> {
        self.output.as_ref().map(|(p, _)| p)
    }

    /// Magnitude colour table paired with [`poly_data`](Self::poly_data).
    pub fn lookup_table(&self) -> Option<&LookupTable> {
        self.output.as_ref().map(|(_, l)| l)
    }

    /// Brings the glyphs up to date; true if they were recomputed.
    pub fn update(&mut self, volume: Option<ResolvedVolume<'_>>, geometry: &dyn GeometryProvider) -> LogicResult<bool> {
        let Some(volume) = volume else {
            let had = self.key.is_some();
            self.clear();
            return Ok(had);
        };
        let key = LayerKey::new(&volume, geometry);
        if self.key == Some(key) {
            trace!(layer = self.role.name(), "glyph cache hit");
            return Ok(false);
        }
        self.key = Some(key);
        self.output = None;

        let vol = &volume.node.volume;
        if vol.components() != 3 {
            return Ok(true);
        }
        let plane = geometry.plane();
        let Some(xy_to_ijk) = plane.xy_to_ijk(vol) else {
            warn!(layer = self.role.name(), volume = %volume.id, "volume geometry is singular, no glyphs");
            return Ok(true);
        };
        let [w, h, _] = plane.dimensions;
        let grid = ResliceGrid::new(xy_to_ijk, w, h)?;
        let xy_to_ras = plane.xy_to_ras();
        let params = GlyphParams {
            spacing: self.spacing,
            scale: self.scale,
            x_axis: xy_to_ras.transform_vector(Vec3::X),
            y_axis: xy_to_ras.transform_vector(Vec3::Y),
        };
        if let Some(poly) = line_glyphs(vol, &grid, &params)? {
            let (lo, hi) = poly.scalars().map_or((0.0, 1.0), |s| {
                s.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &m| {
                    (lo.min(m as f64), hi.max(m as f64))
                })
            });
            let range = if lo <= hi { (lo, hi) } else { (0.0, 1.0) };
            debug!(layer = self.role.name(), glyphs = poly.lines().len(), "glyphs rebuilt");
            let lut = LookupTable::rainbow(GLYPH_COLORS).with_range(range);
            self.output = Some((poly, lut));
        }
        Ok(true)
    }

    /// Drops glyphs and cache.
    pub fn clear(&mut self) {
        self.key = None;
        self.output = None;
    }
}
