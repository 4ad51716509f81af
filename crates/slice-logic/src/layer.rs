//! Per-role layer reslicing with a one-entry cache.
//!
//! A layer output is recomputed only when the volume id, the volume's
//! modification time or the plane version differ from the last run. The
//! output is a colour-mapped RGBA image whose alpha is zero outside the
//! volume.

use crate::traits::{GeometryProvider, Reslicer};
use crate::LogicResult;
use slice_core::{Image2D, LookupTable, TimeStamp};
use slice_ops::colormap::{map_labels, map_scalars, window_level};
use slice_ops::reslice::{reslice, Interpolation, ResliceGrid};
use slice_ops::WindowLevel;
use slice_scene::{LayerRole, NodeId, ResolvedVolume, VolumeNode};
use tracing::{debug, trace, warn};

/// Entries in the fallback label palette.
pub const DEFAULT_LABEL_COLORS: usize = 256;

/// Inputs a cached layer product was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LayerKey {
    pub volume: NodeId,
    pub volume_mtime: TimeStamp,
    pub plane_version: TimeStamp,
}

impl LayerKey {
    pub fn new(volume: &ResolvedVolume<'_>, geometry: &dyn GeometryProvider) -> Self {
        Self {
            volume: volume.id,
            volume_mtime: volume.mtime,
            plane_version: geometry.version(),
        }
    }
}

/// Sampling kernel for a volume node.
pub fn interpolation_for(node: &VolumeNode, interpolate: bool) -> Interpolation {
    if !node.label_map && interpolate && node.display.interpolate {
        Interpolation::Linear
    } else {
        Interpolation::Nearest
    }
}

/// Default [`Reslicer`]: reslice then colour-map.
#[derive(Debug, Clone)]
pub struct LayerReslicer {
    role: LayerRole,
    interpolate: bool,
    key: Option<LayerKey>,
    output: Option<Image2D>,
}

impl LayerReslicer {
    /// Empty layer; `interpolate` enables trilinear sampling for scalar volumes.
    pub fn new(role: LayerRole, interpolate: bool) -> Self {
        Self {
            role,
            interpolate,
            key: None,
            output: None,
        }
    }

    /// Modification time of the output.
    pub fn output_mtime(&self) -> Option<TimeStamp> {
        self.output.as_ref().map(Image2D::mtime)
    }

    fn compute(&self, volume: &ResolvedVolume<'_>, geometry: &dyn GeometryProvider) -> LogicResult<Option<Image2D>> {
        let plane = geometry.plane();
        let node = volume.node;
        let Some(xy_to_ijk) = plane.xy_to_ijk(&node.volume) else {
            warn!(layer = self.role.name(), volume = %volume.id, "volume geometry is singular, layer left empty");
            return Ok(None);
        };
        let [w, h, _] = plane.dimensions;
        let grid = ResliceGrid::new(xy_to_ijk, w, h)?;
        let interpolation = interpolation_for(node, self.interpolate);
        debug!(
            layer = self.role.name(),
            volume = %volume.id,
            width = w,
            height = h,
            ?interpolation,
            "reslice layer"
        );
        let sampled = reslice(&node.volume, &grid, interpolation)?;

        let rgba = if node.label_map {
            match &node.display.color_table {
                Some(table) => map_labels(&sampled, table)?,
                None => map_labels(&sampled, &LookupTable::labels(DEFAULT_LABEL_COLORS))?,
            }
        } else {
            let wl = WindowLevel::new(node.display.window, node.display.level).unwrap_or_else(|e| {
                warn!(layer = self.role.name(), error = %e, "bad window/level, using scalar range");
                let (lo, hi) = node.volume.scalar_range(0);
                WindowLevel::from_range(lo as f64, hi as f64)
            });
            match &node.display.color_table {
                Some(table) if node.volume.components() == 1 => map_scalars(&sampled, wl, table)?,
                _ => window_level(&sampled, wl)?,
            }
        };
        Ok(Some(rgba))
    }
}

impl Reslicer for LayerReslicer {
    fn role(&self) -> LayerRole {
        self.role
    }

    fn update(&mut self, volume: Option<ResolvedVolume<'_>>, geometry: &dyn GeometryProvider) -> LogicResult<bool> {
        let Some(volume) = volume else {
            let had = self.key.is_some() || self.output.is_some();
            if had {
                debug!(layer = self.role.name(), "layer cleared");
            }
            self.clear();
            return Ok(had);
        };
        let key = LayerKey::new(&volume, geometry);
        if self.key == Some(key) {
            trace!(layer = self.role.name(), "layer cache hit");
            return Ok(false);
        }
        self.output = self.compute(&volume, geometry)?;
        self.key = Some(key);
        Ok(true)
    }

    fn output(&self) -> Option<&Image2D> {
        self.output.as_ref()
    }

    fn clear(&mut self) {
        self.key = None;
        self.output = None;
    }
}
