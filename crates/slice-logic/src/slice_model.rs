//! Planar mesh of the slice, for display in 3D views.
//!
//! The model and its display node live in the scene so other views can
//! reference them. This type only remembers their ids. The mesh is a quad
//! spanning the field of view, with texture coordinates `0..1` so the
//! composite image can be mapped onto it.

use crate::config::SliceModelConfig;
use crate::geometry::PlaneGeometry;
use crate::traits::GeometryProvider;
use crate::LogicResult;
use slice_core::{Image2D, LookupTable, PolyData, TimeStamp};
use slice_scene::{ModelDisplayNode, ModelNode, NodeId, Scene};
use tracing::debug;

/// Quad over the plane's pixel grid, in RAS.
pub fn build_slice_mesh(plane: &PlaneGeometry) -> PolyData {
    let mut poly = PolyData::new();
    let ids: Vec<u32> = plane.corners().into_iter().map(|p| poly.push_point(p)).collect();
    poly.push_polygon(ids);
    poly.set_tcoords(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    poly
}

/// Ids and caches of the slice model.
#[derive(Debug, Clone, Default)]
pub struct SliceModel {
    model: Option<NodeId>,
    display: Option<NodeId>,
    plane_version: Option<TimeStamp>,
    texture_mtime: Option<TimeStamp>,
    lut: Option<([f32; 4], LookupTable)>,
}

impl SliceModel {
    /// Nothing created yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Model node id while the model exists.
    pub fn model_id(&self) -> Option<NodeId> {
        self.model
    }

    /// Display node id while the model exists.
    pub fn display_id(&self) -> Option<NodeId> {
        self.display
    }

    /// True if the model node is still in `scene`.
    pub fn exists(&self, scene: &Scene) -> bool {
        self.model.is_some_and(|id| scene.model_node(id).is_some())
    }

    /// Creates the model, or rebuilds its mesh in place if it already exists.
    pub fn create(
        &mut self,
        scene: &mut Scene,
        name: &str,
        geometry: &dyn GeometryProvider,
        defaults: &SliceModelConfig,
    ) -> LogicResult<NodeId> {
        let mesh = build_slice_mesh(geometry.plane());
        if let Some(id) = self.model.filter(|id| scene.model_node(*id).is_some()) {
            scene.modify_model_node(id, |m| m.poly_data = Some(mesh))?;
            self.plane_version = Some(geometry.version());
            debug!(model = %id, "slice model replaced");
            return Ok(id);
        }
        // Stale ids from a model removed behind our back
        self.delete(scene);

        let display_id = scene.add_node(ModelDisplayNode {
            color: defaults.color,
            opacity: defaults.opacity,
            visible: defaults.visible,
            texture: None,
        });
        let model = scene.add_node(ModelNode {
            name: format!("{} Volume Slice", name),
            poly_data: Some(mesh),
            display_node: Some(display_id),
        });
        self.model = Some(model);
        self.display = Some(display_id);
        self.plane_version = Some(geometry.version());
        debug!(model = %model, display = %display_id, "slice model created");
        Ok(model)
    }

    /// Removes the model and its display node; a no-op when absent.
    pub fn delete(&mut self, scene: &mut Scene) {
        for id in [self.model.take(), self.display.take()].into_iter().flatten() {
            if scene.remove_node(id).is_ok() {
                debug!(node = %id, "slice model node removed");
            }
        }
        self.plane_version = None;
        self.texture_mtime = None;
        self.lut = None;
    }

    /// Rebuilds the mesh if the plane changed; true if it did.
    pub fn update(&mut self, scene: &mut Scene, geometry: &dyn GeometryProvider) -> LogicResult<bool> {
        let Some(id) = self.model else {
            return Ok(false);
        };
        if scene.model_node(id).is_none() {
            self.delete(scene);
            return Ok(false);
        }
        if self.plane_version == Some(geometry.version()) {
            return Ok(false);
        }
        let mesh = build_slice_mesh(geometry.plane());
        scene.modify_model_node(id, |m| m.poly_data = Some(mesh))?;
        self.plane_version = Some(geometry.version());
        debug!(model = %id, "slice model mesh rebuilt");
        Ok(true)
    }

    /// Points the display texture at `image` (or clears it).
    pub fn set_texture(&mut self, scene: &mut Scene, image: Option<&Image2D>) -> LogicResult<()> {
        let Some(id) = self.display.filter(|id| scene.model_display_node(*id).is_some()) else {
            return Ok(());
        };
        let mtime = image.map(Image2D::mtime);
        if self.texture_mtime == mtime {
            return Ok(());
        }
        scene.modify_model_display_node(id, |d| d.texture = image.cloned())?;
        self.texture_mtime = mtime;
        Ok(())
    }

    /// Mesh and single-colour table for the aggregator.
    ///
    /// The table is rebuilt only when the display colour or opacity change.
    pub fn display_entry(&mut self, scene: &Scene) -> Option<(PolyData, LookupTable)> {
        let model = scene.model_node(self.model?)?;
        let poly = model.poly_data.clone()?;
        let rgba = match model.display_node.and_then(|d| scene.model_display_node(d)) {
            Some(d) => [d.color[0], d.color[1], d.color[2], d.opacity],
            None => [1.0, 1.0, 1.0, 1.0],
        };
        let lut = match &self.lut {
            Some((c, lut)) if *c == rgba => lut.clone(),
            _ => {
                let lut = LookupTable::single_color("Slice Model", rgba);
                self.lut = Some((rgba, lut.clone()));
                lut
            }
        };
        Some((poly, lut))
    }
}
