//! The slice pipeline controller.
//!
//! [`SliceLogic`] keeps one slice view consistent with the scene:
//!
//! ```text
//! SliceNode ──────────► SliceGeometryState ──► SliceModel
//!                              │
//! SliceCompositeNode ──► volume refs ──► LayerReslicer x3 ──► Compositor ──► image
//!                              │                  │
//!                              └──────────► GlyphLayer x2 ──► PolyDataAggregator
//! ```
//!
//! Change tracking is split per stage: geometry, each of the three layers,
//! and the composite carry their own dirty flag. A scene event marks what
//! it touches and the logic then resolves exactly those stages before
//! looking at the next event.

use crate::aggregator::PolyDataAggregator;
use crate::compositor::SliceCompositor;
use crate::config::SliceLogicConfig;
use crate::geometry::{ras_box, Orientation, PlaneGeometry, SliceGeometryState};
use crate::glyph_layer::GlyphLayer;
use crate::layer::LayerReslicer;
use crate::slice_model::SliceModel;
use crate::traits::{CompositeInputs, CompositeStrategy, Compositor, GeometryProvider, Reslicer};
use crate::{LogicError, LogicResult};
use slice_core::{Bounds, Image2D, LookupTable, PolyData, Volume};
use slice_math::Vec3;
use slice_ops::composite::clamp_opacity;
use slice_scene::{
    LayerRole, NodeId, ObserverId, Scene, SceneError, SceneEvent, SliceCompositeNode, SliceNode,
    VolumeResolver,
};
use tracing::{debug, trace, warn};

/// Stages waiting to be recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyFlags {
    /// Plane changed; the slice model must follow.
    pub geometry: bool,
    /// Per layer role, in [`LayerRole::ALL`] order.
    pub layers: [bool; 3],
    /// Layer outputs or opacities changed.
    pub composite: bool,
}

impl DirtyFlags {
    /// Every stage marked.
    pub fn all() -> Self {
        Self {
            geometry: true,
            layers: [true; 3],
            composite: true,
        }
    }

    /// True if any stage is marked.
    pub fn any(&self) -> bool {
        self.geometry || self.composite || self.layers.iter().any(|d| *d)
    }
}

/// Pipeline state as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicState {
    /// Not attached, or no refresh has completed yet.
    Uninitialized,
    /// All outputs reflect the last seen node values.
    Ready,
    /// Some stages still have to be recomputed.
    Dirty(DirtyFlags),
}

/// Controller of one slice view.
pub struct SliceLogic {
    config: SliceLogicConfig,
    observer: Option<ObserverId>,
    slice_node: Option<NodeId>,
    composite_node: Option<NodeId>,
    volumes: [Option<NodeId>; 3],
    foreground_opacity: f32,
    label_opacity: f32,
    strategy: CompositeStrategy,
    geometry: SliceGeometryState,
    layers: [Box<dyn Reslicer>; 3],
    glyphs: [GlyphLayer; 2],
    compositor: Box<dyn Compositor>,
    slice_model: SliceModel,
    aggregator: PolyDataAggregator,
    dirty: DirtyFlags,
    initialized: bool,
}

impl SliceLogic {
    /// Logic with the default stages.
    pub fn new(config: SliceLogicConfig) -> LogicResult<Self> {
        let interpolate = config.interpolate;
        let layers = LayerRole::ALL.map(|role| Box::new(LayerReslicer::new(role, interpolate)) as Box<dyn Reslicer>);
        Self::with_stages(config, layers, Box::new(SliceCompositor::new()))
    }

    /// Logic with caller-provided reslicers (in [`LayerRole::ALL`] order) and compositor.
    pub fn with_stages(
        config: SliceLogicConfig,
        layers: [Box<dyn Reslicer>; 3],
        compositor: Box<dyn Compositor>,
    ) -> LogicResult<Self> {
        config.validate()?;
        for (layer, role) in layers.iter().zip(LayerRole::ALL) {
            if layer.role() != role {
                return Err(LogicError::InvalidArgument(format!(
                    "reslicer for {} placed in the {} slot",
                    layer.role().name(),
                    role.name()
                )));
            }
        }
        let plane = PlaneGeometry {
            field_of_view: Vec3::from(config.field_of_view),
            dimensions: config.dimensions,
            ..PlaneGeometry::default()
        };
        let plane = match Orientation::from_name(&config.layout) {
            Some(o) => plane.with_orientation(o),
            None => plane,
        };
        let glyphs = [LayerRole::Background, LayerRole::Foreground]
            .map(|role| GlyphLayer::new(role, config.glyph_spacing, config.glyph_scale));
        Ok(Self {
            foreground_opacity: config.foreground_opacity,
            label_opacity: config.label_opacity,
            config,
            observer: None,
            slice_node: None,
            composite_node: None,
            volumes: [None; 3],
            strategy: CompositeStrategy::Opacity,
            geometry: SliceGeometryState::new(plane),
            layers,
            glyphs,
            compositor,
            slice_model: SliceModel::new(),
            aggregator: PolyDataAggregator::new(),
            dirty: DirtyFlags::all(),
            initialized: false,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SliceLogicConfig {
        &self.config
    }

    /// Layout name of the driven view.
    pub fn layout_name(&self) -> &str {
        &self.config.layout
    }

    /// Current state.
    pub fn state(&self) -> LogicState {
        if !self.initialized {
            LogicState::Uninitialized
        } else if self.dirty.any() {
            LogicState::Dirty(self.dirty)
        } else {
            LogicState::Ready
        }
    }

    // === Scene wiring ===

    /// Registers an observer on `scene` and subscribes to the current nodes.
    pub fn attach(&mut self, scene: &mut Scene) -> LogicResult<()> {
        if self.observer.is_some_and(|o| scene.has_observer(o)) {
            return Ok(());
        }
        let obs = scene.add_observer();
        self.observer = Some(obs);
        let watched = [self.slice_node, self.composite_node]
            .into_iter()
            .chain(self.volumes)
            .flatten()
            .filter(|id| scene.contains(*id));
        for id in watched.collect::<Vec<_>>() {
            scene.observe(obs, id)?;
        }
        debug!(layout = %self.config.layout, observer = %obs, "attached");
        self.update_pipeline(scene)
    }

    /// Drops the observer and deletes the slice model.
    pub fn detach(&mut self, scene: &mut Scene) {
        self.slice_model.delete(scene);
        if let Some(obs) = self.observer.take() {
            if scene.remove_observer(obs).is_ok() {
                debug!(layout = %self.config.layout, observer = %obs, "detached");
            }
        }
        self.initialized = false;
        self.rebuild_collections(scene);
    }

    /// True while an observer is registered.
    pub fn is_attached(&self) -> bool {
        self.observer.is_some()
    }

    /// Slice node driving the geometry.
    pub fn slice_node(&self) -> Option<NodeId> {
        self.slice_node
    }

    /// Composite node driving the layers.
    pub fn slice_composite_node(&self) -> Option<NodeId> {
        self.composite_node
    }

    /// Switches to another slice node (or none) and refreshes.
    pub fn set_slice_node(&mut self, scene: &mut Scene, id: Option<NodeId>) -> LogicResult<()> {
        if let Some(id) = id {
            require(scene.slice_node(id).is_some(), id)?;
        }
        let old = std::mem::replace(&mut self.slice_node, id);
        if old != id {
            self.rewatch(scene, old, id)?;
            self.dirty.geometry = true;
            debug!(layout = %self.config.layout, node = ?id, "slice node set");
        }
        self.sync_geometry(scene);
        self.refresh(scene)
    }

    /// Switches to another composite node (or none) and refreshes.
    pub fn set_slice_composite_node(&mut self, scene: &mut Scene, id: Option<NodeId>) -> LogicResult<()> {
        if let Some(id) = id {
            require(scene.composite_node(id).is_some(), id)?;
        }
        let old = std::mem::replace(&mut self.composite_node, id);
        if old != id {
            self.rewatch(scene, old, id)?;
            debug!(layout = %self.config.layout, node = ?id, "composite node set");
        }
        self.sync_composite(scene)?;
        self.refresh(scene)
    }

    /// Handles every queued scene event in delivery order.
    ///
    /// Each event is fully resolved before the next one is taken. Events
    /// caused while resolving are queued behind the current ones. Returns
    /// the number of events handled.
    pub fn process_scene_events(&mut self, scene: &mut Scene) -> LogicResult<usize> {
        let obs = self.observer.ok_or(LogicError::NotAttached)?;
        let mut handled = 0;
        while let Some(event) = scene.take_event(obs) {
            trace!(?event, "scene event");
            self.handle_event(scene, event)?;
            self.refresh(scene)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Re-reads both nodes and checks every stage.
    ///
    /// Stages whose inputs did not change keep their outputs, so a second
    /// call without intervening changes is a no-op.
    pub fn update_pipeline(&mut self, scene: &mut Scene) -> LogicResult<()> {
        self.sync_geometry(scene);
        self.sync_composite(scene)?;
        self.dirty = DirtyFlags::all();
        self.refresh(scene)
    }

    /// Finds or creates the slice node of this layout and adopts it.
    pub fn update_slice_node(&mut self, scene: &mut Scene) -> LogicResult<NodeId> {
        let id = match self.slice_node.filter(|id| scene.slice_node(*id).is_some()) {
            Some(id) => id,
            None => match scene.find_slice_node(&self.config.layout) {
                Some(id) => id,
                None => {
                    let node = self.default_slice_node()?;
                    let id = scene.add_node(node);
                    debug!(layout = %self.config.layout, node = %id, "slice node created");
                    id
                }
            },
        };
        if self.slice_node != Some(id) {
            self.set_slice_node(scene, Some(id))?;
        }
        Ok(id)
    }

    /// Applies the orientation preset named by the slice node's layout.
    ///
    /// Returns false when nothing changed, including when the layout has no preset.
    pub fn update_slice_node_from_layout(&mut self, scene: &mut Scene) -> LogicResult<bool> {
        let Some((id, layout)) = self
            .slice_node
            .and_then(|id| scene.slice_node(id).map(|n| (id, n.layout_name().to_owned())))
        else {
            return Ok(false);
        };
        let Some(orientation) = Orientation::from_name(&layout) else {
            warn!(layout = %layout, "no orientation preset for layout");
            return Ok(false);
        };
        let (x, y, z) = orientation.axes();
        let version = self.geometry.version();
        scene.try_modify(id, |n: &mut SliceNode| n.set_orientation(x, y, z))?;
        self.settle(scene)?;
        Ok(self.geometry.version() != version)
    }

    /// Finds or creates the composite node of this layout, adopts and normalises it.
    ///
    /// Normalisation clears references to missing volumes, clamps opacities
    /// into `[0, 1]` and, if configured, fills an empty background.
    pub fn update_slice_composite_node(&mut self, scene: &mut Scene) -> LogicResult<NodeId> {
        let id = match self.composite_node.filter(|id| scene.composite_node(*id).is_some()) {
            Some(id) => id,
            None => match scene.find_composite_node(&self.config.layout) {
                Some(id) => id,
                None => {
                    let mut node = SliceCompositeNode::new(self.config.layout.clone());
                    node.foreground_opacity = self.config.foreground_opacity;
                    node.label_opacity = self.config.label_opacity;
                    let id = scene.add_node(node);
                    debug!(layout = %self.config.layout, node = %id, "composite node created");
                    id
                }
            },
        };

        let Some(current) = scene.composite_node(id).cloned() else {
            return Err(SceneError::UnknownNode(id).into());
        };
        let mut fixed = current.clone();
        for role in LayerRole::ALL {
            if let Some(vol) = fixed.volume(role) {
                if scene.volume_node(vol).is_none() {
                    warn!(layer = role.name(), volume = %vol, "clearing dangling volume reference");
                    fixed.set_volume(role, None);
                }
            }
        }
        fixed.foreground_opacity = clamp_opacity(fixed.foreground_opacity);
        fixed.label_opacity = clamp_opacity(fixed.label_opacity);
        if self.config.auto_assign_background && fixed.background_volume.is_none() {
            fixed.background_volume = scene.first_scalar_volume();
        }
        if fixed != current {
            debug!(node = %id, "composite node normalised");
            scene.modify_composite_node(id, |n| *n = fixed)?;
        }

        if self.composite_node != Some(id) {
            self.set_slice_composite_node(scene, Some(id))?;
        } else {
            self.settle(scene)?;
        }
        Ok(id)
    }

    // === Outputs ===

    /// Composite image; `None` when no layer has anything to show.
    pub fn image_data(&self) -> Option<&Image2D> {
        self.compositor.image()
    }

    /// RGBA output of one layer.
    pub fn layer_image(&self, role: LayerRole) -> Option<&Image2D> {
        self.layers[role.index()].output()
    }

    /// Glyph layer of the background or foreground; `None` for labels.
    pub fn glyph_layer(&self, role: LayerRole) -> Option<&GlyphLayer> {
        self.glyphs.get(role.index())
    }

    /// Meshes for downstream rendering, in display order.
    pub fn poly_data_collection(&self) -> &[PolyData] {
        self.aggregator.poly_data_collection()
    }

    /// Colour tables parallel to [`poly_data_collection`](Self::poly_data_collection).
    pub fn lookup_table_collection(&self) -> &[LookupTable] {
        self.aggregator.lookup_table_collection()
    }

    /// Current plane state.
    pub fn geometry(&self) -> &SliceGeometryState {
        &self.geometry
    }

    // === Geometry ===

    fn background<'s>(&self, scene: &'s Scene) -> Option<&'s Volume> {
        let id = self.volumes[LayerRole::Background.index()]?;
        scene.resolve_volume(id).map(|v| &v.node.volume)
    }

    /// RAS extent and centre of the background volume.
    pub fn background_ras_box(&self, scene: &Scene) -> Option<(Vec3, Vec3)> {
        self.background(scene).map(ras_box)
    }

    /// Slice-space extent and centre of the background volume.
    pub fn background_slice_dimensions(&self, scene: &Scene) -> Option<(Vec3, Vec3)> {
        self.background(scene).map(|v| self.geometry.slice_dimensions(v))
    }

    /// Background voxel spacing in slice axes; `(1, 1, 1)` without a background.
    pub fn background_slice_spacing(&self, scene: &Scene) -> Vec3 {
        self.geometry.spacing(self.background(scene))
    }

    /// Background box in slice space; [`Bounds::invalid`] without a background.
    pub fn background_slice_bounds(&self, scene: &Scene) -> Bounds {
        self.geometry.slice_bounds(self.background(scene))
    }

    /// Fits the field of view to the background for a `width x height` view.
    ///
    /// A no-op returning false without a background.
    pub fn fit_slice_to_background(&mut self, scene: &mut Scene, width: u32, height: u32) -> LogicResult<bool> {
        let Some(vol) = self.background(scene) else {
            debug!("fit to background without background");
            return Ok(false);
        };
        let plane = self.geometry.fit_to_volume(vol, width, height)?;
        self.apply_plane(scene, plane)
    }

    /// Fits the field of view to all layers.
    ///
    /// Only the background is taken into account; foreground and label
    /// volumes do not widen the fit.
    pub fn fit_slice_to_all(&mut self, scene: &mut Scene, width: u32, height: u32) -> LogicResult<bool> {
        let others = [LayerRole::Foreground, LayerRole::Label]
            .iter()
            .filter(|r| self.volumes[r.index()].is_some_and(|id| scene.resolve_volume(id).is_some()))
            .count();
        if others > 0 {
            debug!(ignored_layers = others, "fit to all uses the background only");
        }
        self.fit_slice_to_background(scene, width, height)
    }

    /// Distance of the plane from the RAS origin along its normal.
    pub fn slice_offset(&self) -> f64 {
        self.geometry.offset()
    }

    /// Moves the plane along its normal; false if it already sits at `offset`.
    pub fn set_slice_offset(&mut self, scene: &mut Scene, offset: f64) -> LogicResult<bool> {
        let mut target = self.geometry.clone();
        if !target.set_offset(offset)? {
            trace!(offset, "offset unchanged");
            return Ok(false);
        }
        self.apply_plane(scene, *target.plane())
    }

    // === Slice model ===

    /// Creates the slice model (or refreshes it in place).
    pub fn create_slice_model(&mut self, scene: &mut Scene) -> LogicResult<NodeId> {
        let id = self
            .slice_model
            .create(scene, &self.config.layout, &self.geometry, &self.config.slice_model)?;
        self.slice_model.set_texture(scene, self.compositor.image())?;
        self.rebuild_collections(scene);
        Ok(id)
    }

    /// Deletes the slice model; a no-op when there is none.
    pub fn delete_slice_model(&mut self, scene: &mut Scene) {
        self.slice_model.delete(scene);
        self.rebuild_collections(scene);
    }

    /// Slice model node while it exists.
    pub fn slice_model_node(&self) -> Option<NodeId> {
        self.slice_model.model_id()
    }

    /// Display node of the slice model while it exists.
    pub fn slice_model_display_node(&self) -> Option<NodeId> {
        self.slice_model.display_id()
    }

    // === Opacity ===

    /// Foreground opacity in effect.
    pub fn foreground_opacity(&self) -> f32 {
        self.foreground_opacity
    }

    /// Label opacity in effect.
    pub fn label_opacity(&self) -> f32 {
        self.label_opacity
    }

    /// Sets the foreground opacity, writing it to the composite node.
    pub fn set_foreground_opacity(&mut self, scene: &mut Scene, opacity: f32) -> LogicResult<()> {
        let opacity = clamp_opacity(opacity);
        self.set_opacity(scene, opacity, |n| n.foreground_opacity = opacity, |s| s.foreground_opacity = opacity)
    }

    /// Sets the label opacity, writing it to the composite node.
    pub fn set_label_opacity(&mut self, scene: &mut Scene, opacity: f32) -> LogicResult<()> {
        let opacity = clamp_opacity(opacity);
        self.set_opacity(scene, opacity, |n| n.label_opacity = opacity, |s| s.label_opacity = opacity)
    }

    fn set_opacity(
        &mut self,
        scene: &mut Scene,
        opacity: f32,
        write: impl FnOnce(&mut SliceCompositeNode),
        local: impl FnOnce(&mut Self),
    ) -> LogicResult<()> {
        match self.composite_node.filter(|id| scene.composite_node(*id).is_some()) {
            Some(id) => {
                scene.modify_composite_node(id, write)?;
                self.settle(scene)
            }
            None => {
                trace!(opacity, "no composite node, opacity kept locally");
                local(self);
                self.dirty.composite = true;
                self.refresh(scene)
            }
        }
    }

    // === Internals ===

    fn default_slice_node(&self) -> LogicResult<SliceNode> {
        let mut node = SliceNode::new(self.config.layout.clone());
        node.set_field_of_view(Vec3::from(self.config.field_of_view))?;
        node.set_dimensions(self.config.dimensions)?;
        match Orientation::from_name(&self.config.layout) {
            Some(o) => {
                let (x, y, z) = o.axes();
                node.set_orientation(x, y, z)?;
            }
            None => warn!(layout = %self.config.layout, "no orientation preset, using identity plane"),
        }
        Ok(node)
    }

    /// Writes `plane` to the slice node (or straight to the geometry without one).
    fn apply_plane(&mut self, scene: &mut Scene, plane: PlaneGeometry) -> LogicResult<bool> {
        let version = self.geometry.version();
        match self.slice_node.filter(|id| scene.slice_node(*id).is_some()) {
            Some(id) => {
                scene.try_modify(id, |n: &mut SliceNode| plane.apply_to(n))?;
                self.settle(scene)?;
            }
            None => {
                if self.geometry.set_plane(plane) {
                    self.mark_geometry_dirty();
                }
                self.refresh(scene)?;
            }
        }
        Ok(self.geometry.version() != version)
    }

    /// Catches up with node writes made by the logic itself.
    fn settle(&mut self, scene: &mut Scene) -> LogicResult<()> {
        if self.observer.is_some() {
            self.process_scene_events(scene).map(|_| ())
        } else {
            self.sync_geometry(scene);
            self.sync_composite(scene)?;
            self.refresh(scene)
        }
    }

    fn handle_event(&mut self, scene: &mut Scene, event: SceneEvent) -> LogicResult<()> {
        let id = event.id();
        let removed = matches!(event, SceneEvent::Removed { .. });
        if Some(id) == self.slice_node {
            if removed {
                debug!(node = %id, "slice node removed");
                self.slice_node = None;
            } else {
                self.sync_geometry(scene);
            }
        } else if Some(id) == self.composite_node {
            if removed {
                debug!(node = %id, "composite node removed");
                self.composite_node = None;
            } else {
                self.sync_composite(scene)?;
            }
        } else {
            for role in LayerRole::ALL {
                if self.volumes[role.index()] == Some(id) {
                    trace!(layer = role.name(), volume = %id, removed, "layer volume changed");
                    self.dirty.layers[role.index()] = true;
                }
            }
        }
        Ok(())
    }

    fn mark_geometry_dirty(&mut self) {
        self.dirty.geometry = true;
        self.dirty.layers = [true; 3];
    }

    fn sync_geometry(&mut self, scene: &Scene) {
        let Some(node) = self.slice_node.and_then(|id| scene.slice_node(id)) else {
            return;
        };
        if self.geometry.sync_from_node(node) {
            self.mark_geometry_dirty();
        }
    }

    fn sync_composite(&mut self, scene: &mut Scene) -> LogicResult<()> {
        let Some(node) = self.composite_node.and_then(|id| scene.composite_node(id)) else {
            return Ok(());
        };
        let volumes = LayerRole::ALL.map(|r| node.volume(r));
        let foreground_opacity = clamp_opacity(node.foreground_opacity);
        let label_opacity = clamp_opacity(node.label_opacity);
        let strategy = CompositeStrategy::from(node.compositing);

        for role in LayerRole::ALL {
            let r = role.index();
            if volumes[r] != self.volumes[r] {
                debug!(layer = role.name(), volume = ?volumes[r], "layer volume reassigned");
                self.dirty.layers[r] = true;
            }
        }
        if (foreground_opacity, label_opacity, strategy) != (self.foreground_opacity, self.label_opacity, self.strategy) {
            self.foreground_opacity = foreground_opacity;
            self.label_opacity = label_opacity;
            self.strategy = strategy;
            self.dirty.composite = true;
        }

        let old = std::mem::replace(&mut self.volumes, volumes);
        for (before, after) in old.into_iter().zip(volumes) {
            if before != after {
                self.rewatch(scene, before, after)?;
            }
        }
        Ok(())
    }

    /// Moves the observer subscription from `old` to `new`.
    fn rewatch(&self, scene: &mut Scene, old: Option<NodeId>, new: Option<NodeId>) -> LogicResult<()> {
        let Some(obs) = self.observer else {
            return Ok(());
        };
        if let Some(old) = old.filter(|id| !self.is_referenced(*id)) {
            scene.unobserve(obs, old)?;
        }
        if let Some(new) = new.filter(|id| scene.contains(*id)) {
            scene.observe(obs, new)?;
        }
        Ok(())
    }

    fn is_referenced(&self, id: NodeId) -> bool {
        self.slice_node == Some(id) || self.composite_node == Some(id) || self.volumes.contains(&Some(id))
    }

    fn refresh(&mut self, scene: &mut Scene) -> LogicResult<()> {
        if self.dirty.geometry {
            self.slice_model.update(scene, &self.geometry)?;
            self.dirty.geometry = false;
        }

        for role in LayerRole::ALL {
            let r = role.index();
            if !self.dirty.layers[r] {
                continue;
            }
            let volume = self.volumes[r].and_then(|id| scene.resolve_volume(id));
            if self.layers[r].update(volume, &self.geometry)? {
                self.dirty.composite = true;
            }
            if let Some(glyph) = self.glyphs.get_mut(r) {
                glyph.update(volume, &self.geometry)?;
            }
            self.dirty.layers[r] = false;
        }

        if self.dirty.composite {
            let inputs = CompositeInputs {
                background: self.layers[0].output(),
                foreground: self.layers[1].output(),
                foreground_opacity: self.foreground_opacity,
                label: self.layers[2].output(),
                label_opacity: self.label_opacity,
                strategy: self.strategy,
            };
            self.compositor.update(&inputs)?;
            self.dirty.composite = false;
        }

        self.slice_model.set_texture(scene, self.compositor.image())?;
        self.rebuild_collections(scene);
        self.initialized = self.observer.is_some() || self.slice_node.is_some() || self.composite_node.is_some();
        Ok(())
    }

    fn rebuild_collections(&mut self, scene: &Scene) {
        let model = self.slice_model.display_entry(scene);
        let glyphs = self
            .glyphs
            .iter()
            .filter_map(|g| Some((g.poly_data()?.clone(), g.lookup_table()?.clone())));
        self.aggregator.rebuild(model.into_iter().chain(glyphs));
    }
}

fn require(ok: bool, id: NodeId) -> LogicResult<()> {
    if ok {
        Ok(())
    } else {
        Err(SceneError::UnknownNode(id).into())
    }
}
