//! Pipeline behaviour driven through the scene.

use slice_core::{Image2D, LookupTable, Volume};
use slice_logic::{
    CompositeInputs, Compositor, GeometryProvider, LayerReslicer, LogicResult, LogicState, Reslicer, SliceCompositor,
    SliceLogic, SliceLogicConfig,
};
use slice_math::Vec3;
use slice_scene::{CompositingMode, LayerRole, NodeId, Scene, VolumeNode};
use std::cell::Cell;
use std::rc::Rc;

fn ramp_volume() -> Volume {
    Volume::from_fn([32, 32, 8], 1, |i, j, k, _| (i + 2 * j + 4 * k) as f32).unwrap()
}

/// Scene with one scalar volume and a logic wired to fresh nodes.
fn setup() -> (Scene, SliceLogic, NodeId) {
    let mut scene = Scene::new();
    let vol = scene.add_node(VolumeNode::new("ramp", ramp_volume()));
    let mut logic = SliceLogic::new(SliceLogicConfig::default()).unwrap();
    logic.attach(&mut scene).unwrap();
    logic.update_slice_node(&mut scene).unwrap();
    logic.update_slice_composite_node(&mut scene).unwrap();
    (scene, logic, vol)
}

#[test]
fn test_background_assigned_and_composited() {
    let (scene, logic, vol) = setup();
    let comp = logic.slice_composite_node().unwrap();
    assert_eq!(scene.composite_node(comp).unwrap().background_volume, Some(vol));
    assert_eq!(logic.state(), LogicState::Ready);

    let image = logic.image_data().unwrap();
    assert_eq!(image.size(), (256, 256));
    assert_eq!(image.channels(), 4);
}

#[test]
fn test_background_only_matches_layer() {
    let (_, logic, _) = setup();
    let layer = logic.layer_image(LayerRole::Background).unwrap();
    let image = logic.image_data().unwrap();
    assert!(image.bit_eq(layer));
    assert!(!image.shares_buffer(layer));
}

#[test]
fn test_no_volumes_no_image() {
    let mut scene = Scene::new();
    let mut logic = SliceLogic::new(SliceLogicConfig::default()).unwrap();
    logic.attach(&mut scene).unwrap();
    logic.update_slice_node(&mut scene).unwrap();
    logic.update_slice_composite_node(&mut scene).unwrap();
    assert!(logic.image_data().is_none());
    assert_eq!(logic.state(), LogicState::Ready);
}

#[test]
fn test_update_pipeline_idempotent() {
    let (mut scene, mut logic, _) = setup();
    logic.create_slice_model(&mut scene).unwrap();
    logic.update_pipeline(&mut scene).unwrap();
    let mtime = logic.image_data().unwrap().mtime();
    let polys = logic.poly_data_collection().to_vec();
    let luts: Vec<LookupTable> = logic.lookup_table_collection().to_vec();

    logic.update_pipeline(&mut scene).unwrap();
    logic.update_pipeline(&mut scene).unwrap();
    assert_eq!(logic.image_data().unwrap().mtime(), mtime);
    assert_eq!(logic.poly_data_collection(), &polys[..]);
    assert_eq!(logic.lookup_table_collection(), &luts[..]);
}

#[test]
fn test_slice_node_edit_propagates() {
    let (mut scene, mut logic, _) = setup();
    let slice = logic.slice_node().unwrap();
    let before = logic.image_data().unwrap().mtime();

    scene.modify_slice_node(slice, |n| n.set_offset(3.0)).unwrap().unwrap();
    assert_eq!(logic.process_scene_events(&mut scene).unwrap(), 1);
    assert!((logic.slice_offset() - 3.0).abs() < 1e-9);
    assert!(logic.image_data().unwrap().mtime() > before);
}

#[test]
fn test_events_resolve_in_order() {
    let (mut scene, mut logic, _) = setup();
    let slice = logic.slice_node().unwrap();
    scene.modify_slice_node(slice, |n| n.set_offset(1.0)).unwrap().unwrap();
    scene.modify_slice_node(slice, |n| n.set_offset(2.0)).unwrap().unwrap();
    assert_eq!(logic.process_scene_events(&mut scene).unwrap(), 2);
    assert!((logic.slice_offset() - 2.0).abs() < 1e-9);
    assert_eq!(logic.state(), LogicState::Ready);
}

#[test]
fn test_volume_edit_relayers() {
    let (mut scene, mut logic, vol) = setup();
    let before = logic.image_data().unwrap().mtime();
    scene.modify_volume_node(vol, |v| v.display.window = 10.0).unwrap();
    logic.process_scene_events(&mut scene).unwrap();
    assert!(logic.image_data().unwrap().mtime() > before);
}

#[test]
fn test_removed_background_clears_image() {
    let (mut scene, mut logic, vol) = setup();
    assert!(logic.image_data().is_some());
    scene.remove_node(vol).unwrap();
    logic.process_scene_events(&mut scene).unwrap();
    assert!(logic.image_data().is_none());
}

#[test]
fn test_dangling_reference_cleared() {
    let (mut scene, mut logic, vol) = setup();
    let comp = logic.slice_composite_node().unwrap();
    scene.modify_composite_node(comp, |c| c.label_volume = Some(vol)).unwrap();
    logic.process_scene_events(&mut scene).unwrap();
    scene.remove_node(vol).unwrap();
    logic.process_scene_events(&mut scene).unwrap();

    logic.update_slice_composite_node(&mut scene).unwrap();
    let node = scene.composite_node(comp).unwrap();
    assert_eq!(node.background_volume, None);
    assert_eq!(node.label_volume, None);
}

#[test]
fn test_opacity_written_to_node() {
    let (mut scene, mut logic, vol) = setup();
    let comp = logic.slice_composite_node().unwrap();
    scene.modify_composite_node(comp, |c| c.foreground_volume = Some(vol)).unwrap();
    logic.process_scene_events(&mut scene).unwrap();

    logic.set_foreground_opacity(&mut scene, 1.7).unwrap();
    assert_eq!(logic.foreground_opacity(), 1.0);
    assert_eq!(scene.composite_node(comp).unwrap().foreground_opacity, 1.0);

    logic.set_label_opacity(&mut scene, 0.25).unwrap();
    assert_eq!(scene.composite_node(comp).unwrap().label_opacity, 0.25);
}

#[test]
fn test_unsupported_mode_falls_back() {
    let (mut scene, mut logic, _) = setup();
    let comp = logic.slice_composite_node().unwrap();
    let before = logic.image_data().unwrap().clone();
    scene.modify_composite_node(comp, |c| c.compositing = CompositingMode::Checkerboard).unwrap();
    logic.process_scene_events(&mut scene).unwrap();
    assert!(logic.image_data().unwrap().bit_eq(&before));
}

#[test]
fn test_fit_to_background() {
    let (mut scene, mut logic, _) = setup();
    assert!(logic.fit_slice_to_background(&mut scene, 512, 512).unwrap());
    let slice = scene.slice_node(logic.slice_node().unwrap()).unwrap();
    assert_eq!(slice.dimensions()[..2], [512, 512]);
    let fov = slice.field_of_view();
    assert!((fov.x - 32.0).abs() < 1e-9);
    assert!((fov.y - 32.0).abs() < 1e-9);
    assert!(slice.origin().abs_diff_eq(Vec3::new(15.5, 15.5, 3.5), 1e-9));

    // second fit lands on the same plane
    assert!(!logic.fit_slice_to_background(&mut scene, 512, 512).unwrap());
    assert!(!logic.fit_slice_to_all(&mut scene, 512, 512).unwrap());
}

#[test]
fn test_fit_without_background_is_noop() {
    let mut scene = Scene::new();
    let mut logic = SliceLogic::new(SliceLogicConfig::default()).unwrap();
    logic.attach(&mut scene).unwrap();
    logic.update_slice_node(&mut scene).unwrap();
    assert!(!logic.fit_slice_to_background(&mut scene, 512, 512).unwrap());
    assert!(logic.background_ras_box(&scene).is_none());
    assert!(!logic.background_slice_bounds(&scene).is_valid());
    assert_eq!(logic.background_slice_spacing(&scene), Vec3::ONE);
}

#[test]
fn test_set_offset_twice() {
    let (mut scene, mut logic, _) = setup();
    let normal = logic.geometry().plane().normal();
    let fov = logic.geometry().plane().field_of_view;
    assert!(logic.set_slice_offset(&mut scene, 4.0).unwrap());
    assert!(!logic.set_slice_offset(&mut scene, 4.0).unwrap());
    assert_eq!(logic.geometry().plane().normal(), normal);
    assert_eq!(logic.geometry().plane().field_of_view, fov);
    let slice = scene.slice_node(logic.slice_node().unwrap()).unwrap();
    assert!((slice.offset() - 4.0).abs() < 1e-9);
}

#[test]
fn test_slice_model_lifecycle() {
    let (mut scene, mut logic, _) = setup();
    assert!(logic.poly_data_collection().is_empty());

    let model = logic.create_slice_model(&mut scene).unwrap();
    assert_eq!(logic.poly_data_collection().len(), 1);
    assert_eq!(logic.lookup_table_collection().len(), 1);
    let display = logic.slice_model_display_node().unwrap();
    assert!(scene.model_display_node(display).unwrap().texture.is_some());

    // recreate replaces in place
    assert_eq!(logic.create_slice_model(&mut scene).unwrap(), model);

    logic.set_slice_offset(&mut scene, 2.0).unwrap();
    let mesh = scene.model_node(model).unwrap().poly_data.as_ref().unwrap();
    assert!(mesh.points().iter().all(|p| (p.z - 2.0).abs() < 1e-9));

    logic.delete_slice_model(&mut scene);
    assert!(!scene.contains(model));
    assert!(logic.poly_data_collection().is_empty());
    logic.delete_slice_model(&mut scene);
}

#[test]
fn test_vector_volume_glyphs() {
    let mut scene = Scene::new();
    let field = Volume::from_fn([32, 32, 1], 3, |_, _, _, c| if c == 0 { 1.0 } else { 0.0 }).unwrap();
    let field = scene.add_node(VolumeNode::new("field", field));
    let config = SliceLogicConfig {
        field_of_view: [32.0, 32.0, 1.0],
        dimensions: [32, 32, 1],
        ..SliceLogicConfig::default()
    };
    let mut logic = SliceLogic::new(config).unwrap();
    logic.attach(&mut scene).unwrap();
    logic.update_slice_node(&mut scene).unwrap();
    let comp = logic.update_slice_composite_node(&mut scene).unwrap();
    // vector volumes are never auto-assigned
    assert_eq!(scene.composite_node(comp).unwrap().background_volume, None);
    scene.modify_composite_node(comp, |c| c.background_volume = Some(field)).unwrap();
    let slice = logic.slice_node().unwrap();
    scene
        .modify_slice_node(slice, |n| n.set_origin(Vec3::new(15.5, 15.5, 0.0)))
        .unwrap()
        .unwrap();
    logic.process_scene_events(&mut scene).unwrap();

    let glyphs = logic.glyph_layer(LayerRole::Background).unwrap();
    assert!(glyphs.poly_data().is_some());
    assert_eq!(logic.poly_data_collection().len(), 1);
    assert!(logic.glyph_layer(LayerRole::Label).is_none());
}

#[test]
fn test_layout_preset_applied() {
    let mut scene = Scene::new();
    let mut logic = SliceLogic::new(SliceLogicConfig::for_layout("Sagittal")).unwrap();
    logic.attach(&mut scene).unwrap();
    let slice = logic.update_slice_node(&mut scene).unwrap();
    assert_eq!(logic.geometry().plane().normal(), Vec3::X);

    scene
        .modify_slice_node(slice, |n| n.set_orientation(Vec3::X, Vec3::Y, Vec3::Z))
        .unwrap()
        .unwrap();
    logic.process_scene_events(&mut scene).unwrap();
    assert!(logic.update_slice_node_from_layout(&mut scene).unwrap());
    assert_eq!(logic.geometry().plane().normal(), Vec3::X);
    assert!(!logic.update_slice_node_from_layout(&mut scene).unwrap());
}

#[test]
fn test_unknown_layout_is_noop() {
    let mut scene = Scene::new();
    let mut logic = SliceLogic::new(SliceLogicConfig::for_layout("Slice4")).unwrap();
    logic.attach(&mut scene).unwrap();
    logic.update_slice_node(&mut scene).unwrap();
    assert!(!logic.update_slice_node_from_layout(&mut scene).unwrap());
}

#[test]
fn test_detach_resets_state() {
    let (mut scene, mut logic, _) = setup();
    let model = logic.create_slice_model(&mut scene).unwrap();
    logic.detach(&mut scene);
    assert!(!logic.is_attached());
    assert!(!scene.contains(model));
    assert_eq!(logic.state(), LogicState::Uninitialized);
}

#[test]
fn test_existing_nodes_reused() {
    let (mut scene, logic, _) = setup();
    let mut other = SliceLogic::new(SliceLogicConfig::default()).unwrap();
    other.attach(&mut scene).unwrap();
    assert_eq!(other.update_slice_node(&mut scene).unwrap(), logic.slice_node().unwrap());
    assert_eq!(
        other.update_slice_composite_node(&mut scene).unwrap(),
        logic.slice_composite_node().unwrap()
    );
}

/// Reslicer that counts recomputes and produces nothing.
struct CountingReslicer {
    role: LayerRole,
    runs: Rc<Cell<usize>>,
    inner: LayerReslicer,
}

impl Reslicer for CountingReslicer {
    fn role(&self) -> LayerRole {
        self.role
    }

    fn update(
        &mut self,
        volume: Option<slice_scene::ResolvedVolume<'_>>,
        geometry: &dyn GeometryProvider,
    ) -> LogicResult<bool> {
        let changed = self.inner.update(volume, geometry)?;
        if changed {
            self.runs.set(self.runs.get() + 1);
        }
        Ok(changed)
    }

    fn output(&self) -> Option<&Image2D> {
        self.inner.output()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

/// Compositor that forwards to the default one and counts calls.
struct CountingCompositor {
    calls: Rc<Cell<usize>>,
    inner: SliceCompositor,
}

impl Compositor for CountingCompositor {
    fn update(&mut self, inputs: &CompositeInputs<'_>) -> LogicResult<bool> {
        self.calls.set(self.calls.get() + 1);
        self.inner.update(inputs)
    }

    fn image(&self) -> Option<&Image2D> {
        self.inner.image()
    }
}

#[test]
fn test_custom_stages_recompute_lazily() {
    let runs = Rc::new(Cell::new(0));
    let calls = Rc::new(Cell::new(0));
    let layers = LayerRole::ALL.map(|role| {
        Box::new(CountingReslicer {
            role,
            runs: Rc::clone(&runs),
            inner: LayerReslicer::new(role, true),
        }) as Box<dyn Reslicer>
    });
    let compositor = Box::new(CountingCompositor {
        calls: Rc::clone(&calls),
        inner: SliceCompositor::new(),
    });

    let mut scene = Scene::new();
    scene.add_node(VolumeNode::new("ramp", ramp_volume()));
    let mut logic = SliceLogic::with_stages(SliceLogicConfig::default(), layers, compositor).unwrap();
    logic.attach(&mut scene).unwrap();
    logic.update_slice_node(&mut scene).unwrap();
    logic.update_slice_composite_node(&mut scene).unwrap();
    assert_eq!(runs.get(), 1);

    logic.update_pipeline(&mut scene).unwrap();
    assert_eq!(runs.get(), 1);

    // opacity alone does not reslice
    logic.set_label_opacity(&mut scene, 0.5).unwrap();
    assert_eq!(runs.get(), 1);
    assert!(calls.get() >= 2);
    assert!(logic.image_data().is_some());
}

#[test]
fn test_oblique_offset_twice_skips_reslice() {
    let runs = Rc::new(Cell::new(0));
    let layers = LayerRole::ALL.map(|role| {
        Box::new(CountingReslicer {
            role,
            runs: Rc::clone(&runs),
            inner: LayerReslicer::new(role, true),
        }) as Box<dyn Reslicer>
    });
    let compositor = Box::new(SliceCompositor::new());
    let mut scene = Scene::new();
    scene.add_node(VolumeNode::new("ramp", ramp_volume()));
    let mut logic = SliceLogic::with_stages(SliceLogicConfig::default(), layers, compositor).unwrap();
    logic.attach(&mut scene).unwrap();
    let slice = logic.update_slice_node(&mut scene).unwrap();
    logic.update_slice_composite_node(&mut scene).unwrap();

    let normal = Vec3::new(0.3, -0.5, 0.8).normalize();
    let row = normal.cross(Vec3::Z).normalize();
    let column = normal.cross(row);
    scene
        .modify_slice_node(slice, |n| n.set_orientation(row, column, normal))
        .unwrap()
        .unwrap();
    logic.process_scene_events(&mut scene).unwrap();

    for i in 0..50 {
        let off = -12.0 + i as f64 * 0.61;
        logic.set_slice_offset(&mut scene, off).unwrap();
        let before = runs.get();
        let mtime = logic.image_data().map(|img| img.mtime());
        assert!(!logic.set_slice_offset(&mut scene, off).unwrap());
        assert_eq!(runs.get(), before);
        assert_eq!(logic.image_data().map(|img| img.mtime()), mtime);
        assert_eq!(logic.state(), LogicState::Ready);
        assert!((logic.slice_offset() - off).abs() < 1e-9);
    }
}
