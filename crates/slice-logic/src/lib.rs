//! # slice-logic
//!
//! Controller that keeps one slice view of a scene up to date.
//!
//! A [`SliceLogic`] watches a [`SliceNode`](slice_scene::SliceNode) for the
//! plane and a [`SliceCompositeNode`](slice_scene::SliceCompositeNode) for
//! the layer assignment. From them it produces:
//!
//! - a composited RGBA image of background, foreground and label layers
//! - an optional slice model: a textured quad placed at the plane in 3D
//! - glyph meshes for vector-valued layers, with their colour tables
//!
//! # Pipeline
//!
//! | Stage | Type | Recomputed when |
//! |-------|------|-----------------|
//! | Geometry | [`SliceGeometryState`] | slice node changes |
//! | Reslice | [`LayerReslicer`] | plane, volume or display changes |
//! | Composite | [`SliceCompositor`] | a layer output or an opacity changes |
//! | Model | [`SliceModel`] | plane or composite changes |
//! | Meshes | [`PolyDataAggregator`] | every refresh |
//!
//! Reslicing and compositing sit behind the [`Reslicer`] and
//! [`Compositor`] traits; [`SliceLogic::with_stages`] swaps them out.
//!
//! # Example
//!
//! ```rust
//! use slice_core::Volume;
//! use slice_logic::{LogicState, SliceLogic, SliceLogicConfig};
//! use slice_scene::{Scene, VolumeNode};
//!
//! let mut scene = Scene::new();
//! let vol = Volume::from_fn([16, 16, 4], 1, |i, j, _, _| (i * j) as f32).unwrap();
//! scene.add_node(VolumeNode::new("MR", vol));
//!
//! let mut logic = SliceLogic::new(SliceLogicConfig::for_layout("Axial")).unwrap();
//! logic.attach(&mut scene).unwrap();
//! logic.update_slice_node(&mut scene).unwrap();
//! logic.update_slice_composite_node(&mut scene).unwrap();
//!
//! assert_eq!(logic.state(), LogicState::Ready);
//! assert!(logic.image_data().is_some());
//! ```
//!
//! # Dependencies
//!
//! - [`slice_scene`] - nodes and change events
//! - [`slice_ops`] - reslice, colour mapping, blending, glyphs
//! - [`slice_core`] - images, volumes, meshes
//! - [`slice_math`] - plane transforms
//!
//! # Used By
//!
//! - `slice-tests` - end-to-end scenarios
//! - `slice-bench` - pipeline benchmarks

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod aggregator;
pub mod compositor;
pub mod config;
mod error;
pub mod geometry;
pub mod glyph_layer;
pub mod layer;
pub mod logic;
pub mod slice_model;
pub mod traits;

pub use aggregator::PolyDataAggregator;
pub use compositor::SliceCompositor;
pub use config::{SliceLogicConfig, SliceModelConfig};
pub use error::{LogicError, LogicResult};
pub use geometry::{Orientation, PlaneGeometry, SliceGeometryState};
pub use glyph_layer::GlyphLayer;
pub use layer::LayerReslicer;
pub use logic::{DirtyFlags, LogicState, SliceLogic};
pub use slice_model::SliceModel;
pub use traits::{CompositeInputs, CompositeStrategy, Compositor, GeometryProvider, Reslicer};
