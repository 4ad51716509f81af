//! # slice-scene
//!
//! The scene graph a slice pipeline observes.
//!
//! A [`Scene`] owns every node and hands out [`NodeId`]s. Consumers keep
//! ids, never node references, and look nodes up through the scene when
//! they need them. Node lifetime is controlled by the scene alone.
//!
//! # Change notification
//!
//! Observers register with [`Scene::add_observer`] and subscribe to nodes
//! with [`Scene::observe`]. Every effective mutation made through
//! [`Scene::modify`] (or the typed `modify_*` helpers) appends a
//! [`SceneEvent`] to the mailbox of each subscriber. Mutations that leave a
//! node equal to its previous value are silent.
//!
//! Events are pulled, not pushed: an observer drains its mailbox with
//! [`Scene::take_event`]. Anything the observer mutates while handling an
//! event lands at the back of the queue, so one event always resolves
//! completely before the next is seen.
//!
//! ```rust
//! use slice_scene::{Scene, SceneEvent, SliceNode};
//!
//! let mut scene = Scene::new();
//! let id = scene.add_node(SliceNode::new("Axial"));
//! let obs = scene.add_observer();
//! scene.observe(obs, id).unwrap();
//!
//! scene.modify_slice_node(id, |n| n.set_offset(10.0)).unwrap().unwrap();
//! assert!(matches!(scene.take_event(obs), Some(SceneEvent::Modified { .. })));
//!
//! // Same offset again: no event
//! scene.modify_slice_node(id, |n| n.set_offset(10.0)).unwrap().unwrap();
//! assert!(scene.take_event(obs).is_none());
//! ```
//!
//! # Dependencies
//!
//! - [`slice_core`] - volumes, images, meshes, timestamps
//! - [`slice_math`] - plane geometry
//!
//! # Used By
//!
//! - `slice-logic` - the slice pipeline controller

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod event;
pub mod id;
pub mod nodes;
pub mod resolver;
pub mod scene;

pub use error::{SceneError, SceneResult};
pub use event::SceneEvent;
pub use id::{NodeId, ObserverId};
pub use nodes::{
    CompositingMode, LayerRole, ModelDisplayNode, ModelNode, Node, NodeKind, SceneNode,
    SliceCompositeNode, SliceNode, VolumeDisplay, VolumeNode,
};
pub use resolver::{ResolvedVolume, VolumeResolver};
pub use scene::Scene;
