//! Node registry with observer mailboxes.

use crate::nodes::{
    ModelDisplayNode, ModelNode, Node, NodeKind, SceneNode, SliceCompositeNode, SliceNode,
    VolumeNode,
};
use crate::{NodeId, ObserverId, ResolvedVolume, SceneError, SceneEvent, SceneResult, VolumeResolver};
use slice_core::TimeStamp;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::{debug, trace};

struct Entry {
    node: Node,
    mtime: TimeStamp,
}

#[derive(Default)]
struct Observer {
    nodes: BTreeSet<NodeId>,
    scene_wide: bool,
    mailbox: VecDeque<SceneEvent>,
}

/// Owns every node and routes change events to observers.
///
/// Nodes are iterated in id (insertion) order, which keeps lookups such as
/// [`Scene::first_scalar_volume`] deterministic.
#[derive(Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Entry>,
    observers: HashMap<ObserverId, Observer>,
    next_node: u64,
    next_observer: u64,
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the scene holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // === Nodes ===

    /// Adds a node and announces it to scene-wide observers.
    pub fn add_node(&mut self, node: impl Into<Node>) -> NodeId {
        self.next_node += 1;
        let id = NodeId(self.next_node);
        let node = node.into();
        let kind = node.kind();
        self.nodes.insert(
            id,
            Entry {
                node,
                mtime: TimeStamp::now(),
            },
        );
        debug!(node = %id, %kind, "node added");
        self.broadcast(SceneEvent::Added { id, kind });
        id
    }

    /// Removes a node, notifying its observers and scene-wide observers.
    pub fn remove_node(&mut self, id: NodeId) -> SceneResult<Node> {
        let entry = self.nodes.remove(&id).ok_or(SceneError::UnknownNode(id))?;
        let kind = entry.node.kind();
        debug!(node = %id, %kind, "node removed");
        let event = SceneEvent::Removed { id, kind };
        for obs in self.observers.values_mut() {
            let watched = obs.nodes.remove(&id);
            if watched || obs.scene_wide {
                obs.mailbox.push_back(event);
            }
        }
        Ok(entry.node)
    }

    /// True if `id` resolves.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Untyped lookup.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).map(|e| &e.node)
    }

    /// Time of the node's last effective change.
    pub fn node_mtime(&self, id: NodeId) -> Option<TimeStamp> {
        self.nodes.get(&id).map(|e| e.mtime)
    }

    /// Typed lookup; `None` if unknown or of another kind.
    pub fn get<T: SceneNode>(&self, id: NodeId) -> Option<&T> {
        self.node(id).and_then(T::from_node)
    }

    /// Runs `f` on the node and announces the change if its value differs afterwards.
    ///
    /// Returns whatever `f` returns.
    pub fn modify<T: SceneNode, R>(&mut self, id: NodeId, f: impl FnOnce(&mut T) -> R) -> SceneResult<R> {
        self.try_modify(id, |n: &mut T| Ok(f(n)))
    }

    /// Like [`modify`](Self::modify) for fallible edits.
    ///
    /// On error the node is restored and nothing is announced.
    pub fn try_modify<T: SceneNode, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut T) -> SceneResult<R>,
    ) -> SceneResult<R> {
        let entry = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        let actual = entry.node.kind();
        let node = T::from_node_mut(&mut entry.node).ok_or(SceneError::WrongKind {
            id,
            expected: T::KIND,
            actual,
        })?;
        let before = node.clone();
        let result = match f(node) {
            Ok(r) => r,
            Err(e) => {
                *node = before;
                return Err(e);
            }
        };
        if *node != before {
            entry.mtime.modified();
            self.notify(id, T::KIND);
        }
        Ok(result)
    }

    /// [`SliceNode`] lookup.
    pub fn slice_node(&self, id: NodeId) -> Option<&SliceNode> {
        self.get(id)
    }

    /// [`SliceCompositeNode`] lookup.
    pub fn composite_node(&self, id: NodeId) -> Option<&SliceCompositeNode> {
        self.get(id)
    }

    /// [`VolumeNode`] lookup.
    pub fn volume_node(&self, id: NodeId) -> Option<&VolumeNode> {
        self.get(id)
    }

    /// [`ModelNode`] lookup.
    pub fn model_node(&self, id: NodeId) -> Option<&ModelNode> {
        self.get(id)
    }

    /// [`ModelDisplayNode`] lookup.
    pub fn model_display_node(&self, id: NodeId) -> Option<&ModelDisplayNode> {
        self.get(id)
    }

    /// [`modify`](Self::modify) for a [`SliceNode`].
    pub fn modify_slice_node<R>(&mut self, id: NodeId, f: impl FnOnce(&mut SliceNode) -> R) -> SceneResult<R> {
        self.modify(id, f)
    }

    /// [`modify`](Self::modify) for a [`SliceCompositeNode`].
    pub fn modify_composite_node<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut SliceCompositeNode) -> R,
    ) -> SceneResult<R> {
        self.modify(id, f)
    }

    /// [`modify`](Self::modify) for a [`VolumeNode`].
    pub fn modify_volume_node<R>(&mut self, id: NodeId, f: impl FnOnce(&mut VolumeNode) -> R) -> SceneResult<R> {
        self.modify(id, f)
    }

    /// [`modify`](Self::modify) for a [`ModelNode`].
    pub fn modify_model_node<R>(&mut self, id: NodeId, f: impl FnOnce(&mut ModelNode) -> R) -> SceneResult<R> {
        self.modify(id, f)
    }

    /// [`modify`](Self::modify) for a [`ModelDisplayNode`].
    pub fn modify_model_display_node<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut ModelDisplayNode) -> R,
    ) -> SceneResult<R> {
        self.modify(id, f)
    }

    /// Slice node of the view `layout_name`.
    pub fn find_slice_node(&self, layout_name: &str) -> Option<NodeId> {
        self.nodes.iter().find_map(|(id, e)| match &e.node {
            Node::Slice(n) if n.layout_name() == layout_name => Some(*id),
            _ => None,
        })
    }

    /// Composite node of the view `layout_name`.
    pub fn find_composite_node(&self, layout_name: &str) -> Option<NodeId> {
        self.nodes.iter().find_map(|(id, e)| match &e.node {
            Node::SliceComposite(n) if n.layout_name == layout_name => Some(*id),
            _ => None,
        })
    }

    /// Oldest single-component, non-label volume.
    pub fn first_scalar_volume(&self) -> Option<NodeId> {
        self.nodes.iter().find_map(|(id, e)| match &e.node {
            Node::Volume(v) if v.is_scalar() => Some(*id),
            _ => None,
        })
    }

    // === Observers ===

    /// Registers an observer with an empty mailbox.
    pub fn add_observer(&mut self) -> ObserverId {
        self.next_observer += 1;
        let id = ObserverId(self.next_observer);
        self.observers.insert(id, Observer::default());
        id
    }

    /// Drops an observer and its pending events.
    pub fn remove_observer(&mut self, observer: ObserverId) -> SceneResult<()> {
        self.observers
            .remove(&observer)
            .map(|_| ())
            .ok_or(SceneError::UnknownObserver(observer))
    }

    /// True while `observer` is registered.
    pub fn has_observer(&self, observer: ObserverId) -> bool {
        self.observers.contains_key(&observer)
    }

    /// Subscribes `observer` to changes of `node`.
    pub fn observe(&mut self, observer: ObserverId, node: NodeId) -> SceneResult<()> {
        if !self.nodes.contains_key(&node) {
            return Err(SceneError::UnknownNode(node));
        }
        self.observer_mut(observer)?.nodes.insert(node);
        Ok(())
    }

    /// Ends a subscription; unknown subscriptions are ignored.
    pub fn unobserve(&mut self, observer: ObserverId, node: NodeId) -> SceneResult<()> {
        self.observer_mut(observer)?.nodes.remove(&node);
        Ok(())
    }

    /// True if `observer` is subscribed to `node`.
    pub fn is_observing(&self, observer: ObserverId, node: NodeId) -> bool {
        self.observers
            .get(&observer)
            .is_some_and(|o| o.nodes.contains(&node))
    }

    /// Subscribes `observer` to node additions and removals.
    pub fn observe_scene(&mut self, observer: ObserverId) -> SceneResult<()> {
        self.observer_mut(observer)?.scene_wide = true;
        Ok(())
    }

    /// Pops the oldest pending event of `observer`.
    pub fn take_event(&mut self, observer: ObserverId) -> Option<SceneEvent> {
        self.observers.get_mut(&observer)?.mailbox.pop_front()
    }

    /// Number of pending events of `observer`.
    pub fn pending_events(&self, observer: ObserverId) -> usize {
        self.observers.get(&observer).map_or(0, |o| o.mailbox.len())
    }

    fn observer_mut(&mut self, observer: ObserverId) -> SceneResult<&mut Observer> {
        self.observers
            .get_mut(&observer)
            .ok_or(SceneError::UnknownObserver(observer))
    }

    fn notify(&mut self, id: NodeId, kind: NodeKind) {
        let event = SceneEvent::Modified { id, kind };
        for (oid, obs) in self.observers.iter_mut() {
            if obs.nodes.contains(&id) {
                trace!(node = %id, observer = %oid, "queue modified");
                obs.mailbox.push_back(event);
            }
        }
    }

    fn broadcast(&mut self, event: SceneEvent) {
        for obs in self.observers.values_mut().filter(|o| o.scene_wide) {
            obs.mailbox.push_back(event);
        }
    }
}

impl VolumeResolver for Scene {
    fn resolve_volume(&self, id: NodeId) -> Option<ResolvedVolume<'_>> {
        let entry = self.nodes.get(&id)?;
        match &entry.node {
            Node::Volume(node) => Some(ResolvedVolume {
                id,
                node,
                mtime: entry.mtime,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slice_core::Volume;
    use slice_math::Vec3;

    fn volume(name: &str) -> VolumeNode {
        VolumeNode::new(name, Volume::from_fn([2, 2, 2], 1, |i, _, _, _| i as f32).unwrap())
    }

    #[test]
    fn test_ids_unique_and_stale() {
        let mut scene = Scene::new();
        let a = scene.add_node(SliceNode::new("Axial"));
        scene.remove_node(a).unwrap();
        let b = scene.add_node(SliceNode::new("Axial"));
        assert_ne!(a, b);
        assert!(scene.slice_node(a).is_none());
        assert!(matches!(scene.remove_node(a), Err(SceneError::UnknownNode(_))));
    }

    #[test]
    fn test_wrong_kind() {
        let mut scene = Scene::new();
        let id = scene.add_node(SliceNode::new("Axial"));
        let err = scene.modify_volume_node(id, |_| ()).unwrap_err();
        assert!(matches!(err, SceneError::WrongKind { actual: NodeKind::Slice, .. }));
    }

    #[test]
    fn test_effective_change_only() {
        let mut scene = Scene::new();
        let id = scene.add_node(SliceCompositeNode::new("Axial"));
        let obs = scene.add_observer();
        scene.observe(obs, id).unwrap();

        let t0 = scene.node_mtime(id).unwrap();
        scene.modify_composite_node(id, |c| c.label_opacity = 1.0).unwrap();
        assert_eq!(scene.pending_events(obs), 0);
        assert_eq!(scene.node_mtime(id), Some(t0));

        scene.modify_composite_node(id, |c| c.label_opacity = 0.5).unwrap();
        assert_eq!(scene.pending_events(obs), 1);
        assert!(scene.node_mtime(id).unwrap() > t0);
    }

    #[test]
    fn test_try_modify_restores() {
        let mut scene = Scene::new();
        let id = scene.add_node(SliceNode::new("Axial"));
        let obs = scene.add_observer();
        scene.observe(obs, id).unwrap();
        let res = scene.try_modify(id, |n: &mut SliceNode| {
            n.set_origin(Vec3::new(1.0, 2.0, 3.0))?;
            n.set_dimensions([0, 1, 1])
        });
        assert!(res.is_err());
        assert_eq!(scene.slice_node(id).unwrap().origin(), Vec3::ZERO);
        assert_eq!(scene.pending_events(obs), 0);
    }

    #[test]
    fn test_delivery_order() {
        let mut scene = Scene::new();
        let a = scene.add_node(SliceNode::new("Axial"));
        let b = scene.add_node(SliceCompositeNode::new("Axial"));
        let obs = scene.add_observer();
        scene.observe(obs, a).unwrap();
        scene.observe(obs, b).unwrap();

        scene.modify_composite_node(b, |c| c.foreground_opacity = 0.3).unwrap();
        scene.modify_slice_node(a, |n| n.set_offset(1.0)).unwrap().unwrap();
        assert_eq!(scene.take_event(obs).map(|e| e.id()), Some(b));
        assert_eq!(scene.take_event(obs).map(|e| e.id()), Some(a));
        assert!(scene.take_event(obs).is_none());
    }

    #[test]
    fn test_scene_wide_events() {
        let mut scene = Scene::new();
        let obs = scene.add_observer();
        scene.observe_scene(obs).unwrap();
        let id = scene.add_node(volume("v"));
        scene.remove_node(id).unwrap();
        assert!(matches!(scene.take_event(obs), Some(SceneEvent::Added { .. })));
        assert!(matches!(scene.take_event(obs), Some(SceneEvent::Removed { .. })));
    }

    #[test]
    fn test_removed_node_notifies_observers() {
        let mut scene = Scene::new();
        let id = scene.add_node(volume("v"));
        let obs = scene.add_observer();
        scene.observe(obs, id).unwrap();
        scene.remove_node(id).unwrap();
        assert!(matches!(scene.take_event(obs), Some(SceneEvent::Removed { .. })));
        assert!(!scene.is_observing(obs, id));
    }

    #[test]
    fn test_lookups() {
        let mut scene = Scene::new();
        let label = VolumeNode::label_map(
            "seg",
            Volume::new([1, 1, 1], 1, vec![1.0]).unwrap(),
            slice_core::LookupTable::labels(4),
        );
        scene.add_node(label);
        let v = scene.add_node(volume("ct"));
        let s = scene.add_node(SliceNode::new("Sagittal"));
        assert_eq!(scene.first_scalar_volume(), Some(v));
        assert_eq!(scene.find_slice_node("Sagittal"), Some(s));
        assert_eq!(scene.find_slice_node("Axial"), None);
        let resolved = scene.resolve_volume(v).unwrap();
        assert_eq!(resolved.node.name, "ct");
        assert!(scene.resolve_volume(s).is_none());
    }
}
