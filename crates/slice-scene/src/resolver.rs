//! Volume lookup by id.

use crate::{NodeId, VolumeNode};
use slice_core::TimeStamp;

/// A resolved volume reference.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedVolume<'a> {
    /// Id that was resolved.
    pub id: NodeId,
    /// The volume node.
    pub node: &'a VolumeNode,
    /// Time of the node's last effective change.
    pub mtime: TimeStamp,
}

/// Resolves layer volume ids stored on composite nodes.
pub trait VolumeResolver {
    /// Looks up `id`; `None` if it is unknown or not a volume.
    fn resolve_volume(&self, id: NodeId) -> Option<ResolvedVolume<'_>>;
}
