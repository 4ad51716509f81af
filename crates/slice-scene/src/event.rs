//! Change notifications delivered to observer mailboxes.

use crate::{NodeId, NodeKind};

/// One scene change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// A node was added. Delivered to scene-wide observers.
    Added {
        /// New node.
        id: NodeId,
        /// Its kind.
        kind: NodeKind,
    },
    /// An observed node changed value.
    Modified {
        /// Changed node.
        id: NodeId,
        /// Its kind.
        kind: NodeKind,
    },
    /// A node was removed. Delivered to its observers and scene-wide observers.
    Removed {
        /// Removed node; the id no longer resolves.
        id: NodeId,
        /// Its kind.
        kind: NodeKind,
    },
}

impl SceneEvent {
    /// Node the event is about.
    pub fn id(&self) -> NodeId {
        match *self {
            Self::Added { id, .. } | Self::Modified { id, .. } | Self::Removed { id, .. } => id,
        }
    }

    /// Kind of that node.
    pub fn kind(&self) -> NodeKind {
        match *self {
            Self::Added { kind, .. } | Self::Modified { kind, .. } | Self::Removed { kind, .. } => kind,
        }
    }
}
