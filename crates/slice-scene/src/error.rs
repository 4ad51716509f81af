//! Error types for scene access.

use crate::{NodeId, NodeKind, ObserverId};
use thiserror::Error;

/// Error type for scene operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// No node with this id exists (never added, or removed).
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The node exists but has a different kind.
    #[error("node {id} is a {actual}, expected a {expected}")]
    WrongKind {
        /// Requested node.
        id: NodeId,
        /// Kind the caller asked for.
        expected: NodeKind,
        /// Kind actually stored.
        actual: NodeKind,
    },

    /// No observer with this id is registered.
    #[error("unknown observer {0}")]
    UnknownObserver(ObserverId),

    /// A setter was given a value that would break a node invariant.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
