//! Error types for scene mutation and configuration.
//!
//! The math types never fail; only operations that touch the node arena or
//! parse external input return a [`SceneError`].

use thiserror::Error;

use crate::scene::NodeId;

/// Errors raised while building or mutating a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// No node with this id exists in the scene.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node cannot be its own parent.
    #[error("node {0} cannot be parented to itself")]
    SelfParent(NodeId),

    /// Parenting `child` under `parent` would close a loop, because
    /// `parent` already descends from `child`.
    #[error("parenting {child} under {parent} would create a cycle")]
    CycleDetected {
        /// The node being attached.
        child: NodeId,
        /// The requested parent.
        parent: NodeId,
    },

    /// Configuration JSON could not be parsed.
    #[error("invalid scene configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias for scene operations.
pub type Result<T, E = SceneError> = std::result::Result<T, E>;
