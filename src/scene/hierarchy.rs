//! Algorithms over the node arena.
//!
//! Nodes live in a flat slice indexed by [`NodeId`]. Parent links point up,
//! child lists point down, and nothing here allocates beyond a small work
//! stack. Callers validate ids before reaching these functions.

use tracing::{debug, trace, warn};

use super::node::{Node, NodeId};
use crate::error::{Result, SceneError};
use crate::matrix::Matrix4;

/// Recomputes the world matrix of `id` if it is dirty.
///
/// Dirty ancestors are refreshed first, root-most down, so a node can be
/// updated before its parents and still see their current state. Clean
/// nodes are left alone.
pub(crate) fn update(nodes: &mut [Node], id: NodeId) {
    let mut chain = Vec::new();
    let mut current = Some(id);
    while let Some(node) = current {
        if !nodes[node.0].dirty {
            break;
        }
        chain.push(node);
        current = nodes[node.0].parent;
    }
    let Some(&top) = chain.last() else {
        return;
    };

    let mut rotation = match nodes[top.0].parent {
        Some(parent) => total_rotation(nodes, parent),
        None => Matrix4::IDENTITY,
    };
    for &node in chain.iter().rev() {
        rotation = rotation * nodes[node.0].rotation;
        recompute(nodes, node, &rotation);
    }
}

/// Rebuilds one world matrix from a fresh parent and its total rotation.
fn recompute(nodes: &mut [Node], id: NodeId, rotation: &Matrix4) {
    let mut world = nodes[id.0].local_matrix();

    if let Some(parent) = nodes[id.0].parent {
        let p = &nodes[parent.0];
        if !nodes[id.0].inherit_scaling && p.is_scaled {
            let s = p.scale;
            world = Matrix4::scale(1.0 / s.x, 1.0 / s.y, 1.0 / s.z) * world;
        }
        world = p.world * world;
    }

    let node = &mut nodes[id.0];
    node.normal_world = node.normal.transform(rotation).to_vector3().normalize();
    node.world = world;
    node.dirty = false;
    trace!(node = %id, position = %node.world.translation_part(), "world matrix recomputed");
}

/// Rotation-only chain from the root down to `id`, recomputed on every call.
pub(crate) fn total_rotation(nodes: &[Node], id: NodeId) -> Matrix4 {
    let mut rotation = nodes[id.0].rotation;
    let mut current = nodes[id.0].parent;
    while let Some(parent) = current {
        rotation = nodes[parent.0].rotation * rotation;
        current = nodes[parent.0].parent;
    }
    rotation
}

/// Marks `id` and every descendant dirty.
pub(crate) fn mark_dirty_recursive(nodes: &mut [Node], id: NodeId) {
    let node = &mut nodes[id.0];
    node.dirty = true;
    if node.children.is_empty() {
        return;
    }

    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let node = &mut nodes[current.0];
        node.dirty = true;
        stack.extend_from_slice(&node.children);
    }
}

/// Whether `candidate` is `id` itself or one of its ancestors.
fn is_ancestor_or_self(nodes: &[Node], candidate: NodeId, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if node == candidate {
            return true;
        }
        current = nodes[node.0].parent;
    }
    false
}

/// Makes `child` a child of `parent`, detaching it from any previous parent.
///
/// Rejects self-parenting and any link that would close a loop. On success
/// the child subtree is marked dirty so it picks up the new parent transform.
pub(crate) fn attach(nodes: &mut [Node], child: NodeId, parent: NodeId) -> Result<()> {
    for id in [child, parent] {
        if id.0 >= nodes.len() {
            return Err(SceneError::NodeNotFound(id));
        }
    }
    if child == parent {
        warn!(node = %child, "rejected self-parenting");
        return Err(SceneError::SelfParent(child));
    }
    if is_ancestor_or_self(nodes, child, parent) {
        warn!(%child, %parent, "rejected parenting that would create a cycle");
        return Err(SceneError::CycleDetected { child, parent });
    }

    match nodes[child.0].parent {
        Some(old) if old == parent => return Ok(()),
        Some(old) => nodes[old.0].children.retain(|&c| c != child),
        None => {}
    }

    nodes[parent.0].children.push(child);
    nodes[child.0].parent = Some(parent);
    mark_dirty_recursive(nodes, child);
    debug!(%child, %parent, "node attached");
    Ok(())
}

/// Turns `child` back into a root. No-op if it has no parent.
pub(crate) fn detach(nodes: &mut [Node], child: NodeId) -> Result<()> {
    let Some(node) = nodes.get(child.0) else {
        return Err(SceneError::NodeNotFound(child));
    };
    if let Some(old) = node.parent {
        nodes[old.0].children.retain(|&c| c != child);
        nodes[child.0].parent = None;
        mark_dirty_recursive(nodes, child);
        debug!(%child, parent = %old, "node detached");
    }
    Ok(())
}
