//! Mutable access to a single node.

use std::ops::Deref;

use super::hierarchy;
use super::node::{Node, NodeId, RenderHandle};
use crate::matrix::Matrix4;
use crate::quaternion::Quaternion;
use crate::tween::Tween;
use crate::vector::Vector3;

/// A borrowed, mutable view of one node in a scene.
///
/// Every setter marks the node and all of its descendants dirty, so the next
/// [`Scene::update`](super::Scene::update) recomputes exactly the affected
/// world matrices. Setters return `&mut Self` and can be chained.
///
/// Reads go through [`Deref`] to the underlying [`Node`].
///
/// # Example
///
/// ```
/// use trellis::{Node, Scene, Vector3};
///
/// let mut scene = Scene::new();
/// let id = scene.add_node(Node::new());
/// scene
///     .node_mut(id)?
///     .set_translation([0.0, 0.0, -200.0])
///     .set_rotation(Vector3::Y, 0.5);
/// # Ok::<(), trellis::SceneError>(())
/// ```
pub struct NodeMut<'a> {
    nodes: &'a mut [Node],
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    /// Callers guarantee `id` is in bounds.
    pub(crate) fn new(nodes: &'a mut [Node], id: NodeId) -> Self {
        Self { nodes, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    fn node(&mut self) -> &mut Node {
        &mut self.nodes[self.id.0]
    }

    fn invalidate(&mut self) {
        hierarchy::mark_dirty_recursive(self.nodes, self.id);
    }

    pub fn set_translation(&mut self, translation: impl Into<Vector3>) -> &mut Self {
        self.node().apply_translation(translation.into());
        self.invalidate();
        self
    }

    pub fn set_scale(&mut self, scale: impl Into<Vector3>) -> &mut Self {
        self.node().apply_scale(scale.into());
        self.invalidate();
        self
    }

    /// Rotation of `angle` radians about a normalized `axis`. A zero angle
    /// resets to identity.
    pub fn set_rotation(&mut self, axis: Vector3, angle: f64) -> &mut Self {
        self.node().apply_rotation(axis, angle);
        self.invalidate();
        self
    }

    /// Euler angles in radians, applied X first, then Y, then Z.
    pub fn set_rotation_xyz(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.node().apply_rotation_xyz(x, y, z);
        self.invalidate();
        self
    }

    /// Replaces the rotation with an arbitrary rotation-only matrix.
    pub fn set_rotation_matrix(&mut self, rotation: Matrix4) -> &mut Self {
        self.node().apply_rotation_matrix(rotation);
        self.invalidate();
        self
    }

    /// Point in local space that rotations turn around.
    pub fn set_pivot(&mut self, pivot: impl Into<Vector3>) -> &mut Self {
        self.node().apply_pivot(pivot.into());
        self.invalidate();
        self
    }

    pub fn set_normal(&mut self, normal: impl Into<Vector3>) -> &mut Self {
        self.node().normal = normal.into();
        self.invalidate();
        self
    }

    pub fn set_inherit_scaling(&mut self, inherit: bool) -> &mut Self {
        self.node().inherit_scaling = inherit;
        self.invalidate();
        self
    }

    /// Records a pending change for the renderer only when the value differs
    /// from the last one set.
    pub fn set_backface_culling(&mut self, value: bool) -> &mut Self {
        self.node().apply_backface_culling(value);
        self
    }

    pub fn set_shading(&mut self, shading: bool) -> &mut Self {
        self.node().shading = shading;
        self
    }

    pub fn set_auto_center(&mut self, auto_center: bool) -> &mut Self {
        self.node().auto_center = auto_center;
        self
    }

    /// Overrides the computed depth order. `None` restores automatic sorting.
    pub fn set_z_index(&mut self, z_index: Option<i32>) -> &mut Self {
        self.node().z_index = z_index;
        self
    }

    pub fn set_render(&mut self, render: Option<RenderHandle>) -> &mut Self {
        self.node().render = render;
        self
    }

    /// Moves along the world-space forward vector (`-Z`).
    pub fn forward(&mut self, steps: f64) -> &mut Self {
        let t = self.translation() + self.forward_vector() * steps;
        self.set_translation(t)
    }

    /// Moves against the world-space right vector.
    pub fn left(&mut self, steps: f64) -> &mut Self {
        let t = self.translation() - self.right_vector() * steps;
        self.set_translation(t)
    }

    /// Moves along the world-space up vector (`-Y`).
    pub fn up(&mut self, steps: f64) -> &mut Self {
        let t = self.translation() + self.up_vector() * steps;
        self.set_translation(t)
    }

    pub fn lerp_scale(&mut self, from: Vector3, to: Vector3, t: f64) -> &mut Self {
        self.set_scale(from.lerp(to, t))
    }

    pub fn lerp_translation(&mut self, from: Vector3, to: Vector3, t: f64) -> &mut Self {
        self.set_translation(from.lerp(to, t))
    }

    /// Slerps from the rotation in `from` towards `to` and stores the result.
    pub fn lerp_rotation(&mut self, from: &Matrix4, to: Quaternion, t: f64) -> &mut Self {
        let q = Quaternion::slerp(Quaternion::from_matrix4(from), to, t);
        self.set_rotation_matrix(q.to_matrix4())
    }

    /// Applies every blend present in `tween`. `None` for `t` is a no-op.
    pub fn lerp(&mut self, tween: &Tween, t: Option<f64>) -> &mut Self {
        let Some(t) = t else {
            return self;
        };
        if let Some((from, to)) = tween.scale {
            self.lerp_scale(from, to, t);
        }
        if let Some((from, to)) = tween.translation {
            self.lerp_translation(from, to, t);
        }
        if let Some((from, to)) = tween.rotation {
            self.lerp_rotation(&from, to, t);
        }
        self
    }

    /// Refreshes this node's world matrix (and its ancestors') if stale.
    pub fn update(&mut self) -> &mut Self {
        hierarchy::update(self.nodes, self.id);
        self
    }

    pub fn total_rotation(&self) -> Matrix4 {
        hierarchy::total_rotation(&*self.nodes, self.id)
    }
}

impl Deref for NodeMut<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.nodes[self.id.0]
    }
}

#[cfg(test)]
mod tests {
    use crate::scene::{Node, Scene};
    use crate::{Matrix4, Quaternion, Tween, Vector3};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn setters_mark_descendants_dirty() {
        let mut scene = Scene::new();
        let root = scene.add_node(Node::new());
        let child = scene.add_node(Node::new());
        let grandchild = scene.add_node(Node::new());
        scene.set_parent(child, root).unwrap();
        scene.set_parent(grandchild, child).unwrap();
        scene.update();

        scene.node_mut(root).unwrap().set_translation([1.0, 0.0, 0.0]);
        assert!(scene.node(child).unwrap().is_dirty());
        assert!(scene.node(grandchild).unwrap().is_dirty());
    }

    #[test]
    fn set_pivot_marks_dirty() {
        let mut scene = Scene::new();
        let id = scene.add_node(Node::new());
        scene.update();
        scene.node_mut(id).unwrap().set_pivot([1.0, 0.0, 0.0]);
        assert!(scene.node(id).unwrap().is_dirty());
        assert!(scene.node(id).unwrap().is_pivot_changed());
    }

    #[test]
    fn rotation_matrix_always_counts_as_rotated() {
        let mut scene = Scene::new();
        let id = scene.add_node(Node::new());
        let mut node = scene.node_mut(id).unwrap();
        node.set_rotation_matrix(Matrix4::IDENTITY);
        assert!(node.is_rotated());
        node.set_rotation_xyz(0.0, 0.0, 0.0);
        assert!(!node.is_rotated());
    }

    #[test]
    fn movement_follows_world_basis() {
        let mut scene = Scene::new();
        let id = scene.add_node(Node::new().with_rotation(Vector3::Y, FRAC_PI_2));
        let mut node = scene.node_mut(id).unwrap();
        node.update();
        node.forward(10.0);
        assert!(node.translation().distance(Vector3::new(-10.0, 0.0, 0.0)) < 1e-9);

        node.update();
        node.left(5.0);
        assert!(node.translation().distance(Vector3::new(-10.0, 0.0, 5.0)) < 1e-9);

        node.update();
        node.up(2.0);
        assert!(node.translation().distance(Vector3::new(-10.0, -2.0, 5.0)) < 1e-9);
    }

    #[test]
    fn lerp_rotation_reaches_target() {
        let mut scene = Scene::new();
        let id = scene.add_node(Node::new());
        let target = Quaternion::from_axis_angle(Vector3::X, 1.0);
        let mut node = scene.node_mut(id).unwrap();
        node.lerp_rotation(&Matrix4::IDENTITY, target, 1.0);
        let expected = Matrix4::rotation_x(1.0);
        for i in 0..16 {
            assert!((node.rotation()[i] - expected[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn lerp_without_t_is_noop() {
        let mut scene = Scene::new();
        let id = scene.add_node(Node::new());
        scene.update();
        let tween = Tween::new().translation(Vector3::ZERO, Vector3::new(5.0, 0.0, 0.0));
        let mut node = scene.node_mut(id).unwrap();
        node.lerp(&tween, None);
        assert!(!node.is_dirty());
        node.lerp(&tween, Some(0.5));
        assert_eq!(node.translation(), Vector3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn presentation_flags_do_not_dirty() {
        let mut scene = Scene::new();
        let id = scene.add_node(Node::new());
        scene.update();
        let mut node = scene.node_mut(id).unwrap();
        node.set_shading(false).set_z_index(Some(4)).set_auto_center(false);
        assert!(!node.is_dirty());
        assert!(!node.shading());
        assert_eq!(node.z_index(), Some(4));
    }
}
