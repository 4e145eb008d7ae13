//! Scene-graph nodes and their identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matrix::Matrix4;
use crate::vector::Vector3;

/// Handle to a node stored in a [`Scene`](super::Scene).
///
/// Ids are dense indices handed out by [`Scene::add_node`](super::Scene::add_node)
/// and stay valid for the lifetime of the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The renderer's view of a node: an identifier plus its measured size.
///
/// Nodes without a handle are pure transform groups. They take part in the
/// hierarchy but are skipped by collision queries and the render queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderHandle {
    /// Identifier the renderer uses for the drawn object.
    pub id: String,
    /// Rendered width in world units.
    pub width: f64,
    /// Rendered height in world units.
    pub height: f64,
}

impl RenderHandle {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }

    /// Radius of the coarse bounding sphere: half the larger side.
    pub fn half_extent(&self) -> f64 {
        (self.width / 2.0).max(self.height / 2.0)
    }
}

/// A positioned object in the scene graph.
///
/// A node stores its local transform (translation, scale, rotation, pivot)
/// and caches the resulting world matrix. The cache is refreshed by
/// [`Scene::update`](super::Scene::update) whenever the node, or any of its
/// ancestors, changed since the last pass.
///
/// Nodes are configured with builder methods before being added to a scene,
/// and mutated afterwards through a [`NodeMut`](super::NodeMut) handle so the
/// dirty flags stay consistent.
///
/// # Example
///
/// ```
/// use trellis::{Node, RenderHandle, Scene};
///
/// let mut scene = Scene::new();
/// let panel = scene.add_node(
///     Node::new()
///         .at(0.0, 0.0, -100.0)
///         .with_scale([2.0, 2.0, 1.0])
///         .with_render(RenderHandle::new("panel", 200.0, 100.0)),
/// );
/// scene.update();
/// assert_eq!(scene.node(panel).unwrap().total_translation().z, -100.0);
/// ```
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) translation: Vector3,
    pub(crate) scale: Vector3,
    pub(crate) rotation: Matrix4,
    pub(crate) pivot: Vector3,
    pub(crate) world: Matrix4,
    pub(crate) dirty: bool,

    pub(crate) is_scaled: bool,
    pub(crate) is_rotated: bool,
    pub(crate) is_translated: bool,
    pub(crate) is_pivot_changed: bool,

    pub(crate) normal: Vector3,
    pub(crate) normal_world: Vector3,
    pub(crate) inherit_scaling: bool,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    pub(crate) render: Option<RenderHandle>,
    pub(crate) shading: bool,
    pub(crate) backface_culling: bool,
    pub(crate) backface_culling_previous: Option<bool>,
    pub(crate) backface_culling_dirty: bool,
    pub(crate) auto_center: bool,
    pub(crate) z_index: Option<i32>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            translation: Vector3::ZERO,
            scale: Vector3::ONE,
            rotation: Matrix4::IDENTITY,
            pivot: Vector3::ZERO,
            world: Matrix4::IDENTITY,
            dirty: true,
            is_scaled: false,
            is_rotated: false,
            is_translated: false,
            is_pivot_changed: false,
            normal: Vector3::Z,
            normal_world: Vector3::Z,
            inherit_scaling: false,
            parent: None,
            children: Vec::new(),
            render: None,
            shading: true,
            backface_culling: false,
            backface_culling_previous: None,
            backface_culling_dirty: false,
            auto_center: true,
            z_index: None,
        }
    }
}

impl Node {
    /// A node at the origin with identity rotation and unit scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local translation.
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.apply_translation(Vector3::new(x, y, z));
        self
    }

    pub fn with_scale(mut self, scale: impl Into<Vector3>) -> Self {
        self.apply_scale(scale.into());
        self
    }

    /// Rotation about `axis` by `angle` radians.
    pub fn with_rotation(mut self, axis: Vector3, angle: f64) -> Self {
        self.apply_rotation(axis, angle);
        self
    }

    /// Euler rotation, X applied first.
    pub fn with_rotation_xyz(mut self, x: f64, y: f64, z: f64) -> Self {
        self.apply_rotation_xyz(x, y, z);
        self
    }

    pub fn with_pivot(mut self, pivot: impl Into<Vector3>) -> Self {
        self.apply_pivot(pivot.into());
        self
    }

    /// Local surface normal used for shading and collision. Defaults to `+Z`.
    pub fn with_normal(mut self, normal: impl Into<Vector3>) -> Self {
        self.normal = normal.into();
        self
    }

    /// Attaches the renderer's handle for this node.
    pub fn with_render(mut self, render: RenderHandle) -> Self {
        self.render = Some(render);
        self
    }

    /// Lets this node inherit its parent's scale instead of cancelling it.
    pub fn inheriting_scale(mut self) -> Self {
        self.inherit_scaling = true;
        self
    }

    pub fn translation(&self) -> Vector3 {
        self.translation
    }

    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    /// Local rotation matrix, without translation.
    pub fn rotation(&self) -> &Matrix4 {
        &self.rotation
    }

    pub fn pivot(&self) -> Vector3 {
        self.pivot
    }

    /// Cached world matrix, as of the last update.
    pub fn world_matrix(&self) -> &Matrix4 {
        &self.world
    }

    /// Whether the cached world matrix is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_scaled(&self) -> bool {
        self.is_scaled
    }

    pub fn is_rotated(&self) -> bool {
        self.is_rotated
    }

    pub fn is_translated(&self) -> bool {
        self.is_translated
    }

    pub fn is_pivot_changed(&self) -> bool {
        self.is_pivot_changed
    }

    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// The local normal rotated into world space, as of the last update.
    pub fn normal_world(&self) -> Vector3 {
        self.normal_world
    }

    pub fn inherit_scaling(&self) -> bool {
        self.inherit_scaling
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn render(&self) -> Option<&RenderHandle> {
        self.render.as_ref()
    }

    pub fn shading(&self) -> bool {
        self.shading
    }

    pub fn backface_culling(&self) -> bool {
        self.backface_culling
    }

    /// Whether the backface culling flag changed since the renderer last read it.
    pub fn backface_culling_dirty(&self) -> bool {
        self.backface_culling_dirty
    }

    pub fn auto_center(&self) -> bool {
        self.auto_center
    }

    /// Explicit depth order, overriding the computed one.
    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    /// Local transform without any parent contribution.
    ///
    /// Composed as `T * S * [T(pivot)] * R * [T(-pivot)]`, skipping identity
    /// factors.
    pub fn local_matrix(&self) -> Matrix4 {
        let t = self.translation;
        let mut m = if self.is_translated {
            Matrix4::translation(t.x, t.y, t.z)
        } else {
            Matrix4::IDENTITY
        };
        if self.is_scaled {
            let s = self.scale;
            m = m * Matrix4::scale(s.x, s.y, s.z);
        }
        if self.is_rotated {
            let p = self.pivot;
            if self.is_pivot_changed {
                m = m * Matrix4::translation(p.x, p.y, p.z);
            }
            m = m * self.rotation;
            if self.is_pivot_changed {
                m = m * Matrix4::translation(-p.x, -p.y, -p.z);
            }
        }
        m
    }

    /// Pivot mapped through the world matrix.
    pub fn pivot_transformed(&self) -> Vector3 {
        self.pivot.transform(&self.world).to_vector3()
    }

    /// World-space position, read from the world matrix translation column.
    pub fn total_translation(&self) -> Vector3 {
        self.world.translation_part()
    }

    /// Unit `+Z` of the world matrix.
    pub fn back_vector(&self) -> Vector3 {
        self.world.back().normalize()
    }

    /// Unit `-Z` of the world matrix.
    pub fn forward_vector(&self) -> Vector3 {
        self.world.forward().normalize()
    }

    pub fn right_vector(&self) -> Vector3 {
        self.world.right().normalize()
    }

    pub fn up_vector(&self) -> Vector3 {
        self.world.up().normalize()
    }

    // Field updates that keep the identity-skip flags in sync. Dirty
    // propagation to descendants is the caller's job.

    pub(crate) fn apply_translation(&mut self, t: Vector3) {
        self.translation = t;
        self.is_translated = !t.is_zero();
        self.dirty = true;
    }

    pub(crate) fn apply_scale(&mut self, s: Vector3) {
        self.scale = s;
        self.is_scaled = !(s.x == 1.0 && s.y == 1.0 && s.z == 1.0);
        self.dirty = true;
    }

    pub(crate) fn apply_rotation(&mut self, axis: Vector3, angle: f64) {
        self.is_rotated = angle != 0.0;
        self.rotation = if self.is_rotated {
            Matrix4::rotation_axis(axis, angle)
        } else {
            Matrix4::IDENTITY
        };
        self.dirty = true;
    }

    pub(crate) fn apply_rotation_xyz(&mut self, x: f64, y: f64, z: f64) {
        self.is_rotated = !(x == 0.0 && y == 0.0 && z == 0.0);
        self.rotation = if self.is_rotated {
            Matrix4::rotation_xyz(x, y, z)
        } else {
            Matrix4::IDENTITY
        };
        self.dirty = true;
    }

    pub(crate) fn apply_rotation_matrix(&mut self, m: Matrix4) {
        self.rotation = m;
        self.is_rotated = true;
        self.dirty = true;
    }

    pub(crate) fn apply_pivot(&mut self, p: Vector3) {
        self.pivot = p;
        self.is_pivot_changed = !p.is_zero();
        self.dirty = true;
    }

    pub(crate) fn apply_backface_culling(&mut self, value: bool) {
        self.backface_culling = value;
        if self.backface_culling_previous != Some(value) {
            self.backface_culling_dirty = true;
            self.backface_culling_previous = Some(value);
        }
    }

    /// Reads and clears the pending backface culling change.
    pub(crate) fn take_backface_culling_change(&mut self) -> Option<bool> {
        if self.backface_culling_dirty {
            self.backface_culling_dirty = false;
            Some(self.backface_culling)
        } else {
            None
        }
    }
}
