//! The scene: node arena, camera, lighting and the per-frame passes.

use tracing::{debug, trace};

use super::handle::NodeMut;
use super::hierarchy;
use super::node::{Node, NodeId};
use crate::camera::Camera;
use crate::collision::{Collision, Contact, Probe};
use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::matrix::Matrix4;
use crate::quaternion::Quaternion;
use crate::render::{self, RenderItem};
use crate::tween::{CameraTween, NodeTween, Tween};
use crate::vector::Vector3;

/// A forest of nodes plus the camera and light they are seen with.
///
/// Nodes are stored in insertion order, which is also the order of
/// [`Scene::update`], [`Scene::render_queue`] and collision results.
///
/// # Example
///
/// ```
/// use trellis::{Node, Scene};
///
/// let mut scene = Scene::new();
/// let a = scene.add_node(Node::new().at(0.0, 0.0, -100.0).with_scale([2.0, 2.0, 2.0]));
/// let b = scene.add_node(Node::new().at(0.0, 0.0, 50.0));
/// scene.set_parent(b, a)?;
/// scene.update();
///
/// // B cancels A's scale, so its offset is not doubled.
/// assert_eq!(scene.node(b).unwrap().total_translation().z, -50.0);
/// # Ok::<(), trellis::SceneError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<Node>,
    camera: Camera,
    light: Vector3,
    shading_intensity: f64,
    depth_sorting: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::with_config(&SceneConfig::default())
    }
}

impl Scene {
    /// An empty scene with the default camera, a light shining down `-Z`
    /// and a shading intensity of 0.7.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &SceneConfig) -> Self {
        let mut camera = Camera::with_perspective(config.camera.perspective);
        if let Some(position) = config.camera.position {
            camera.set_translation(position);
        }
        Self {
            nodes: Vec::new(),
            camera,
            light: config.light.normalize(),
            shading_intensity: config.shading_intensity,
            depth_sorting: config.depth_sorting,
        }
    }

    /// Adds a root node and returns its id.
    ///
    /// Any parent or child links the node carries (say, from cloning a node
    /// out of a scene) are dropped; link it with [`Scene::set_parent`].
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = None;
        node.children.clear();
        node.dirty = true;
        self.nodes.push(node);
        debug!(node = %id, "node added");
        id
    }

    /// All nodes in insertion order. Index `i` holds the node with id `#i`.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<NodeMut<'_>> {
        self.check(id)?;
        Ok(NodeMut::new(&mut self.nodes, id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(SceneError::NodeNotFound(id))
        }
    }

    /// Makes `child` a child of `parent`.
    ///
    /// A child that already has a parent is moved. Self-parenting and links
    /// that would form a cycle are rejected and leave the scene unchanged.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        hierarchy::attach(&mut self.nodes, child, parent)
    }

    /// Same as [`Scene::set_parent`] with the arguments the other way round.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        hierarchy::attach(&mut self.nodes, child, parent)
    }

    /// Detaches `child` from its parent, making it a root again.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        hierarchy::detach(&mut self.nodes, child)
    }

    /// First node whose render handle has this id.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.render().is_some_and(|r| r.id == id))
            .map(NodeId)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Unit direction the light travels in.
    pub fn light(&self) -> Vector3 {
        self.light
    }

    /// Sets the light direction. Stored normalized.
    pub fn set_light(&mut self, light: impl Into<Vector3>) {
        self.light = light.into().normalize();
    }

    pub fn shading_intensity(&self) -> f64 {
        self.shading_intensity
    }

    pub fn set_shading_intensity(&mut self, intensity: f64) {
        self.shading_intensity = intensity;
    }

    pub fn depth_sorting(&self) -> bool {
        self.depth_sorting
    }

    pub fn set_depth_sorting(&mut self, enabled: bool) {
        self.depth_sorting = enabled;
    }

    /// Rotation-only chain from the root to `id`.
    pub fn total_rotation(&self, id: NodeId) -> Result<Matrix4> {
        self.check(id)?;
        Ok(hierarchy::total_rotation(&self.nodes, id))
    }

    /// Refreshes one node (and its ancestors) if stale.
    pub fn update_node(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        hierarchy::update(&mut self.nodes, id);
        Ok(())
    }

    /// Refreshes every stale world matrix, then the camera's view matrix.
    ///
    /// Run this before reading world matrices, rendering or querying
    /// collisions.
    pub fn update(&mut self) {
        for index in 0..self.nodes.len() {
            hierarchy::update(&mut self.nodes, NodeId(index));
        }
        self.camera.update();
        trace!(nodes = self.nodes.len(), "scene updated");
    }

    /// Tween from the node's current state to the given targets.
    ///
    /// Only components with a target are animated. The node's current
    /// scale, translation and rotation are captured now as the start.
    pub fn tween(
        &self,
        id: NodeId,
        to_scale: Option<Vector3>,
        to_translation: Option<Vector3>,
        to_rotation: Option<Quaternion>,
    ) -> Result<NodeTween> {
        self.check(id)?;
        let node = &self.nodes[id.0];
        let mut tween = Tween::new();
        if let Some(to) = to_scale {
            tween = tween.scale(node.scale, to);
        }
        if let Some(to) = to_translation {
            tween = tween.translation(node.translation, to);
        }
        if let Some(to) = to_rotation {
            tween = tween.rotation(node.rotation, to);
        }
        Ok(NodeTween::new(id, tween))
    }

    /// Camera pose facing node `id` from `distance` (perspective by default).
    ///
    /// Reads the node's cached world matrix; update the scene first.
    pub fn face_node_matrix(&self, id: NodeId, distance: Option<f64>) -> Result<Matrix4> {
        self.check(id)?;
        Ok(self.camera.face_node_matrix(&self.nodes, id, distance))
    }

    /// Camera tween from the current pose to [`Scene::face_node_matrix`].
    pub fn face_node_tween(&self, id: NodeId, distance: Option<f64>) -> Result<CameraTween> {
        let pose = self.face_node_matrix(id, distance)?;
        Ok(CameraTween::new(self.camera.tween_to(&pose)))
    }

    /// Turns the camera towards node `id`.
    pub fn look_at_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.get(id.0).ok_or(SceneError::NodeNotFound(id))?;
        self.camera.look_at_node(node);
        Ok(())
    }

    /// Rendered nodes within reach of `probe`, in insertion order.
    pub fn collisions(&self, probe: &Probe) -> Vec<Contact> {
        Collision::new(&self.nodes).collisions(probe)
    }

    /// Builds this frame's render data for every node with a render handle.
    ///
    /// Uses the view matrix from the last [`Scene::update`]. Pending
    /// backface culling changes are consumed, so each one is reported once.
    pub fn render_queue(&mut self) -> Vec<RenderItem> {
        let view = *self.camera.view_matrix();
        let light = self.light;
        let intensity = self.shading_intensity;
        let depth_sorting = self.depth_sorting;

        let mut items = Vec::new();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.render.is_none() {
                continue;
            }
            let world_view = view * node.world;
            let z_index = depth_sorting.then(|| {
                node.z_index
                    .unwrap_or_else(|| render::depth_key(node.pivot, &world_view))
            });
            let brightness = node
                .shading
                .then(|| render::brightness(node.normal_world, light, intensity));
            items.push(RenderItem {
                node: NodeId(index),
                world_view,
                z_index,
                brightness,
                backface_culling: node.take_backface_culling_change(),
            });
        }
        items
    }
}
