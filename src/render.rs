//! Per-frame data for an external renderer.
//!
//! [`Scene::render_queue`](crate::Scene::render_queue) produces one
//! [`RenderItem`] per node that carries a render handle, in insertion order.
//! The renderer turns each item into whatever its backend needs (a CSS
//! `matrix3d`, a uniform buffer, ...). Nothing in this crate draws.

use crate::matrix::Matrix4;
use crate::scene::NodeId;
use crate::vector::Vector3;

/// Everything a renderer needs to place and shade one node this frame.
///
/// # Fields
///
/// * `node` - The node being drawn
/// * `world_view` - `view * world`, the node in camera space
/// * `z_index` - Stacking order, when depth sorting is on
/// * `brightness` - Shading scalar, when shading is on for this node
/// * `backface_culling` - New culling state, only on frames where it changed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderItem {
    pub node: NodeId,
    pub world_view: Matrix4,
    pub z_index: Option<i32>,
    pub brightness: Option<f64>,
    pub backface_culling: Option<bool>,
}

/// Stacking order from the camera-space depth of a point, in tenths.
pub fn depth_key(pivot: Vector3, world_view: &Matrix4) -> i32 {
    (pivot.transform(world_view).z * 10.0).round() as i32
}

/// Lambert-style brightness in `[1 - intensity, 1]`.
///
/// `|normal · light| * intensity + (1 - intensity)`. Faces turned away from
/// the light are lit as if they faced it.
pub fn brightness(normal_world: Vector3, light: Vector3, intensity: f64) -> f64 {
    normal_world.dot(light).abs() * intensity + (1.0 - intensity)
}
