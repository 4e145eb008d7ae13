//! Explicit, externally driven tweens.
//!
//! A tween captures a "from" snapshot and a target, and applies the blend
//! for whatever progress value the caller hands it. There is no clock in
//! here: drive [`NodeTween::apply`] or [`CameraTween::apply`] from your own
//! frame loop with `t` running from `0.0` to `1.0`.
//!
//! # Example
//!
//! ```
//! use trellis::{Easing, Node, Scene};
//!
//! let mut scene = Scene::new();
//! let id = scene.add_node(Node::new());
//! let slide = scene
//!     .tween(id, None, Some([0.0, 0.0, -500.0].into()), None)?
//!     .easing(Easing::Hermite);
//!
//! for step in 0..=10 {
//!     slide.apply(&mut scene, step as f64 / 10.0)?;
//!     scene.update();
//! }
//! assert_eq!(scene.node(id).unwrap().translation().z, -500.0);
//! # Ok::<(), trellis::SceneError>(())
//! ```

use crate::camera::Camera;
use crate::error::Result;
use crate::interpolation::Easing;
use crate::matrix::Matrix4;
use crate::quaternion::Quaternion;
use crate::scene::{NodeId, Scene};
use crate::vector::Vector3;

/// From/to pairs for each animatable component. Absent pairs are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tween {
    pub scale: Option<(Vector3, Vector3)>,
    pub translation: Option<(Vector3, Vector3)>,
    /// Starting rotation matrix and target rotation.
    pub rotation: Option<(Matrix4, Quaternion)>,
}

impl Tween {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(mut self, from: Vector3, to: Vector3) -> Self {
        self.scale = Some((from, to));
        self
    }

    pub fn translation(mut self, from: Vector3, to: Vector3) -> Self {
        self.translation = Some((from, to));
        self
    }

    pub fn rotation(mut self, from: Matrix4, to: Quaternion) -> Self {
        self.rotation = Some((from, to));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_none() && self.translation.is_none() && self.rotation.is_none()
    }
}

/// A [`Tween`] bound to one node of a scene.
///
/// Built by [`Scene::tween`], which snapshots the node's current state as
/// the starting point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTween {
    pub node: NodeId,
    pub tween: Tween,
    pub easing: Easing,
}

impl NodeTween {
    pub fn new(node: NodeId, tween: Tween) -> Self {
        Self {
            node,
            tween,
            easing: Easing::default(),
        }
    }

    /// Sets the easing curve applied to `t`.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Writes the blended state for progress `t` into the node.
    pub fn apply(&self, scene: &mut Scene, t: f64) -> Result<()> {
        scene
            .node_mut(self.node)?
            .lerp(&self.tween, Some(self.easing.apply(t)));
        Ok(())
    }
}

/// A [`Tween`] for the scene camera. Scale pairs are ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTween {
    pub tween: Tween,
    pub easing: Easing,
}

impl CameraTween {
    pub fn new(tween: Tween) -> Self {
        Self {
            tween,
            easing: Easing::default(),
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn apply(&self, camera: &mut Camera, t: f64) {
        camera.lerp(&self.tween, Some(self.easing.apply(t)));
    }
}
