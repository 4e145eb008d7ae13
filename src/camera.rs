//! The scene camera.
//!
//! The camera follows the CSS perspective model: its translation marks the
//! projection plane, and the eye sits `perspective` units behind it along the
//! camera's own back vector. A camera at `(0, 0, perspective)` with no
//! rotation therefore produces an identity view matrix, and content placed at
//! `z = 0` renders at its natural size.

use crate::matrix::Matrix4;
use crate::quaternion::Quaternion;
use crate::scene::{Node, NodeId, hierarchy};
use crate::tween::Tween;
use crate::vector::Vector3;

/// Default distance between the eye and the projection plane.
pub const DEFAULT_PERSPECTIVE: f64 = 800.0;

/// A perspective camera producing a cached view matrix.
///
/// Setters only mark the camera dirty; [`Camera::update`] (called by
/// [`Scene::update`](crate::Scene::update)) rebuilds the view matrix.
///
/// # Example
///
/// ```
/// use trellis::Camera;
///
/// let mut camera = Camera::new().at(0.0, 0.0, 1000.0);
/// camera.update();
/// // The eye sits 800 units behind the plane at z = 1000.
/// assert_eq!(camera.view_matrix().translation_part().z, -200.0);
/// ```
#[derive(Clone, Debug)]
pub struct Camera {
    translation: Vector3,
    rotation: Matrix4,
    view: Matrix4,
    dirty: bool,
    perspective: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_perspective(DEFAULT_PERSPECTIVE)
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera at `(0, 0, perspective)` looking down `-Z`.
    pub fn with_perspective(perspective: f64) -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, perspective),
            rotation: Matrix4::IDENTITY,
            view: Matrix4::IDENTITY,
            dirty: true,
            perspective,
        }
    }

    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.set_translation([x, y, z]);
        self
    }

    pub fn set_rotation(&mut self, axis: Vector3, angle: f64) -> &mut Self {
        self.set_rotation_matrix(Matrix4::rotation_axis(axis, angle))
    }

    /// Euler angles in radians, applied X first, then Y, then Z.
    pub fn set_rotation_xyz(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.set_rotation_matrix(Matrix4::rotation_xyz(x, y, z))
    }

    pub fn set_rotation_matrix(&mut self, rotation: Matrix4) -> &mut Self {
        self.rotation = rotation;
        self.dirty = true;
        self
    }

    pub fn rotation(&self) -> &Matrix4 {
        &self.rotation
    }

    pub fn set_translation(&mut self, translation: impl Into<Vector3>) -> &mut Self {
        self.translation = translation.into();
        self.dirty = true;
        self
    }

    pub fn translation(&self) -> Vector3 {
        self.translation
    }

    pub fn set_perspective(&mut self, perspective: f64) -> &mut Self {
        self.perspective = perspective;
        self.dirty = true;
        self
    }

    pub fn perspective(&self) -> f64 {
        self.perspective
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn back_vector(&self) -> Vector3 {
        self.rotation.back().normalize()
    }

    pub fn forward_vector(&self) -> Vector3 {
        self.rotation.forward().normalize()
    }

    pub fn right_vector(&self) -> Vector3 {
        self.rotation.right().normalize()
    }

    pub fn up_vector(&self) -> Vector3 {
        self.rotation.up().normalize()
    }

    pub fn forward(&mut self, steps: f64) -> &mut Self {
        let t = self.translation + self.forward_vector() * steps;
        self.set_translation(t)
    }

    pub fn left(&mut self, steps: f64) -> &mut Self {
        let t = self.translation - self.right_vector() * steps;
        self.set_translation(t)
    }

    pub fn up(&mut self, steps: f64) -> &mut Self {
        let t = self.translation + self.up_vector() * steps;
        self.set_translation(t)
    }

    /// The view matrix as of the last [`Camera::update`].
    pub fn view_matrix(&self) -> &Matrix4 {
        &self.view
    }

    /// Adopts an external camera pose: the upper 3×3 block becomes the
    /// rotation and the translation column becomes the translation.
    pub fn set_view_matrix(&mut self, m: &Matrix4) -> &mut Self {
        self.rotation = m.rotation_part();
        self.set_translation(m.translation_part())
    }

    /// Pose that faces `id` head on from `distance` units along its back
    /// vector (defaults to the perspective distance).
    ///
    /// The rotation is the node's total rotation; the translation is the
    /// node's world-space pivot pushed out along its back vector.
    pub(crate) fn face_node_matrix(
        &self,
        nodes: &[Node],
        id: NodeId,
        distance: Option<f64>,
    ) -> Matrix4 {
        let distance = distance.unwrap_or(self.perspective);
        let node = &nodes[id.0];
        let position = node.pivot_transformed() + node.back_vector() * distance;
        hierarchy::total_rotation(nodes, id).with_translation(position)
    }

    /// Tween from the current pose to `pose`, blending rotation by slerp.
    pub fn tween_to(&self, pose: &Matrix4) -> Tween {
        Tween::new()
            .translation(self.translation, pose.translation_part())
            .rotation(
                self.rotation,
                Quaternion::from_matrix4(&pose.rotation_part()),
            )
    }

    pub fn lerp_translation(&mut self, from: Vector3, to: Vector3, t: f64) -> &mut Self {
        self.set_translation(from.lerp(to, t))
    }

    pub fn lerp_rotation(&mut self, from: &Matrix4, to: Quaternion, t: f64) -> &mut Self {
        let q = Quaternion::slerp(Quaternion::from_matrix4(from), to, t);
        self.set_rotation_matrix(q.to_matrix4())
    }

    /// Applies the translation and rotation blends of `tween`. Scale is
    /// ignored; `None` for `t` is a no-op.
    pub fn lerp(&mut self, tween: &Tween, t: Option<f64>) -> &mut Self {
        let Some(t) = t else {
            return self;
        };
        if let Some((from, to)) = tween.translation {
            self.lerp_translation(from, to, t);
        }
        if let Some((from, to)) = tween.rotation {
            self.lerp_rotation(&from, to, t);
        }
        self
    }

    /// Points the camera from its current translation towards `target`,
    /// with world up fixed at `(0, -1, 0)`.
    pub fn look_at(&mut self, target: Vector3) -> &mut Self {
        let rotation = Matrix4::look_at(self.translation, target, Vector3::new(0.0, -1.0, 0.0));
        self.set_rotation_matrix(rotation)
    }

    /// Points the camera at a node's local translation.
    pub fn look_at_node(&mut self, node: &Node) -> &mut Self {
        self.look_at(node.translation())
    }

    /// Rebuilds the view matrix if anything changed.
    ///
    /// The eye is the translation pulled back by `perspective` along the back
    /// vector; the view matrix is the rigid inverse of the eye pose.
    pub fn update(&mut self) -> &mut Self {
        if self.dirty {
            let eye = self.translation - self.back_vector() * self.perspective;
            self.view = self.rotation.with_translation(eye).fast_inverse();
            self.dirty = false;
        }
        self
    }

    /// Vertical field of view in degrees for a viewport `height` units tall.
    pub fn fov(&self, height: f64) -> f64 {
        (360.0 * (height / (2.0 * self.perspective)).atan()) / std::f64::consts::PI
    }
}
