//! # Trellis
//!
//! **A scene-graph transform kernel for panel-based 3D.**
//!
//! Place flat panels in 3D, parent them into hierarchies, point a
//! perspective camera at them, and read back per-frame matrices for
//! whatever actually draws them (CSS `matrix3d`, a GPU, a test harness).
//!
//! ## Quick Start
//!
//! ```
//! use trellis::*;
//!
//! let mut scene = Scene::new();
//!
//! let cube = scene.add_node(Node::new().at(0.0, 0.0, -300.0));
//! let front = scene.add_node(
//!     Node::new()
//!         .at(0.0, 0.0, 100.0)
//!         .with_render(RenderHandle::new("front", 200.0, 200.0)),
//! );
//! scene.set_parent(front, cube)?;
//!
//! scene.node_mut(cube)?.set_rotation(Vector3::Y, 0.5);
//! scene.update();
//!
//! for item in scene.render_queue() {
//!     println!("{} -> z {:?}\n{}", item.node, item.z_index, item.world_view);
//! }
//! # Ok::<(), SceneError>(())
//! ```
//!
//! ## Philosophy
//!
//! - **Lazy world matrices**: setters mark a subtree dirty, [`Scene::update`] pays for it once.
//! - **No clock inside**: tweens take a progress value, the caller owns time.
//! - **No drawing**: the render queue is plain data.
//! - **Ids, not pointers**: nodes live in one arena and refer to each other by [`NodeId`].

mod camera;
mod collision;
mod config;
mod error;
mod interpolation;
mod matrix;
mod quaternion;
mod render;
pub mod scene;
mod tween;
mod vector;

pub use camera::{Camera, DEFAULT_PERSPECTIVE};
pub use collision::{Collision, Contact, Probe};
pub use config::{CameraConfig, SceneConfig};
pub use error::{Result, SceneError};
pub use interpolation::{Easing, lerp};
pub use matrix::Matrix4;
pub use quaternion::{AxisAngle, Quaternion};
pub use render::{RenderItem, brightness, depth_key};
pub use scene::{Node, NodeId, NodeMut, RenderHandle, Scene};
pub use tween::{CameraTween, NodeTween, Tween};
pub use vector::{Vector3, Vector4};

// Re-export glam math types for interop
pub use glam::{DMat4, DQuat, DVec3, DVec4};
