//! The scene graph.
//!
//! A [`Scene`] owns every [`Node`] in a flat arena and hands out [`NodeId`]s.
//! Parent/child links are ids, so a hierarchy is a forest over the arena.
//!
//! # Overview
//!
//! Each node keeps a local transform (translation, scale, rotation about a
//! pivot) and a cached world matrix. Setters go through [`NodeMut`], which
//! marks the node and all of its descendants dirty; [`Scene::update`] then
//! recomputes stale world matrices, parents before children.
//!
//! By default a child cancels its parent's scale, so scaling a panel does
//! not stretch the panels attached to it. Opt back in with
//! [`Node::inheriting_scale`].
//!
//! # Example
//!
//! ```
//! use trellis::{Node, Scene, Vector3};
//!
//! let mut scene = Scene::new();
//! let arm = scene.add_node(Node::new().at(0.0, 0.0, -200.0));
//! let hand = scene.add_node(Node::new().at(100.0, 0.0, 0.0));
//! scene.set_parent(hand, arm)?;
//!
//! scene.node_mut(arm)?.set_rotation(Vector3::Z, std::f64::consts::FRAC_PI_2);
//! scene.update();
//!
//! let p = scene.node(hand).unwrap().total_translation();
//! assert!((p.y - 100.0).abs() < 1e-9);
//! # Ok::<(), trellis::SceneError>(())
//! ```

mod handle;
pub(crate) mod hierarchy;
mod node;
mod scene;

pub use handle::NodeMut;
pub use node::{Node, NodeId, RenderHandle};
pub use scene::Scene;
