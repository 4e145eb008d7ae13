//! Point-versus-plane proximity queries over scene nodes.
//!
//! A query describes a moving point: where it is, which way it is heading
//! and how far it travels this step. Every rendered node is treated as a flat
//! panel: a bounding sphere of half its larger side for the coarse test, then
//! the panel plane (its world normal through its world position) for the
//! fine test.
//!
//! # Example
//!
//! ```
//! use trellis::{Node, Probe, RenderHandle, Scene, Vector3};
//!
//! let mut scene = Scene::new();
//! let wall = scene.add_node(
//!     Node::new()
//!         .at(0.0, 0.0, 10.5)
//!         .with_render(RenderHandle::new("wall", 10.0, 10.0)),
//! );
//! scene.update();
//!
//! let probe = Probe::new(Vector3::ZERO, Vector3::Z, 10.0);
//! let hits = scene.collisions(&probe);
//! assert_eq!(hits[0].node, wall);
//! ```

use crate::scene::{Node, NodeId};
use crate::vector::Vector3;

/// A proximity query: a point moving `distance` units along `normal`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Probe {
    /// Current position of the moving point.
    pub position: Vector3,
    /// Direction of travel. Not normalized.
    pub normal: Vector3,
    /// Travel distance for this step. Also the half-width of the band
    /// around each plane that counts as a hit.
    pub distance: f64,
}

impl Probe {
    pub fn new(position: Vector3, normal: Vector3, distance: f64) -> Self {
        Self {
            position,
            normal,
            distance,
        }
    }

    /// The point being tested: `position + normal * distance`.
    pub fn point(&self) -> Vector3 {
        self.position + self.normal * self.distance
    }
}

/// A node hit by a [`Probe`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub node: NodeId,
    /// Distance from the node's world position to the test point.
    pub distance: f64,
    /// Signed distance from the test point to the node's plane, measured
    /// along the node's world normal.
    pub plane_distance: f64,
}

/// Stateless collision query over a slice of nodes.
///
/// World matrices must be current; run [`Scene::update`](crate::Scene::update)
/// first.
#[derive(Clone, Copy, Debug)]
pub struct Collision<'a> {
    nodes: &'a [Node],
}

impl<'a> Collision<'a> {
    pub fn new(nodes: &'a [Node]) -> Self {
        Self { nodes }
    }

    /// Nodes whose panel is within reach of the probe, in insertion order.
    ///
    /// A node is reported when the test point lies inside its bounding
    /// sphere and `|plane_distance| < probe.distance`. The band is two-sided
    /// and as wide as the step, so a point that has already crossed a panel
    /// within this step still counts.
    pub fn collisions(&self, probe: &Probe) -> Vec<Contact> {
        let point = probe.point();
        let mut contacts = Vec::new();

        for (index, node) in self.nodes.iter().enumerate() {
            let Some(render) = node.render() else {
                continue;
            };

            let position = node.total_translation();
            let distance = position.distance(point);
            if distance >= render.half_extent() {
                continue;
            }

            let plane_distance = node.normal_world().dot(position - point);
            if plane_distance.abs() < probe.distance {
                contacts.push(Contact {
                    node: NodeId(index),
                    distance,
                    plane_distance,
                });
            }
        }

        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RenderHandle, Scene};

    fn panel(scene: &mut Scene, z: f64, size: f64) -> NodeId {
        scene.add_node(
            Node::new()
                .at(0.0, 0.0, z)
                .with_render(RenderHandle::new(format!("panel{z}"), size, size)),
        )
    }

    #[test]
    fn probe_point() {
        let probe = Probe::new(Vector3::new(1.0, 0.0, 0.0), Vector3::Y, 4.0);
        assert_eq!(probe.point(), Vector3::new(1.0, 4.0, 0.0));
    }

    #[test]
    fn reports_panel_just_past_test_point() {
        let mut scene = Scene::new();
        let id = panel(&mut scene, 10.5, 10.0);
        scene.update();

        let contacts = Collision::new(scene.nodes())
            .collisions(&Probe::new(Vector3::ZERO, Vector3::Z, 10.0));
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].node, id);
        assert_eq!(contacts[0].distance, 0.5);
        assert_eq!(contacts[0].plane_distance, 0.5);
    }

    #[test]
    fn coarse_sphere_rejects_far_nodes() {
        let mut scene = Scene::new();
        panel(&mut scene, 100.0, 10.0);
        scene.update();
        let contacts = Collision::new(scene.nodes())
            .collisions(&Probe::new(Vector3::ZERO, Vector3::Z, 10.0));
        assert!(contacts.is_empty());
    }

    #[test]
    fn plane_band_rejects_glancing_points() {
        let mut scene = Scene::new();
        // Large panel, so the sphere test passes, but the point is 3 units
        // off the plane and the step is only 2.
        let id = scene.add_node(
            Node::new()
                .at(0.0, 0.0, 5.0)
                .with_render(RenderHandle::new("big", 100.0, 100.0)),
        );
        scene.update();
        let probe = Probe::new(Vector3::ZERO, Vector3::Z, 2.0);
        assert!(Collision::new(scene.nodes()).collisions(&probe).is_empty());

        let probe = Probe::new(Vector3::new(0.0, 0.0, 2.0), Vector3::Z, 2.0);
        let contacts = Collision::new(scene.nodes()).collisions(&probe);
        assert_eq!(contacts[0].node, id);
    }

    #[test]
    fn points_behind_the_plane_still_count() {
        let mut scene = Scene::new();
        panel(&mut scene, 10.0, 10.0);
        scene.update();
        let contacts = Collision::new(scene.nodes())
            .collisions(&Probe::new(Vector3::new(0.0, 0.0, 1.0), Vector3::Z, 10.0));
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].plane_distance, -1.0);
    }

    #[test]
    fn nodes_without_render_handle_are_skipped() {
        let mut scene = Scene::new();
        scene.add_node(Node::new().at(0.0, 0.0, 10.0));
        scene.update();
        let contacts = Collision::new(scene.nodes())
            .collisions(&Probe::new(Vector3::ZERO, Vector3::Z, 10.0));
        assert!(contacts.is_empty());
    }

    #[test]
    fn results_keep_insertion_order() {
        let mut scene = Scene::new();
        let a = panel(&mut scene, 10.2, 10.0);
        let b = panel(&mut scene, 9.9, 10.0);
        scene.update();
        let contacts = Collision::new(scene.nodes())
            .collisions(&Probe::new(Vector3::ZERO, Vector3::Z, 10.0));
        let ids: Vec<_> = contacts.iter().map(|c| c.node).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
