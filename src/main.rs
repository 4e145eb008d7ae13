use std::error::Error;
use std::f64::consts::{FRAC_PI_2, PI};

use tracing::{debug, info};
use trellis::{Easing, Node, NodeId, Probe, Quaternion, RenderHandle, Scene, SceneConfig, Vector3};

const FACE_SIZE: f64 = 200.0;
const STEPS: usize = 30;

/// Reads a JSON scene config from the first argument, if any.
fn load_config() -> Result<SceneConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            info!(%path, "Loaded scene config");
            Ok(SceneConfig::from_json_str(&text)?)
        }
        None => Ok(SceneConfig::default()),
    }
}

/// Six panels around a root node, each facing outwards.
fn build_cube(scene: &mut Scene) -> Result<NodeId, Box<dyn Error>> {
    let half = FACE_SIZE / 2.0;
    let root = scene.add_node(Node::new().at(0.0, 0.0, -400.0));

    let faces = [
        ("front", Node::new().at(0.0, 0.0, half)),
        ("back", Node::new().at(0.0, 0.0, -half).with_rotation(Vector3::Y, PI)),
        ("right", Node::new().at(half, 0.0, 0.0).with_rotation(Vector3::Y, FRAC_PI_2)),
        ("left", Node::new().at(-half, 0.0, 0.0).with_rotation(Vector3::Y, -FRAC_PI_2)),
        ("top", Node::new().at(0.0, -half, 0.0).with_rotation(Vector3::X, FRAC_PI_2)),
        ("bottom", Node::new().at(0.0, half, 0.0).with_rotation(Vector3::X, -FRAC_PI_2)),
    ];
    for (name, face) in faces {
        let id = scene.add_node(face.with_render(RenderHandle::new(name, FACE_SIZE, FACE_SIZE)));
        scene.set_parent(id, root)?;
    }

    Ok(root)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = load_config()?;
    let mut scene = Scene::with_config(&config);
    let root = build_cube(&mut scene)?;
    scene.update();
    info!(nodes = scene.len(), "Cube built");

    // Quarter turn of the whole cube.
    let spin = scene
        .tween(root, None, None, Some(Quaternion::from_axis_angle(Vector3::Y, FRAC_PI_2)))?
        .easing(Easing::SmoothStep);
    for step in 0..=STEPS {
        spin.apply(&mut scene, step as f64 / STEPS as f64)?;
        scene.update();
    }

    // Fly the camera in front of the right face.
    let target = scene.element_by_id("right").ok_or("right face missing")?;
    let fly = scene.face_node_tween(target, None)?.easing(Easing::Hermite);
    for step in 0..=STEPS {
        fly.apply(scene.camera_mut(), step as f64 / STEPS as f64);
        scene.update();
        debug!(step, camera = %scene.camera().translation(), "Camera moved");
    }
    info!(camera = %scene.camera().translation(), "Camera facing right face");

    let probe = Probe::new(Vector3::new(0.0, 0.0, -290.0), -Vector3::Z, 8.0);
    for contact in scene.collisions(&probe) {
        info!(
            node = %contact.node,
            distance = contact.distance,
            plane_distance = contact.plane_distance,
            "Probe contact"
        );
    }

    for item in scene.render_queue() {
        let name = scene
            .node(item.node)
            .and_then(|node| node.render())
            .map_or("?", |render| render.id.as_str());
        info!(
            node = %item.node,
            face = name,
            z_index = ?item.z_index,
            brightness = ?item.brightness,
            "Render item"
        );
        debug!("\n{}", item.world_view);
    }

    Ok(())
}
