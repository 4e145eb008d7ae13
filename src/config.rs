//! Scene configuration.
//!
//! Loads scene settings from JSON strings (file IO left to the app). Every
//! field is optional in the JSON and falls back to the scene defaults.
//!
//! ```
//! use trellis::SceneConfig;
//!
//! let config = SceneConfig::from_json_str(r#"{ "shading_intensity": 0.5 }"#)?;
//! assert_eq!(config.shading_intensity, 0.5);
//! assert_eq!(config.camera.perspective, 800.0);
//! # Ok::<(), trellis::SceneError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::camera::DEFAULT_PERSPECTIVE;
use crate::error::Result;
use crate::vector::Vector3;

/// Settings for a [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    /// Direction the light travels. Normalized when the scene is built.
    #[serde(default = "default_light")]
    pub light: Vector3,
    /// Weight of the directional term in shading, `0..=1`.
    #[serde(default = "default_shading_intensity")]
    pub shading_intensity: f64,
    /// Compute per-node stacking order in the render queue.
    #[serde(default = "default_depth_sorting")]
    pub depth_sorting: bool,
}

/// Settings for the scene camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Projection plane position. Defaults to `(0, 0, perspective)`.
    #[serde(default)]
    pub position: Option<Vector3>,
    /// Distance from the eye to the projection plane.
    #[serde(default = "default_perspective")]
    pub perspective: f64,
}

fn default_light() -> Vector3 {
    Vector3::new(0.0, 0.0, -1.0)
}

fn default_shading_intensity() -> f64 {
    0.7
}

fn default_depth_sorting() -> bool {
    true
}

fn default_perspective() -> f64 {
    DEFAULT_PERSPECTIVE
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            light: default_light(),
            shading_intensity: default_shading_intensity(),
            depth_sorting: default_depth_sorting(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: None,
            perspective: default_perspective(),
        }
    }
}

impl SceneConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
