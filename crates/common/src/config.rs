//! Declarative world configuration.
//!
//! [`WorldConfig`] is the partially-specified record a caller hands to the
//! orchestrator. [`WorldConfig::resolve`] is the single defaulting pass that
//! turns it into a fully-populated [`WorldSettings`]; nothing downstream
//! looks at optional fields.

use crate::types::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ANTIALIAS: bool = true;
pub const DEFAULT_BACKGROUND: Color = Color::from_hex(0x202020);
pub const DEFAULT_AXES_HELPER_SIZE: f32 = 10.0;
pub const DEFAULT_GRID_HELPER_SIZE: f32 = 10.0;
pub const DEFAULT_GRID_HELPER_DIVISIONS: u32 = 10;
pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);
pub const DEFAULT_DAMPING: bool = true;
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.2;
pub const DEFAULT_FPS: f64 = 30.0;

/// Errors from loading or resolving a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config format {0:?}: expected .json, .yaml or .yml")]
    UnsupportedFormat(String),
    #[error("renderer.containerId must not be empty")]
    EmptyContainerId,
    #[error("animate.fps must be a positive finite number with a representable frame interval, got {0}")]
    InvalidFrameRate(f64),
}

/// Partially-specified world configuration.
///
/// Only `renderer.containerId` is required; every other field falls back to
/// the documented default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldConfig {
    pub renderer: RendererConfig,
    pub scene: Option<SceneConfig>,
    pub camera: Option<CameraConfig>,
    #[serde(alias = "controller")]
    pub controls: Option<ControlsConfig>,
    pub animate: Option<AnimateConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererConfig {
    /// Id of the element the surface is mounted into.
    pub container_id: String,
    /// Defaults to true.
    pub anti_alias: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    /// Defaults to 0x202020.
    pub background_color: Option<Color>,
    /// Defaults to false.
    pub axes_helper: Option<bool>,
    /// Defaults to 10.
    pub axes_helper_size: Option<f32>,
    /// Defaults to false.
    pub grid_helper: Option<bool>,
    /// Defaults to 10.
    pub grid_helper_size: Option<f32>,
    /// Defaults to 10.
    pub grid_helper_divisions: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    /// Defaults to false.
    pub z_axis_up: Option<bool>,
    /// Vertical field of view in degrees. Defaults to 75.
    pub fov: Option<f32>,
    /// Defaults to 0.1.
    pub near_clipping: Option<f32>,
    /// Defaults to 1000.
    pub far_clipping: Option<f32>,
    /// Defaults to 10,10,10.
    pub position: Option<PositionConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsConfig {
    /// Defaults to true.
    pub damping: Option<bool>,
    /// Defaults to 0.2.
    pub damping_factor: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimateConfig {
    /// Target render rate. Defaults to 30.
    pub fps: Option<f64>,
}

/// Fully-resolved settings consumed by the factories and the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSettings {
    pub renderer: RendererSettings,
    pub scene: SceneSettings,
    pub camera: CameraSettings,
    pub controls: ControlSettings,
    pub animate: AnimateSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RendererSettings {
    pub container_id: String,
    pub antialias: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSettings {
    pub background: Color,
    /// Axes helper length, present when the helper is enabled.
    pub axes_helper: Option<f32>,
    pub grid_helper: Option<GridHelperSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridHelperSettings {
    pub size: f32,
    pub divisions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub up: Vec3,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlSettings {
    pub damping: bool,
    pub damping_factor: f32,
}

/// Target frame rate and the frame interval derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimateSettings {
    fps: f64,
    #[serde(skip)]
    interval: Duration,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            axes_helper: None,
            grid_helper: None,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            up: Vec3::Y,
            position: DEFAULT_CAMERA_POSITION,
        }
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            damping_factor: DEFAULT_DAMPING_FACTOR,
        }
    }
}

impl Default for AnimateSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            interval: Duration::from_secs_f64(1.0 / DEFAULT_FPS),
        }
    }
}

impl AnimateSettings {
    /// Settings for `fps` frames per second. The interval `1 / fps` must be
    /// representable as a [`Duration`].
    pub fn new(fps: f64) -> Result<Self, ConfigError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ConfigError::InvalidFrameRate(fps));
        }
        let interval =
            Duration::try_from_secs_f64(1.0 / fps).map_err(|_| ConfigError::InvalidFrameRate(fps))?;
        Ok(Self { fps, interval })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Time between rendered frames.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl WorldConfig {
    /// A configuration with only the required container id set.
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            renderer: RendererConfig {
                container_id: container_id.into(),
                anti_alias: None,
            },
            scene: None,
            camera: None,
            controls: None,
            animate: None,
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Read a configuration file, choosing the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let text = std::fs::read_to_string(path)?;
        let config = match ext.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        tracing::debug!("loaded world config from {}", path.display());
        Ok(config)
    }

    /// Apply every documented default and validate the result.
    pub fn resolve(&self) -> Result<WorldSettings, ConfigError> {
        let renderer = self.renderer.resolve()?;
        let animate = self
            .animate
            .as_ref()
            .map(AnimateConfig::resolve)
            .transpose()?
            .unwrap_or_default();
        Ok(WorldSettings {
            renderer,
            scene: self.scene.as_ref().map(SceneConfig::resolve).unwrap_or_default(),
            camera: self.camera.as_ref().map(CameraConfig::resolve).unwrap_or_default(),
            controls: self
                .controls
                .as_ref()
                .map(ControlsConfig::resolve)
                .unwrap_or_default(),
            animate,
        })
    }
}

impl RendererConfig {
    fn resolve(&self) -> Result<RendererSettings, ConfigError> {
        if self.container_id.trim().is_empty() {
            return Err(ConfigError::EmptyContainerId);
        }
        Ok(RendererSettings {
            container_id: self.container_id.clone(),
            antialias: self.anti_alias.unwrap_or(DEFAULT_ANTIALIAS),
        })
    }
}

impl SceneConfig {
    fn resolve(&self) -> SceneSettings {
        let axes_helper = self
            .axes_helper
            .unwrap_or(false)
            .then(|| self.axes_helper_size.unwrap_or(DEFAULT_AXES_HELPER_SIZE));
        let grid_helper = self.grid_helper.unwrap_or(false).then(|| GridHelperSettings {
            size: self.grid_helper_size.unwrap_or(DEFAULT_GRID_HELPER_SIZE),
            divisions: self
                .grid_helper_divisions
                .unwrap_or(DEFAULT_GRID_HELPER_DIVISIONS),
        });
        SceneSettings {
            background: self.background_color.unwrap_or(DEFAULT_BACKGROUND),
            axes_helper,
            grid_helper,
        }
    }
}

impl CameraConfig {
    fn resolve(&self) -> CameraSettings {
        let position = self.position.unwrap_or_default();
        CameraSettings {
            fov_degrees: self.fov.unwrap_or(DEFAULT_FOV_DEGREES),
            near: self.near_clipping.unwrap_or(DEFAULT_NEAR),
            far: self.far_clipping.unwrap_or(DEFAULT_FAR),
            up: if self.z_axis_up.unwrap_or(false) {
                Vec3::Z
            } else {
                Vec3::Y
            },
            position: Vec3::new(
                position.x.unwrap_or(DEFAULT_CAMERA_POSITION.x),
                position.y.unwrap_or(DEFAULT_CAMERA_POSITION.y),
                position.z.unwrap_or(DEFAULT_CAMERA_POSITION.z),
            ),
        }
    }
}

impl ControlsConfig {
    fn resolve(&self) -> ControlSettings {
        ControlSettings {
            damping: self.damping.unwrap_or(DEFAULT_DAMPING),
            damping_factor: self.damping_factor.unwrap_or(DEFAULT_DAMPING_FACTOR),
        }
    }
}

impl AnimateConfig {
    fn resolve(&self) -> Result<AnimateSettings, ConfigError> {
        AnimateSettings::new(self.fps.unwrap_or(DEFAULT_FPS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_sections_resolve_to_defaults() {
        let settings = WorldConfig::new("app").resolve().unwrap();
        assert_eq!(settings.renderer.container_id, "app");
        assert!(settings.renderer.antialias);
        assert_eq!(settings.scene, SceneSettings::default());
        assert_eq!(settings.scene.background.hex(), 0x202020);
        assert_eq!(settings.camera, CameraSettings::default());
        assert_eq!(settings.camera.fov_degrees, 75.0);
        assert_eq!(settings.camera.position, Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(settings.camera.up, Vec3::Y);
        assert_eq!(settings.controls.damping_factor, 0.2);
        assert!(settings.controls.damping);
        assert_eq!(settings.animate.fps(), 30.0);
    }

    #[test]
    fn empty_sections_resolve_to_defaults() {
        let config = WorldConfig::from_json_str(
            r#"{"renderer":{"containerId":"app"},"scene":{},"camera":{},"controls":{},"animate":{}}"#,
        )
        .unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings, WorldConfig::new("app").resolve().unwrap());
    }

    #[test]
    fn json_overrides_are_applied() {
        let config = WorldConfig::from_json_str(
            r##"{
                "renderer": {"containerId": "scene", "antiAlias": false},
                "scene": {"backgroundColor": "#ff0000", "axesHelper": true, "axesHelperSize": 4},
                "camera": {"zAxisUp": true, "fov": 50, "position": {"y": 2}},
                "controls": {"damping": false, "dampingFactor": 0.5},
                "animate": {"fps": 60}
            }"##,
        )
        .unwrap();
        let s = config.resolve().unwrap();
        assert!(!s.renderer.antialias);
        assert_eq!(s.scene.background, Color::from_hex(0xff0000));
        assert_eq!(s.scene.axes_helper, Some(4.0));
        assert_eq!(s.camera.up, Vec3::Z);
        assert_eq!(s.camera.fov_degrees, 50.0);
        assert_eq!(s.camera.position, Vec3::new(10.0, 2.0, 10.0));
        assert!(!s.controls.damping);
        assert_eq!(s.controls.damping_factor, 0.5);
        assert_eq!(s.animate.fps(), 60.0);
    }

    #[test]
    fn axes_helper_size_defaults_when_enabled() {
        let config =
            WorldConfig::from_json_str(r#"{"renderer":{"containerId":"app"},"scene":{"axesHelper":true}}"#)
                .unwrap();
        assert_eq!(config.resolve().unwrap().scene.axes_helper, Some(10.0));
    }

    #[test]
    fn yaml_and_controller_alias() {
        let config = WorldConfig::from_yaml_str(
            "renderer:\n  containerId: app\ncontroller:\n  dampingFactor: 0.1\nscene:\n  gridHelper: true\n",
        )
        .unwrap();
        let s = config.resolve().unwrap();
        assert_eq!(s.controls.damping_factor, 0.1);
        assert_eq!(
            s.scene.grid_helper,
            Some(GridHelperSettings {
                size: 10.0,
                divisions: 10
            })
        );
    }

    #[test]
    fn missing_container_id_is_a_parse_error() {
        assert!(WorldConfig::from_json_str(r#"{"renderer":{}}"#).is_err());
        assert!(WorldConfig::from_json_str("{}").is_err());
    }

    #[test]
    fn empty_container_id_is_rejected() {
        let err = WorldConfig::new("  ").resolve().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyContainerId));
    }

    #[test]
    fn non_positive_fps_is_rejected() {
        for fps in [0.0, -5.0, f64::NAN, f64::INFINITY, 1e-20] {
            let mut config = WorldConfig::new("app");
            config.animate = Some(AnimateConfig { fps: Some(fps) });
            assert!(matches!(
                config.resolve(),
                Err(ConfigError::InvalidFrameRate(_))
            ));
        }
    }

    #[test]
    fn interval_is_reciprocal_of_fps() {
        let animate = AnimateSettings::new(30.0).unwrap();
        let expected = Duration::from_secs_f64(1.0 / 30.0);
        assert_eq!(animate.interval(), expected);
        assert_eq!(AnimateSettings::default(), animate);
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "renderer:\n  containerId: app\nanimate:\n  fps: 24").unwrap();
        let config = WorldConfig::load(&path).unwrap();
        assert_eq!(config.resolve().unwrap().animate.fps(), 24.0);

        let bad = dir.path().join("world.toml");
        std::fs::write(&bad, "").unwrap();
        assert!(matches!(
            WorldConfig::load(&bad),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
