//! Shared types and the declarative configuration record for wavescape.
//!
//! # Invariants
//! - A configuration is resolved exactly once; consumers only read settings.

pub mod config;
pub mod types;

pub use config::{
    AnimateSettings, CameraSettings, ConfigError, ControlSettings, GridHelperSettings,
    RendererSettings, SceneSettings, WorldConfig, WorldSettings,
};
pub use types::{Color, ColorParseError, Transform, Viewport};
