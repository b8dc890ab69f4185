use wavescape_common::WorldConfig;
use wavescape_common::config::SceneConfig;

/// Configuration used when the page supplies only a container id: every
/// default, with the axes helper shown.
pub fn default_page_config(container_id: impl Into<String>) -> WorldConfig {
    WorldConfig {
        scene: Some(SceneConfig {
            axes_helper: Some(true),
            ..SceneConfig::default()
        }),
        ..WorldConfig::new(container_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_default_shows_axes() {
        let settings = default_page_config("app").resolve().unwrap();
        assert_eq!(settings.renderer.container_id, "app");
        assert_eq!(settings.scene.axes_helper, Some(10.0));
        assert_eq!(settings.scene.grid_helper, None);
        assert_eq!(settings.animate.fps(), 30.0);
    }
}
