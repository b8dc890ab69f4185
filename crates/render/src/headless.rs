use crate::camera::PerspectiveCamera;
use crate::draw::DrawList;
use crate::scene::SceneGraph;
use crate::surface::{RenderError, RenderSurface, ShadowMap};
use std::fmt::Write;
use wavescape_common::Viewport;

/// Surface that draws into memory instead of a GPU.
///
/// Flattens each frame into a [`DrawList`] and keeps a human-readable
/// summary of the last one. Useful for the CLI, logging and tests.
#[derive(Debug)]
pub struct HeadlessSurface {
    size: Viewport,
    pixel_ratio: f64,
    shadow_map: ShadowMap,
    antialias: bool,
    frames: u64,
    draw_list: DrawList,
    summary: String,
    failing: bool,
}

impl HeadlessSurface {
    pub fn new(antialias: bool) -> Self {
        Self {
            size: Viewport::new(1, 1),
            pixel_ratio: 1.0,
            shadow_map: ShadowMap::default(),
            antialias,
            frames: 0,
            draw_list: DrawList::default(),
            summary: String::new(),
            failing: false,
        }
    }

    pub fn antialias(&self) -> bool {
        self.antialias
    }

    /// Number of frames rendered successfully.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Primitives of the last rendered frame.
    pub fn last_frame(&self) -> &DrawList {
        &self.draw_list
    }

    /// Text description of the last rendered frame.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Make every following render fail, to exercise error paths.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl RenderSurface for HeadlessSurface {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_size(&mut self, size: Viewport) {
        self.size = size;
    }

    fn size(&self) -> Viewport {
        self.size
    }

    fn set_shadow_map(&mut self, shadow_map: ShadowMap) {
        self.shadow_map = shadow_map;
    }

    fn shadow_map(&self) -> ShadowMap {
        self.shadow_map
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        if self.failing {
            return Err(RenderError::Backend("headless surface set to fail".into()));
        }
        self.draw_list.rebuild(scene);
        self.frames += 1;

        let eye = camera.position;
        let target = camera.target();
        self.summary.clear();
        let _ = writeln!(
            self.summary,
            "=== Frame {} ({} @{}x) ===",
            self.frames, self.size, self.pixel_ratio
        );
        let _ = writeln!(self.summary, "Background: {}", scene.background());
        let _ = writeln!(
            self.summary,
            "Nodes: {}  Segments: {}  Triangles: {}",
            scene.len(),
            self.draw_list.segment_count(),
            self.draw_list.triangle_count()
        );
        let _ = writeln!(
            self.summary,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            eye.x, eye.y, eye.z, target.x, target.y, target.z, camera.fov_degrees, camera.aspect
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use wavescape_common::{CameraSettings, Color};

    #[test]
    fn headless_renders_empty_scene() {
        let scene = SceneGraph::new(Color::from_hex(0x202020));
        let camera = PerspectiveCamera::from_settings(&CameraSettings::default(), 1.0);
        let mut surface = HeadlessSurface::new(true);
        surface.set_size(Viewport::new(800, 600));
        surface.render(&scene, &camera).unwrap();

        assert_eq!(surface.frames(), 1);
        assert!(surface.summary().contains("Frame 1 (800x600"));
        assert!(surface.summary().contains("Background: #202020"));
        assert!(surface.summary().contains("fov=75"));
    }

    #[test]
    fn headless_counts_primitives() {
        let mut scene = SceneGraph::new(Color::BLACK);
        scene.add(Node::axes_helper(1.0));
        let camera = PerspectiveCamera::from_settings(&CameraSettings::default(), 1.0);
        let mut surface = HeadlessSurface::new(false);
        surface.render(&scene, &camera).unwrap();
        assert_eq!(surface.last_frame().segment_count(), 3);
        assert!(surface.summary().contains("Segments: 3"));
    }

    #[test]
    fn physical_size_scales_with_pixel_ratio() {
        let mut surface = HeadlessSurface::new(true);
        surface.set_pixel_ratio(2.0);
        surface.set_size(Viewport::new(640, 480));
        assert_eq!(surface.size(), Viewport::new(640, 480));
        assert_eq!(surface.physical_size(), Viewport::new(1280, 960));
    }

    #[test]
    fn failing_surface_reports_error() {
        let scene = SceneGraph::new(Color::BLACK);
        let camera = PerspectiveCamera::from_settings(&CameraSettings::default(), 1.0);
        let mut surface = HeadlessSurface::new(true);
        surface.set_failing(true);
        assert!(surface.render(&scene, &camera).is_err());
        assert_eq!(surface.frames(), 0);
    }
}
