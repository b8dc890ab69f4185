use glam::{Mat4, Vec3};
use wavescape_common::CameraSettings;

/// Perspective projection camera.
///
/// Owned by the orchestrator. Its aspect ratio only changes through a
/// viewport resize; position and orientation are driven by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub up: Vec3,
    target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_degrees,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            up: Vec3::Y,
            target: Vec3::NEG_Z,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Build the camera described by `settings`, looking at the origin.
    ///
    /// Numeric settings are used as given; nonsensical clip planes or field
    /// of view are the caller's responsibility.
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        let mut camera = Self::new(settings.fov_degrees, aspect, settings.near, settings.far);
        camera.up = settings.up;
        camera.position = settings.position;
        camera.look_at(Vec3::ZERO);
        tracing::debug!(
            "camera fov={} aspect={aspect:.3} position={:?}",
            settings.fov_degrees,
            settings.position
        );
        camera
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Change the aspect ratio and refresh the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Recompute the projection after fov, aspect or clip planes change.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_camera() {
        let cam = PerspectiveCamera::from_settings(&CameraSettings::default(), 16.0 / 9.0);
        assert_eq!(cam.fov_degrees, 75.0);
        assert_eq!(cam.near, 0.1);
        assert_eq!(cam.far, 1000.0);
        assert_eq!(cam.position, Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(cam.up, Vec3::Y);
        assert_eq!(cam.target(), Vec3::ZERO);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = PerspectiveCamera::from_settings(&CameraSettings::default(), 1.5);
        let clip = cam.view_projection().project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
    }

    #[test]
    fn z_up_setting_is_applied() {
        let settings = CameraSettings {
            up: Vec3::Z,
            ..CameraSettings::default()
        };
        let cam = PerspectiveCamera::from_settings(&settings, 1.0);
        assert_eq!(cam.up, Vec3::Z);
    }

    #[test]
    fn set_aspect_refreshes_projection() {
        let mut cam = PerspectiveCamera::from_settings(&CameraSettings::default(), 1.0);
        let before = cam.projection_matrix();
        cam.set_aspect(2.0);
        assert_eq!(cam.aspect, 2.0);
        assert_ne!(cam.projection_matrix(), before);
        let expected = Mat4::perspective_rh(75.0_f32.to_radians(), 2.0, 0.1, 1000.0);
        assert_eq!(cam.projection_matrix(), expected);
    }
}
