use crate::action::ControlInput;
use glam::{Quat, Vec2, Vec3};
use std::f32::consts::{PI, TAU};
use wavescape_common::{ControlSettings, Viewport};
use wavescape_render::PerspectiveCamera;

const EPS: f32 = 1e-6;

/// Spherical coordinates around the +Y axis: `theta` is the azimuth from +Z,
/// `phi` the polar angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_vec(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_vec(self) -> Vec3 {
        let ring = self.phi.sin() * self.radius;
        Vec3::new(ring * self.theta.sin(), self.phi.cos() * self.radius, ring * self.theta.cos())
    }
}

/// Orbit-style camera controller.
///
/// Keeps the camera on a sphere around a target point. Input accumulates
/// rotation, pan and zoom deltas; [`update`](OrbitControls::update) applies
/// them. With damping enabled only a `damping_factor` share of the pending
/// motion is applied per update and the rest decays over later updates, so
/// `update` has to run every loop iteration, not only on rendered frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// Pan in screen space instead of the plane orthogonal to the camera up.
    pub screen_space_panning: bool,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    target: Vec3,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            screen_space_panning: true,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            target: camera.target(),
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    /// Build the controller for `camera` from resolved settings.
    /// Screen-space panning is always off.
    pub fn from_settings(settings: &ControlSettings, camera: &PerspectiveCamera) -> Self {
        let mut controls = Self::new(camera);
        controls.enable_damping = settings.damping;
        controls.damping_factor = settings.damping_factor;
        controls.screen_space_panning = false;
        tracing::debug!(
            "orbit controls damping={} factor={}",
            settings.damping,
            settings.damping_factor
        );
        controls
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// True while damped motion is still decaying.
    pub fn is_settling(&self) -> bool {
        self.spherical_delta.theta.abs() > EPS
            || self.spherical_delta.phi.abs() > EPS
            || self.pan_offset.length_squared() > EPS * EPS
            || (self.scale - 1.0).abs() > EPS
    }

    /// Queue a manipulation. `viewport` is the size of the input element.
    pub fn handle_input(&mut self, input: ControlInput, camera: &PerspectiveCamera, viewport: Viewport) {
        let height = viewport.height.max(1) as f32;
        match input {
            ControlInput::Rotate(delta) => {
                self.rotate_left(TAU * delta.x / height * self.rotate_speed);
                self.rotate_up(TAU * delta.y / height * self.rotate_speed);
            }
            ControlInput::Pan(delta) => self.pan(delta * self.pan_speed, camera, height),
            ControlInput::Dolly(steps) => {
                self.scale *= self.zoom_scale().powf(-steps);
            }
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera, height: f32) {
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov_degrees.to_radians() / 2.0).tan();
        let camera_matrix = camera.view_matrix().inverse();
        let right = camera_matrix.x_axis.truncate();

        let left = right * -(2.0 * delta.x * target_distance / height);
        let up_axis = if self.screen_space_panning {
            camera_matrix.y_axis.truncate()
        } else {
            camera.up.cross(right)
        };
        let up = up_axis * (2.0 * delta.y * target_distance / height);
        self.pan_offset += left + up;
    }

    /// Apply pending motion to `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let up = camera.up.try_normalize().unwrap_or(Vec3::Y);
        let to_y_up = Quat::from_rotation_arc(up, Vec3::Y);
        let from_y_up = to_y_up.inverse();

        let offset = to_y_up * (camera.position - self.target);
        let mut spherical = Spherical::from_vec(offset);

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        spherical.phi = spherical.phi.clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * step;

        let position = self.target + from_y_up * spherical.to_vec();
        let moved = position.distance_squared(camera.position) > EPS;
        camera.position = position;
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
        moved
    }
}
