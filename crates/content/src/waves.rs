use crate::fence::{Fence, FenceOptions};
use crate::points::linear_points;
use crate::wave::Wave;
use glam::Vec3;
use std::f32::consts::PI;
use wavescape_common::{Color, Transform};
use wavescape_kernel::{AnimationFrame, AnimationId, Stage};
use wavescape_render::{LineMaterial, MeshMaterial, Node, NodeId, SceneError};

pub const WAVE_LENGTH: f32 = 10.0;
pub const WAVE_STEP: f32 = 0.1;
pub const WAVE_COLOR: Color = Color::from_hex(0x448aff);
pub const FENCE_COLOR: Color = Color::from_hex(0xaaaaaa);
pub const FENCE_OPACITY: f32 = 0.7;

/// Wave phase at `elapsed` seconds.
pub fn wave_angle(elapsed: f64) -> f32 {
    (-elapsed * 2.0) as f32
}

/// Height of a wave vertex at `x` for the given phase.
pub fn wave_height(angle: f32, x: f32) -> f32 {
    (angle + PI * x).sin()
}

/// Nodes and the animation added by [`Waves::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waves {
    pub entry: Wave,
    pub exit: Wave,
    pub fence: Fence,
    pub grid: NodeId,
    pub animation: AnimationId,
}

impl Waves {
    /// Populate `stage` with the two travelling waves, the fence behind them
    /// and a floor grid, and register the wave motion.
    ///
    /// The entry wave (x in [-10, 0]) twists about X at half the wave phase;
    /// the exit wave (x in [0, 10]) stays flat but its amplitude shrinks by
    /// the cosine of that twist, as if seen through the fence.
    pub fn load(stage: &mut impl Stage) -> Result<Self, SceneError> {
        let mut entry_points = linear_points(-WAVE_LENGTH, 0.0, WAVE_STEP);
        let mut exit_points = linear_points(0.0, WAVE_LENGTH, WAVE_STEP);
        let material = LineMaterial { color: WAVE_COLOR };

        let scene = stage.scene_mut();
        let entry = Wave::spawn(scene, "entry-wave", &entry_points, material);
        let exit = Wave::spawn(scene, "exit-wave", &exit_points, material);

        let fence = Fence::spawn(
            scene,
            &FenceOptions::new(
                Vec3::new(0.0, 0.0, -1.0),
                MeshMaterial {
                    color: FENCE_COLOR,
                    opacity: FENCE_OPACITY,
                    transparent: true,
                },
            ),
        )?;

        let grid = scene.add(
            Node::grid_helper(10.0, 10)
                .named("floor-grid")
                .with_transform(Transform::from_position(Vec3::new(0.0, -1.0, 0.0))),
        );

        let animation = stage.add_animation(move |frame: &mut AnimationFrame<'_>| {
            let angle = wave_angle(frame.elapsed());
            let rotation = angle / 2.0;
            let scene = frame.scene_mut();

            for p in &mut entry_points {
                p.y = wave_height(angle, p.x);
            }
            entry.set_points(scene, &entry_points)?;
            entry.set_rotation_x(scene, rotation)?;

            let amplitude = rotation.cos().abs();
            for p in &mut exit_points {
                p.y = wave_height(angle, p.x) * amplitude;
            }
            exit.set_points(scene, &exit_points)?;
            Ok(())
        });

        tracing::debug!("waves loaded: {} scene nodes", stage.scene().len());
        Ok(Self {
            entry,
            exit,
            fence,
            grid,
            animation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wavescape_common::{Viewport, WorldConfig};
    use wavescape_kernel::{HeadlessHost, World};
    use wavescape_render::{HeadlessSurface, NodeKind, RenderSurface, SceneGraph};

    fn world(host: &mut HeadlessHost) -> World<HeadlessSurface> {
        let settings = WorldConfig::new("app").resolve().unwrap();
        World::new(&settings, host).unwrap()
    }

    fn line_points(scene: &SceneGraph, id: NodeId) -> Vec<Vec3> {
        match &scene.get(id).unwrap().kind {
            NodeKind::Line { geometry, .. } => geometry.points.clone(),
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn load_builds_the_layout() {
        let mut host = HeadlessHost::new().with_container("app");
        let mut world = world(&mut host);
        let waves = Waves::load(&mut world).unwrap();

        let scene = world.scene();
        assert_eq!(line_points(scene, waves.entry.node()).len(), 101);
        assert_eq!(line_points(scene, waves.exit.node()).len(), 101);
        match &scene.get(waves.entry.node()).unwrap().kind {
            NodeKind::Line { material, .. } => assert_eq!(material.color, WAVE_COLOR),
            _ => unreachable!(),
        }
        let grid = scene.get(waves.grid).unwrap();
        assert_eq!(grid.kind, NodeKind::GridHelper { size: 10.0, divisions: 10 });
        assert_eq!(grid.transform.position, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(
            scene.get(waves.fence.group()).unwrap().transform.position,
            Vec3::new(0.0, 0.0, -1.0)
        );
        assert_eq!(world.animation_count(), 1);
        assert_eq!(waves.animation.index(), 0);
    }

    #[test]
    fn waves_move_with_elapsed_time() {
        let mut host = HeadlessHost::new()
            .with_container("app")
            .with_viewport(Viewport::new(640, 480));
        let mut world = world(&mut host);
        let waves = Waves::load(&mut world).unwrap();

        host.time().advance(Duration::from_millis(500));
        world.iterate();
        let elapsed = 0.5;
        let angle = wave_angle(elapsed);
        let rotation = angle / 2.0;

        let scene = world.scene();
        let entry = line_points(scene, waves.entry.node());
        for p in &entry {
            assert!((p.y - (angle + PI * p.x).sin()).abs() < 1e-5);
        }
        let twist = scene.get(waves.entry.node()).unwrap().transform.rotation;
        let (x, y, z) = twist.to_euler(glam::EulerRot::XYZ);
        assert!((x - rotation).abs() < 1e-5 && y.abs() < 1e-5 && z.abs() < 1e-5);

        let exit = line_points(scene, waves.exit.node());
        let amplitude = rotation.cos().abs();
        for p in &exit {
            assert!((p.y - (angle + PI * p.x).sin() * amplitude).abs() < 1e-5);
        }
        assert_eq!(
            scene.get(waves.exit.node()).unwrap().transform,
            Transform::default()
        );
        assert_eq!(world.surface().frames(), 1);
    }

    #[test]
    fn exit_wave_flattens_when_entry_wave_is_edge_on() {
        let mut host = HeadlessHost::new().with_container("app");
        let mut world = world(&mut host);
        let waves = Waves::load(&mut world).unwrap();

        // rotation = -elapsed, so |cos| vanishes at elapsed = pi/2
        host.time().advance(Duration::from_secs_f64(std::f64::consts::FRAC_PI_2));
        world.iterate();
        let exit = line_points(world.scene(), waves.exit.node());
        assert!(exit.iter().all(|p| p.y.abs() < 1e-3));
    }

    #[test]
    fn rendered_frame_contains_waves_and_fence() {
        let mut host = HeadlessHost::new().with_container("app");
        let mut world = world(&mut host);
        Waves::load(&mut world).unwrap();
        host.time().advance(Duration::from_millis(40));
        world.iterate();

        let frame = world.surface().last_frame();
        assert_eq!(frame.segment_count(), 200 + 22);
        assert!(!frame.transparent_triangles.is_empty());
        assert!(frame.opaque_triangles.is_empty());
    }
}
