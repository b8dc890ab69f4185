use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wavescape_common::config::{AnimateConfig, CameraConfig, SceneConfig};
use wavescape_common::{Color, Viewport, WorldConfig};
use wavescape_kernel::{
    AnimationError, AnimationFrame, HeadlessHost, Stage, World, WorldError, WorldHandle,
};
use wavescape_render::{HeadlessSurface, RenderSurface, ShadowFilter};

const REFRESH: f64 = 1.0 / 60.0;

fn host() -> HeadlessHost {
    HeadlessHost::new()
        .with_container("app")
        .with_viewport(Viewport::new(800, 600))
        .with_pixel_ratio(2.0)
}

fn launch(config: &WorldConfig, host: &mut HeadlessHost) -> WorldHandle<HeadlessSurface> {
    World::launch(config, host).unwrap()
}

fn refresh(host: &HeadlessHost, times: usize) {
    for _ in 0..times {
        host.step(Duration::from_secs_f64(REFRESH));
    }
}

#[test]
fn omitted_sections_resolve_to_defaults() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    world.with_world(|w| {
        let camera = w.camera();
        assert_eq!(camera.fov_degrees, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position, glam::Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(camera.up, glam::Vec3::Y);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);

        let surface = w.surface();
        assert!(surface.antialias());
        assert_eq!(surface.size(), Viewport::new(800, 600));
        assert_eq!(surface.pixel_ratio(), 2.0);
        assert!(surface.shadow_map().enabled);
        assert_eq!(surface.shadow_map().filter, ShadowFilter::PcfSoft);

        assert_eq!(w.scene().background(), Color::from_hex(0x202020));
        assert_eq!(w.scene().len(), 1);

        assert!(w.controls().enable_damping);
        assert_eq!(w.controls().damping_factor, 0.2);
        assert!(!w.controls().screen_space_panning);

        assert_eq!(w.throttle().interval(), Duration::from_secs_f64(1.0 / 30.0));
    });
    assert!(world.is_running());
    assert_eq!(host.mounted(), ["app".to_string()]);
    assert_eq!(host.resize_listener_count(), 1);
}

#[test]
fn configured_sections_override_defaults() {
    let config = WorldConfig {
        scene: Some(SceneConfig {
            background_color: Some(Color::from_hex(0x112233)),
            axes_helper: Some(true),
            grid_helper: Some(true),
            ..Default::default()
        }),
        camera: Some(CameraConfig {
            z_axis_up: Some(true),
            fov: Some(50.0),
            ..Default::default()
        }),
        animate: Some(AnimateConfig { fps: Some(60.0) }),
        ..WorldConfig::new("app")
    };
    let mut host = host();
    let world = launch(&config, &mut host);
    world.with_world(|w| {
        assert_eq!(w.scene().background(), Color::from_hex(0x112233));
        assert_eq!(w.scene().len(), 3);
        assert_eq!(w.camera().up, glam::Vec3::Z);
        assert_eq!(w.camera().fov_degrees, 50.0);
        assert_eq!(w.throttle().interval(), Duration::from_secs_f64(1.0 / 60.0));
    });
}

#[test]
fn missing_container_fails_construction() {
    let mut host = HeadlessHost::new().with_container("other");
    let err = World::launch(&WorldConfig::new("app"), &mut host).unwrap_err();
    assert!(matches!(err, WorldError::ContainerNotFound(ref id) if id == "app"));
    assert!(host.mounted().is_empty());
    assert_eq!(host.resize_listener_count(), 0);
    assert_eq!(host.scheduler_handle().pending(), 0);
}

#[test]
fn invalid_frame_rate_is_a_config_error() {
    // 1e-20 fps is positive but its interval overflows a Duration
    for fps in [0.0, 1e-20] {
        let config = WorldConfig {
            animate: Some(AnimateConfig { fps: Some(fps) }),
            ..WorldConfig::new("app")
        };
        let mut host = host();
        let err = World::launch(&config, &mut host).unwrap_err();
        assert!(matches!(err, WorldError::Config(_)));
        assert_eq!(host.scheduler_handle().pending(), 0);
    }
}

#[test]
fn resize_keeps_aspect_and_surface_in_step() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    for viewport in [
        Viewport::new(1024, 768),
        Viewport::new(333, 1000),
        Viewport::new(1920, 1080),
    ] {
        host.set_viewport(viewport);
        world.with_world(|w| {
            let expected = viewport.width as f32 / viewport.height as f32;
            assert!((w.camera().aspect - expected).abs() < 1e-6);
            assert_eq!(w.surface().size(), viewport);
            assert_eq!(
                w.surface().physical_size(),
                Viewport::new(viewport.width * 2, viewport.height * 2)
            );
        });
    }
}

#[test]
fn moving_to_a_denser_display_rescales_the_surface() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    host.set_pixel_ratio(3.0);
    world.with_world(|w| {
        assert_eq!(w.surface().pixel_ratio(), 3.0);
        assert_eq!(w.surface().size(), Viewport::new(800, 600));
        assert_eq!(w.surface().physical_size(), Viewport::new(2400, 1800));
    });
}

#[test]
fn identical_resizes_match_a_single_one() {
    let mut once_host = host();
    let once = launch(&WorldConfig::new("app"), &mut once_host);
    once_host.set_viewport(Viewport::new(500, 250));

    let mut twice_host = host();
    let twice = launch(&WorldConfig::new("app"), &mut twice_host);
    twice_host.set_viewport(Viewport::new(500, 250));
    twice_host.set_viewport(Viewport::new(500, 250));

    let state = |h: &WorldHandle<HeadlessSurface>| {
        h.with_world(|w| (w.camera().clone(), w.surface().size(), w.surface().physical_size()))
    };
    assert_eq!(state(&once), state(&twice));
}

#[test]
fn renders_follow_the_accumulator() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    let deltas_ms = [5u64, 20, 12, 33, 30, 1, 25, 16, 16, 16, 9, 31, 3, 21];
    let mut total = Duration::ZERO;
    for ms in deltas_ms {
        let delta = Duration::from_millis(ms);
        total += delta;
        host.step(delta);
    }
    let interval = Duration::from_secs_f64(1.0 / 30.0);
    let expected = (total.as_nanos() / interval.as_nanos()) as i64;
    world.with_world(|w| {
        let stats = w.stats();
        assert_eq!(stats.iterations, deltas_ms.len() as u64);
        assert_eq!(stats.rendered + stats.throttled, stats.iterations);
        assert!((stats.rendered as i64 - expected).abs() <= 1, "{stats:?}");
        assert!(w.throttle().accumulated() <= interval);
        assert_eq!(w.surface().frames(), stats.rendered);
    });
}

#[test]
fn callbacks_run_in_order_with_the_same_elapsed() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in ["A", "B", "C"] {
        let log = log.clone();
        world.add_animation(move |frame: &mut AnimationFrame<'_>| {
            log.borrow_mut().push((name, frame.elapsed()));
            Ok(())
        });
    }
    host.step(Duration::from_millis(40));

    let log = log.borrow();
    let names: Vec<_> = log.iter().map(|(n, _)| *n).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert!(log.iter().all(|(_, t)| *t == log[0].1));
    assert!((log[0].1 - 0.040).abs() < 1e-9);
}

#[test]
fn throttled_iterations_skip_callbacks_but_update_controls() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    world.add_animation(move |_: &mut AnimationFrame<'_>| {
        *counter.borrow_mut() += 1;
        Ok(())
    });
    world.handle_input(wavescape_input::ControlInput::Rotate(glam::Vec2::new(60.0, 0.0)));
    let before = world.with_world(|w| w.camera().position);
    host.step(Duration::from_millis(10));
    assert_eq!(*calls.borrow(), 0);
    let after_one = world.with_world(|w| w.camera().position);
    assert_ne!(before, after_one);

    host.step(Duration::from_millis(10));
    assert_eq!(*calls.borrow(), 0);
    assert_ne!(after_one, world.with_world(|w| w.camera().position));
}

#[test]
fn callback_added_mid_frame_starts_next_frame() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    let late_calls = Rc::new(RefCell::new(Vec::new()));
    let late = late_calls.clone();
    let mut registered = false;
    world.add_animation(move |frame: &mut AnimationFrame<'_>| {
        if !registered {
            registered = true;
            let late = late.clone();
            frame.add_animation(move |frame: &mut AnimationFrame<'_>| {
                late.borrow_mut().push(frame.elapsed());
                Ok(())
            });
        }
        Ok(())
    });

    host.step(Duration::from_millis(40));
    assert!(late_calls.borrow().is_empty());
    assert_eq!(world.with_world(|w| w.animation_count()), 2);

    host.step(Duration::from_millis(40));
    assert_eq!(late_calls.borrow().len(), 1);
}

#[test]
fn failing_callback_is_isolated() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    let after = Rc::new(RefCell::new(0));
    world.add_animation(|_: &mut AnimationFrame<'_>| Err(AnimationError::Failed("broken wave".into())));
    let counter = after.clone();
    world.add_animation(move |_: &mut AnimationFrame<'_>| {
        *counter.borrow_mut() += 1;
        Ok(())
    });
    host.step(Duration::from_millis(40));
    host.step(Duration::from_millis(40));

    assert_eq!(*after.borrow(), 2);
    world.with_world(|w| {
        assert_eq!(w.stats().callback_failures, 2);
        assert_eq!(w.surface().frames(), 2);
    });
    assert!(world.is_running());
}

#[test]
fn render_failure_is_counted_and_loop_continues() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    world.with_world(|w| w.surface_mut().set_failing(true));
    host.step(Duration::from_millis(40));
    world.with_world(|w| w.surface_mut().set_failing(false));
    host.step(Duration::from_millis(40));

    world.with_world(|w| {
        assert_eq!(w.stats().render_failures, 1);
        assert_eq!(w.stats().rendered, 2);
        assert_eq!(w.surface().frames(), 1);
    });
    assert_eq!(host.scheduler_handle().pending(), 1);
}

#[test]
fn stop_cancels_the_pending_frame() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    refresh(&host, 3);
    assert_eq!(host.scheduler_handle().pending(), 1);

    world.stop();
    assert!(!world.is_running());
    assert_eq!(host.scheduler_handle().pending(), 0);
    assert_eq!(host.step(Duration::from_secs(1)), 0);
    assert_eq!(world.with_world(|w| w.stats().iterations), 3);

    world.start();
    assert!(world.is_running());
    host.step(Duration::from_millis(10));
    assert_eq!(world.with_world(|w| w.stats().iterations), 4);
}

#[test]
fn stop_from_inside_a_callback() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    let handle = world.clone();
    world.add_animation(move |_: &mut AnimationFrame<'_>| {
        handle.stop();
        Ok(())
    });
    host.step(Duration::from_millis(40));
    assert!(!world.is_running());
    assert_eq!(host.scheduler_handle().pending(), 0);
}

#[test]
fn resize_during_a_frame_is_ignored_without_panicking() {
    let mut host = host();
    let world = launch(&WorldConfig::new("app"), &mut host);
    let handle = world.clone();
    world.add_animation(move |_: &mut AnimationFrame<'_>| {
        handle.resize(Viewport::new(10, 10));
        Ok(())
    });
    host.step(Duration::from_millis(40));
    world.with_world(|w| assert_eq!(w.surface().size(), Viewport::new(800, 600)));
}

#[test]
fn thirty_fps_over_one_second_at_sixty_hertz() {
    let config = WorldConfig {
        animate: Some(AnimateConfig { fps: Some(30.0) }),
        ..WorldConfig::new("app")
    };
    let mut host = host();
    let world = launch(&config, &mut host);

    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));
    for log in [first.clone(), second.clone()] {
        world.add_animation(move |frame: &mut AnimationFrame<'_>| {
            log.borrow_mut().push(frame.elapsed());
            Ok(())
        });
    }

    refresh(&host, 60);

    let rendered = world.with_world(|w| w.surface().frames());
    assert!((29..=31).contains(&rendered), "rendered {rendered} frames");
    let first = first.borrow();
    let second = second.borrow();
    assert_eq!(first.len() as u64, rendered);
    assert_eq!(*first, *second);
    assert!(first.windows(2).all(|w| w[1] > w[0]));
}
