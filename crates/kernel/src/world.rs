use crate::animation::{AnimationFrame, AnimationId, AnimationRegistry, AnimationResult, Stage};
use crate::clock::Clock;
use crate::error::WorldError;
use crate::host::Host;
use crate::runner::WorldHandle;
use crate::surface::build_surface;
use crate::throttle::FrameThrottle;
use wavescape_common::{Viewport, WorldConfig, WorldSettings};
use wavescape_input::{ControlInput, OrbitControls};
use wavescape_render::{PerspectiveCamera, RenderSurface, SceneGraph};

/// Counters for everything the loop has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Loop iterations, rendered or not.
    pub iterations: u64,
    /// Iterations that ran the callbacks and the render step.
    pub rendered: u64,
    /// Iterations skipped because the frame interval had not passed.
    pub throttled: u64,
    pub callback_failures: u64,
    pub render_failures: u64,
}

/// What one call to [`World::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    Throttled,
}

/// The scene orchestrator.
///
/// Owns the camera, rendering surface, scene graph, controller, clock and
/// callback registry. Only the loop and the resize handler mutate the camera
/// and the surface; content reaches the scene through [`Stage`].
pub struct World<S: RenderSurface> {
    settings: WorldSettings,
    clock: Clock,
    throttle: FrameThrottle,
    camera: PerspectiveCamera,
    surface: S,
    scene: SceneGraph,
    controls: OrbitControls,
    animations: AnimationRegistry,
    stats: FrameStats,
}

impl<S: RenderSurface + 'static> World<S> {
    /// Assemble a world and start its loop on `host`.
    ///
    /// Resolves the configuration, builds camera, surface, scene and
    /// controller in that order, registers the resize listener and schedules
    /// the first frame. Fails without side effects on the loop if the
    /// configured container does not exist.
    pub fn launch<H>(config: &WorldConfig, host: &mut H) -> Result<WorldHandle<S>, WorldError>
    where
        H: Host<Surface = S>,
    {
        let settings = config.resolve()?;
        let world = Self::new(&settings, host)?;
        let handle = WorldHandle::new(world, host.scheduler());
        host.listen_resize(handle.resize_listener())?;
        handle.start();
        tracing::info!(
            "world launched in #{} at {} fps",
            settings.renderer.container_id,
            settings.animate.fps()
        );
        Ok(handle)
    }
}

impl<S: RenderSurface> World<S> {
    /// Build the world's parts without listening for resizes or scheduling
    /// frames. Drive it with [`iterate`](World::iterate).
    pub fn new<H>(settings: &WorldSettings, host: &mut H) -> Result<Self, WorldError>
    where
        H: Host<Surface = S>,
    {
        let viewport = host.viewport();
        let camera = PerspectiveCamera::from_settings(&settings.camera, viewport.aspect());
        let surface = build_surface(&settings.renderer, host)?;
        let scene = SceneGraph::from_settings(&settings.scene);
        let controls = OrbitControls::from_settings(&settings.controls, &camera);
        let throttle = FrameThrottle::new(settings.animate.interval());
        tracing::debug!("frame interval {:?}", throttle.interval());
        Ok(Self {
            settings: settings.clone(),
            clock: Clock::start(host.time_source()),
            throttle,
            camera,
            surface,
            scene,
            controls,
            animations: AnimationRegistry::new(),
            stats: FrameStats::default(),
        })
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access, for backend-specific toggles. Resizing goes
    /// through [`resize`](World::resize).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn throttle(&self) -> &FrameThrottle {
        &self.throttle
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Step the controller. Runs every iteration so damping keeps moving
    /// the camera between rendered frames.
    pub fn update_controls(&mut self) -> bool {
        self.controls.update(&mut self.camera)
    }

    /// Accumulate real time and, once a frame is due, run the callbacks and
    /// render.
    pub fn advance(&mut self) -> FrameOutcome {
        self.stats.iterations += 1;
        let delta = self.clock.delta();
        if !self.throttle.accumulate(delta) {
            self.stats.throttled += 1;
            return FrameOutcome::Throttled;
        }

        let elapsed = self.clock.elapsed();
        let report = self.animations.run(elapsed, &mut self.scene);
        self.stats.callback_failures += report.failed as u64;

        if let Err(e) = self.surface.render(&self.scene, &self.camera) {
            self.stats.render_failures += 1;
            tracing::error!("render failed: {e}");
        }
        self.throttle.consume();
        self.stats.rendered += 1;
        tracing::trace!(
            "frame {} at {:.3}s, carried {:?}",
            self.stats.rendered,
            elapsed.as_secs_f64(),
            self.throttle.accumulated()
        );
        FrameOutcome::Rendered
    }

    /// One full loop iteration without scheduling: controls, then the
    /// throttled frame.
    pub fn iterate(&mut self) -> FrameOutcome {
        self.update_controls();
        self.advance()
    }

    /// Match camera aspect and surface size to `viewport`.
    pub fn resize(&mut self, viewport: Viewport) {
        let aspect = viewport.aspect();
        if self.surface.size() == viewport && self.camera.aspect == aspect {
            return;
        }
        self.camera.set_aspect(aspect);
        self.surface.set_size(viewport);
        tracing::debug!("resized to {viewport} (aspect {aspect:.3})");
    }

    /// Follow a change in the display's device pixel ratio, e.g. after the
    /// window moves to another monitor.
    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        if self.surface.pixel_ratio() == ratio {
            return;
        }
        self.surface.set_pixel_ratio(ratio);
        tracing::debug!("pixel ratio now {ratio}");
    }

    /// Feed a pointer manipulation to the controller. Takes effect on the
    /// next [`update_controls`](World::update_controls).
    pub fn handle_input(&mut self, input: ControlInput) {
        let element = self.surface.size();
        self.controls.handle_input(input, &self.camera, element);
    }
}

impl<S: RenderSurface> Stage for World<S> {
    fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    fn add_animation<F>(&mut self, animation: F) -> AnimationId
    where
        F: FnMut(&mut AnimationFrame<'_>) -> AnimationResult + 'static,
    {
        self.animations.add(animation)
    }
}

impl<S: RenderSurface> std::fmt::Debug for World<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("clock", &self.clock)
            .field("throttle", &self.throttle)
            .field("camera", &self.camera)
            .field("scene_nodes", &self.scene.len())
            .field("animations", &self.animations)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
