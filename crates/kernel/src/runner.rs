use crate::animation::{AnimationFrame, AnimationId, AnimationResult, Stage};
use crate::host::{FrameRequest, FrameScheduler, ResizeListener};
use crate::world::World;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wavescape_common::Viewport;
use wavescape_input::ControlInput;
use wavescape_render::RenderSurface;

struct LoopState {
    scheduler: Rc<dyn FrameScheduler>,
    running: Cell<bool>,
    pending: Cell<Option<FrameRequest>>,
}

/// Shared handle to a running [`World`] and its frame loop.
///
/// Each iteration reposts itself to the host scheduler before doing any
/// frame work. The scheduled callback holds a strong reference, so the world
/// stays alive until [`stop`](WorldHandle::stop) cancels the pending frame.
pub struct WorldHandle<S: RenderSurface + 'static> {
    world: Rc<RefCell<World<S>>>,
    state: Rc<LoopState>,
}

impl<S: RenderSurface + 'static> Clone for WorldHandle<S> {
    fn clone(&self) -> Self {
        Self {
            world: self.world.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S: RenderSurface + 'static> WorldHandle<S> {
    /// Wrap `world` without starting the loop.
    pub fn new(world: World<S>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            world: Rc::new(RefCell::new(world)),
            state: Rc::new(LoopState {
                scheduler,
                running: Cell::new(false),
                pending: Cell::new(None),
            }),
        }
    }

    /// Schedule the first iteration. No-op while already running.
    pub fn start(&self) {
        if self.state.running.replace(true) {
            return;
        }
        self.request_next();
    }

    /// Cancel the pending iteration and end the loop. Safe to call from
    /// inside an animation callback.
    pub fn stop(&self) {
        if !self.state.running.replace(false) {
            return;
        }
        if let Some(request) = self.state.pending.take() {
            self.state.scheduler.cancel_frame(request);
        }
        tracing::debug!("world loop stopped");
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Run `f` with exclusive access to the world.
    ///
    /// # Panics
    /// If the world is already borrowed, e.g. when called from an animation
    /// callback. Callbacks get scene access through their [`AnimationFrame`].
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World<S>) -> R) -> R {
        f(&mut self.world.borrow_mut())
    }

    /// Register a per-frame callback. See [`Stage::add_animation`].
    pub fn add_animation<F>(&self, animation: F) -> AnimationId
    where
        F: FnMut(&mut AnimationFrame<'_>) -> AnimationResult + 'static,
    {
        self.with_world(|world| world.add_animation(animation))
    }

    /// Apply a viewport change. Dropped with a warning if it arrives while a
    /// frame holds the world.
    pub fn resize(&self, viewport: Viewport) {
        match self.world.try_borrow_mut() {
            Ok(mut world) => world.resize(viewport),
            Err(_) => tracing::warn!("resize to {viewport} arrived during a frame; ignored"),
        }
    }

    pub fn handle_input(&self, input: ControlInput) {
        match self.world.try_borrow_mut() {
            Ok(mut world) => world.handle_input(input),
            Err(_) => tracing::warn!("input {input:?} arrived during a frame; ignored"),
        }
    }

    /// Listener suitable for [`Host::listen_resize`](crate::Host::listen_resize).
    /// Holds only a weak reference to the world.
    pub fn resize_listener(&self) -> ResizeListener {
        let world = Rc::downgrade(&self.world);
        Box::new(move |viewport, ratio| {
            let Some(world) = world.upgrade() else {
                return;
            };
            match world.try_borrow_mut() {
                Ok(mut world) => {
                    world.set_pixel_ratio(ratio);
                    world.resize(viewport);
                }
                Err(_) => tracing::warn!("resize to {viewport} arrived during a frame; ignored"),
            };
        })
    }

    fn request_next(&self) {
        let next = self.clone();
        let request = self.state.scheduler.request_frame(Box::new(move || next.run_frame()));
        self.state.pending.set(Some(request));
    }

    fn run_frame(&self) {
        self.state.pending.set(None);
        if !self.state.running.get() {
            return;
        }
        let Ok(mut world) = self.world.try_borrow_mut() else {
            tracing::warn!("world busy at frame time; skipping iteration");
            self.request_next();
            return;
        };
        world.update_controls();
        self.request_next();
        world.advance();
    }
}

impl<S: RenderSurface + 'static> std::fmt::Debug for WorldHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldHandle")
            .field("running", &self.state.running.get())
            .field("pending", &self.state.pending.get())
            .finish_non_exhaustive()
    }
}
