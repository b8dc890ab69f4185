use crate::clock::{ManualTime, TimeSource};
use crate::host::{FrameCallback, FrameRequest, FrameScheduler, Host, HostError, ResizeListener};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;
use wavescape_common::Viewport;
use wavescape_render::HeadlessSurface;

/// Scheduler whose frames only run when [`fire`](ManualScheduler::fire) is called.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: Cell<u64>,
    queue: RefCell<Vec<(FrameRequest, FrameCallback)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests waiting for the next refresh.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Simulate one display refresh: run every request made before this
    /// call. Requests made while firing wait for the next refresh.
    pub fn fire(&self) -> usize {
        let due = std::mem::take(&mut *self.queue.borrow_mut());
        let count = due.len();
        for (_, callback) in due {
            callback();
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let request = FrameRequest(id);
        self.queue.borrow_mut().push((request, callback));
        request
    }

    fn cancel_frame(&self, request: FrameRequest) {
        self.queue.borrow_mut().retain(|(r, _)| *r != request);
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Deterministic in-memory host for tests and the CLI.
///
/// Containers are plain names; time and display refreshes only advance when
/// the caller says so.
pub struct HeadlessHost {
    viewport: Cell<Viewport>,
    pixel_ratio: Cell<f64>,
    containers: BTreeSet<String>,
    mounted: Vec<String>,
    listeners: RefCell<Vec<ResizeListener>>,
    scheduler: Rc<ManualScheduler>,
    time: ManualTime,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            viewport: Cell::new(Viewport::default()),
            pixel_ratio: Cell::new(1.0),
            containers: BTreeSet::new(),
            mounted: Vec::new(),
            listeners: RefCell::new(Vec::new()),
            scheduler: Rc::new(ManualScheduler::new()),
            time: ManualTime::new(),
        }
    }

    pub fn with_container(mut self, id: impl Into<String>) -> Self {
        self.containers.insert(id.into());
        self
    }

    pub fn with_viewport(self, viewport: Viewport) -> Self {
        self.viewport.set(viewport);
        self
    }

    pub fn with_pixel_ratio(self, ratio: f64) -> Self {
        self.pixel_ratio.set(ratio);
        self
    }

    /// Containers that received a surface, in mount order.
    pub fn mounted(&self) -> &[String] {
        &self.mounted
    }

    pub fn resize_listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Change the viewport and notify every resize listener.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
        self.notify_resize();
    }

    /// Change the device pixel ratio, as when a window moves to another
    /// display, and notify every resize listener.
    pub fn set_pixel_ratio(&self, ratio: f64) {
        self.pixel_ratio.set(ratio);
        self.notify_resize();
    }

    fn notify_resize(&self) {
        let (viewport, ratio) = (self.viewport.get(), self.pixel_ratio.get());
        let mut listeners = self.listeners.take();
        for listener in &mut listeners {
            listener(viewport, ratio);
        }
        self.listeners.borrow_mut().append(&mut listeners);
    }

    pub fn time(&self) -> &ManualTime {
        &self.time
    }

    pub fn scheduler_handle(&self) -> &Rc<ManualScheduler> {
        &self.scheduler
    }

    /// Advance time by `delta` and fire one display refresh.
    pub fn step(&self, delta: Duration) -> usize {
        self.time.advance(delta);
        self.scheduler.fire()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for HeadlessHost {
    type Surface = HeadlessSurface;

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio.get()
    }

    fn create_surface(&mut self, antialias: bool) -> Result<HeadlessSurface, HostError> {
        Ok(HeadlessSurface::new(antialias))
    }

    fn mount_surface(&mut self, container_id: &str, _surface: &HeadlessSurface) -> Result<(), HostError> {
        if !self.containers.contains(container_id) {
            return Err(HostError::ContainerNotFound(container_id.to_string()));
        }
        self.mounted.push(container_id.to_string());
        Ok(())
    }

    fn listen_resize(&mut self, listener: ResizeListener) -> Result<(), HostError> {
        self.listeners.borrow_mut().push(listener);
        Ok(())
    }

    fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        self.scheduler.clone()
    }

    fn time_source(&self) -> Rc<dyn TimeSource> {
        Rc::new(self.time.clone())
    }
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("viewport", &self.viewport.get())
            .field("pixel_ratio", &self.pixel_ratio.get())
            .field("containers", &self.containers)
            .field("mounted", &self.mounted)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
