use crate::clock::TimeSource;
use std::rc::Rc;
use wavescape_common::Viewport;
use wavescape_render::RenderSurface;

/// Errors reported by a platform host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("container `{0}` not found")]
    ContainerNotFound(String),
    #[error("no rendering surface available: {0}")]
    SurfaceUnavailable(String),
    #[error("host error: {0}")]
    Backend(String),
}

/// Identifies one scheduled frame so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

pub type FrameCallback = Box<dyn FnOnce()>;

/// Called with the new viewport and the device pixel ratio at that moment.
pub type ResizeListener = Box<dyn FnMut(Viewport, f64)>;

/// The platform's per-frame scheduling primitive, e.g. `requestAnimationFrame`.
///
/// A requested callback runs at most once, on the next display refresh.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest;

    /// Drop a pending request. Unknown or already-fired requests are ignored.
    fn cancel_frame(&self, request: FrameRequest);
}

/// Platform adapter the world is assembled against.
pub trait Host {
    type Surface: RenderSurface + 'static;

    /// Current viewport in logical pixels.
    fn viewport(&self) -> Viewport;

    fn device_pixel_ratio(&self) -> f64;

    fn create_surface(&mut self, antialias: bool) -> Result<Self::Surface, HostError>;

    /// Attach the surface's output element to the container named `container_id`.
    fn mount_surface(&mut self, container_id: &str, surface: &Self::Surface) -> Result<(), HostError>;

    /// Subscribe to viewport size changes for the rest of the host's life.
    fn listen_resize(&mut self, listener: ResizeListener) -> Result<(), HostError>;

    fn scheduler(&self) -> Rc<dyn FrameScheduler>;

    fn time_source(&self) -> Rc<dyn TimeSource>;
}
