use std::rc::Rc;
use std::sync::Arc;
use wavescape_common::Viewport;
use wavescape_kernel::{
    FrameScheduler, Host, HostError, ManualScheduler, MonotonicTime, ResizeListener, TimeSource,
};
use wavescape_render_wgpu::{GpuContext, WgpuSurface};
use winit::window::Window;

/// Host backed by one native window, which acts as the only container.
///
/// Frames are queued on a [`ManualScheduler`] and fired from
/// `RedrawRequested`; the event loop requests a redraw while any are pending.
pub struct DesktopHost {
    window: Arc<Window>,
    container: String,
    gpu: Option<GpuContext>,
    listeners: Vec<ResizeListener>,
    frames: Rc<ManualScheduler>,
    time: Rc<MonotonicTime>,
}

impl DesktopHost {
    pub fn new(window: Arc<Window>, container: String, gpu: GpuContext) -> Self {
        Self {
            window,
            container,
            gpu: Some(gpu),
            listeners: Vec::new(),
            frames: Rc::new(ManualScheduler::new()),
            time: Rc::new(MonotonicTime::new()),
        }
    }

    pub fn frames(&self) -> &ManualScheduler {
        &self.frames
    }

    /// Forward the window's current size and scale factor to every resize
    /// listener.
    pub fn notify_resize(&mut self) {
        let (viewport, ratio) = (self.viewport(), self.device_pixel_ratio());
        for listener in &mut self.listeners {
            listener(viewport, ratio);
        }
    }
}

impl Host for DesktopHost {
    type Surface = WgpuSurface;

    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size().to_logical::<f64>(self.window.scale_factor());
        Viewport::new(size.width.round() as u32, size.height.round() as u32)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn create_surface(&mut self, antialias: bool) -> Result<WgpuSurface, HostError> {
        let gpu = self
            .gpu
            .take()
            .ok_or_else(|| HostError::SurfaceUnavailable("the window already has a surface".into()))?;
        Ok(WgpuSurface::new(gpu, antialias))
    }

    fn mount_surface(&mut self, container_id: &str, _surface: &WgpuSurface) -> Result<(), HostError> {
        if container_id != self.container {
            return Err(HostError::ContainerNotFound(container_id.to_string()));
        }
        self.window.set_title(&format!("Wavescape #{container_id}"));
        Ok(())
    }

    fn listen_resize(&mut self, listener: ResizeListener) -> Result<(), HostError> {
        self.listeners.push(listener);
        Ok(())
    }

    fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        self.frames.clone()
    }

    fn time_source(&self) -> Rc<dyn TimeSource> {
        self.time.clone()
    }
}
