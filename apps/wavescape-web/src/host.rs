use crate::pointer::viewport_from_inner;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wavescape_common::Viewport;
use wavescape_kernel::{
    FrameCallback, FrameRequest, FrameScheduler, Host, HostError, MonotonicTime, ResizeListener,
    TimeSource,
};
use wavescape_render_wgpu::{GpuContext, WgpuSurface};
use web_sys::{Document, HtmlCanvasElement, Window};

/// Schedules frames with `requestAnimationFrame`.
pub struct AnimationFrameScheduler {
    window: Window,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        let closure = Closure::once_into_js(move || callback());
        match self.window.request_animation_frame(closure.unchecked_ref()) {
            Ok(id) => FrameRequest(id as u64),
            Err(e) => {
                tracing::error!("requestAnimationFrame failed: {e:?}");
                FrameRequest(0)
            }
        }
    }

    fn cancel_frame(&self, request: FrameRequest) {
        // rAF ids start at 1; 0 marks a request that never got scheduled
        if request.0 == 0 {
            return;
        }
        if let Err(e) = self.window.cancel_animation_frame(request.0 as i32) {
            tracing::warn!("cancelAnimationFrame failed: {e:?}");
        }
    }
}

/// Host backed by the page: a canvas mounted into a DOM container, sized to
/// the browser window.
pub struct WebHost {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    gpu: Option<GpuContext>,
    scheduler: Rc<AnimationFrameScheduler>,
    time: Rc<MonotonicTime>,
}

impl WebHost {
    pub fn new(window: Window, document: Document, canvas: HtmlCanvasElement, gpu: GpuContext) -> Self {
        Self {
            scheduler: Rc::new(AnimationFrameScheduler::new(window.clone())),
            window,
            document,
            canvas,
            gpu: Some(gpu),
            time: Rc::new(MonotonicTime::new()),
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

fn window_viewport(window: &Window) -> Viewport {
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    viewport_from_inner(dim(window.inner_width()), dim(window.inner_height()))
}

impl Host for WebHost {
    type Surface = WgpuSurface;

    fn viewport(&self) -> Viewport {
        window_viewport(&self.window)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn create_surface(&mut self, antialias: bool) -> Result<WgpuSurface, HostError> {
        let gpu = self
            .gpu
            .take()
            .ok_or_else(|| HostError::SurfaceUnavailable("the canvas already has a surface".into()))?;
        Ok(WgpuSurface::new(gpu, antialias))
    }

    fn mount_surface(&mut self, container_id: &str, _surface: &WgpuSurface) -> Result<(), HostError> {
        let container = self
            .document
            .get_element_by_id(container_id)
            .ok_or_else(|| HostError::ContainerNotFound(container_id.to_string()))?;
        self.canvas
            .style()
            .set_css_text("display: block; width: 100%; height: 100%; touch-action: none;");
        container
            .append_child(&self.canvas)
            .map_err(|e| HostError::Backend(format!("appendChild failed: {e:?}")))?;
        Ok(())
    }

    fn listen_resize(&mut self, mut listener: ResizeListener) -> Result<(), HostError> {
        let window = self.window.clone();
        // browser zoom changes devicePixelRatio and also fires `resize`
        let closure = Closure::<dyn FnMut()>::new(move || {
            listener(window_viewport(&window), window.device_pixel_ratio())
        });
        self.window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .map_err(|e| HostError::Backend(format!("addEventListener failed: {e:?}")))?;
        // lives as long as the page
        closure.forget();
        Ok(())
    }

    fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        self.scheduler.clone()
    }

    fn time_source(&self) -> Rc<dyn TimeSource> {
        self.time.clone()
    }
}
