//! Browser entry point.
//!
//! ```js
//! import init, { start } from "./wavescape_web.js";
//! await init();
//! const app = await start("app");
//! // or, with a full world configuration:
//! // const app = await startWithConfig(JSON.stringify({ renderer: { containerId: "app" } }));
//! app.stop();
//! ```

pub mod page;
pub mod pointer;

#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod logging;

#[cfg(target_arch = "wasm32")]
pub use app::{WavescapeApp, start, start_with_config};

#[cfg(target_arch = "wasm32")]
mod app {
    use crate::host::WebHost;
    use crate::page::default_page_config;
    use crate::pointer::pointer_button;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wavescape_common::WorldConfig;
    use wavescape_content::Waves;
    use wavescape_input::PointerTracker;
    use wavescape_kernel::{World, WorldHandle};
    use wavescape_render_wgpu::{GpuContext, WgpuSurface};
    use web_sys::{HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent};

    /// A running scene, handed to JavaScript.
    #[wasm_bindgen]
    pub struct WavescapeApp {
        world: WorldHandle<WgpuSurface>,
    }

    #[wasm_bindgen]
    impl WavescapeApp {
        /// Cancel the pending frame; the scene stays mounted.
        pub fn stop(&self) {
            self.world.stop();
        }

        /// Resume a stopped loop.
        pub fn resume(&self) {
            self.world.start();
        }

        #[wasm_bindgen(getter)]
        pub fn running(&self) -> bool {
            self.world.is_running()
        }

        #[wasm_bindgen(getter)]
        pub fn frames(&self) -> u64 {
            self.world.with_world(|w| w.stats().rendered)
        }
    }

    fn js_error(e: impl std::fmt::Display) -> JsValue {
        JsError::new(&e.to_string()).into()
    }

    /// Build the wave scene inside the element with id `container_id` and start
    /// animating it, with the axes helper shown.
    #[wasm_bindgen]
    pub async fn start(container_id: String) -> Result<WavescapeApp, JsValue> {
        launch(default_page_config(container_id)).await
    }

    /// Like [`start`], with every setting taken from a JSON world
    /// configuration (`renderer.containerId` is required).
    #[wasm_bindgen(js_name = startWithConfig)]
    pub async fn start_with_config(config_json: String) -> Result<WavescapeApp, JsValue> {
        let config = WorldConfig::from_json_str(&config_json).map_err(js_error)?;
        launch(config).await
    }

    async fn launch(config: WorldConfig) -> Result<WavescapeApp, JsValue> {
        console_error_panic_hook::set_once();
        crate::logging::init(tracing::Level::INFO);

        let window = web_sys::window().ok_or_else(|| js_error("no global window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(js_error)?;
        let gpu = GpuContext::new(&instance, surface).await.map_err(js_error)?;
        tracing::info!("GPU ready ({:?})", gpu.backend());

        let mut host = WebHost::new(window, document, canvas, gpu);
        let world = World::launch(&config, &mut host).map_err(js_error)?;
        world.with_world(Waves::load).map_err(js_error)?;
        listen_pointer(host.canvas(), &world)?;

        Ok(WavescapeApp { world })
    }

    fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        canvas: &HtmlCanvasElement,
        kind: &str,
        handler: impl FnMut(E) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn position(event: &MouseEvent) -> Vec2 {
        Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
    }

    /// Wire canvas pointer and wheel events into the orbit controls.
    fn listen_pointer(canvas: &HtmlCanvasElement, world: &WorldHandle<WgpuSurface>) -> Result<(), JsValue> {
        let tracker = Rc::new(RefCell::new(PointerTracker::new()));

        {
            let tracker = tracker.clone();
            let target = canvas.clone();
            listen(canvas, "pointerdown", move |e: PointerEvent| {
                if let Some(button) = pointer_button(e.button()) {
                    let _ = target.set_pointer_capture(e.pointer_id());
                    tracker.borrow_mut().pointer_down(button, position(&e));
                }
            })?;
        }
        {
            let tracker = tracker.clone();
            let world = world.clone();
            listen(canvas, "pointermove", move |e: PointerEvent| {
                let input = tracker.borrow_mut().pointer_move(position(&e));
                if let Some(input) = input {
                    world.handle_input(input);
                }
            })?;
        }
        for kind in ["pointerup", "pointercancel"] {
            let tracker = tracker.clone();
            listen(canvas, kind, move |_: PointerEvent| tracker.borrow_mut().pointer_up())?;
        }
        {
            let world = world.clone();
            listen(canvas, "wheel", move |e: WheelEvent| {
                e.prevent_default();
                let input = tracker.borrow().wheel(e.delta_y() as f32);
                if let Some(input) = input {
                    world.handle_input(input);
                }
            })?;
        }
        listen(canvas, "contextmenu", |e: MouseEvent| e.prevent_default())?;
        Ok(())
    }
}
