mod host;

use anyhow::Result;
use clap::Parser;
use glam::Vec2;
use host::DesktopHost;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wavescape_common::WorldConfig;
use wavescape_content::Waves;
use wavescape_input::{PointerButton, PointerTracker};
use wavescape_kernel::{World, WorldHandle};
use wavescape_render_wgpu::{GpuContext, WgpuSurface};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "wavescape-desktop", about = "Wavescape in a native window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Name of the container the window provides
    #[arg(long, default_value = "app")]
    container: String,

    /// World configuration file (.json, .yaml or .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Everything that exists once the window is up.
struct Running {
    window: Arc<Window>,
    host: DesktopHost,
    world: WorldHandle<WgpuSurface>,
    pointer: PointerTracker,
    cursor: Vec2,
}

struct App {
    container: String,
    config: WorldConfig,
    running: Option<Running>,
}

impl App {
    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title("Wavescape")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let gpu = pollster::block_on(GpuContext::new(&instance, surface))?;

        let mut host = DesktopHost::new(window.clone(), self.container.clone(), gpu);
        let world = World::launch(&self.config, &mut host)?;
        world.with_world(Waves::load)?;

        Ok(Running {
            window,
            host,
            world,
            pointer: PointerTracker::new(),
            cursor: Vec2::ZERO,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                tracing::error!("failed to start: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(app) = &mut self.running else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                app.world.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                app.host.notify_resize();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(app.window.scale_factor());
                app.cursor = Vec2::new(logical.x, logical.y);
                if let Some(input) = app.pointer.pointer_move(app.cursor) {
                    app.world.handle_input(input);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                match state {
                    ElementState::Pressed => app.pointer.pointer_down(button, app.cursor),
                    ElementState::Released => app.pointer.pointer_up(),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive; that zooms in
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                if let Some(input) = app.pointer.wheel(-y) {
                    app.world.handle_input(input);
                }
            }
            WindowEvent::RedrawRequested => {
                app.host.frames().fire();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.running {
            if app.host.frames().pending() > 0 {
                app.window.request_redraw();
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("wavescape-desktop starting");

    let config = match &cli.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::new(cli.container.clone()),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App {
        container: cli.container,
        config,
        running: None,
    };
    event_loop.run_app(&mut app)?;

    Ok(())
}
