use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wavescape_common::Viewport;
use wavescape_render::{
    DrawList, DrawVertex, PerspectiveCamera, RenderError, RenderSurface, SceneGraph, ShadowMap,
};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;
const INITIAL_VERTEX_CAPACITY: u64 = 4096;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuVertex {
    position: [f32; 3],
    color: [f32; 4],
}

impl From<&DrawVertex> for GpuVertex {
    fn from(v: &DrawVertex) -> Self {
        Self {
            position: v.position.to_array(),
            color: v.color,
        }
    }
}

/// Device, queue and presentation surface for one output element.
pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    alpha_mode: wgpu::CompositeAlphaMode,
    msaa_supported: bool,
    backend: wgpu::Backend,
}

impl GpuContext {
    /// Pick an adapter compatible with `surface` and open a device on it.
    ///
    /// Limits are the WebGL2 downlevel set so the same path works in the
    /// browser and natively.
    pub async fn new(instance: &wgpu::Instance, surface: wgpu::Surface<'static>) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::Backend("no compatible GPU adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("wavescape_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Backend("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let msaa_supported = adapter
            .get_texture_format_features(format)
            .flags
            .sample_count_supported(MSAA_SAMPLES);
        let backend = adapter.get_info().backend;
        tracing::info!("GPU initialized with {} backend, format {format:?}", backend.to_str());

        Ok(Self {
            surface,
            device,
            queue,
            format,
            alpha_mode,
            msaa_supported,
            backend,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn backend(&self) -> wgpu::Backend {
        self.backend
    }
}

/// Vertex buffer that grows to fit the largest upload so far.
struct VertexBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u64,
    count: u32,
}

impl VertexBuffer {
    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        let capacity = INITIAL_VERTEX_CAPACITY * std::mem::size_of::<GpuVertex>() as u64;
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
            count: 0,
        }
    }

    fn allocate(device: &wgpu::Device, label: &'static str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[GpuVertex]) {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let len = bytes.len() as u64;
        if len > self.capacity {
            self.capacity = len.next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            tracing::debug!("{} grown to {} bytes", self.label, self.capacity);
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.count = vertices.len() as u32;
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipeline: &wgpu::RenderPipeline) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(pipeline);
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..self.count, 0..1);
    }
}

/// GPU-backed [`RenderSurface`].
///
/// Flattens the scene into a [`DrawList`] each frame and draws opaque
/// triangles, then lines, then alpha-blended transparent triangles. With
/// anti-aliasing on, renders into a 4x multisampled target when the format
/// allows it.
pub struct WgpuSurface {
    gpu: GpuContext,
    config: wgpu::SurfaceConfiguration,
    size: Viewport,
    pixel_ratio: f64,
    shadow_map: ShadowMap,
    antialias: bool,
    sample_count: u32,
    line_pipeline: wgpu::RenderPipeline,
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    lines: VertexBuffer,
    opaque: VertexBuffer,
    transparent: VertexBuffer,
    depth_texture: wgpu::TextureView,
    msaa_texture: Option<wgpu::TextureView>,
    draw_list: DrawList,
    scratch: Vec<GpuVertex>,
}

impl WgpuSurface {
    pub fn new(gpu: GpuContext, antialias: bool) -> Self {
        let device = &gpu.device;
        let sample_count = if antialias && gpu.msaa_supported {
            MSAA_SAMPLES
        } else {
            1
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: gpu.format,
            width: 1,
            height: 1,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: gpu.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        gpu.surface.configure(device, &config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = |label, topology, blend, depth_write| {
            create_pipeline(
                device,
                &PipelineDesc {
                    label,
                    layout: &layout,
                    shader: &shader,
                    format: gpu.format,
                    sample_count,
                    topology,
                    blend,
                    depth_write,
                },
            )
        };
        let line_pipeline = pipeline(
            "line_pipeline",
            wgpu::PrimitiveTopology::LineList,
            wgpu::BlendState::REPLACE,
            true,
        );
        let opaque_pipeline = pipeline(
            "opaque_pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::BlendState::REPLACE,
            true,
        );
        let transparent_pipeline = pipeline(
            "transparent_pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        let lines = VertexBuffer::new(device, "line_vertex_buffer");
        let opaque = VertexBuffer::new(device, "opaque_vertex_buffer");
        let transparent = VertexBuffer::new(device, "transparent_vertex_buffer");
        let depth_texture = create_depth_texture(device, 1, 1, sample_count);
        let msaa_texture = (sample_count > 1).then(|| create_msaa_texture(device, &config, sample_count));

        tracing::debug!("wgpu surface created, {sample_count}x sampling");

        Self {
            gpu,
            config,
            size: Viewport::new(1, 1),
            pixel_ratio: 1.0,
            shadow_map: ShadowMap::default(),
            antialias,
            sample_count,
            line_pipeline,
            opaque_pipeline,
            transparent_pipeline,
            uniform_buffer,
            uniform_bind_group,
            lines,
            opaque,
            transparent,
            depth_texture,
            msaa_texture,
            draw_list: DrawList::default(),
            scratch: Vec::new(),
        }
    }

    pub fn antialias(&self) -> bool {
        self.antialias
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    fn reconfigure(&mut self) {
        let physical = self.physical_size();
        let width = physical.width.max(1);
        let height = physical.height.max(1);
        if self.config.width == width && self.config.height == height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        let device = &self.gpu.device;
        self.gpu.surface.configure(device, &self.config);
        self.depth_texture = create_depth_texture(device, width, height, self.sample_count);
        if self.sample_count > 1 {
            self.msaa_texture = Some(create_msaa_texture(device, &self.config, self.sample_count));
        }
    }

    fn upload(&mut self) {
        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        for (source, target) in [
            (&self.draw_list.lines, &mut self.lines),
            (&self.draw_list.opaque_triangles, &mut self.opaque),
            (&self.draw_list.transparent_triangles, &mut self.transparent),
        ] {
            self.scratch.clear();
            self.scratch.extend(source.iter().map(GpuVertex::from));
            target.upload(device, queue, &self.scratch);
        }
    }
}

impl RenderSurface for WgpuSurface {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
        self.reconfigure();
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_size(&mut self, size: Viewport) {
        self.size = size;
        self.reconfigure();
    }

    fn size(&self) -> Viewport {
        self.size
    }

    /// Recorded for parity with other surfaces; the scene has no lights, so
    /// nothing casts shadows yet.
    fn set_shadow_map(&mut self, shadow_map: ShadowMap) {
        self.shadow_map = shadow_map;
    }

    fn shadow_map(&self) -> ShadowMap {
        self.shadow_map
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.surface.configure(&self.gpu.device, &self.config);
                return Err(RenderError::SurfaceLost);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Backend(e.to_string())),
        };

        self.draw_list.rebuild(scene);
        self.upload();
        self.gpu.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
            }),
        );

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let (target, resolve_target) = match &self.msaa_texture {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };
        let [r, g, b] = self
            .draw_list
            .background
            .unwrap_or_else(|| scene.background())
            .to_linear();

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            self.opaque.draw(&mut pass, &self.opaque_pipeline);
            self.lines.draw(&mut pass, &self.line_pipeline);
            self.transparent.draw(&mut pass, &self.transparent_pipeline);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

struct PipelineDesc<'a> {
    label: &'static str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    sample_count: u32,
    topology: wgpu::PrimitiveTopology,
    blend: wgpu::BlendState,
    depth_write: bool,
}

fn create_pipeline(device: &wgpu::Device, desc: &PipelineDesc<'_>) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x4,
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(desc.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: desc.sample_count,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32, sample_count: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn create_msaa_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa_texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
