//! wgpu backend: device/queue/surface ownership plus the resource tables and
//! binding-state tracking behind [`GraphicsDevice`].
//!
//! Frames are explicit: the runtime calls [`WgpuDevice::begin_frame`] before
//! ticking the scheduler and [`WgpuDevice::end_frame`] afterwards. Clears and
//! draws each record their own render pass into the frame encoder, so the
//! transient bind/unbind protocol of the trait maps onto pass-scoped state.

use std::collections::HashMap;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::{
    BufferId, DeviceFeature, GraphicsDevice, IndexData, IndexWidth, PrimitiveTopology, ProgramId,
    ShaderSources, TransformId, VertexAttribute,
};
use crate::error::{BindSlot, ConstructionError, DrawError, GpuStateError, ShaderCompileError};
use crate::transform::Transform;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is broadly supported and matches
    /// the display-refresh pacing the scheduler assumes.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference; a supported mode is selected when the
    /// preference is unavailable.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum BufferKind {
    Vertex,
    Index,
}

struct BufferEntry {
    buffer: wgpu::Buffer,
    kind: BufferKind,
}

struct ProgramEntry {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    /// Pipelines are built lazily per topology; cleared when depth testing
    /// is enabled after the fact, since depth state is baked in.
    pipelines: HashMap<PrimitiveTopology, wgpu::RenderPipeline>,
}

struct TransformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct FrameState {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// Owns wgpu core objects, the surface configuration, and all device-side
/// resources addressed by the opaque handles of [`GraphicsDevice`].
pub struct WgpuDevice<'w> {
    /// Surface lifetime is tied to the window; the runtime ensures the window
    /// outlives the device.
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,

    transform_layout: wgpu::BindGroupLayout,
    clear_color: wgpu::Color,
    depth: Option<DepthTarget>,

    buffers: Vec<BufferEntry>,
    programs: Vec<ProgramEntry>,
    transforms: Vec<TransformSlot>,

    active_program: Option<ProgramId>,
    bound_vertex: Option<BufferId>,
    bound_index: Option<(BufferId, IndexWidth)>,
    staged_transform: Option<TransformId>,

    frame: Option<FrameState>,
}

impl<'w> WgpuDevice<'w> {
    /// Creates a device bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("hedron device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&surface_caps, init.prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = init
            .alpha_mode
            .filter(|m| surface_caps.alpha_modes.contains(m))
            .unwrap_or_else(|| {
                surface_caps
                    .alpha_modes
                    .first()
                    .copied()
                    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
            });

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("hedron transform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<Transform>() as u64)
                            .expect("Transform is non-zero sized"),
                    ),
                },
                count: None,
            }],
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            transform_layout,
            clear_color: wgpu::Color::BLACK,
            depth: None,
            buffers: Vec::new(),
            programs: Vec::new(),
            transforms: Vec::new(),
            active_program: None,
            bound_vertex: None,
            bound_index: None,
            staged_transform: None,
            frame: None,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Width over height of the current surface.
    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    /// Reconfigures the surface after a resize.
    ///
    /// A 0x0 size cannot be configured; only internal state is updated and
    /// configuration is deferred until a non-empty size arrives.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            self.size = new_size;
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        if self.depth.is_some() {
            self.depth = Some(create_depth_target(&self.device, &self.config));
        }
    }

    /// Acquires the next surface texture and opens a frame encoder.
    pub fn begin_frame(&mut self) -> std::result::Result<(), SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hedron frame encoder"),
            });

        self.frame = Some(FrameState {
            surface_texture,
            view,
            encoder,
        });
        Ok(())
    }

    /// Submits the recorded frame and presents it. A no-op when no frame is
    /// open.
    pub fn end_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.queue.submit(std::iter::once(frame.encoder.finish()));
            drop(frame.view);
            frame.surface_texture.present();
        }
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(&self.device, &self.config);
                }
                SurfaceErrorAction::Reconfigured
            }
            SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
            SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }

    fn check_buffer(
        &self,
        id: BufferId,
        kind: BufferKind,
        slot: BindSlot,
    ) -> Result<(), GpuStateError> {
        match self.buffers.get(id.0 as usize) {
            None => Err(GpuStateError::UnknownHandle),
            Some(entry) if entry.kind != kind => Err(GpuStateError::KindMismatch { slot }),
            Some(_) => Ok(()),
        }
    }

    fn ensure_pipeline(
        &mut self,
        program: ProgramId,
        topology: PrimitiveTopology,
    ) -> Result<(), GpuStateError> {
        let has_depth = self.depth.is_some();
        let entry = self
            .programs
            .get_mut(program.0 as usize)
            .ok_or(GpuStateError::UnknownHandle)?;
        if entry.pipelines.contains_key(&topology) {
            return Ok(());
        }

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("hedron pipeline layout"),
                bind_group_layouts: &[&self.transform_layout],
                immediate_size: 0,
            });

        const POSITION_ATTR: [wgpu::VertexAttribute; 1] =
            wgpu::vertex_attr_array![0 => Float32x3];
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: 3 * std::mem::size_of::<f32>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTR,
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("hedron pipeline"),
                layout: Some(&layout),

                vertex: wgpu::VertexState {
                    module: &entry.vertex,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &entry.fragment,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: map_topology(topology),
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: has_depth.then(|| wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),

                multiview_mask: None,
                cache: None,
            });

        entry.pipelines.insert(topology, pipeline);
        Ok(())
    }
}

impl GraphicsDevice for WgpuDevice<'_> {
    fn compile_program(
        &mut self,
        sources: &ShaderSources<'_>,
    ) -> Result<ProgramId, ShaderCompileError> {
        // naga's front end produces the diagnostic text; wgpu itself reports
        // shader errors only through async error scopes.
        validate_wgsl("vertex shader", sources.vertex)?;
        validate_wgsl("fragment shader", sources.fragment)?;

        let vertex = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("hedron vertex shader"),
                source: wgpu::ShaderSource::Wgsl(sources.vertex.into()),
            });
        let fragment = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("hedron fragment shader"),
                source: wgpu::ShaderSource::Wgsl(sources.fragment.into()),
            });

        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(ProgramEntry {
            vertex,
            fragment,
            pipelines: HashMap::new(),
        });
        Ok(id)
    }

    fn create_vertex_buffer(
        &mut self,
        values: &[f32],
        attribute: &VertexAttribute,
    ) -> Result<BufferId, ConstructionError> {
        if attribute.components != 3 {
            return Err(ConstructionError::Device(format!(
                "attribute '{}': only 3-component vertex attributes are supported",
                attribute.name
            )));
        }

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("hedron vertex buffer"),
                contents: bytemuck::cast_slice(values),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(BufferEntry {
            buffer,
            kind: BufferKind::Vertex,
        });
        Ok(id)
    }

    fn create_index_buffer(&mut self, data: IndexData<'_>) -> Result<BufferId, ConstructionError> {
        // Uploads must be 4-byte aligned; an odd number of u16 indices gets
        // one padding element past the drawn range.
        let mut padded;
        let contents = match data {
            IndexData::U16(v) if v.len() % 2 != 0 => {
                padded = v.to_vec();
                padded.push(0);
                bytemuck::cast_slice(&padded)
            }
            _ => data.bytes(),
        };

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("hedron index buffer"),
                contents,
                usage: wgpu::BufferUsages::INDEX,
            });

        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(BufferEntry {
            buffer,
            kind: BufferKind::Index,
        });
        Ok(id)
    }

    fn create_transform_slot(&mut self) -> Result<TransformId, ConstructionError> {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("hedron transform ubo"),
            size: std::mem::size_of::<Transform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("hedron transform bind group"),
            layout: &self.transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        let id = TransformId(self.transforms.len() as u32);
        self.transforms.push(TransformSlot { buffer, bind_group });
        Ok(id)
    }

    fn write_transform(
        &mut self,
        slot: TransformId,
        transform: &Transform,
    ) -> Result<(), GpuStateError> {
        let entry = self
            .transforms
            .get(slot.0 as usize)
            .ok_or(GpuStateError::UnknownHandle)?;
        // Buffered until submit; each slot holds one value per frame.
        self.queue
            .write_buffer(&entry.buffer, 0, bytemuck::bytes_of(transform));
        self.staged_transform = Some(slot);
        Ok(())
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), GpuStateError> {
        if program.0 as usize >= self.programs.len() {
            return Err(GpuStateError::UnknownHandle);
        }
        self.active_program = Some(program);
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError> {
        self.check_buffer(buffer, BufferKind::Vertex, BindSlot::VertexAttribute)?;
        if self.bound_vertex.is_some() {
            return Err(GpuStateError::AlreadyBound {
                slot: BindSlot::VertexAttribute,
            });
        }
        self.bound_vertex = Some(buffer);
        Ok(())
    }

    fn unbind_vertex_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError> {
        match self.bound_vertex {
            None => Err(GpuStateError::NotBound {
                slot: BindSlot::VertexAttribute,
            }),
            Some(bound) if bound != buffer => Err(GpuStateError::BindingMismatch {
                slot: BindSlot::VertexAttribute,
            }),
            Some(_) => {
                self.bound_vertex = None;
                Ok(())
            }
        }
    }

    fn bind_index_buffer(
        &mut self,
        buffer: BufferId,
        width: IndexWidth,
    ) -> Result<(), GpuStateError> {
        self.check_buffer(buffer, BufferKind::Index, BindSlot::Index)?;
        if self.bound_index.is_some() {
            return Err(GpuStateError::AlreadyBound {
                slot: BindSlot::Index,
            });
        }
        self.bound_index = Some((buffer, width));
        Ok(())
    }

    fn unbind_index_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError> {
        match self.bound_index {
            None => Err(GpuStateError::NotBound {
                slot: BindSlot::Index,
            }),
            Some((bound, _)) if bound != buffer => Err(GpuStateError::BindingMismatch {
                slot: BindSlot::Index,
            }),
            Some(_) => {
                self.bound_index = None;
                Ok(())
            }
        }
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_count: u32,
    ) -> Result<(), DrawError> {
        let program = self.active_program.ok_or(GpuStateError::NoProgram)?;
        let vertex = self.bound_vertex.ok_or(GpuStateError::NotBound {
            slot: BindSlot::VertexAttribute,
        })?;
        let (index, width) = self.bound_index.ok_or(GpuStateError::NotBound {
            slot: BindSlot::Index,
        })?;
        let transform = self.staged_transform.ok_or(GpuStateError::NoTransform)?;

        self.ensure_pipeline(program, topology)?;

        let frame = self.frame.as_mut().ok_or(DrawError::NoActiveFrame)?;
        let pipeline = &self.programs[program.0 as usize].pipelines[&topology];
        let vertex_buffer = &self.buffers[vertex.0 as usize].buffer;
        let index_buffer = &self.buffers[index.0 as usize].buffer;
        let bind_group = &self.transforms[transform.0 as usize].bind_group;

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("hedron draw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: self.depth.as_ref().map(|depth| {
                wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.set_index_buffer(
            index_buffer.slice(..),
            match width {
                IndexWidth::U16 => wgpu::IndexFormat::Uint16,
                IndexWidth::U32 => wgpu::IndexFormat::Uint32,
            },
        );
        rpass.draw_indexed(0..index_count, 0, 0..1);

        Ok(())
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        };
    }

    fn enable_feature(&mut self, feature: DeviceFeature) {
        match feature {
            DeviceFeature::DepthTest => {
                if self.depth.is_none() {
                    self.depth = Some(create_depth_target(&self.device, &self.config));
                    // Existing pipelines were built without depth state.
                    for entry in &mut self.programs {
                        entry.pipelines.clear();
                    }
                }
            }
        }
    }

    fn clear_frame(&mut self) -> Result<(), DrawError> {
        let frame = self.frame.as_mut().ok_or(DrawError::NoActiveFrame)?;

        let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("hedron clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: self.depth.as_ref().map(|depth| {
                wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        Ok(())
    }
}

fn map_topology(topology: PrimitiveTopology) -> wgpu::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => wgpu::PrimitiveTopology::PointList,
        PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
        PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
    }
}

fn validate_wgsl(stage: &str, source: &str) -> Result<(), ShaderCompileError> {
    naga::front::wgsl::parse_str(source)
        .map(|_| ())
        .map_err(|err| ShaderCompileError {
            diagnostic: format!("{stage}: {}", err.emit_to_string(source)),
        })
}

fn create_depth_target(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> DepthTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("hedron depth target"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    DepthTarget {
        _texture: texture,
        view,
    }
}

fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}
