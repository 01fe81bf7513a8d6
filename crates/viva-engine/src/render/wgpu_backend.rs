//! `GpuBackend` on top of wgpu.
//!
//! The renderer's protocol is immediate (update a constant buffer, draw, update,
//! draw...). wgpu wants whole render passes, so draws are recorded during the
//! frame and replayed at `present`:
//! - every constant-buffer state a draw observes is snapshotted into a per-frame
//!   uniform arena and bound with dynamic offsets
//! - dynamic vertices are appended to a per-frame vertex arena
//! - `clear_depth` splits the frame into consecutive render passes

use std::collections::HashMap;
use std::num::NonZeroU64;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::coords::{Color, Viewport};
use crate::device::{Gpu, GpuFrame};
use crate::mesh::Vertex;

use super::backend::{
    validate_rgba, BufferId, ConstantBuffer, FrameStatus, GpuBackend, RasterMode, TextureFilter,
    TextureId, Topology, VertexShader, VertexSource, VERTEX_SLOTS,
};
use super::error::RenderError;

/// One uniform snapshot. Equal to the default `min_uniform_buffer_offset_alignment`.
const UNIFORM_CHUNK: usize = 256;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

// ── recorded commands ─────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    shader: VertexShader,
    topology: Topology,
    raster: RasterMode,
    blend: bool,
}

#[derive(Debug, Copy, Clone)]
enum DrawKind {
    Generated { count: u32 },
    Buffer { id: BufferId, count: u32 },
    Dynamic { first: u32, count: u32 },
    Indexed { vertices: BufferId, indices: BufferId, count: u32 },
}

#[derive(Debug, Copy, Clone)]
struct DrawCmd {
    key: PipelineKey,
    /// Arena offsets for bindings 0..=3 (three vertex slots, then pixel flags).
    offsets: [u32; VERTEX_SLOTS + 1],
    texture: Option<TextureId>,
    filter: TextureFilter,
    kind: DrawKind,
}

#[derive(Debug, Copy, Clone)]
enum Command {
    Draw(DrawCmd),
    ClearDepth,
}

// ── uniform arena ─────────────────────────────────────────────────────────

/// CPU shadows of every constant buffer plus the per-frame snapshot stream.
///
/// Chunk 0 of each frame is all zeros and backs unbound slots.
struct UniformArena {
    bytes: Vec<u8>,
    shadows: [[u8; UNIFORM_CHUNK]; ConstantBuffer::ALL.len()],
    /// Offset of the latest snapshot of each buffer, if still current.
    snapshot: [Option<u32>; ConstantBuffer::ALL.len()],
}

impl UniformArena {
    fn new() -> Self {
        let mut arena = Self {
            bytes: Vec::new(),
            shadows: [[0; UNIFORM_CHUNK]; ConstantBuffer::ALL.len()],
            snapshot: [None; ConstantBuffer::ALL.len()],
        };
        arena.reset();
        arena
    }

    fn reset(&mut self) {
        self.bytes.clear();
        self.bytes.resize(UNIFORM_CHUNK, 0);
        self.snapshot = [None; ConstantBuffer::ALL.len()];
    }

    fn write(&mut self, buffer: ConstantBuffer, data: &[u8]) {
        if data.len() > UNIFORM_CHUNK {
            log::warn!(
                "constant buffer {buffer:?} update of {} bytes truncated to {UNIFORM_CHUNK}",
                data.len()
            );
        }
        let i = buffer.index();
        let n = data.len().min(UNIFORM_CHUNK);
        self.shadows[i].fill(0);
        self.shadows[i][..n].copy_from_slice(&data[..n]);
        self.snapshot[i] = None;
    }

    fn offset_of(&mut self, buffer: ConstantBuffer) -> u32 {
        let i = buffer.index();
        if let Some(offset) = self.snapshot[i] {
            return offset;
        }
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(&self.shadows[i]);
        self.snapshot[i] = Some(offset);
        offset
    }
}

// ── bind state ────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone)]
struct BindState {
    shader: VertexShader,
    slots: [Option<ConstantBuffer>; VERTEX_SLOTS],
    texture: Option<TextureId>,
    raster: RasterMode,
    filter: TextureFilter,
    blend: bool,
}

impl Default for BindState {
    fn default() -> Self {
        Self {
            shader: VertexShader::Sprite,
            slots: [None; VERTEX_SLOTS],
            texture: None,
            raster: RasterMode::Solid,
            filter: TextureFilter::Point,
            blend: false,
        }
    }
}

struct GpuTexture {
    _texture: wgpu::Texture,
    /// Indexed by `filter_index`.
    bind_groups: [wgpu::BindGroup; 2],
}

fn filter_index(filter: TextureFilter) -> usize {
    match filter {
        TextureFilter::Point => 0,
        TextureFilter::Linear => 1,
    }
}

// ── backend ───────────────────────────────────────────────────────────────

/// wgpu implementation of `GpuBackend`, bound to one window surface.
pub struct WgpuBackend<'w> {
    gpu: Gpu<'w>,
    wireframe_supported: bool,
    warned_wireframe: bool,

    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sprite_module: wgpu::ShaderModule,
    mesh_module: wgpu::ShaderModule,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    samplers: [wgpu::Sampler; 2],
    depth_view: wgpu::TextureView,

    textures: HashMap<TextureId, GpuTexture>,
    fallback_texture: GpuTexture,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    next_id: u32,

    state: BindState,
    arena: UniformArena,
    uniform_buffer: wgpu::Buffer,
    uniform_group: wgpu::BindGroup,

    dynamic_vertices: Vec<Vertex>,
    dynamic_first: u32,
    dynamic_buffer: wgpu::Buffer,

    commands: Vec<Command>,
    clear: Color,
}

impl<'w> WgpuBackend<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        let device = gpu.device();
        let wireframe_supported = device.features().contains(wgpu::Features::POLYGON_MODE_LINE);

        let uniform_entry = |binding: u32, visibility: wgpu::ShaderStages| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(UNIFORM_CHUNK as u64),
                },
                count: None,
            }
        };

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("viva uniform bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                uniform_entry(1, wgpu::ShaderStages::VERTEX),
                uniform_entry(2, wgpu::ShaderStages::VERTEX),
                uniform_entry(3, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("viva texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("viva pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let sprite_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("viva sprite shader"),
            source: wgpu::ShaderSource::Wgsl(
                concat!(include_str!("shaders/pixel.wgsl"), include_str!("shaders/sprite.wgsl"))
                    .into(),
            ),
        });
        let mesh_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("viva mesh shader"),
            source: wgpu::ShaderSource::Wgsl(
                concat!(include_str!("shaders/pixel.wgsl"), include_str!("shaders/mesh.wgsl"))
                    .into(),
            ),
        });

        let samplers = [
            create_sampler(device, wgpu::FilterMode::Nearest, "viva point sampler"),
            create_sampler(device, wgpu::FilterMode::Linear, "viva linear sampler"),
        ];

        let depth_view = create_depth_view(device, gpu.size());

        let fallback_texture = upload_texture(
            device,
            gpu.queue(),
            &texture_layout,
            &samplers,
            1,
            1,
            &[255, 255, 255, 255],
        );

        let uniform_buffer = create_uniform_buffer(device, (UNIFORM_CHUNK * 64) as u64);
        let uniform_group = create_uniform_group(device, &uniform_layout, &uniform_buffer);
        let dynamic_buffer = create_dynamic_buffer(device, 1024);

        log::debug!("wgpu backend ready (wireframe supported: {wireframe_supported})");

        Self {
            gpu,
            wireframe_supported,
            warned_wireframe: false,
            uniform_layout,
            texture_layout,
            pipeline_layout,
            sprite_module,
            mesh_module,
            pipelines: HashMap::new(),
            samplers,
            depth_view,
            textures: HashMap::new(),
            fallback_texture,
            buffers: HashMap::new(),
            next_id: 1,
            state: BindState::default(),
            arena: UniformArena::new(),
            uniform_buffer,
            uniform_group,
            dynamic_vertices: Vec::new(),
            dynamic_first: 0,
            dynamic_buffer,
            commands: Vec::new(),
            clear: Color::SLATE,
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn push_draw(&mut self, topology: Topology, kind: DrawKind) {
        let mut offsets = [0u32; VERTEX_SLOTS + 1];
        for (slot, bound) in self.state.slots.iter().enumerate() {
            if let Some(buffer) = bound {
                offsets[slot] = self.arena.offset_of(*buffer);
            }
        }
        offsets[VERTEX_SLOTS] = self.arena.offset_of(ConstantBuffer::PixelFlags);

        self.commands.push(Command::Draw(DrawCmd {
            key: PipelineKey {
                shader: self.state.shader,
                topology,
                raster: self.state.raster,
                blend: self.state.blend,
            },
            offsets,
            texture: self.state.texture,
            filter: self.state.filter,
            kind,
        }));
    }

    /// Uploads this frame's uniform snapshots and dynamic vertices, growing buffers
    /// as needed.
    fn upload_frame_data(&mut self) {
        let device = self.gpu.device();

        let needed = self.arena.bytes.len() as u64;
        if needed > self.uniform_buffer.size() {
            let size = needed.next_power_of_two();
            log::debug!("growing uniform arena to {size} bytes");
            self.uniform_buffer = create_uniform_buffer(device, size);
            self.uniform_group =
                create_uniform_group(device, &self.uniform_layout, &self.uniform_buffer);
        }
        self.gpu
            .queue()
            .write_buffer(&self.uniform_buffer, 0, &self.arena.bytes);

        if !self.dynamic_vertices.is_empty() {
            let bytes: &[u8] = bytemuck::cast_slice(&self.dynamic_vertices);
            if bytes.len() as u64 > self.dynamic_buffer.size() {
                let vertices = self.dynamic_vertices.len().next_power_of_two();
                self.dynamic_buffer = create_dynamic_buffer(self.gpu.device(), vertices);
            }
            self.gpu.queue().write_buffer(&self.dynamic_buffer, 0, bytes);
        }
    }

    fn ensure_pipelines(&mut self) {
        let missing: Vec<PipelineKey> = self
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw(d) if !self.pipelines.contains_key(&d.key) => Some(d.key),
                _ => None,
            })
            .collect();

        for key in missing {
            if self.pipelines.contains_key(&key) {
                continue;
            }
            let pipeline = self.create_pipeline(key);
            self.pipelines.insert(key, pipeline);
        }
    }

    fn create_pipeline(&self, key: PipelineKey) -> wgpu::RenderPipeline {
        log::debug!("creating pipeline {key:?}");

        let mesh_layout = [Vertex::layout()];
        let (module, buffers): (&wgpu::ShaderModule, &[wgpu::VertexBufferLayout<'_>]) =
            match key.shader {
                VertexShader::Sprite => (&self.sprite_module, &[]),
                VertexShader::Mesh => (&self.mesh_module, &mesh_layout),
            };

        let wireframe = key.raster == RasterMode::Wireframe;
        let polygon_mode =
            if wireframe && self.wireframe_supported && key.topology == Topology::Triangles {
                wgpu::PolygonMode::Line
            } else {
                wgpu::PolygonMode::Fill
            };

        self.gpu
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("viva pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.gpu.surface_format(),
                        blend: key.blend.then(alpha_blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: match key.topology {
                        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
                        Topology::Lines => wgpu::PrimitiveTopology::LineList,
                    },
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: if wireframe { None } else { Some(wgpu::Face::Front) },
                    polygon_mode,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
    }

    fn encode(&self, frame: &mut GpuFrame) {
        let segments = self
            .commands
            .split(|c| matches!(c, Command::ClearDepth));

        for (i, segment) in segments.enumerate() {
            let load = if i == 0 {
                wgpu::LoadOp::Clear(self.clear.to_wgpu())
            } else {
                wgpu::LoadOp::Load
            };

            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("viva scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for cmd in segment {
                if let Command::Draw(draw) = cmd {
                    self.encode_draw(&mut pass, draw);
                }
            }
        }
    }

    fn encode_draw(&self, pass: &mut wgpu::RenderPass<'_>, draw: &DrawCmd) {
        let Some(pipeline) = self.pipelines.get(&draw.key) else { return };
        let texture = draw
            .texture
            .and_then(|id| self.textures.get(&id))
            .unwrap_or(&self.fallback_texture);

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniform_group, &draw.offsets);
        pass.set_bind_group(1, &texture.bind_groups[filter_index(draw.filter)], &[]);

        match draw.kind {
            DrawKind::Generated { count } => pass.draw(0..count, 0..1),
            DrawKind::Buffer { id, count } => {
                let Some(vb) = self.buffers.get(&id) else { return };
                pass.set_vertex_buffer(0, vb.slice(..));
                pass.draw(0..count, 0..1);
            }
            DrawKind::Dynamic { first, count } => {
                pass.set_vertex_buffer(0, self.dynamic_buffer.slice(..));
                pass.draw(first..first + count, 0..1);
            }
            DrawKind::Indexed {
                vertices,
                indices,
                count,
            } => {
                let (Some(vb), Some(ib)) = (self.buffers.get(&vertices), self.buffers.get(&indices))
                else {
                    return;
                };
                pass.set_vertex_buffer(0, vb.slice(..));
                pass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..count, 0, 0..1);
            }
        }
    }
}

impl GpuBackend for WgpuBackend<'_> {
    fn viewport(&self) -> Viewport {
        let size = self.gpu.size();
        Viewport::new(size.width as f32, size.height as f32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
        if width > 0 && height > 0 {
            self.depth_view = create_depth_view(self.gpu.device(), self.gpu.size());
        }
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, RenderError> {
        validate_rgba(width, height, rgba.len())?;

        let texture = upload_texture(
            self.gpu.device(),
            self.gpu.queue(),
            &self.texture_layout,
            &self.samplers,
            width,
            height,
            rgba,
        );
        let id = TextureId(self.alloc_id());
        self.textures.insert(id, texture);
        log::debug!("created {id} ({width}x{height})");
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_none() {
            log::warn!("destroy of unknown {id}");
        }
        if self.state.texture == Some(id) {
            self.state.texture = None;
        }
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> BufferId {
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("viva mesh vertices"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = BufferId(self.alloc_id());
        self.buffers.insert(id, buffer);
        id
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> BufferId {
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("viva mesh indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let id = BufferId(self.alloc_id());
        self.buffers.insert(id, buffer);
        id
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        if self.buffers.remove(&id).is_none() {
            log::warn!("destroy of unknown {id}");
        }
    }

    fn write_dynamic_vertices(&mut self, vertices: &[Vertex]) {
        self.dynamic_first = self.dynamic_vertices.len() as u32;
        self.dynamic_vertices.extend_from_slice(vertices);
    }

    fn begin_frame(&mut self, clear: Color) {
        self.clear = clear;
        self.commands.clear();
        self.arena.reset();
        self.dynamic_vertices.clear();
        self.dynamic_first = 0;
    }

    fn clear_depth(&mut self) {
        self.commands.push(Command::ClearDepth);
    }

    fn set_vertex_shader(&mut self, shader: VertexShader) {
        self.state.shader = shader;
    }

    fn bind_constant_buffer(&mut self, slot: u32, buffer: ConstantBuffer) {
        match self.state.slots.get_mut(slot as usize) {
            Some(s) => *s = Some(buffer),
            None => log::warn!("constant buffer slot {slot} out of range"),
        }
    }

    fn update_constant_buffer(&mut self, buffer: ConstantBuffer, bytes: &[u8]) {
        self.arena.write(buffer, bytes);
    }

    fn bind_texture(&mut self, texture: TextureId) {
        if !self.textures.contains_key(&texture) {
            log::warn!("binding unknown {texture}; drawing with the fallback");
        }
        self.state.texture = Some(texture);
    }

    fn set_raster(&mut self, mode: RasterMode) {
        if mode == RasterMode::Wireframe && !self.wireframe_supported && !self.warned_wireframe {
            log::warn!("POLYGON_MODE_LINE unavailable; wireframe draws fall back to fill");
            self.warned_wireframe = true;
        }
        self.state.raster = mode;
    }

    fn set_filter(&mut self, filter: TextureFilter) {
        self.state.filter = filter;
    }

    fn set_blend(&mut self, enabled: bool) {
        self.state.blend = enabled;
    }

    fn draw(&mut self, topology: Topology, source: VertexSource, vertex_count: u32) {
        let kind = match source {
            VertexSource::Generated => DrawKind::Generated { count: vertex_count },
            VertexSource::Buffer(id) => DrawKind::Buffer {
                id,
                count: vertex_count,
            },
            VertexSource::Dynamic => DrawKind::Dynamic {
                first: self.dynamic_first,
                count: vertex_count,
            },
        };
        self.push_draw(topology, kind);
    }

    fn draw_indexed(&mut self, vertices: BufferId, indices: BufferId, index_count: u32) {
        self.push_draw(
            Topology::Triangles,
            DrawKind::Indexed {
                vertices,
                indices,
                count: index_count,
            },
        );
    }

    fn present(&mut self) -> FrameStatus {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface unavailable: {err}");
                self.commands.clear();
                let action = self.gpu.handle_surface_error(err);
                return if action.is_fatal() {
                    FrameStatus::Fatal
                } else {
                    FrameStatus::Skipped
                };
            }
        };

        self.upload_frame_data();
        self.ensure_pipelines();
        self.encode(&mut frame);
        self.gpu.submit(frame);
        self.commands.clear();

        FrameStatus::Presented
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::Zero,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn create_sampler(device: &wgpu::Device, filter: wgpu::FilterMode, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

fn create_depth_view(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("viva depth"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_uniform_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("viva uniform arena"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    let entry = |binding: u32| wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer,
            offset: 0,
            size: NonZeroU64::new(UNIFORM_CHUNK as u64),
        }),
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("viva uniform group"),
        layout,
        entries: &[entry(0), entry(1), entry(2), entry(3)],
    })
}

fn create_dynamic_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("viva dynamic vertices"),
        size: (vertices.max(1) * size_of::<Vertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    samplers: &[wgpu::Sampler; 2],
    width: u32,
    height: u32,
    rgba: &[u8],
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("viva texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let group = |sampler: &wgpu::Sampler| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("viva texture group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    };
    let bind_groups = [group(&samplers[0]), group(&samplers[1])];

    GpuTexture {
        _texture: texture,
        bind_groups,
    }
}
