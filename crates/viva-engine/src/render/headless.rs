//! A backend that records every call instead of touching a GPU.
//!
//! Used by the test suite and by tools that want to inspect the exact byte stream
//! the renderer would send to the shaders.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::coords::{Color, Viewport};
use crate::mesh::Vertex;

use super::backend::{
    validate_rgba, BufferId, ConstantBuffer, FrameStatus, GpuBackend, RasterMode, TextureFilter,
    TextureId, Topology, VertexShader, VertexSource,
};
use super::error::RenderError;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Resize { width: u32, height: u32 },
    CreateTexture { id: TextureId, width: u32, height: u32 },
    DestroyTexture(TextureId),
    CreateVertexBuffer { id: BufferId, vertices: usize },
    CreateIndexBuffer { id: BufferId, indices: usize },
    DestroyBuffer(BufferId),
    WriteDynamicVertices(usize),
    BeginFrame(Color),
    ClearDepth,
    SetVertexShader(VertexShader),
    BindConstantBuffer { slot: u32, buffer: ConstantBuffer },
    UpdateConstantBuffer { buffer: ConstantBuffer, bytes: Vec<u8> },
    BindTexture(TextureId),
    SetRaster(RasterMode),
    SetFilter(TextureFilter),
    SetBlend(bool),
    Draw { topology: Topology, source: VertexSource, vertex_count: u32 },
    DrawIndexed { vertices: BufferId, indices: BufferId, index_count: u32 },
    Present,
}

#[derive(Debug, Default)]
struct Shared {
    calls: Vec<BackendCall>,
    live_textures: BTreeSet<TextureId>,
    live_buffers: BTreeSet<BufferId>,
}

/// Read side of a `HeadlessBackend`, still usable after the backend is boxed.
#[derive(Debug, Clone, Default)]
pub struct HeadlessLog {
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessLog {
    pub fn calls(&self) -> Vec<BackendCall> {
        self.shared.borrow().calls.clone()
    }

    /// Returns and forgets every call recorded so far.
    pub fn take(&self) -> Vec<BackendCall> {
        std::mem::take(&mut self.shared.borrow_mut().calls)
    }

    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.shared.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Byte payloads written to `buffer`, in order.
    pub fn uploads(&self, buffer: ConstantBuffer) -> Vec<Vec<u8>> {
        self.shared
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::UpdateConstantBuffer { buffer: b, bytes } if *b == buffer => {
                    Some(bytes.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn live_textures(&self) -> Vec<TextureId> {
        self.shared.borrow().live_textures.iter().copied().collect()
    }

    pub fn live_buffers(&self) -> Vec<BufferId> {
        self.shared.borrow().live_buffers.iter().copied().collect()
    }
}

/// Recording backend with a fixed-size virtual surface.
#[derive(Debug)]
pub struct HeadlessBackend {
    viewport: Viewport,
    next_id: u32,
    log: HeadlessLog,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width as f32, height as f32),
            next_id: 1,
            log: HeadlessLog::default(),
        }
    }

    /// Handle for inspecting recorded calls.
    pub fn log(&self) -> HeadlessLog {
        self.log.clone()
    }

    fn record(&self, call: BackendCall) {
        self.log.shared.borrow_mut().calls.push(call);
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GpuBackend for HeadlessBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width as f32, height as f32);
        self.record(BackendCall::Resize { width, height });
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, RenderError> {
        validate_rgba(width, height, rgba.len())?;
        let id = TextureId(self.alloc_id());
        self.log.shared.borrow_mut().live_textures.insert(id);
        self.record(BackendCall::CreateTexture { id, width, height });
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.log.shared.borrow_mut().live_textures.remove(&id);
        self.record(BackendCall::DestroyTexture(id));
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> BufferId {
        let id = BufferId(self.alloc_id());
        self.log.shared.borrow_mut().live_buffers.insert(id);
        self.record(BackendCall::CreateVertexBuffer {
            id,
            vertices: vertices.len(),
        });
        id
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> BufferId {
        let id = BufferId(self.alloc_id());
        self.log.shared.borrow_mut().live_buffers.insert(id);
        self.record(BackendCall::CreateIndexBuffer {
            id,
            indices: indices.len(),
        });
        id
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        self.log.shared.borrow_mut().live_buffers.remove(&id);
        self.record(BackendCall::DestroyBuffer(id));
    }

    fn write_dynamic_vertices(&mut self, vertices: &[Vertex]) {
        self.record(BackendCall::WriteDynamicVertices(vertices.len()));
    }

    fn begin_frame(&mut self, clear: Color) {
        self.record(BackendCall::BeginFrame(clear));
    }

    fn clear_depth(&mut self) {
        self.record(BackendCall::ClearDepth);
    }

    fn set_vertex_shader(&mut self, shader: VertexShader) {
        self.record(BackendCall::SetVertexShader(shader));
    }

    fn bind_constant_buffer(&mut self, slot: u32, buffer: ConstantBuffer) {
        self.record(BackendCall::BindConstantBuffer { slot, buffer });
    }

    fn update_constant_buffer(&mut self, buffer: ConstantBuffer, bytes: &[u8]) {
        self.record(BackendCall::UpdateConstantBuffer {
            buffer,
            bytes: bytes.to_vec(),
        });
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.record(BackendCall::BindTexture(texture));
    }

    fn set_raster(&mut self, mode: RasterMode) {
        self.record(BackendCall::SetRaster(mode));
    }

    fn set_filter(&mut self, filter: TextureFilter) {
        self.record(BackendCall::SetFilter(filter));
    }

    fn set_blend(&mut self, enabled: bool) {
        self.record(BackendCall::SetBlend(enabled));
    }

    fn draw(&mut self, topology: Topology, source: VertexSource, vertex_count: u32) {
        self.record(BackendCall::Draw {
            topology,
            source,
            vertex_count,
        });
    }

    fn draw_indexed(&mut self, vertices: BufferId, indices: BufferId, index_count: u32) {
        self.record(BackendCall::DrawIndexed {
            vertices,
            indices,
            index_count,
        });
    }

    fn present(&mut self) -> FrameStatus {
        self.record(BackendCall::Present);
        FrameStatus::Presented
    }
}
