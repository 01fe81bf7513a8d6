//! The seam between the renderer and a concrete GPU API.
//!
//! `Renderer` speaks a small immediate-mode protocol: bind a vertex shader path,
//! bind constant buffers to slots, update their contents, draw. Implementations
//! decide how that maps onto real GPU objects.

use core::fmt;

use crate::coords::{Color, Viewport};
use crate::mesh::Vertex;

use super::error::RenderError;

/// Handle to a GPU texture owned by a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureId(pub(crate) u32);

/// Handle to a GPU vertex or index buffer owned by a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferId(pub(crate) u32);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Vertex shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexShader {
    /// Generates a unit quad (or a line) from `SV_VertexID`; reads sprite + camera.
    Sprite,
    /// Reads `Vertex` input; reads world + view + transform.
    Mesh,
}

/// Renderer-owned constant buffers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ConstantBuffer {
    Sprite,
    Camera,
    MeshWorld,
    MeshView,
    MeshTransform,
    /// Fragment stage flags. Always bound; never part of a vertex slot.
    PixelFlags,
}

impl ConstantBuffer {
    pub const ALL: [ConstantBuffer; 6] = [
        ConstantBuffer::Sprite,
        ConstantBuffer::Camera,
        ConstantBuffer::MeshWorld,
        ConstantBuffer::MeshView,
        ConstantBuffer::MeshTransform,
        ConstantBuffer::PixelFlags,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            ConstantBuffer::Sprite => 0,
            ConstantBuffer::Camera => 1,
            ConstantBuffer::MeshWorld => 2,
            ConstantBuffer::MeshView => 3,
            ConstantBuffer::MeshTransform => 4,
            ConstantBuffer::PixelFlags => 5,
        }
    }
}

/// Number of vertex-stage constant buffer slots.
pub const VERTEX_SLOTS: usize = 3;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RasterMode {
    /// Filled triangles, front faces culled.
    #[default]
    Solid,
    /// Edges only, no culling.
    Wireframe,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureFilter {
    #[default]
    Point,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Where vertex data for a non-indexed draw comes from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexSource {
    /// No vertex buffer; the shader builds positions from the vertex index.
    Generated,
    /// A buffer created with `create_vertex_buffer`.
    Buffer(BufferId),
    /// The vertices passed to the most recent `write_dynamic_vertices`.
    Dynamic,
}

/// Outcome of presenting a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    Presented,
    /// The frame was dropped (surface lost, outdated or timed out).
    Skipped,
    /// The device cannot continue.
    Fatal,
}

/// GPU boundary used by `Renderer`.
///
/// Binding state (shader, slots, texture, raster, filter, blend) persists across
/// frames until changed.
pub trait GpuBackend {
    /// Current drawable size in physical pixels.
    fn viewport(&self) -> Viewport;

    fn resize(&mut self, width: u32, height: u32);

    /// Creates an RGBA8 texture. `rgba.len()` must equal `width * height * 4`.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8])
        -> Result<TextureId, RenderError>;

    fn destroy_texture(&mut self, id: TextureId);

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> BufferId;

    fn create_index_buffer(&mut self, indices: &[u32]) -> BufferId;

    fn destroy_buffer(&mut self, id: BufferId);

    /// Replaces the contents of the shared dynamic vertex buffer.
    fn write_dynamic_vertices(&mut self, vertices: &[Vertex]);

    /// Starts a frame, clearing color to `clear` and depth to 1.0.
    fn begin_frame(&mut self, clear: Color);

    /// Clears depth mid-frame; color is kept.
    fn clear_depth(&mut self);

    fn set_vertex_shader(&mut self, shader: VertexShader);

    /// Binds `buffer` to vertex-stage `slot` (0..`VERTEX_SLOTS`).
    fn bind_constant_buffer(&mut self, slot: u32, buffer: ConstantBuffer);

    /// Replaces the contents of `buffer`. Subsequent draws observe the new bytes.
    fn update_constant_buffer(&mut self, buffer: ConstantBuffer, bytes: &[u8]);

    fn bind_texture(&mut self, texture: TextureId);

    fn set_raster(&mut self, mode: RasterMode);

    fn set_filter(&mut self, filter: TextureFilter);

    fn set_blend(&mut self, enabled: bool);

    fn draw(&mut self, topology: Topology, source: VertexSource, vertex_count: u32);

    fn draw_indexed(&mut self, vertices: BufferId, indices: BufferId, index_count: u32);

    /// Submits everything recorded since `begin_frame` and presents.
    fn present(&mut self) -> FrameStatus;
}

/// Checks that `len` bytes describe a `width` x `height` RGBA8 image.
pub(crate) fn validate_rgba(width: u32, height: u32, len: usize) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::ZeroSizedTexture);
    }
    let expected = width as usize * height as usize * 4;
    if expected != len {
        return Err(RenderError::TextureSizeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}
