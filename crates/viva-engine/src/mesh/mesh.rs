use crate::coords::{Color, Vec3};
use crate::render::{BufferId, MeshWorldUniform, TextureId};

/// Bits of `Mesh::data`, read by the mesh vertex shader.
pub struct MeshFlags;

impl MeshFlags {
    /// Use the caller's transform block verbatim instead of pos/rot/scale + camera.
    pub const APPLY_TRANSFORM: u32 = 4;
    /// Positions are already in clip space; color comes from each vertex.
    pub const DYNAMIC_VERTICES: u32 = 8;
}

/// GPU vertex (and optional index) buffers plus a world transform.
///
/// Created by `Renderer::create_mesh` (or `Mesh::dynamic` for immediate-mode
/// drawing) and released with `Renderer::destroy_mesh`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub pos: Vec3,
    /// Euler angles in radians: x = roll, y = pitch, z = yaw.
    pub rot: Vec3,
    pub scale: Vec3,
    /// Multiplied into the output; alpha is forced to 1 for static meshes.
    pub color: Color,
    pub data: u32,
    pub texture: Option<TextureId>,

    pub(crate) vertex_buffer: Option<BufferId>,
    pub(crate) index_buffer: Option<BufferId>,
    pub(crate) vertex_count: u32,
    pub(crate) index_count: u32,
}

impl Mesh {
    pub(crate) fn with_buffers(
        vertex_buffer: Option<BufferId>,
        vertex_count: u32,
        index_buffer: Option<BufferId>,
        index_count: u32,
        texture: Option<TextureId>,
    ) -> Self {
        Self {
            pos: Vec3::ZERO,
            rot: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Color::WHITE,
            data: 0,
            texture,
            vertex_buffer,
            index_buffer,
            vertex_count,
            index_count,
        }
    }

    /// A buffer-less mesh for `Renderer::draw_mesh_dynamic`.
    pub fn dynamic(texture: Option<TextureId>) -> Self {
        Self::with_buffers(None, 0, None, 0, texture)
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn to_uniform(&self) -> MeshWorldUniform {
        MeshWorldUniform {
            x: self.pos.x,
            y: self.pos.y,
            z: self.pos.z,
            _pad0: 0.0,
            q1: self.rot.x,
            q2: self.rot.y,
            q3: self.rot.z,
            _pad1: 0.0,
            sx: self.scale.x,
            sy: self.scale.y,
            sz: self.scale.z,
            data: self.data,
            r: self.color.r,
            g: self.color.g,
            b: self.color.b,
            a: self.color.a,
        }
    }

    /// CPU mirror of the shader's world matrix: translation * rotation * scale.
    pub fn world_matrix(&self) -> glam::Mat4 {
        let rotation =
            glam::Quat::from_euler(glam::EulerRot::ZYX, self.rot.z, self.rot.y, self.rot.x);
        glam::Mat4::from_scale_rotation_translation(
            self.scale.to_glam(),
            rotation,
            self.pos.to_glam(),
        )
    }
}
