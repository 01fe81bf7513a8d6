//! Constant-buffer layouts shared with the WGSL shaders.
//!
//! Field order here is the binary contract with `shaders/*.wgsl`. Every struct is a
//! multiple of 16 bytes so it can be bound as a uniform block as-is.

use bytemuck::{Pod, Zeroable};

// ── sprite path ───────────────────────────────────────────────────────────

/// Per-draw sprite (or line) record, slot 0 of the sprite path.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteUniform {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub sx: f32,

    pub sy: f32,
    pub rot: f32,
    pub ox: f32,
    pub oy: f32,

    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,

    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,

    pub flags: u32,
    pub _pad: [u32; 3],
}

/// 2D camera, slot 1 of the sprite path.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub aspect_ratio: f32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
    pub _pad: [f32; 3],
}

// ── mesh path ─────────────────────────────────────────────────────────────

/// Mesh world transform, slot 0 of the mesh path.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct MeshWorldUniform {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub _pad0: f32,

    /// Euler angles (roll, pitch, yaw) in radians.
    pub q1: f32,
    pub q2: f32,
    pub q3: f32,
    pub _pad1: f32,

    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
    pub data: u32,

    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Perspective camera, slot 1 of the mesh path.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Camera3DUniform {
    pub aspect_ratio: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,

    pub eye: [f32; 3],
    pub at: [f32; 3],
    pub up: [f32; 3],
    pub _pad: [f32; 3],
}

/// Caller-supplied 4x4 transform (column-major, as `glam::Mat4`), slot 2 of the mesh path.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub cols: [[f32; 4]; 4],
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self {
            cols: glam::Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

impl From<&glam::Mat4> for TransformUniform {
    fn from(m: &glam::Mat4) -> Self {
        Self {
            cols: m.to_cols_array_2d(),
        }
    }
}

// ── pixel stage ───────────────────────────────────────────────────────────

/// Fragment flags. Non-zero `notexture` skips sampling and outputs the vertex color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PixelFlags {
    pub notexture: u32,
    pub _pad: [u32; 3],
}

impl PixelFlags {
    #[inline]
    pub fn new(notexture: bool) -> Self {
        Self {
            notexture: notexture as u32,
            _pad: [0; 3],
        }
    }
}

const _: () = assert!(size_of::<SpriteUniform>() % 16 == 0);
const _: () = assert!(size_of::<CameraUniform>() % 16 == 0);
const _: () = assert!(size_of::<MeshWorldUniform>() % 16 == 0);
const _: () = assert!(size_of::<Camera3DUniform>() % 16 == 0);
const _: () = assert!(size_of::<TransformUniform>() % 16 == 0);
const _: () = assert!(size_of::<PixelFlags>() % 16 == 0);
