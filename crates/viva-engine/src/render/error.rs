use std::fmt;

use super::backend::{BufferId, TextureId};

/// Errors raised by the renderer and its backends.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// `draw_mesh_dynamic` was given more vertices than the shared buffer holds.
    DynamicOverflow { requested: usize, capacity: usize },
    /// Texture dimensions were zero.
    ZeroSizedTexture,
    /// Pixel data length did not match `width * height * 4`.
    TextureSizeMismatch { expected: usize, actual: usize },
    /// A texture handle that is not (or no longer) alive.
    UnknownTexture(TextureId),
    /// A buffer handle that is not (or no longer) alive.
    UnknownBuffer(BufferId),
    /// `create_mesh` was given no vertices, or an empty index list.
    EmptyMesh { vertices: usize, indices: Option<usize> },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::DynamicOverflow { requested, capacity } => write!(
                f,
                "dynamic vertex buffer overflow: {requested} vertices requested, \
                 capacity is {capacity}"
            ),
            RenderError::ZeroSizedTexture => write!(f, "texture has zero width or height"),
            RenderError::TextureSizeMismatch { expected, actual } => write!(
                f,
                "texture data is {actual} bytes, expected {expected}"
            ),
            RenderError::UnknownTexture(id) => write!(f, "unknown texture {id}"),
            RenderError::UnknownBuffer(id) => write!(f, "unknown buffer {id}"),
            RenderError::EmptyMesh { vertices, indices } => match indices {
                Some(n) => write!(
                    f,
                    "mesh needs vertices and indices ({vertices} vertices, {n} indices)"
                ),
                None => write!(f, "mesh needs at least one vertex"),
            },
        }
    }
}

impl std::error::Error for RenderError {}
