//! Texture handles and image decoding.

mod decode;
mod error;

pub use decode::{decode_file, decode_memory, DecodedImage};
pub use error::TextureError;

use crate::render::TextureId;

/// A GPU texture plus the CPU-side metadata callers need for UV math.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    /// Slot in the owning registry; 0 until registered.
    pub index: usize,
}

impl Texture {
    #[inline]
    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}
