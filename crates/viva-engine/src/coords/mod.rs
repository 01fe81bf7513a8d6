//! Small value types shared by sprites, meshes and the renderer.
//!
//! World space for sprites:
//! - the window spans roughly [-aspect, aspect] x [-1, 1] at camera scale 1
//! - +X right, +Y down (the sprite shader flips y)
//!
//! UV space is normalized: (0,0) is the top-left texel corner, (1,1) the bottom-right.

mod color;
mod uv_rect;
mod vec2;
mod vec3;
mod viewport;

pub use color::Color;
pub use uv_rect::UvRect;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use viewport::Viewport;
