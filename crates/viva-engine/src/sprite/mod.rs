//! Sprites: the atomic 2D drawable.
//!
//! A `Sprite` stores flat scalar fields (what the sprite shader consumes) and
//! exposes grouped accessors for CPU-side code. `Line` is the second variant
//! that travels through the same constant buffer.

mod line;
mod sprite;
mod uv_split;

pub use line::Line;
pub use sprite::{Sprite, SpriteFlags, SpriteTexture};
pub use uv_split::{uv_split, UvSplit};
