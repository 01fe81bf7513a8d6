//! viva: a small 2D sprite and 3D mesh engine over wgpu.
//!
//! Sprites, lines and meshes are drawn by `render::Renderer` through a
//! constant-buffer protocol. Everything allocated at runtime lives in a
//! `resources::Registry`, which frees it in order at shutdown and reports
//! anything left over. `window::Runtime` runs an `core::App` in a window;
//! `engine::Engine` is the same frame loop without one.

pub mod logging;
pub mod time;
pub mod coords;
pub mod resources;
pub mod texture;
pub mod sprite;
pub mod animation;
pub mod dynamic;
pub mod text;
pub mod mesh;
pub mod render;
pub mod routine;
pub mod input;
pub mod device;
pub mod window;
pub mod core;
pub mod engine;
