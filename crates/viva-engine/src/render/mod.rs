//! GPU rendering subsystem.
//!
//! `Renderer` drives a `GpuBackend` with a constant-buffer protocol: one sprite,
//! line or mesh record per draw. `WgpuBackend` renders to a window surface;
//! `HeadlessBackend` records the calls for tests and tooling.
//!
//! Convention:
//! - Sprite world space is centred on the window, +Y down, 2 units tall at scale 1.
//! - Mesh space is left-handed, viewed through `Camera3D`.

mod backend;
mod camera;
mod error;
mod headless;
mod renderer;
mod uniforms;
mod wgpu_backend;

pub use backend::{
    BufferId, ConstantBuffer, FrameStatus, GpuBackend, RasterMode, TextureFilter, TextureId,
    Topology, VertexShader, VertexSource, VERTEX_SLOTS,
};
pub use camera::{Camera, Camera3D};
pub use error::RenderError;
pub use headless::{BackendCall, HeadlessBackend, HeadlessLog};
pub use renderer::{PipelineMode, Renderer, RendererConfig};
pub use uniforms::{
    Camera3DUniform, CameraUniform, MeshWorldUniform, PixelFlags, SpriteUniform,
    TransformUniform,
};
pub use wgpu_backend::WgpuBackend;
