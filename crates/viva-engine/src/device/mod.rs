//! wgpu device and surface ownership.
//!
//! `Gpu` creates the instance, adapter, device, queue and the window surface, and
//! hands out one `GpuFrame` per presented image. Everything above it talks to the
//! GPU through `render::WgpuBackend`.

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
