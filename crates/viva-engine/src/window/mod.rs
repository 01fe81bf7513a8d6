//! Window and event loop.
//!
//! Owns the `winit` EventLoop and Window, builds an `Engine` over the window's
//! surface and drives it once per redraw.

mod input;
mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
