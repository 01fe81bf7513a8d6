//! The contract between the engine loop and a game.
//!
//! Games implement `App`; the engine hands them a `FrameCtx` for logic and a
//! `DrawCtx` for extra draw calls.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{DrawCtx, FrameCtx};
