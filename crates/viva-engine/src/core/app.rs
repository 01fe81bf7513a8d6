use winit::event::WindowEvent;

use super::ctx::{DrawCtx, FrameCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// A game driven by `Engine`.
///
/// Per frame the engine calls `on_frame`, advances routines, animations and
/// dynamics, draws the registry, then calls `on_draw` before presenting.
pub trait App {
    /// Called once, before the first frame. Load textures and allocate sprites here.
    fn on_start(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for raw window events, after input translation.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Per-frame game logic.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Extra draw calls (typically meshes) after the registry has drawn.
    fn on_draw(&mut self, ctx: &mut DrawCtx<'_, '_>) {
        let _ = ctx;
    }

    /// Called once before the registry is freed.
    fn on_exit(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        let _ = ctx;
    }
}
