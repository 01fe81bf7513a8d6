use crate::input::{InputFrame, InputState};
use crate::render::Renderer;
use crate::resources::Registry;
use crate::time::Timer;
use crate::window::RuntimeCtx;

/// Per-frame context passed to `App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by the renderer's backend
pub struct FrameCtx<'a, 'w> {
    pub renderer: &'a mut Renderer<'w>,
    pub registry: &'a mut Registry,
    pub timer: &'a Timer,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Seconds since the previous frame.
    #[inline]
    pub fn dt(&self) -> f32 {
        self.timer.tick_time()
    }

    /// Asks the runtime to close the window after this frame.
    pub fn exit(&mut self) {
        self.runtime.exit();
    }
}

/// Context passed to `App::on_draw`, between `begin_scene` and `end_scene`.
pub struct DrawCtx<'a, 'w> {
    pub renderer: &'a mut Renderer<'w>,
    pub registry: &'a mut Registry,
    pub timer: &'a Timer,
}
