//! One frame of the game loop, independent of the window system.

use std::time::Instant;

use anyhow::Context;

use crate::core::{App, AppControl, DrawCtx, FrameCtx};
use crate::input::{InputFrame, InputState};
use crate::render::{FrameStatus, HeadlessLog, Renderer};
use crate::resources::{Allocation, Registry};
use crate::time::Timer;
use crate::window::RuntimeCtx;

/// Renderer, registry and clock of one window.
pub struct Engine<'w> {
    pub renderer: Renderer<'w>,
    pub registry: Registry,
    pub timer: Timer,
}

impl<'w> Engine<'w> {
    pub fn new(renderer: Renderer<'w>) -> Self {
        Self {
            renderer,
            registry: Registry::new(),
            timer: Timer::new(),
        }
    }

    /// Runs `App::on_start`.
    pub fn start<A: App + ?Sized>(
        &mut self,
        app: &mut A,
        input: &InputState,
        input_frame: &InputFrame,
        runtime: &mut RuntimeCtx,
    ) -> anyhow::Result<()> {
        let mut ctx = FrameCtx {
            renderer: &mut self.renderer,
            registry: &mut self.registry,
            timer: &self.timer,
            input,
            input_frame,
            runtime,
        };
        app.on_start(&mut ctx).context("application failed to start")
    }

    /// Samples the wall clock and runs one frame.
    pub fn frame<A: App + ?Sized>(
        &mut self,
        app: &mut A,
        input: &InputState,
        input_frame: &InputFrame,
        runtime: &mut RuntimeCtx,
    ) -> AppControl {
        self.timer.update();
        self.step(app, input, input_frame, runtime)
    }

    /// Runs one frame as if the clock read `now`.
    pub fn frame_at<A: App + ?Sized>(
        &mut self,
        now: Instant,
        app: &mut A,
        input: &InputState,
        input_frame: &InputFrame,
        runtime: &mut RuntimeCtx,
    ) -> AppControl {
        self.timer.update_at(now);
        self.step(app, input, input_frame, runtime)
    }

    /// Logic, routines, animations, dynamics, then draw and present.
    ///
    /// An `Exit` from `on_frame` skips drawing. A fatal present also exits.
    fn step<A: App + ?Sized>(
        &mut self,
        app: &mut A,
        input: &InputState,
        input_frame: &InputFrame,
        runtime: &mut RuntimeCtx,
    ) -> AppControl {
        let control = {
            let mut ctx = FrameCtx {
                renderer: &mut self.renderer,
                registry: &mut self.registry,
                timer: &self.timer,
                input,
                input_frame,
                runtime,
            };
            app.on_frame(&mut ctx)
        };
        if control == AppControl::Exit {
            return AppControl::Exit;
        }

        self.registry.update_routines(&self.timer);
        self.registry.update_animations(&self.timer);
        self.registry.update_dynamics(&self.timer);

        self.renderer.begin_scene();
        self.registry.draw(&mut self.renderer);
        app.on_draw(&mut DrawCtx {
            renderer: &mut self.renderer,
            registry: &mut self.registry,
            timer: &self.timer,
        });

        match self.renderer.end_scene() {
            FrameStatus::Fatal => AppControl::Exit,
            FrameStatus::Presented | FrameStatus::Skipped => AppControl::Continue,
        }
    }

    /// Follows a window resize, in physical pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    /// Runs `App::on_exit`, frees the registry and returns whatever is still
    /// tracked afterwards.
    pub fn shutdown<A: App + ?Sized>(
        &mut self,
        app: &mut A,
        input: &InputState,
        input_frame: &InputFrame,
        runtime: &mut RuntimeCtx,
    ) -> Vec<Allocation> {
        {
            let mut ctx = FrameCtx {
                renderer: &mut self.renderer,
                registry: &mut self.registry,
                timer: &self.timer,
                input,
                input_frame,
                runtime,
            };
            app.on_exit(&mut ctx);
        }
        self.registry.free_all(&mut self.renderer);
        self.registry.report_leaks()
    }
}

impl Engine<'static> {
    /// An engine over a recording backend.
    pub fn headless(width: u32, height: u32) -> (Self, HeadlessLog) {
        let (renderer, log) = Renderer::headless(width, height);
        (Self::new(renderer), log)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::render::BackendCall;
    use crate::resources::{SpriteId, TextureSlot};
    use crate::sprite::Sprite;

    #[derive(Default)]
    struct Game {
        texture: Option<TextureSlot>,
        sprite: Option<SpriteId>,
        frames: u32,
        draws: u32,
        exit_after: Option<u32>,
    }

    impl App for Game {
        fn on_start(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()> {
            let texture = ctx.renderer.create_texture_from_bytes(2, 2, &[255; 16])?;
            let id = texture.id;
            self.texture = Some(ctx.registry.add_texture(texture));

            let sprite = ctx.registry.add_sprite(Sprite::new(Some(id)));
            let dynamic = ctx.registry.add_dynamic(sprite, ctx.timer);
            if let Some(d) = ctx.registry.dynamic_mut(dynamic) {
                d.velocity.x = 2.0;
            }
            self.sprite = Some(sprite);
            Ok(())
        }

        fn on_frame(&mut self, _ctx: &mut FrameCtx<'_, '_>) -> AppControl {
            self.frames += 1;
            match self.exit_after {
                Some(n) if self.frames > n => AppControl::Exit,
                _ => AppControl::Continue,
            }
        }

        fn on_draw(&mut self, _ctx: &mut DrawCtx<'_, '_>) {
            self.draws += 1;
        }
    }

    struct Ctx {
        input: InputState,
        frame: InputFrame,
        runtime: RuntimeCtx,
    }

    fn ctx() -> Ctx {
        Ctx {
            input: InputState::default(),
            frame: InputFrame::default(),
            runtime: RuntimeCtx::default(),
        }
    }

    #[test]
    fn frame_updates_then_draws_then_presents() {
        let (mut engine, log) = Engine::headless(64, 64);
        let t0 = Instant::now();
        engine.timer = Timer::starting_at(t0);
        let mut game = Game::default();
        let mut c = ctx();

        engine
            .start(&mut game, &c.input, &c.frame, &mut c.runtime)
            .unwrap();
        log.take();

        let control = engine.frame_at(
            t0 + Duration::from_millis(500),
            &mut game,
            &c.input,
            &c.frame,
            &mut c.runtime,
        );
        assert_eq!(control, AppControl::Continue);
        assert_eq!((game.frames, game.draws), (1, 1));

        let sprite = engine.registry.sprite(game.sprite.unwrap()).unwrap();
        assert!((sprite.x - 1.0).abs() < 1e-4);

        let calls = log.take();
        let begin = calls
            .iter()
            .position(|c| matches!(c, BackendCall::BeginFrame(_)))
            .unwrap();
        let draw = calls
            .iter()
            .position(|c| matches!(c, BackendCall::Draw { .. }))
            .unwrap();
        assert!(begin < draw);
        assert_eq!(calls.last(), Some(&BackendCall::Present));
    }

    #[test]
    fn exit_from_on_frame_skips_drawing() {
        let (mut engine, log) = Engine::headless(64, 64);
        let mut game = Game {
            exit_after: Some(0),
            ..Game::default()
        };
        let mut c = ctx();
        engine
            .start(&mut game, &c.input, &c.frame, &mut c.runtime)
            .unwrap();

        let control = engine.frame(&mut game, &c.input, &c.frame, &mut c.runtime);
        assert_eq!(control, AppControl::Exit);
        assert_eq!(game.draws, 0);
        assert_eq!(log.count(|c| matches!(c, BackendCall::Present)), 0);
    }

    #[test]
    fn shutdown_releases_gpu_resources() {
        let (mut engine, log) = Engine::headless(64, 64);
        let mut game = Game::default();
        let mut c = ctx();
        engine
            .start(&mut game, &c.input, &c.frame, &mut c.runtime)
            .unwrap();
        assert_eq!(log.live_textures().len(), 1);

        let leaks = engine.shutdown(&mut game, &c.input, &c.frame, &mut c.runtime);
        assert!(leaks.is_empty());
        assert!(log.live_textures().is_empty());
        assert!(engine.registry.texture(game.texture.unwrap()).is_none());
    }

    #[test]
    fn start_errors_carry_context() {
        struct Broken;
        impl App for Broken {
            fn on_start(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()> {
                ctx.renderer.create_texture_from_bytes(0, 0, &[])?;
                Ok(())
            }
            fn on_frame(&mut self, _ctx: &mut FrameCtx<'_, '_>) -> AppControl {
                AppControl::Continue
            }
        }

        let (mut engine, _log) = Engine::headless(8, 8);
        let mut c = ctx();
        let err = engine
            .start(&mut Broken, &c.input, &c.frame, &mut c.runtime)
            .unwrap_err();
        assert!(format!("{err:#}").starts_with("application failed to start"));
    }
}
