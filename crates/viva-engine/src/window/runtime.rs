use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl};
use crate::device::{Gpu, GpuInit};
use crate::engine::Engine;
use crate::input::{InputFrame, InputState};
use crate::render::{Renderer, RendererConfig, WgpuBackend};
use crate::time::Timer;

use super::input::translate_window_event;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "viva".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            resizable: true,
        }
    }
}

/// Requests from the application to the runtime.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(title.into()));
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.commands.push(Command::SetCursorVisible(visible));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn exit_requested(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Exit))
    }
}

#[derive(Debug)]
enum Command {
    SetTitle(String),
    SetCursorVisible(bool),
    Exit,
}

/// Entry point: opens the window and runs the app until it exits.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer_config: RendererConfig,
        app: A,
    ) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, gpu_init, renderer_config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,

    window: Window,

    #[borrows(window)]
    #[not_covariant]
    engine: Engine<'this>,
}

fn build_engine<'w>(
    window: &'w Window,
    gpu_init: GpuInit,
    renderer_config: RendererConfig,
) -> Result<Engine<'w>> {
    let gpu = pollster::block_on(Gpu::new(window, gpu_init))
        .context("GPU initialization failed for window")?;
    let renderer = Renderer::new(Box::new(WgpuBackend::new(gpu)), renderer_config);
    Ok(Engine::new(renderer))
}

struct RuntimeState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_config: RendererConfig,
    app: A,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> RuntimeState<A>
where
    A: App + 'static,
{
    fn new(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer_config: RendererConfig,
        app: A,
    ) -> Self {
        Self {
            config,
            gpu_init,
            renderer_config,
            app,
            entry: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn create_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let renderer_config = self.renderer_config.clone();

        let mut entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            window,
            engine_builder: |w| build_engine(w, gpu_init, renderer_config),
        }
        .try_build()?;

        let mut runtime = RuntimeCtx::default();
        let app = &mut self.app;
        entry.with_mut(|fields| -> Result<()> {
            fields
                .engine
                .start(app, fields.input_state, fields.input_frame, &mut runtime)?;
            // Loading time is not game time.
            fields.engine.timer = Timer::new();
            Ok(())
        })?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        self.apply_commands(runtime);
        Ok(())
    }

    fn apply_commands(&mut self, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::SetTitle(title) => {
                    if let Some(entry) = &self.entry {
                        entry.with_window(|w| w.set_title(&title));
                    }
                }
                Command::SetCursorVisible(visible) => {
                    if let Some(entry) = &self.entry {
                        entry.with_window(|w| w.set_cursor_visible(visible));
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }
    }

    /// Runs the app's exit hook and frees the registry, then drops the window.
    fn release(&mut self) {
        let Some(mut entry) = self.entry.take() else {
            return;
        };
        let app = &mut self.app;
        let mut runtime = RuntimeCtx::default();
        let leaks = entry.with_mut(|fields| {
            fields
                .engine
                .shutdown(app, fields.input_state, fields.input_frame, &mut runtime)
        });
        if !leaks.is_empty() {
            log::warn!("{} allocations outlived shutdown", leaks.len());
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.release();
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for RuntimeState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_entry(event_loop) {
            log::error!("failed to start: {e:#}");
            self.failure = Some(e);
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            self.shutdown(event_loop);
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            self.shutdown(event_loop);
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let mut exit_from_app_event = false;
        entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.input_state, &event) {
                fields.input_state.apply_event(fields.input_frame, ev);
            }
            if app.on_window_event(&event) == AppControl::Exit {
                exit_from_app_event = true;
            }
        });

        if exit_from_app_event {
            self.shutdown(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => {
                entry.with_engine_mut(|engine| engine.resize(size.width, size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.with_window(|w| w.inner_size());
                entry.with_engine_mut(|engine| engine.resize(size.width, size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let mut runtime = RuntimeCtx::default();
                let control = entry.with_mut(|fields| {
                    let control = fields.engine.frame(
                        app,
                        fields.input_state,
                        fields.input_frame,
                        &mut runtime,
                    );
                    fields.input_frame.clear();
                    control
                });

                if control == AppControl::Exit {
                    runtime.exit();
                }
                self.apply_commands(runtime);
                if self.exit_requested {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.release();
    }
}
