use std::sync::Arc;

use anyhow::Context as _;
use lumen_core::{InputState, Time, TimeClock};
use lumen_renderer::{OverlayQueue, SceneContext};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::builder::AppConfig;
use crate::context::{AppContext, SetupContext};
use crate::graphics::GraphicsState;
use crate::traits::LumenApp;

/// Everything that only exists once the window is up.
struct Running {
    graphics: GraphicsState,
    scene: SceneContext,
    overlay: OverlayQueue,
}

struct Runner<A: LumenApp> {
    app: A,
    config: AppConfig,
    input: InputState,
    clock: TimeClock,
    running: Option<Running>,
    /// Elapsed time of the last statistics line.
    last_stats: f64,
    /// First fatal error; returned from [`run_internal`].
    error: Option<anyhow::Error>,
}

impl<A: LumenApp> Runner<A> {
    fn new(app: A, config: AppConfig) -> Self {
        Self {
            app,
            config,
            input: InputState::new(),
            clock: TimeClock::new(),
            running: None,
            last_stats: 0.0,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| anyhow::anyhow!("creating window: {e}"))?,
        );

        let mut graphics = pollster::block_on(GraphicsState::new(window, &self.config))?;
        let window_size = graphics.size();
        let mut scene = {
            let mut ctx = SetupContext {
                renderer: &mut graphics.renderer,
                config: &self.config,
                window_size,
            };
            self.app.setup(&mut ctx).context("app setup failed")?
        };
        scene.clear_color = self.config.clear_color();
        scene.resize(window_size.0 as f32 / window_size.1 as f32);

        log::info!(
            "scene ready: {} entities, {} materials, sky {}",
            scene.entities.len(),
            scene.materials().len(),
            if scene.sky.is_some() { "on" } else { "off" }
        );
        for mesh in scene.mesh_stats() {
            log::info!(
                "mesh `{}`: {} vertices, {} indices, {} triangles",
                mesh.name,
                mesh.vertices,
                mesh.indices,
                mesh.triangles
            );
        }

        Ok(Running {
            graphics,
            scene,
            overlay: OverlayQueue::new(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }
        running.graphics.resize(width, height);
        running.scene.resize(width as f32 / height as f32);
        if let Some(overlay) = self.app.overlay_renderer() {
            overlay.resize(width, height);
        }
        let mut ctx = AppContext {
            input: &mut self.input,
            time: self.clock.peek(),
            window_size: (width, height),
            scene: &mut running.scene,
            overlay: &mut running.overlay,
            renderer: &running.graphics.renderer,
            exit_requested: false,
        };
        self.app.on_resize((width, height), &mut ctx);
    }

    /// Update, then record and submit one frame.  `Ok(false)` asks the loop
    /// to stop.
    fn frame(&mut self) -> anyhow::Result<bool> {
        let Some(running) = self.running.as_mut() else {
            return Ok(true);
        };
        let time = self.clock.tick();

        // ── 1. UPDATE ────────────────────────────────────────────────────────
        let mut ctx = AppContext {
            input: &mut self.input,
            time,
            window_size: running.graphics.size(),
            scene: &mut running.scene,
            overlay: &mut running.overlay,
            renderer: &running.graphics.renderer,
            exit_requested: false,
        };
        self.app.update(&mut ctx);
        if ctx.exit_requested {
            return Ok(false);
        }
        running
            .scene
            .active_camera_mut()
            .update(time.delta, &mut self.input);

        // ── 2. RECORD + SUBMIT ───────────────────────────────────────────────
        let Some(frame) = running.graphics.acquire().context("acquiring surface texture")? else {
            self.input.end_frame();
            return Ok(true);
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let stats = running.graphics.renderer.render(
            &mut running.scene,
            &mut running.overlay,
            &time,
            &view,
            self.app.overlay_renderer(),
        )?;
        running.graphics.window.pre_present_notify();
        frame.present();

        if time.elapsed - self.last_stats >= self.config.stats_interval {
            self.last_stats = time.elapsed;
            log_stats(&time, &stats, running);
        }

        // edges must survive every callback of the frame
        self.input.end_frame();
        running.graphics.window.request_redraw();
        Ok(true)
    }
}

fn log_stats(time: &Time, stats: &lumen_renderer::FrameStats, running: &Running) {
    let staging = running.graphics.renderer.staging_stats();
    log::info!(
        "frame {}: {:.1} fps, {} draws, {} pipeline / {} material / {} mesh changes, {} B uploaded",
        time.frame_count,
        time.fps,
        stats.draws,
        stats.pipeline_changes,
        stats.material_changes,
        stats.mesh_changes,
        stats.bytes_uploaded
    );
    log::debug!("staging: {staging:?}");
}

impl<A: LumenApp> ApplicationHandler for Runner<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.graphics.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_window_event(&event);

        if let Some(running) = self.running.as_mut() {
            let mut ctx = AppContext {
                input: &mut self.input,
                time: self.clock.peek(),
                window_size: running.graphics.size(),
                scene: &mut running.scene,
                overlay: &mut running.overlay,
                renderer: &running.graphics.renderer,
                exit_requested: false,
            };
            self.app.on_window_event(&event, &mut ctx);
            if ctx.exit_requested {
                event_loop.exit();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match self.frame() {
                Ok(true) => {}
                Ok(false) => event_loop.exit(),
                Err(e) => self.fail(event_loop, e),
            },
            _ => {}
        }
    }
}

/// Runs the event loop to completion.  The first fatal error (window or GPU
/// setup, app setup, a failed frame) stops the loop and is returned.
pub(crate) fn run_internal<A: LumenApp + 'static>(config: AppConfig, app: A) -> anyhow::Result<()> {
    let mut runner = Runner::new(app, config);
    let event_loop =
        EventLoop::new().map_err(|e| anyhow::anyhow!("creating event loop: {e}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut runner)
        .map_err(|e| anyhow::anyhow!("event loop: {e}"))?;
    match runner.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
