use std::sync::Arc;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::catalog::Catalog;
use crate::config::{Config, DEFAULT_STAGGER};
use crate::error::AppError;
use crate::headless;
use crate::panel::{ControlPanel, PanelChanges, PanelStatus};
use crate::player::{LoopHandle, Player};
use crate::render::{GpuCanvas, GpuState};
use crate::sprite::sheet::SpriteSheet;
use crate::sprite::{DrawSurface, FrameSource};

/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
    /// FPS over the last completed log window.
    fps: f64,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
            fps: 0.0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            self.fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                self.fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
///
/// Everything here lives on the event-loop thread; the tick and the panel's
/// input handlers never run concurrently.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    panel: Option<ControlPanel>,

    sheet: SpriteSheet,
    background: [u8; 3],
    player: Player,
    canvas: GpuCanvas,
    loop_handle: LoopHandle,

    last_frame_time: Option<Instant>,
    frame_stats: FrameStats,

    /// Startup failure inside `resumed`, reported by `run` after exit.
    init_error: Option<AppError>,
}

impl App {
    fn new(
        sheet: SpriteSheet,
        background: [u8; 3],
        player: Player,
        canvas_w: u32,
        canvas_h: u32,
    ) -> Self {
        Self {
            window: None,
            gpu: None,
            panel: None,
            sheet,
            background,
            player,
            canvas: GpuCanvas::new(canvas_w, canvas_h),
            loop_handle: LoopHandle::new(),
            last_frame_time: None,
            frame_stats: FrameStats::new(),
            init_error: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (canvas_w, canvas_h) = self.canvas.size();
        let attrs = WindowAttributes::default()
            .with_title("sheetplay")
            .with_inner_size(winit::dpi::PhysicalSize::new(canvas_w, canvas_h));

        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = GpuState::new(window.clone(), &self.sheet, self.background)?;
        log::info!("wgpu + sprite pipeline initialized");

        let state = self.player.state();
        let panel = ControlPanel::new(
            &window,
            &gpu,
            self.player.catalog().names().map(str::to_owned).collect(),
            &state.current.name,
            state.stagger_frames,
        );

        self.gpu = Some(gpu);
        self.panel = Some(panel);
        self.window = Some(window);
        Ok(())
    }

    fn apply_changes(&mut self, changes: PanelChanges) {
        if let Some(name) = changes.animation {
            if let Err(e) = self.player.on_select_animation(&name) {
                log::warn!("{e}");
            }
        }
        // The slider already yields integers in range
        if let Some(stagger) = changes.stagger {
            self.player.set_stagger(stagger);
        }
    }

    fn on_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => self.loop_handle.stop(),
            PhysicalKey::Code(KeyCode::F1) => {
                if let Some(panel) = &mut self.panel {
                    panel.toggle();
                }
            }
            _ => {}
        }
    }

    /// One tick: advance the player into the canvas, then present it with
    /// the panel on top.
    fn redraw(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            self.frame_stats
                .record_frame(now.duration_since(last).as_secs_f64());
        }
        self.last_frame_time = Some(now);

        let frame = self.player.on_tick(&mut self.canvas);

        let (Some(window), Some(gpu), Some(panel)) =
            (&self.window, &self.gpu, &mut self.panel)
        else {
            return;
        };

        let Some(mut ctx) = gpu.begin_frame() else {
            return;
        };

        gpu.draw_canvas(&mut ctx.encoder, &ctx.view, &self.canvas);

        let state = self.player.state();
        let status = PanelStatus {
            tick_count: state.tick_count,
            frame,
            num_frames: state.current.num_frames,
            fps: self.frame_stats.fps,
        };
        let (w, h) = (gpu.surface_config.width, gpu.surface_config.height);
        let (changes, primitives, textures_delta, screen_descriptor) =
            panel.run_frame(window, w, h, &status);

        let extra = panel.prepare(
            &gpu.device,
            &gpu.queue,
            &mut ctx.encoder,
            &primitives,
            &textures_delta,
            &screen_descriptor,
        );
        {
            let mut pass = GpuState::begin_panel_pass(&mut ctx.encoder, &ctx.view);
            panel.render(&mut pass, &primitives, &screen_descriptor);
        }
        gpu.finish_frame(ctx.encoder, ctx.output, extra);
        panel.free_textures(&textures_delta);

        self.apply_changes(changes);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_graphics(event_loop) {
            self.init_error = Some(e);
            event_loop.exit();
            return;
        }

        // One tick per display refresh
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.loop_handle.is_running() {
            event_loop.exit();
            return;
        }

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(panel)) = (&self.window, &mut self.panel) {
            if panel.on_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.loop_handle.stop();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event),
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Player on `--animation`, with `--stagger` applied as raw input.
fn build_player(config: &Config, catalog: Catalog, source: FrameSource) -> Player {
    let mut player = Player::new(catalog, source, &config.animation, DEFAULT_STAGGER);
    player.on_stagger_change(&config.stagger);
    player
}

/// Load everything the player needs, then run the window or the headless dump.
pub fn run(config: Config) -> Result<(), AppError> {
    config.validate()?;

    let catalog = match &config.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    let source = FrameSource::new(config.cell_width, config.cell_height)?;
    let sheet = SpriteSheet::load(&config.sheet)?;
    let player = build_player(&config, catalog, source);

    if let Some(dir) = &config.dump {
        return headless::dump(&sheet, player, config.canvas_size(), dir, config.ticks);
    }

    let event_loop = EventLoop::new()?;
    let (canvas_w, canvas_h) = config.canvas_size();
    let mut app = App::new(sheet, config.background_rgb()?, player, canvas_w, canvas_h);
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn player_for(args: &[&str]) -> Player {
        let config = Config::parse_from(std::iter::once("sheetplay").chain(args.iter().copied()));
        let catalog = Catalog::from_json(r#"[{"name": "dizzy", "row": 4, "numFrames": 11}]"#).unwrap();
        build_player(&config, catalog, FrameSource::new(575, 523).unwrap())
    }

    #[test]
    fn cli_stagger_goes_through_input_parsing() {
        assert_eq!(player_for(&[]).state().stagger_frames, 5);
        assert_eq!(player_for(&["--stagger", "3.7"]).state().stagger_frames, 3);
        assert_eq!(player_for(&["--stagger", "-2"]).state().stagger_frames, -2);
        assert_eq!(player_for(&["--stagger", "fast"]).state().stagger_frames, 0);
    }
}
