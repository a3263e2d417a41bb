use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use grid_raycaster::framebuffer::{FrameBuffer, ScaleLut, present};
use grid_raycaster::renderer::render_frame;
use grid_raycaster::{Config, GridMap, InputEvent, Session};

/// Simulation speeds are per tick, so ticks are paced at a fixed rate.
const TICK: Duration = Duration::from_micros(16_667);

#[derive(Parser, Debug)]
#[command(version, about = "Grid raycaster with a top-down minimap")]
struct Cli {
    /// JSON config file; defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,
    /// Text map file (rows of 0/1); the built-in map when absent
    #[arg(long)]
    map: Option<PathBuf>,
    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    session: Session,

    // Frame rendered at config resolution, stretched to the window
    fb: FrameBuffer,
    scale_lut: ScaleLut,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    pacer: Pacer,
    failed: Option<anyhow::Error>,
}

impl App {
    fn new(session: Session) -> Self {
        let config = session.config();
        let fb = FrameBuffer::new(config.screen_width as usize, config.screen_height as usize);
        Self {
            window: None,
            surface: None,
            session,
            fb,
            scale_lut: ScaleLut::empty(),
            frame_counter: 0,
            last_fps_print: Instant::now(),
            pacer: Pacer::new(Instant::now(), TICK),
            failed: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let config = self.session.config();
        let attributes = Window::default_attributes()
            .with_title("Grid Raycaster")
            .with_inner_size(LogicalSize::new(
                config.screen_width as f64 * 2.0,
                config.screen_height as f64 * 2.0,
            ));
        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .context("creating window")?,
        );

        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| anyhow::anyhow!("softbuffer context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow::anyhow!("softbuffer surface: {e}"))?;

        let size = window.inner_size();
        self.rebuild_scale_lut(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        self.window = Some(window);
        self.pacer = Pacer::new(Instant::now(), TICK);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failed = Some(err);
        event_loop.exit();
    }

    fn rebuild_scale_lut(&mut self, dst_w: usize, dst_h: usize) {
        self.scale_lut = ScaleLut::new(dst_w, dst_h, self.fb.width, self.fb.height);
    }

    fn redraw(&mut self, id: WindowId) -> anyhow::Result<()> {
        let frame = if self.pacer.take_due() {
            self.session.tick()
        } else {
            self.session.render_frame()
        };
        render_frame(&mut self.fb, &self.session, &frame);

        let Some(window) = self.window.as_ref().filter(|w| w.id() == id) else {
            return Ok(());
        };
        let size = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // minimized
        };
        let (dw, dh) = (size.width as usize, size.height as usize);
        if self.scale_lut.dst_size() != (dw, dh) {
            self.rebuild_scale_lut(dw, dh);
        }

        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        surface
            .resize(w, h)
            .map_err(|e| anyhow::anyhow!("resizing surface: {e}"))?;
        let mut buf = surface
            .buffer_mut()
            .map_err(|e| anyhow::anyhow!("locking surface: {e}"))?;
        present(&mut buf, dw, &self.fb, &self.scale_lut);
        buf.present()
            .map_err(|e| anyhow::anyhow!("presenting frame: {e}"))?;

        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            let pose = frame.pose;
            log::debug!(
                "fps {:.1}, pos ({:.1}, {:.1}), heading {:.3}",
                self.frame_counter as f32 / elapsed,
                pose.pos[0],
                pose.pos[1],
                pose.heading
            );
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
        Ok(())
    }
}

fn input_event(code: KeyCode) -> Option<InputEvent> {
    match code {
        KeyCode::ArrowUp | KeyCode::KeyW => Some(InputEvent::MoveForward),
        KeyCode::ArrowDown | KeyCode::KeyS => Some(InputEvent::MoveBackward),
        KeyCode::ArrowLeft | KeyCode::KeyA => Some(InputEvent::TurnLeft),
        KeyCode::ArrowRight | KeyCode::KeyD => Some(InputEvent::TurnRight),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                } else if let Some(input) = input_event(code) {
                    self.session
                        .handle(input, state == ElementState::Pressed);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(id) {
                    self.fail(event_loop, err);
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_scale_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.pacer.poll(Instant::now()) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.next()));
    }
}

/// Fixed-rate tick schedule. Redraws the OS asks for (resize, expose) do
/// not advance the simulation; only a fired deadline does.
struct Pacer {
    next: Instant,
    period: Duration,
    due: bool,
}

impl Pacer {
    fn new(start: Instant, period: Duration) -> Self {
        Self {
            next: start,
            period,
            due: false,
        }
    }

    /// Returns true when the deadline has passed and a redraw should be
    /// requested; the tick stays pending until `take_due`.
    fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        // don't try to catch up after a stall
        self.next = (self.next + self.period).max(now);
        self.due = true;
        true
    }

    fn take_due(&mut self) -> bool {
        std::mem::take(&mut self.due)
    }

    fn next(&self) -> Instant {
        self.next
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Some(
            Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        ),
        None => None,
    };

    let (config, map) = match (loaded, &cli.map) {
        (Some(config), Some(path)) => {
            let map = GridMap::load(path, config.cell_size)
                .with_context(|| format!("loading map {}", path.display()))?;
            (config, map)
        }
        (Some(config), None) => {
            let map = GridMap::default_layout(config.cell_size);
            (config, map)
        }
        (None, Some(path)) => {
            let map = GridMap::load(path, Config::default().cell_size)
                .with_context(|| format!("loading map {}", path.display()))?;
            (Config::sized_for(&map), map)
        }
        (None, None) => {
            let config = Config::default();
            let map = GridMap::default_layout(config.cell_size);
            (config, map)
        }
    };

    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let session = Session::new(config, map).context("invalid map or config")?;

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(session);
    event_loop.run_app(&mut app).context("running event loop")?;

    match app.failed.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
