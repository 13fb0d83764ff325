//! Kaleidosynth - a seeded coordinate network you can see and hear
//!
//! Every tick the network paints a field; the same numbers are run through a
//! harmonic spectral mask and streamed to the speakers.

use clap::Parser;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use kaleidosynth::audio::{AudioDoubleBuffer, AudioSystem, RealtimeFeed};
use kaleidosynth::capture;
use kaleidosynth::cli::Args;
use kaleidosynth::controls::Command;
use kaleidosynth::engine::Kaleidosynth;
use kaleidosynth::params::Settings;
use kaleidosynth::rendering::RenderSystem;

/// Main application state
struct App {
    settings: Settings,

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Tick and audio contexts
    synth: Option<Kaleidosynth>,
    audio: Option<AudioSystem>,

    // Fixed-interval tick timer
    tick_interval: Duration,
    next_tick: Instant,

    failed: bool,
}

impl App {
    fn new(settings: Settings) -> Self {
        let tick_interval = Duration::from_secs_f64(1.0 / settings.field.fps as f64);
        Self {
            settings,
            window: None,
            render_system: None,
            synth: None,
            audio: None,
            tick_interval,
            next_tick: Instant::now(),
            failed: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, context: &str, error: impl std::fmt::Display) {
        log::error!("{}: {}", context, error);
        self.failed = true;
        event_loop.exit();
    }

    /// Run one tick and hand the new field to the renderer
    fn step(&mut self) {
        let Some(synth) = self.synth.as_mut() else {
            return;
        };
        if let Err(e) = synth.tick() {
            log::error!("Tick failed: {}", e);
            return;
        }
        if let (Some(render_system), Ok(field)) = (self.render_system.as_mut(), synth.visual_field()) {
            render_system.upload_field(&field);
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Keyboard mapping: 1-9 select a template, 0 clears, R/M/P act
fn key_command(code: KeyCode) -> Option<Command> {
    let digit = match code {
        KeyCode::Digit0 => 0,
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        KeyCode::Digit9 => 9,
        KeyCode::KeyR => return Some(Command::Reseed),
        KeyCode::KeyM => return Some(Command::ToggleMelody),
        KeyCode::KeyP => return Some(Command::TogglePercussion),
        _ => return None,
    };
    Command::for_digit(digit)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let (width, height) = self.settings.field.window_size();
        let window_attributes = Window::default_attributes()
            .with_title("Kaleidosynth")
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, "Failed to create window", e),
        };

        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.settings.field.width as u32,
            self.settings.field.height as u32,
        )) {
            Ok(render_system) => render_system,
            Err(e) => return self.fail(event_loop, "Failed to initialize renderer", e),
        };

        let (writer, reader) = AudioDoubleBuffer::new(self.settings.field.sample_count());
        let synth = match Kaleidosynth::new(&self.settings, writer) {
            Ok(synth) => synth,
            Err(e) => return self.fail(event_loop, "Failed to build synth", e),
        };

        // Visuals keep running without a sound device
        let feed = RealtimeFeed::new(reader, self.settings.audio.stereo);
        let audio = match AudioSystem::new(feed, &self.settings.audio) {
            Ok(audio) => Some(audio),
            Err(e) => {
                log::error!("{}; continuing without sound", e);
                None
            }
        };

        log::info!(
            "Kaleidosynth is running: 1-{} select a template, 0 clears, R reseeds, M melody, P percussion, Esc quits",
            synth.template_count().min(9)
        );

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.synth = Some(synth);
        self.audio = audio;

        self.next_tick = Instant::now();
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_tick {
            self.step();
            self.next_tick += self.tick_interval;
            // Drop missed ticks instead of bursting to catch up
            if self.next_tick < now {
                self.next_tick = now + self.tick_interval;
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                } else if let (Some(command), Some(synth)) = (key_command(code), self.synth.as_mut()) {
                    synth.push_command(command);
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(render_system) = self.render_system.as_mut() {
                    if let Err(e) = render_system.render() {
                        log::error!("Render error: {}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut audio) = self.audio.take() {
            audio.shutdown();
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = match args.to_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    if let Some(recording) = args.recording_config() {
        if let Err(e) = capture::record(&settings, &recording) {
            log::error!("Recording failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };

    let mut app = App::new(settings);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
    if app.failed {
        std::process::exit(1);
    }
}
