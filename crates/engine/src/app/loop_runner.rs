use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use super::host::{Host, HostFlow, Shell};
use super::input::{InputEvent, KeyPhase, PointerPhase};
use super::metrics::LoopMetrics;
use super::registry::WorldRegistry;
use super::rendering::{LayoutBox, Presenter, MIN_SURFACE_HEIGHT, MIN_SURFACE_WIDTH};
use super::session::Session;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    /// World to start instead of the menu.
    pub initial_world: Option<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Golf Worlds".to_string(),
            window_width: 1280,
            window_height: 720,
            max_frame_delta: Duration::from_millis(100),
            metrics_log_interval: Duration::from_secs(5),
            max_render_fps: Some(60),
            initial_world: None,
        }
    }
}

const FALLBACK_MAX_FRAME_DELTA: Duration = Duration::from_millis(100);
const FALLBACK_METRICS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to present frame: {0}")]
    Present(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and runs the menu/world loop until the user quits.
pub fn run_app<S: Shell>(
    config: LoopConfig,
    registry: WorldRegistry,
    shell: S,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_min_inner_size(LogicalSize::new(
                MIN_SURFACE_WIDTH as f64,
                MIN_SURFACE_HEIGHT as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );

    let session = Session::new(registry, window_layout(&window));
    let mut host = Host::new(session, shell);
    let mut presenter =
        Presenter::new(Arc::clone(&window), host.surface()).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut pacer = FramePacer::new(&config, Instant::now());
    let metrics_interval = if config.metrics_log_interval.is_zero() {
        FALLBACK_METRICS_INTERVAL
    } else {
        config.metrics_log_interval
    };
    info!(
        max_frame_delta_ms = pacer.max_frame_delta.as_millis() as u64,
        frame_budget_ms = ?pacer.frame_budget.map(|budget| budget.as_millis() as u64),
        metrics_log_interval_ms = metrics_interval.as_millis() as u64,
        initial_world = ?config.initial_world,
        "loop_config"
    );

    host.launch(config.initial_world.as_deref());

    let mut cursor = PhysicalPosition::new(0.0_f64, 0.0_f64);
    let mut metrics = LoopMetrics::new(metrics_interval, Instant::now());
    let mut failure: Option<AppError> = None;

    event_loop
        .run(|event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(size) => {
                    if let Err(error) = presenter.resize_window(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        failure = Some(AppError::Present(error));
                        window_target.exit();
                        return;
                    }
                    host.resize(window_layout(&window));
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = presenter.resize_window(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        failure = Some(AppError::Present(error));
                        window_target.exit();
                        return;
                    }
                    host.resize(window_layout(&window));
                }
                WindowEvent::CursorMoved { position, .. } => {
                    cursor = position;
                    let event = pointer_event(&window, PointerPhase::Move, cursor);
                    host.handle_input(event);
                }
                WindowEvent::CursorLeft { .. } => {
                    let event = pointer_event(&window, PointerPhase::Leave, cursor);
                    host.handle_input(event);
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    let phase = match state {
                        ElementState::Pressed => PointerPhase::Down,
                        ElementState::Released => PointerPhase::Up,
                    };
                    let event = pointer_event(&window, phase, cursor);
                    host.handle_input(event);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let Some(input) = key_event_to_input(&event) {
                        if host.handle_input(input) == HostFlow::Quit {
                            window_target.exit();
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let (measured, frame_dt) = pacer.begin_frame(now);
                    host.frame(frame_dt);

                    let idle = pacer.remaining_budget(Instant::now());
                    if !idle.is_zero() {
                        thread::sleep(idle);
                    }

                    if let Err(error) = presenter.present(host.surface()) {
                        warn!(error = %error, "renderer_draw_failed");
                        failure = Some(AppError::Present(error));
                        window_target.exit();
                        return;
                    }
                    pacer.presented(Instant::now());
                    metrics.record(measured);

                    if let Some(snapshot) = metrics.flush(now) {
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            world = host.session().active_world_id().unwrap_or("menu"),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                presenter.window().request_redraw();
            }
            Event::LoopExiting => {
                host.shutdown();
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    match failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn window_layout(window: &Window) -> LayoutBox {
    let logical = window.inner_size().to_logical::<f32>(window.scale_factor());
    LayoutBox::sized(logical.width, logical.height)
}

fn pointer_event(
    window: &Window,
    phase: PointerPhase,
    position: PhysicalPosition<f64>,
) -> InputEvent {
    let logical = position.to_logical::<f32>(window.scale_factor());
    InputEvent::pointer(phase, logical.x, logical.y)
}

/// Key repeats arrive as further presses, matching held-key handlers in worlds.
fn key_event_to_input(event: &KeyEvent) -> Option<InputEvent> {
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };
    let code = key_code_name(code);
    Some(match event.state {
        ElementState::Pressed => InputEvent::Key {
            phase: KeyPhase::Down,
            code,
        },
        ElementState::Released => InputEvent::Key {
            phase: KeyPhase::Up,
            code,
        },
    })
}

/// winit key codes are named after the W3C `KeyboardEvent.code` values.
fn key_code_name(code: KeyCode) -> String {
    format!("{code:?}")
}

/// Frame timing resolved from [`LoopConfig`]: dt clamping and the optional FPS cap.
#[derive(Debug, Clone, Copy)]
struct FramePacer {
    max_frame_delta: Duration,
    frame_budget: Option<Duration>,
    last_frame: Instant,
    last_present: Instant,
}

impl FramePacer {
    fn new(config: &LoopConfig, now: Instant) -> Self {
        let max_frame_delta = if config.max_frame_delta.is_zero() {
            FALLBACK_MAX_FRAME_DELTA
        } else {
            config.max_frame_delta
        };
        Self {
            max_frame_delta,
            frame_budget: config
                .max_render_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs(1) / fps),
            last_frame: now,
            last_present: now,
        }
    }

    /// Measured time since the previous frame, and the clamped dt handed to the session.
    fn begin_frame(&mut self, now: Instant) -> (Duration, Duration) {
        let measured = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        (measured, measured.min(self.max_frame_delta))
    }

    /// How long to wait before presenting so the cap holds. Zero when uncapped.
    fn remaining_budget(&self, now: Instant) -> Duration {
        let since_present = now.saturating_duration_since(self.last_present);
        self.frame_budget
            .map_or(Duration::ZERO, |budget| budget.saturating_sub(since_present))
    }

    fn presented(&mut self, now: Instant) {
        self.last_present = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer(max_frame_delta: Duration, max_render_fps: Option<u32>, now: Instant) -> FramePacer {
        let config = LoopConfig {
            max_frame_delta,
            max_render_fps,
            ..LoopConfig::default()
        };
        FramePacer::new(&config, now)
    }

    #[test]
    fn long_frames_are_clamped_for_the_session_only() {
        let base = Instant::now();
        let mut pacer = pacer(Duration::from_millis(100), None, base);
        let (measured, dt) = pacer.begin_frame(base + Duration::from_millis(900));
        assert_eq!(measured, Duration::from_millis(900));
        assert_eq!(dt, Duration::from_millis(100));

        let (measured, dt) = pacer.begin_frame(base + Duration::from_millis(916));
        assert_eq!((measured, dt), (Duration::from_millis(16), Duration::from_millis(16)));
    }

    #[test]
    fn zero_settings_fall_back() {
        let base = Instant::now();
        let pacer = pacer(Duration::ZERO, Some(0), base);
        assert_eq!(pacer.max_frame_delta, FALLBACK_MAX_FRAME_DELTA);
        assert_eq!(pacer.frame_budget, None);
        assert_eq!(pacer.remaining_budget(base), Duration::ZERO);
    }

    #[test]
    fn capped_pacer_waits_out_the_rest_of_the_budget() {
        let base = Instant::now();
        let mut pacer = pacer(Duration::from_millis(100), Some(50), base);
        assert_eq!(pacer.frame_budget, Some(Duration::from_millis(20)));
        assert_eq!(
            pacer.remaining_budget(base + Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert_eq!(
            pacer.remaining_budget(base + Duration::from_millis(25)),
            Duration::ZERO
        );

        pacer.presented(base + Duration::from_millis(25));
        assert_eq!(
            pacer.remaining_budget(base + Duration::from_millis(30)),
            Duration::from_millis(15)
        );
    }

    #[test]
    fn key_codes_use_w3c_names() {
        assert_eq!(key_code_name(KeyCode::Digit1), "Digit1");
        assert_eq!(key_code_name(KeyCode::Space), "Space");
        assert_eq!(key_code_name(KeyCode::ArrowUp), "ArrowUp");
        assert_eq!(key_code_name(KeyCode::KeyH), "KeyH");
        assert_eq!(key_code_name(KeyCode::Escape), "Escape");
        assert_eq!(key_code_name(KeyCode::Enter), "Enter");
    }
}
