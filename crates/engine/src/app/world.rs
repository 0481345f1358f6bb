use std::time::Duration;

use crate::math::clamp;

use super::input::{InputEvent, InputRouter, KeyState, PointerPhase, PointerState};
use super::rendering::{LayoutBox, RenderSurface};
use super::timers::{TimerQueue, TimerTag};

const REFERENCE_FRAME_SECONDS: f32 = 1.0 / 60.0;
const MAX_FRAME_SCALE: f32 = 4.0;

/// Timing for one frame of the active world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub dt: Duration,
    /// Session clock at the start of this frame.
    pub now: Duration,
    pub index: u64,
}

impl FrameTick {
    pub fn dt_seconds(&self) -> f32 {
        self.dt.as_secs_f32()
    }

    pub fn dt_millis(&self) -> f32 {
        self.dt.as_secs_f32() * 1000.0
    }

    /// Multiplier for constants tuned per 60 Hz frame.
    pub fn frame_scale(&self) -> f32 {
        clamp(self.dt_seconds() / REFERENCE_FRAME_SECONDS, 0.0, MAX_FRAME_SCALE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    /// Schedule another frame.
    Continue,
    /// Stop requesting frames until something calls `resume_frames`.
    Halt,
}

/// Transition a world asks the session to perform once its handler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    Menu,
    World(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudText {
    pub title: String,
    pub subtitle: String,
    pub hint: String,
    pub status: String,
}

#[derive(Debug, Default)]
pub(crate) struct WorldEffects {
    pub(crate) request: Option<SessionRequest>,
    pub(crate) resume_frames: bool,
}

/// Everything a world may touch while one of its hooks runs.
pub struct WorldContext<'a> {
    surface: &'a mut RenderSurface,
    keys: &'a KeyState,
    pointer: PointerState,
    timers: &'a mut TimerQueue,
    hud: &'a mut HudText,
    effects: &'a mut WorldEffects,
    now: Duration,
}

impl<'a> WorldContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        surface: &'a mut RenderSurface,
        keys: &'a KeyState,
        pointer: PointerState,
        timers: &'a mut TimerQueue,
        hud: &'a mut HudText,
        effects: &'a mut WorldEffects,
        now: Duration,
    ) -> Self {
        Self {
            surface,
            keys,
            pointer,
            timers,
            hud,
            effects,
            now,
        }
    }

    pub fn surface(&self) -> &RenderSurface {
        self.surface
    }

    pub fn surface_mut(&mut self) -> &mut RenderSurface {
        self.surface
    }

    pub fn width(&self) -> f32 {
        self.surface.width() as f32
    }

    pub fn height(&self) -> f32 {
        self.surface.height() as f32
    }

    pub fn keys(&self) -> &KeyState {
        self.keys
    }

    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys.is_down(code)
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `on_timer(tag)` after `delay`. The timer is dropped if the
    /// world stops first.
    pub fn schedule(&mut self, delay: Duration, tag: TimerTag) {
        self.timers.schedule(self.now, delay, tag);
    }

    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.hud.hint = hint.into();
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.hud.status = status.into();
    }

    pub fn hud(&self) -> &HudText {
        self.hud
    }

    pub fn request_menu(&mut self) {
        self.effects.request = Some(SessionRequest::Menu);
    }

    pub fn request_world(&mut self, id: impl Into<String>) {
        self.effects.request = Some(SessionRequest::World(id.into()));
    }

    /// Restarts the frame loop after the world returned [`FrameControl::Halt`].
    pub fn resume_frames(&mut self) {
        self.effects.resume_frames = true;
    }
}

/// Lifecycle contract shared by every world.
///
/// Only `start` and `frame` are required; the remaining hooks default to
/// no-ops so a world implements just the input it cares about.
pub trait World {
    /// Resets all state from the current surface size. Called once per run,
    /// and again on every replay.
    fn start(&mut self, ctx: &mut WorldContext<'_>);

    /// Advances one tick and repaints the whole surface.
    fn frame(&mut self, tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl;

    fn stop(&mut self) {}

    fn on_pointer_move(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {}

    fn on_pointer_down(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {}

    fn on_pointer_up(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {}

    fn on_pointer_leave(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {}

    fn on_key_down(&mut self, _code: &str, _ctx: &mut WorldContext<'_>) {}

    fn on_key_up(&mut self, _code: &str, _ctx: &mut WorldContext<'_>) {}

    /// The surface was resized; re-derive any size-relative geometry.
    fn on_resize(&mut self, _ctx: &mut WorldContext<'_>) {}

    fn on_timer(&mut self, _tag: TimerTag, _ctx: &mut WorldContext<'_>) {}
}

/// Headless owner of everything a [`WorldContext`] borrows.
///
/// Drives a single world directly without a session, registry or window.
/// Pointer coordinates passed in are already surface pixels.
pub struct WorldSandbox {
    surface: RenderSurface,
    router: InputRouter,
    timers: TimerQueue,
    hud: HudText,
    effects: WorldEffects,
    now: Duration,
    frame_index: u64,
}

impl WorldSandbox {
    pub fn new(width: f32, height: f32) -> Self {
        let mut surface = RenderSurface::new();
        surface.resize(LayoutBox::sized(width, height));
        Self {
            surface,
            router: InputRouter::new(),
            timers: TimerQueue::new(),
            hud: HudText::default(),
            effects: WorldEffects::default(),
            now: Duration::ZERO,
            frame_index: 0,
        }
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn hud(&self) -> &HudText {
        &self.hud
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn take_request(&mut self) -> Option<SessionRequest> {
        self.effects.request.take()
    }

    pub fn take_resume(&mut self) -> bool {
        std::mem::take(&mut self.effects.resume_frames)
    }

    pub fn with_context<R>(&mut self, run: impl FnOnce(&mut WorldContext<'_>) -> R) -> R {
        let mut ctx = WorldContext::new(
            &mut self.surface,
            self.router.keys(),
            self.router.pointer(),
            &mut self.timers,
            &mut self.hud,
            &mut self.effects,
            self.now,
        );
        run(&mut ctx)
    }

    pub fn start(&mut self, world: &mut dyn World) {
        self.with_context(|ctx| world.start(ctx));
    }

    /// Advances the clock by `dt`, fires due timers, then runs one frame.
    pub fn frame(&mut self, world: &mut dyn World, dt: Duration) -> FrameControl {
        self.now = self.now.saturating_add(dt);
        self.fire_timers(world);
        let tick = FrameTick {
            dt,
            now: self.now,
            index: self.frame_index,
        };
        self.frame_index += 1;
        self.with_context(|ctx| world.frame(&tick, ctx))
    }

    /// Runs `count` frames of `dt` each and returns the last frame's control.
    pub fn frames(&mut self, world: &mut dyn World, count: usize, dt: Duration) -> FrameControl {
        let mut control = FrameControl::Continue;
        for _ in 0..count {
            control = self.frame(world, dt);
        }
        control
    }

    /// Advances the clock without running a frame, firing timers that come due.
    pub fn advance(&mut self, world: &mut dyn World, dt: Duration) {
        self.now = self.now.saturating_add(dt);
        self.fire_timers(world);
    }

    /// Invalidates every pending timer, as a session does when a world stops.
    pub fn stop(&mut self, world: &mut dyn World) {
        world.stop();
        self.timers.advance_generation();
    }

    pub fn resize(&mut self, world: &mut dyn World, width: f32, height: f32) {
        if self.surface.resize(LayoutBox::sized(width, height)) {
            self.with_context(|ctx| world.on_resize(ctx));
        }
    }

    pub fn input(&mut self, world: &mut dyn World, event: InputEvent) {
        let layout = LayoutBox::sized(self.surface.width() as f32, self.surface.height() as f32);
        let size = (self.surface.width(), self.surface.height());
        if let Some(routed) = self.router.route(&event, layout, size) {
            self.with_context(|ctx| routed.dispatch_to(world, ctx));
        }
    }

    pub fn pointer_move(&mut self, world: &mut dyn World, x: f32, y: f32) {
        self.input(world, InputEvent::pointer(PointerPhase::Move, x, y));
    }

    pub fn pointer_down(&mut self, world: &mut dyn World, x: f32, y: f32) {
        self.input(world, InputEvent::pointer(PointerPhase::Down, x, y));
    }

    pub fn pointer_up(&mut self, world: &mut dyn World, x: f32, y: f32) {
        self.input(world, InputEvent::pointer(PointerPhase::Up, x, y));
    }

    pub fn click(&mut self, world: &mut dyn World, x: f32, y: f32) {
        self.pointer_down(world, x, y);
        self.pointer_up(world, x, y);
    }

    pub fn key_down(&mut self, world: &mut dyn World, code: &str) {
        self.input(world, InputEvent::key_down(code));
    }

    pub fn key_up(&mut self, world: &mut dyn World, code: &str) {
        self.input(world, InputEvent::key_up(code));
    }

    pub fn press_key(&mut self, world: &mut dyn World, code: &str) {
        self.key_down(world, code);
        self.key_up(world, code);
    }

    fn fire_timers(&mut self, world: &mut dyn World) {
        for tag in self.timers.take_due(self.now) {
            self.with_context(|ctx| world.on_timer(tag, ctx));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        starts: u32,
        frames: u32,
        timers: Vec<TimerTag>,
        keys: Vec<String>,
    }

    impl World for Recorder {
        fn start(&mut self, ctx: &mut WorldContext<'_>) {
            self.starts += 1;
            ctx.set_hint("hint");
            ctx.schedule(Duration::from_millis(100), TimerTag::new(1));
        }

        fn frame(&mut self, _tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl {
            self.frames += 1;
            ctx.surface_mut().fill([1, 2, 3, 255]);
            FrameControl::Continue
        }

        fn on_key_down(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
            self.keys.push(code.to_string());
            if code == "Escape" {
                ctx.request_menu();
            }
        }

        fn on_timer(&mut self, tag: TimerTag, _ctx: &mut WorldContext<'_>) {
            self.timers.push(tag);
        }
    }

    #[test]
    fn frame_scale_is_one_at_sixty_hz() {
        let tick = FrameTick {
            dt: Duration::from_secs_f64(1.0 / 60.0),
            now: Duration::ZERO,
            index: 0,
        };
        assert!((tick.frame_scale() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn frame_scale_is_clamped_for_long_frames() {
        let tick = FrameTick {
            dt: Duration::from_secs(2),
            now: Duration::ZERO,
            index: 0,
        };
        assert_eq!(tick.frame_scale(), MAX_FRAME_SCALE);
    }

    #[test]
    fn sandbox_delivers_timers_once_they_are_due() {
        let mut sandbox = WorldSandbox::new(800.0, 480.0);
        let mut world = Recorder::default();
        sandbox.start(&mut world);
        assert_eq!(sandbox.hud().hint, "hint");

        sandbox.frame(&mut world, Duration::from_millis(50));
        assert!(world.timers.is_empty());
        sandbox.frame(&mut world, Duration::from_millis(50));
        assert_eq!(world.timers, vec![TimerTag::new(1)]);
        assert_eq!(world.frames, 2);
        assert_eq!(sandbox.surface().pixel(5, 5), Some([1, 2, 3, 255]));
    }

    #[test]
    fn sandbox_stop_invalidates_pending_timers() {
        let mut sandbox = WorldSandbox::new(800.0, 480.0);
        let mut world = Recorder::default();
        sandbox.start(&mut world);
        sandbox.stop(&mut world);
        sandbox.advance(&mut world, Duration::from_secs(1));
        assert!(world.timers.is_empty());
    }

    #[test]
    fn requests_surface_through_effects() {
        let mut sandbox = WorldSandbox::new(800.0, 480.0);
        let mut world = Recorder::default();
        sandbox.press_key(&mut world, "Escape");
        assert_eq!(world.keys, vec!["Escape".to_string()]);
        assert_eq!(sandbox.take_request(), Some(SessionRequest::Menu));
        assert_eq!(sandbox.take_request(), None);
    }
}
