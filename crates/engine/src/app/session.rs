use std::time::Duration;

use tracing::{debug, info, warn};

use super::input::{InputEvent, InputRouter, RoutedInput};
use super::registry::{UnknownWorldError, WorldInfo, WorldRegistry};
use super::rendering::{LayoutBox, RenderSurface};
use super::timers::TimerQueue;
use super::world::{
    FrameControl, FrameTick, HudText, SessionRequest, World, WorldContext, WorldEffects,
};

/// The one outstanding request for a frame of the active world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle {
    pub id: u64,
    pub generation: u64,
}

/// A world change that happened as a consequence of input, a frame or a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started(WorldInfo),
    Menu,
    StartFailed(UnknownWorldError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Handled by the active world with no transition.
    Delivered,
    /// No world is active; the caller (the shell) may act on it.
    Idle(RoutedInput),
    /// Consumed by the router, e.g. the release of a latched press.
    Swallowed,
    Transition(Transition),
}

/// Disjoint borrows of the session for painting the shell.
pub struct PaintParts<'a> {
    pub surface: &'a mut RenderSurface,
    pub registry: &'a WorldRegistry,
    pub hud: &'a HudText,
    pub active: Option<WorldInfo>,
    pub clock: Duration,
    pub frames_run: u64,
}

struct ActiveWorld {
    world: Box<dyn World>,
    info: WorldInfo,
    generation: u64,
}

/// Owns the single active world, its frame schedule, and everything it draws into.
pub struct Session {
    registry: WorldRegistry,
    surface: RenderSurface,
    layout: LayoutBox,
    router: InputRouter,
    timers: TimerQueue,
    hud: HudText,
    effects: WorldEffects,
    active: Option<ActiveWorld>,
    pending_frame: Option<FrameHandle>,
    next_frame_id: u64,
    frame_index: u64,
    clock: Duration,
}

impl Session {
    pub fn new(registry: WorldRegistry, layout: LayoutBox) -> Self {
        let mut surface = RenderSurface::new();
        surface.resize(layout);
        Self {
            registry,
            surface,
            layout,
            router: InputRouter::new(),
            timers: TimerQueue::new(),
            hud: HudText::default(),
            effects: WorldEffects::default(),
            active: None,
            pending_frame: None,
            next_frame_id: 0,
            frame_index: 0,
            clock: Duration::ZERO,
        }
    }

    pub fn registry(&self) -> &WorldRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut RenderSurface {
        &mut self.surface
    }

    pub fn hud(&self) -> &HudText {
        &self.hud
    }

    pub fn layout(&self) -> LayoutBox {
        self.layout
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn active_info(&self) -> Option<WorldInfo> {
        self.active.as_ref().map(|active| active.info)
    }

    pub fn active_world_id(&self) -> Option<&'static str> {
        self.active.as_ref().map(|active| active.info.id)
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn generation(&self) -> u64 {
        self.timers.generation()
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of world frames run over the session's lifetime.
    pub fn frames_run(&self) -> u64 {
        self.frame_index
    }

    pub fn paint_parts(&mut self) -> PaintParts<'_> {
        PaintParts {
            active: self.active.as_ref().map(|active| active.info),
            surface: &mut self.surface,
            registry: &self.registry,
            hud: &self.hud,
            clock: self.clock,
            frames_run: self.frame_index,
        }
    }

    /// Stops whatever runs, then builds, sizes and starts world `id`.
    ///
    /// The id is checked before anything is stopped, so an unknown id leaves
    /// the session exactly as it was.
    pub fn start_world(&mut self, id: &str) -> Result<WorldInfo, UnknownWorldError> {
        let (world, info) = match self.registry.create(id) {
            Ok(created) => created,
            Err(error) => {
                warn!(world = id, active = ?self.active_world_id(), "unknown_world");
                return Err(error);
            }
        };

        self.stop_current_world();
        self.surface.resize(self.layout);
        self.hud = HudText {
            title: info.name.to_string(),
            subtitle: info.summary.to_string(),
            ..HudText::default()
        };

        let generation = self.timers.generation();
        self.active = Some(ActiveWorld {
            world,
            info,
            generation,
        });
        self.with_active(|world, ctx| world.start(ctx));
        self.schedule_frame();
        info!(
            world = info.id,
            generation,
            width = self.surface.width(),
            height = self.surface.height(),
            "world_started"
        );
        Ok(info)
    }

    /// Cancels the pending frame, stops the active world and clears the surface.
    /// Always advances the generation so delayed callbacks from before become stale.
    pub fn stop_current_world(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            debug!(frame = handle.id, "frame_cancelled");
        }
        if let Some(mut active) = self.active.take() {
            active.world.stop();
            info!(world = active.info.id, generation = active.generation, "world_stopped");
        }
        self.effects = WorldEffects::default();
        self.surface.clear();
        self.timers.advance_generation();
    }

    pub fn show_menu(&mut self) {
        self.stop_current_world();
        self.hud = HudText::default();
        info!(generation = self.timers.generation(), "menu_shown");
    }

    /// Re-lays out the surface; the active world re-derives its geometry if the size changed.
    pub fn resize(&mut self, layout: LayoutBox) -> Option<Transition> {
        self.layout = layout;
        if !self.surface.resize(layout) {
            return None;
        }
        info!(
            width = self.surface.width(),
            height = self.surface.height(),
            "surface_resized"
        );
        self.with_active(|world, ctx| world.on_resize(ctx));
        self.apply_effects()
    }

    /// Advances the session clock, fires due timers, then runs the pending frame if any.
    pub fn run_frame(&mut self, dt: Duration) -> Option<Transition> {
        self.clock = self.clock.saturating_add(dt);
        if let Some(transition) = self.fire_timers() {
            return Some(transition);
        }

        let handle = self.pending_frame.take()?;
        let Some(active_generation) = self.active.as_ref().map(|active| active.generation) else {
            debug!(frame = handle.id, "stale_frame_dropped");
            return None;
        };
        if handle.generation != active_generation {
            debug!(
                frame = handle.id,
                frame_generation = handle.generation,
                active_generation,
                "stale_frame_dropped"
            );
            return None;
        }

        let tick = FrameTick {
            dt,
            now: self.clock,
            index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        let control = self.with_active(|world, ctx| world.frame(&tick, ctx));
        if control == Some(FrameControl::Continue) {
            self.schedule_frame();
        }
        self.apply_effects()
    }

    /// Routes one platform event to the active world.
    pub fn dispatch(&mut self, event: InputEvent) -> DispatchOutcome {
        let surface_size = (self.surface.width(), self.surface.height());
        let Some(routed) = self.router.route(&event, self.layout, surface_size) else {
            return DispatchOutcome::Swallowed;
        };
        if self.active.is_none() {
            return DispatchOutcome::Idle(routed);
        }

        let is_press = matches!(routed, RoutedInput::PointerDown(_));
        self.with_active(|world, ctx| routed.dispatch_to(world, ctx));
        match self.apply_effects() {
            Some(transition) => {
                if is_press {
                    self.router.latch_press();
                }
                DispatchOutcome::Transition(transition)
            }
            None => DispatchOutcome::Delivered,
        }
    }

    /// Keeps the rest of the current press away from whoever receives input next.
    pub fn latch_press(&mut self) {
        self.router.latch_press();
    }

    fn schedule_frame(&mut self) {
        let Some(generation) = self.active.as_ref().map(|active| active.generation) else {
            return;
        };
        if self.pending_frame.is_some() {
            return;
        }
        self.pending_frame = Some(FrameHandle {
            id: self.next_frame_id,
            generation,
        });
        self.next_frame_id = self.next_frame_id.wrapping_add(1);
    }

    fn fire_timers(&mut self) -> Option<Transition> {
        let generation = self.timers.generation();
        for tag in self.timers.take_due(self.clock) {
            if self.timers.generation() != generation {
                debug!(kind = tag.kind, stamp = tag.stamp, "stale_timer_dropped");
                continue;
            }
            self.with_active(|world, ctx| world.on_timer(tag, ctx));
            if let Some(transition) = self.apply_effects() {
                return Some(transition);
            }
        }
        None
    }

    fn apply_effects(&mut self) -> Option<Transition> {
        let effects = std::mem::take(&mut self.effects);
        if effects.resume_frames {
            self.schedule_frame();
        }
        match effects.request? {
            SessionRequest::Menu => {
                self.show_menu();
                Some(Transition::Menu)
            }
            SessionRequest::World(id) => match self.start_world(&id) {
                Ok(info) => Some(Transition::Started(info)),
                Err(error) => Some(Transition::StartFailed(error)),
            },
        }
    }

    fn with_active<R>(
        &mut self,
        run: impl FnOnce(&mut dyn World, &mut WorldContext<'_>) -> R,
    ) -> Option<R> {
        let active = self.active.as_mut()?;
        let mut ctx = WorldContext::new(
            &mut self.surface,
            self.router.keys(),
            self.router.pointer(),
            &mut self.timers,
            &mut self.hud,
            &mut self.effects,
            self.clock,
        );
        Some(run(active.world.as_mut(), &mut ctx))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::app::input::{PointerPhase, PointerState};
    use crate::app::timers::TimerTag;

    const FRAME: Duration = Duration::from_millis(16);

    #[derive(Default)]
    struct Tally {
        frames: Cell<u32>,
        starts: Cell<u32>,
        stops: Cell<u32>,
        timers: Cell<u32>,
        resizes: RefCell<Vec<(f32, f32)>>,
        start_sizes: RefCell<Vec<(f32, f32)>>,
        events: RefCell<Vec<String>>,
    }

    struct TallyWorld {
        tally: Rc<Tally>,
        halt_after: Option<u32>,
    }

    impl World for TallyWorld {
        fn start(&mut self, ctx: &mut WorldContext<'_>) {
            self.tally.starts.set(self.tally.starts.get() + 1);
            self.tally
                .start_sizes
                .borrow_mut()
                .push((ctx.width(), ctx.height()));
        }

        fn frame(&mut self, _tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl {
            let frames = self.tally.frames.get() + 1;
            self.tally.frames.set(frames);
            ctx.surface_mut().fill([40, 90, 40, 255]);
            match self.halt_after {
                Some(limit) if frames >= limit => FrameControl::Halt,
                _ => FrameControl::Continue,
            }
        }

        fn stop(&mut self) {
            self.tally.stops.set(self.tally.stops.get() + 1);
        }

        fn on_pointer_down(&mut self, pointer: PointerState, ctx: &mut WorldContext<'_>) {
            self.tally
                .events
                .borrow_mut()
                .push(format!("down {} {}", pointer.x, pointer.y));
            if pointer.x < 10.0 {
                ctx.request_world("b");
            }
        }

        fn on_pointer_up(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {
            self.tally.events.borrow_mut().push("up".to_string());
        }

        fn on_key_down(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
            self.tally.events.borrow_mut().push(format!("key {code}"));
            match code {
                "KeyT" => ctx.schedule(Duration::from_millis(100), TimerTag::new(1)),
                "KeyM" => ctx.request_menu(),
                "KeyR" => ctx.resume_frames(),
                "KeyX" => ctx.request_world("missing"),
                _ => {}
            }
        }

        fn on_resize(&mut self, ctx: &mut WorldContext<'_>) {
            self.tally
                .resizes
                .borrow_mut()
                .push((ctx.width(), ctx.height()));
        }

        fn on_timer(&mut self, _tag: TimerTag, _ctx: &mut WorldContext<'_>) {
            self.tally.timers.set(self.tally.timers.get() + 1);
        }
    }

    fn info(id: &'static str) -> WorldInfo {
        WorldInfo {
            id,
            name: "Tally",
            summary: "tally world",
            accent: [255, 255, 255, 255],
        }
    }

    fn session_with(a: &Rc<Tally>, b: &Rc<Tally>, halt_after: Option<u32>) -> Session {
        let mut registry = WorldRegistry::new();
        let tally_a = Rc::clone(a);
        registry.register(info("a"), move || TallyWorld {
            tally: Rc::clone(&tally_a),
            halt_after,
        });
        let tally_b = Rc::clone(b);
        registry.register(info("b"), move || TallyWorld {
            tally: Rc::clone(&tally_b),
            halt_after: None,
        });
        Session::new(registry, LayoutBox::sized(1000.0, 600.0))
    }

    fn tallies() -> (Rc<Tally>, Rc<Tally>) {
        (Rc::new(Tally::default()), Rc::new(Tally::default()))
    }

    #[test]
    fn starts_idle_with_no_pending_frame() {
        let (a, b) = tallies();
        let session = session_with(&a, &b, None);
        assert!(session.is_idle());
        assert_eq!(session.pending_frame(), None);
    }

    #[test]
    fn start_world_activates_and_schedules_exactly_one_frame() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        let info = session.start_world("a").expect("start");

        assert_eq!(info.id, "a");
        assert_eq!(session.active_world_id(), Some("a"));
        assert!(session.pending_frame().is_some());
        assert_eq!(a.starts.get(), 1);
        assert_eq!(session.hud().title, "Tally");
        assert_eq!(session.hud().subtitle, "tally world");

        session.run_frame(FRAME);
        session.run_frame(FRAME);
        assert_eq!(a.frames.get(), 2);
        assert!(session.pending_frame().is_some());
    }

    #[test]
    fn switching_worlds_keeps_a_single_active_world() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");
        session.run_frame(FRAME);
        session.start_world("b").expect("b");
        let handle = session.pending_frame().expect("frame");
        assert_eq!(handle.generation, session.generation());

        session.run_frame(FRAME);
        assert_eq!(a.frames.get(), 1);
        assert_eq!(a.stops.get(), 1);
        assert_eq!(b.frames.get(), 1);
        assert_eq!(session.active_world_id(), Some("b"));
    }

    #[test]
    fn unknown_world_from_idle_stays_idle() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        let generation = session.generation();
        let error = session.start_world("nope").expect_err("unknown");
        assert_eq!(error.id, "nope");
        assert!(session.is_idle());
        assert_eq!(session.pending_frame(), None);
        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn unknown_world_while_active_leaves_world_running() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");
        let generation = session.generation();

        assert!(session.start_world("nope").is_err());
        assert_eq!(session.active_world_id(), Some("a"));
        assert_eq!(session.generation(), generation);
        assert_eq!(a.stops.get(), 0);
        session.run_frame(FRAME);
        assert_eq!(a.frames.get(), 1);
    }

    #[test]
    fn frame_counter_freezes_after_stop() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");
        session.run_frame(FRAME);
        session.run_frame(FRAME);
        session.stop_current_world();

        for _ in 0..5 {
            session.run_frame(FRAME);
        }
        assert_eq!(a.frames.get(), 2);
        assert!(session.is_idle());
        assert_eq!(session.pending_frame(), None);
        assert_eq!(
            session.surface().pixel(0, 0),
            Some(crate::app::rendering::BACKGROUND_COLOR)
        );
    }

    #[test]
    fn stop_is_idempotent_but_still_advances_generation() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        let before = session.generation();
        session.stop_current_world();
        session.stop_current_world();
        assert!(session.is_idle());
        assert_eq!(session.generation(), before + 2);
    }

    #[test]
    fn timers_from_a_stopped_world_never_fire() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");
        session.dispatch(InputEvent::key_down("KeyT"));
        session.start_world("b").expect("b");

        for _ in 0..20 {
            session.run_frame(FRAME);
        }
        assert_eq!(a.timers.get(), 0);
        assert_eq!(b.timers.get(), 0);
    }

    #[test]
    fn timers_fire_for_the_world_that_scheduled_them() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");
        session.dispatch(InputEvent::key_down("KeyT"));
        for _ in 0..8 {
            session.run_frame(FRAME);
        }
        assert_eq!(a.timers.get(), 1);
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn halted_world_resumes_on_request() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, Some(2));
        session.start_world("a").expect("a");
        for _ in 0..5 {
            session.run_frame(FRAME);
        }
        assert_eq!(a.frames.get(), 2);
        assert_eq!(session.pending_frame(), None);

        assert_eq!(
            session.dispatch(InputEvent::key_down("KeyR")),
            DispatchOutcome::Delivered
        );
        assert!(session.pending_frame().is_some());
        session.dispatch(InputEvent::key_down("KeyR"));
        session.run_frame(FRAME);
        assert_eq!(a.frames.get(), 3);
    }

    #[test]
    fn world_can_return_to_menu() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");
        let outcome = session.dispatch(InputEvent::key_down("KeyM"));
        assert_eq!(outcome, DispatchOutcome::Transition(Transition::Menu));
        assert!(session.is_idle());
        assert_eq!(a.stops.get(), 1);
        assert_eq!(session.hud(), &HudText::default());
    }

    #[test]
    fn world_requesting_unknown_world_reports_failure() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");
        let outcome = session.dispatch(InputEvent::key_down("KeyX"));
        assert_eq!(
            outcome,
            DispatchOutcome::Transition(Transition::StartFailed(UnknownWorldError {
                id: "missing".to_string()
            }))
        );
        assert_eq!(session.active_world_id(), Some("a"));
    }

    #[test]
    fn idle_input_is_handed_back() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        let outcome = session.dispatch(InputEvent::key_down("Digit1"));
        assert_eq!(
            outcome,
            DispatchOutcome::Idle(RoutedInput::KeyDown("Digit1".to_string()))
        );
    }

    #[test]
    fn pointer_coordinates_reach_world_in_surface_pixels() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.resize(LayoutBox::sized(1000.0, 600.0));
        session.start_world("a").expect("a");
        session.dispatch(InputEvent::pointer(PointerPhase::Down, 500.0, 300.0));
        assert_eq!(a.events.borrow().as_slice(), ["down 500 300".to_string()]);
    }

    #[test]
    fn press_that_switches_worlds_is_not_replayed_into_new_world() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");

        let outcome = session.dispatch(InputEvent::pointer(PointerPhase::Down, 5.0, 5.0));
        assert!(matches!(
            outcome,
            DispatchOutcome::Transition(Transition::Started(info)) if info.id == "b"
        ));
        assert_eq!(
            session.dispatch(InputEvent::pointer(PointerPhase::Up, 5.0, 5.0)),
            DispatchOutcome::Swallowed
        );
        assert!(b.events.borrow().is_empty());
    }

    #[test]
    fn resize_runs_before_start_and_notifies_active_world() {
        let (a, b) = tallies();
        let mut session = session_with(&a, &b, None);
        session.start_world("a").expect("a");
        assert_eq!(a.start_sizes.borrow().as_slice(), [(1000.0, 600.0)]);

        session.resize(LayoutBox::sized(1200.0, 700.0));
        assert_eq!(a.resizes.borrow().as_slice(), [(1200.0, 700.0)]);

        session.resize(LayoutBox::sized(1200.0, 700.0));
        assert_eq!(a.resizes.borrow().len(), 1);

        session.resize(LayoutBox::sized(300.0, 100.0));
        assert_eq!(a.resizes.borrow().last(), Some(&(800.0, 480.0)));
    }
}
