use std::time::Duration;

use tracing::{info, warn};

use super::input::{InputEvent, KeyPhase, RoutedInput};
use super::registry::{UnknownWorldError, WorldInfo, WorldRegistry};
use super::rendering::{LayoutBox, RenderSurface};
use super::session::{DispatchOutcome, Session, Transition};
use super::world::HudText;

pub const MENU_KEY: &str = "Escape";

/// What the shell wants after handling menu input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellRequest {
    Nothing,
    StartWorld(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFlow {
    Continue,
    Quit,
}

/// The menu/HUD collaborator around a [`Session`].
///
/// It only ever sees registry metadata and HUD text; all world state stays
/// inside the session.
pub trait Shell {
    fn world_started(&mut self, _info: &WorldInfo) {}

    fn menu_shown(&mut self) {}

    fn start_failed(&mut self, _error: &UnknownWorldError) {}

    /// Input that arrived while no world is active.
    fn menu_input(&mut self, input: &RoutedInput, registry: &WorldRegistry) -> ShellRequest;

    /// Paints the full selection screen. Called every frame while idle.
    fn paint_menu(&mut self, surface: &mut RenderSurface, registry: &WorldRegistry, now: Duration);

    /// Paints HUD text over a freshly rendered world frame.
    fn paint_hud(&mut self, surface: &mut RenderSurface, hud: &HudText, info: &WorldInfo);
}

/// Joins a [`Session`] to a [`Shell`]: input routing, frame pacing, painting order.
pub struct Host<S: Shell> {
    session: Session,
    shell: S,
    frames_painted: u64,
}

impl<S: Shell> Host<S> {
    pub fn new(session: Session, shell: S) -> Self {
        Self {
            session,
            shell,
            frames_painted: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Starts `initial` if given, otherwise shows the menu. An unknown initial
    /// world falls back to the menu.
    pub fn launch(&mut self, initial: Option<&str>) {
        match initial {
            Some(id) => match self.session.start_world(id) {
                Ok(info) => self.shell.world_started(&info),
                Err(error) => {
                    self.shell.start_failed(&error);
                    self.show_menu();
                }
            },
            None => self.show_menu(),
        }
    }

    pub fn show_menu(&mut self) {
        self.session.show_menu();
        self.shell.menu_shown();
    }

    pub fn start_world(&mut self, id: &str) -> Result<WorldInfo, UnknownWorldError> {
        let result = self.session.start_world(id);
        match &result {
            Ok(info) => self.shell.world_started(info),
            Err(error) => self.shell.start_failed(error),
        }
        result
    }

    pub fn handle_input(&mut self, event: InputEvent) -> HostFlow {
        if let InputEvent::Key {
            phase: KeyPhase::Down,
            code,
        } = &event
        {
            if code == MENU_KEY {
                if self.session.is_idle() {
                    info!(reason = "escape_key", "shutdown_requested");
                    return HostFlow::Quit;
                }
                self.show_menu();
                return HostFlow::Continue;
            }
        }

        match self.session.dispatch(event) {
            DispatchOutcome::Delivered | DispatchOutcome::Swallowed => HostFlow::Continue,
            DispatchOutcome::Transition(transition) => {
                self.notify(transition);
                HostFlow::Continue
            }
            DispatchOutcome::Idle(routed) => {
                let request = self.shell.menu_input(&routed, self.session.registry());
                self.apply_shell_request(request, &routed)
            }
        }
    }

    /// Runs one session frame and paints the shell on top of it.
    pub fn frame(&mut self, dt: Duration) {
        let before = self.session.frames_run();
        if let Some(transition) = self.session.run_frame(dt) {
            self.notify(transition);
        }

        let parts = self.session.paint_parts();
        match parts.active {
            None => {
                self.shell.paint_menu(parts.surface, parts.registry, parts.clock);
            }
            Some(info) => {
                if parts.frames_run != before {
                    self.shell.paint_hud(parts.surface, parts.hud, &info);
                    self.frames_painted = self.frames_painted.wrapping_add(1);
                }
            }
        }
    }

    /// Re-lays out the session. A resized surface gets its HUD back right away,
    /// since a halted world schedules no frame to repaint it.
    pub fn resize(&mut self, layout: LayoutBox) {
        let before = self.session.surface().size();
        if let Some(transition) = self.session.resize(layout) {
            self.notify(transition);
        }
        if self.session.surface().size() == before {
            return;
        }
        let parts = self.session.paint_parts();
        if let Some(info) = parts.active {
            self.shell.paint_hud(parts.surface, parts.hud, &info);
        }
    }

    pub fn surface(&self) -> &RenderSurface {
        self.session.surface()
    }

    pub fn shutdown(&mut self) {
        self.session.stop_current_world();
        info!(frames_painted = self.frames_painted, "shutdown");
    }

    fn apply_shell_request(&mut self, request: ShellRequest, routed: &RoutedInput) -> HostFlow {
        match request {
            ShellRequest::Nothing => HostFlow::Continue,
            ShellRequest::Quit => {
                info!(reason = "menu", "shutdown_requested");
                HostFlow::Quit
            }
            ShellRequest::StartWorld(id) => {
                if self.start_world(&id).is_ok() && matches!(routed, RoutedInput::PointerDown(_)) {
                    self.session.latch_press();
                }
                HostFlow::Continue
            }
        }
    }

    fn notify(&mut self, transition: Transition) {
        match transition {
            Transition::Started(info) => self.shell.world_started(&info),
            Transition::Menu => self.shell.menu_shown(),
            Transition::StartFailed(error) => {
                warn!(world = %error.id, "world_request_failed");
                self.shell.start_failed(&error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::app::input::{PointerPhase, PointerState};
    use crate::app::world::{FrameControl, FrameTick, World, WorldContext};

    const FRAME: Duration = Duration::from_millis(16);

    struct Ticker {
        frames: Rc<Cell<u32>>,
        ups: Rc<Cell<u32>>,
    }

    impl World for Ticker {
        fn start(&mut self, _ctx: &mut WorldContext<'_>) {}

        fn frame(&mut self, _tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl {
            self.frames.set(self.frames.get() + 1);
            ctx.surface_mut().fill([0, 80, 0, 255]);
            FrameControl::Continue
        }

        fn on_pointer_up(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {
            self.ups.set(self.ups.get() + 1);
        }
    }

    struct Stalled;

    impl World for Stalled {
        fn start(&mut self, _ctx: &mut WorldContext<'_>) {}

        fn frame(&mut self, _tick: &FrameTick, _ctx: &mut WorldContext<'_>) -> FrameControl {
            FrameControl::Halt
        }
    }

    #[derive(Default)]
    struct RecordingShell {
        started: Vec<&'static str>,
        menus: u32,
        failures: Vec<String>,
        menu_paints: u32,
        hud_paints: u32,
    }

    impl Shell for RecordingShell {
        fn world_started(&mut self, info: &WorldInfo) {
            self.started.push(info.id);
        }

        fn menu_shown(&mut self) {
            self.menus += 1;
        }

        fn start_failed(&mut self, error: &UnknownWorldError) {
            self.failures.push(error.id.clone());
        }

        fn menu_input(&mut self, input: &RoutedInput, _registry: &WorldRegistry) -> ShellRequest {
            match input {
                RoutedInput::PointerDown(_) => ShellRequest::StartWorld("tick".to_string()),
                RoutedInput::KeyDown(code) if code == "Digit9" => {
                    ShellRequest::StartWorld("nine".to_string())
                }
                RoutedInput::KeyDown(code) if code == "KeyQ" => ShellRequest::Quit,
                _ => ShellRequest::Nothing,
            }
        }

        fn paint_menu(
            &mut self,
            surface: &mut RenderSurface,
            _registry: &WorldRegistry,
            _now: Duration,
        ) {
            self.menu_paints += 1;
            surface.fill([0, 0, 80, 255]);
        }

        fn paint_hud(&mut self, _surface: &mut RenderSurface, _hud: &HudText, _info: &WorldInfo) {
            self.hud_paints += 1;
        }
    }

    fn host() -> (Host<RecordingShell>, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let frames = Rc::new(Cell::new(0));
        let ups = Rc::new(Cell::new(0));
        let mut registry = WorldRegistry::new();
        let (frames_for_factory, ups_for_factory) = (Rc::clone(&frames), Rc::clone(&ups));
        registry.register(
            WorldInfo {
                id: "tick",
                name: "Tick",
                summary: "counts frames",
                accent: [255; 4],
            },
            move || Ticker {
                frames: Rc::clone(&frames_for_factory),
                ups: Rc::clone(&ups_for_factory),
            },
        );
        registry.register(
            WorldInfo {
                id: "stalled",
                name: "Stalled",
                summary: "halts after one frame",
                accent: [255; 4],
            },
            || Stalled,
        );
        let session = Session::new(registry, LayoutBox::sized(800.0, 480.0));
        (Host::new(session, RecordingShell::default()), frames, ups)
    }

    #[test]
    fn launch_without_initial_world_shows_menu() {
        let (mut host, _, _) = host();
        host.launch(None);
        host.frame(FRAME);
        assert_eq!(host.shell().menus, 1);
        assert_eq!(host.shell().menu_paints, 1);
        assert!(host.session().is_idle());
    }

    #[test]
    fn unknown_initial_world_falls_back_to_menu() {
        let (mut host, _, _) = host();
        host.launch(Some("ghost"));
        assert_eq!(host.shell().failures, vec!["ghost".to_string()]);
        assert_eq!(host.shell().menus, 1);
        assert!(host.session().is_idle());
    }

    #[test]
    fn menu_click_starts_world_and_swallows_release() {
        let (mut host, frames, ups) = host();
        host.launch(None);
        host.handle_input(InputEvent::pointer(PointerPhase::Down, 100.0, 100.0));
        host.handle_input(InputEvent::pointer(PointerPhase::Up, 100.0, 100.0));
        host.frame(FRAME);

        assert_eq!(host.shell().started, vec!["tick"]);
        assert_eq!(frames.get(), 1);
        assert_eq!(ups.get(), 0);
        assert_eq!(host.shell().hud_paints, 1);
    }

    #[test]
    fn escape_returns_to_menu_then_quits() {
        let (mut host, frames, _) = host();
        host.launch(Some("tick"));
        host.frame(FRAME);

        assert_eq!(host.handle_input(InputEvent::key_down("Escape")), HostFlow::Continue);
        assert!(host.session().is_idle());
        host.frame(FRAME);
        assert_eq!(frames.get(), 1);

        assert_eq!(host.handle_input(InputEvent::key_down("Escape")), HostFlow::Quit);
    }

    #[test]
    fn shell_start_failure_is_reported_and_menu_stays() {
        let (mut host, _, _) = host();
        host.launch(None);
        assert_eq!(host.handle_input(InputEvent::key_down("Digit9")), HostFlow::Continue);
        assert_eq!(host.shell().failures, vec!["nine".to_string()]);
        assert!(host.session().is_idle());
        assert_eq!(host.handle_input(InputEvent::key_down("KeyQ")), HostFlow::Quit);
    }

    #[test]
    fn resize_repaints_hud_over_a_halted_world() {
        let (mut host, _, _) = host();
        host.launch(Some("stalled"));
        host.frame(FRAME);
        host.frame(FRAME);
        assert_eq!(host.shell().hud_paints, 1);

        host.resize(LayoutBox::sized(1000.0, 600.0));
        assert_eq!(host.shell().hud_paints, 2);
        host.resize(LayoutBox::sized(1000.0, 600.0));
        assert_eq!(host.shell().hud_paints, 2);
    }

    #[test]
    fn resize_on_the_menu_paints_no_hud() {
        let (mut host, _, _) = host();
        host.launch(None);
        host.resize(LayoutBox::sized(1000.0, 600.0));
        assert_eq!(host.shell().hud_paints, 0);
    }

    #[test]
    fn shutdown_stops_active_world() {
        let (mut host, frames, _) = host();
        host.launch(Some("tick"));
        host.shutdown();
        host.frame(FRAME);
        assert_eq!(frames.get(), 0);
        assert!(host.session().is_idle());
    }
}
