mod host;
mod input;
mod loop_runner;
mod metrics;
mod registry;
mod rendering;
mod session;
mod timers;
mod world;

pub use host::{Host, HostFlow, Shell, ShellRequest, MENU_KEY};
pub use input::{
    client_to_surface, InputEvent, InputRouter, KeyPhase, KeyState, PointerPhase, PointerState,
    RawPointerEvent, RoutedInput,
};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use registry::{UnknownWorldError, WorldFactory, WorldInfo, WorldRegistry};
pub use rendering::{
    glyph_advance, hex_color, lerp_color, line_height, surface_size_for_layout, text_width,
    with_alpha, LayoutBox, Presenter, RenderSurface, Rgba, BACKGROUND_COLOR, GLYPH_HEIGHT,
    GLYPH_WIDTH, MIN_SURFACE_HEIGHT, MIN_SURFACE_WIDTH,
};
pub use session::{DispatchOutcome, FrameHandle, PaintParts, Session, Transition};
pub use timers::{TimerQueue, TimerTag};
pub use world::{
    FrameControl, FrameTick, HudText, SessionRequest, World, WorldContext, WorldSandbox,
};
