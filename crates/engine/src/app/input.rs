use std::collections::HashMap;

use super::rendering::LayoutBox;
use super::world::{World, WorldContext};

/// Pointer position in surface pixels plus the primary button state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub is_down: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Move,
    Down,
    Up,
    Leave,
}

/// Pointer event in client coordinates, as delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointerEvent {
    pub phase: PointerPhase,
    pub client_x: f32,
    pub client_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(RawPointerEvent),
    Key { phase: KeyPhase, code: String },
}

impl InputEvent {
    pub fn pointer(phase: PointerPhase, client_x: f32, client_y: f32) -> Self {
        Self::Pointer(RawPointerEvent {
            phase,
            client_x,
            client_y,
        })
    }

    pub fn key_down(code: impl Into<String>) -> Self {
        Self::Key {
            phase: KeyPhase::Down,
            code: code.into(),
        }
    }

    pub fn key_up(code: impl Into<String>) -> Self {
        Self::Key {
            phase: KeyPhase::Up,
            code: code.into(),
        }
    }
}

/// Held state per key code, updated on every key event.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pressed: HashMap<String, bool>,
}

impl KeyState {
    pub fn is_down(&self, code: &str) -> bool {
        self.pressed.get(code).copied().unwrap_or(false)
    }

    pub fn set(&mut self, code: &str, is_down: bool) {
        if let Some(entry) = self.pressed.get_mut(code) {
            *entry = is_down;
        } else {
            self.pressed.insert(code.to_string(), is_down);
        }
    }
}

/// A normalized event ready to be delivered to a world or the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutedInput {
    PointerMove(PointerState),
    PointerDown(PointerState),
    PointerUp(PointerState),
    PointerLeave(PointerState),
    KeyDown(String),
    KeyUp(String),
}

impl RoutedInput {
    pub fn dispatch_to(&self, world: &mut dyn World, ctx: &mut WorldContext<'_>) {
        match self {
            Self::PointerMove(pointer) => world.on_pointer_move(*pointer, ctx),
            Self::PointerDown(pointer) => world.on_pointer_down(*pointer, ctx),
            Self::PointerUp(pointer) => world.on_pointer_up(*pointer, ctx),
            Self::PointerLeave(pointer) => world.on_pointer_leave(*pointer, ctx),
            Self::KeyDown(code) => world.on_key_down(code, ctx),
            Self::KeyUp(code) => world.on_key_up(code, ctx),
        }
    }
}

/// Converts a client coordinate into surface pixels:
/// `(client - origin) * surface / layout`, per axis.
pub fn client_to_surface(client: f32, origin: f32, layout_size: f32, surface_size: u32) -> f32 {
    let ratio = if layout_size.is_finite() && layout_size > 0.0 {
        surface_size as f32 / layout_size
    } else {
        1.0
    };
    (client - origin) * ratio
}

#[derive(Debug, Default)]
pub struct InputRouter {
    pointer: PointerState,
    keys: KeyState,
    press_latched: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// Updates pointer/key state and returns what should be delivered.
    ///
    /// Returns `None` only for the pointer-up that closes a latched press.
    pub fn route(
        &mut self,
        event: &InputEvent,
        layout: LayoutBox,
        surface_size: (u32, u32),
    ) -> Option<RoutedInput> {
        match event {
            InputEvent::Pointer(raw) => self.route_pointer(*raw, layout, surface_size),
            InputEvent::Key { phase, code } => {
                let is_down = *phase == KeyPhase::Down;
                self.keys.set(code, is_down);
                Some(if is_down {
                    RoutedInput::KeyDown(code.clone())
                } else {
                    RoutedInput::KeyUp(code.clone())
                })
            }
        }
    }

    /// Detaches the current press from whoever receives input next.
    ///
    /// Used after a pointer-down changed the active world: the rest of that
    /// press must not reach the new world as a drag or a release.
    pub fn latch_press(&mut self) {
        if self.pointer.is_down {
            self.pointer.is_down = false;
            self.press_latched = true;
        }
    }

    fn route_pointer(
        &mut self,
        raw: RawPointerEvent,
        layout: LayoutBox,
        surface_size: (u32, u32),
    ) -> Option<RoutedInput> {
        let x = client_to_surface(raw.client_x, layout.left, layout.width, surface_size.0);
        let y = client_to_surface(raw.client_y, layout.top, layout.height, surface_size.1);
        if x.is_finite() && y.is_finite() {
            self.pointer.x = x;
            self.pointer.y = y;
        }

        match raw.phase {
            PointerPhase::Move => Some(RoutedInput::PointerMove(self.pointer)),
            PointerPhase::Down => {
                self.press_latched = false;
                self.pointer.is_down = true;
                Some(RoutedInput::PointerDown(self.pointer))
            }
            PointerPhase::Up => {
                self.pointer.is_down = false;
                if self.press_latched {
                    self.press_latched = false;
                    return None;
                }
                Some(RoutedInput::PointerUp(self.pointer))
            }
            PointerPhase::Leave => {
                self.pointer.is_down = false;
                self.press_latched = false;
                Some(RoutedInput::PointerLeave(self.pointer))
            }
        }
    }
}
