//! Shared runtime for the worlds: a single render surface, input routing,
//! the one-active-world session, and the native window loop around it.

pub mod app;
pub mod math;

pub use app::*;
pub use math::{clamp, ease_out_cubic, lerp, Vec2};
