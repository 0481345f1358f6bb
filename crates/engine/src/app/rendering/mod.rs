mod paint;
mod renderer;
mod surface;
mod text;

pub use paint::{lerp_color, with_alpha, Rgba};
pub use renderer::Presenter;
pub use surface::{
    hex_color, surface_size_for_layout, LayoutBox, RenderSurface, BACKGROUND_COLOR,
    MIN_SURFACE_HEIGHT, MIN_SURFACE_WIDTH,
};
pub use text::{glyph_advance, line_height, text_width, GLYPH_HEIGHT, GLYPH_WIDTH};
