use crate::math::Vec2;

use super::paint::{self, Rgba};
use super::text;

pub const MIN_SURFACE_WIDTH: u32 = 800;
pub const MIN_SURFACE_HEIGHT: u32 = 480;
pub const BACKGROUND_COLOR: Rgba = [11, 18, 32, 255];

/// Container box the surface is laid out in, in logical (pre-scaling) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }
}

/// The single RGBA8 drawing target shared by whichever world is active.
pub struct RenderSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface {
    pub fn new() -> Self {
        let mut surface = Self {
            width: MIN_SURFACE_WIDTH,
            height: MIN_SURFACE_HEIGHT,
            pixels: vec![0; MIN_SURFACE_WIDTH as usize * MIN_SURFACE_HEIGHT as usize * 4],
        };
        surface.clear();
        surface
    }

    /// Re-derives the backing size from `layout`. Returns whether the size changed.
    pub fn resize(&mut self, layout: LayoutBox) -> bool {
        let (width, height) = surface_size_for_layout(layout);
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
        self.clear();
        true
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn frame(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.pixels.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn clear(&mut self) {
        paint::fill_all(&mut self.pixels, BACKGROUND_COLOR);
    }

    pub fn fill(&mut self, color: Rgba) {
        if color[3] == 255 {
            paint::fill_all(&mut self.pixels, color);
        } else {
            self.fill_rect(0.0, 0.0, self.width as f32, self.height as f32, color);
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let (x0, y0) = (x.round() as i32, y.round() as i32);
        let (x1, y1) = ((x + width).round() as i32, (y + height).round() as i32);
        paint::fill_rect(
            &mut self.pixels,
            self.width,
            self.height,
            x0,
            y0,
            x1 - x0,
            y1 - y0,
            color,
        );
    }

    pub fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
        color: Rgba,
    ) {
        paint::rect_outline(
            &mut self.pixels,
            self.width,
            self.height,
            x.round() as i32,
            y.round() as i32,
            width.round() as i32,
            height.round() as i32,
            thickness.round().max(1.0) as i32,
            color,
        );
    }

    pub fn fill_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        color: Rgba,
    ) {
        paint::fill_rounded_rect(
            &mut self.pixels,
            self.width,
            self.height,
            x,
            y,
            width,
            height,
            radius,
            color,
        );
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.fill_ellipse(center, radius, radius, color);
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, thickness: f32, color: Rgba) {
        paint::ring(
            &mut self.pixels,
            self.width,
            self.height,
            center.x,
            center.y,
            radius,
            thickness,
            color,
        );
    }

    pub fn fill_ellipse(&mut self, center: Vec2, radius_x: f32, radius_y: f32, color: Rgba) {
        paint::fill_ellipse(
            &mut self.pixels,
            self.width,
            self.height,
            center.x,
            center.y,
            radius_x,
            radius_y,
            color,
        );
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Rgba) {
        paint::thick_line(
            &mut self.pixels,
            self.width,
            self.height,
            (from.x, from.y),
            (to.x, to.y),
            thickness,
            color,
        );
    }

    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Rgba) {
        paint::fill_triangle(
            &mut self.pixels,
            self.width,
            self.height,
            [(a.x, a.y), (b.x, b.y), (c.x, c.y)],
            color,
        );
    }

    /// Fills rows `[y, y + height)` blending from `top` to `bottom`.
    pub fn vertical_gradient(&mut self, y: f32, height: f32, top: Rgba, bottom: Rgba) {
        let start = y.round() as i32;
        let end = (y + height).round() as i32;
        let span = (end - start).max(1) as f32;
        for row in start..end {
            let color = paint::lerp_color(top, bottom, (row - start) as f32 / span);
            paint::fill_span(
                &mut self.pixels,
                self.width,
                self.height,
                row,
                0,
                self.width as i32,
                color,
            );
        }
    }

    pub fn text(&mut self, x: f32, y: f32, content: &str, scale: i32, color: Rgba) {
        text::draw_text(
            &mut self.pixels,
            self.width,
            self.height,
            x.round() as i32,
            y.round() as i32,
            content,
            scale,
            color,
        );
    }

    /// Draws `content` horizontally centered on `center_x` with its top at `y`.
    pub fn text_centered(&mut self, center_x: f32, y: f32, content: &str, scale: i32, color: Rgba) {
        let half = text::text_width(content, scale) as f32 * 0.5;
        self.text(center_x - half, y, content, scale, color);
    }

    pub fn text_width(&self, content: &str, scale: i32) -> f32 {
        text::text_width(content, scale) as f32
    }
}

/// `max(minimum, floor(layout))` per axis; non-finite sizes fall back to the minimum.
pub fn surface_size_for_layout(layout: LayoutBox) -> (u32, u32) {
    (
        clamp_dimension(layout.width, MIN_SURFACE_WIDTH),
        clamp_dimension(layout.height, MIN_SURFACE_HEIGHT),
    )
}

fn clamp_dimension(value: f32, minimum: u32) -> u32 {
    if !value.is_finite() || value <= minimum as f32 {
        return minimum;
    }
    // Caps absurd sizes rather than allocating them.
    (value.floor() as u32).clamp(minimum, 16_384)
}

pub const fn hex_color(rgb: u32) -> Rgba {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255]
}
