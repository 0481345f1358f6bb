//! 3x5 bitmap font covering printable ASCII, scaled by an integer factor.

use super::paint::{fill_rect, Rgba};

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;

const FIRST_GLYPH: char = ' ';
const FALLBACK_GLYPH: u16 = 0b111_001_011_000_010;

// One entry per char in ' '..='~'; each row is three bits, top row highest.
#[rustfmt::skip]
const GLYPHS: [u16; 95] = [
    0b000_000_000_000_000, 0b010_010_010_000_010, 0b101_101_000_000_000, 0b101_111_101_111_101,
    0b111_110_111_011_111, 0b101_001_010_100_101, 0b010_101_010_101_011, 0b010_010_000_000_000,
    0b001_010_010_010_001, 0b100_010_010_010_100, 0b000_101_010_101_000, 0b000_010_111_010_000,
    0b000_000_000_010_100, 0b000_000_111_000_000, 0b000_000_000_000_010, 0b001_001_010_100_100,
    0b111_101_101_101_111, 0b010_110_010_010_111, 0b111_001_111_100_111, 0b111_001_111_001_111,
    0b101_101_111_001_001, 0b111_100_111_001_111, 0b111_100_111_101_111, 0b111_001_010_010_010,
    0b111_101_111_101_111, 0b111_101_111_001_111, 0b000_010_000_010_000, 0b000_010_000_010_100,
    0b001_010_100_010_001, 0b000_111_000_111_000, 0b100_010_001_010_100, 0b111_001_011_000_010,
    0b111_101_111_100_111, 0b010_101_111_101_101, 0b110_101_110_101_110, 0b111_100_100_100_111,
    0b110_101_101_101_110, 0b111_100_110_100_111, 0b111_100_110_100_100, 0b111_100_101_101_111,
    0b101_101_111_101_101, 0b111_010_010_010_111, 0b111_001_001_101_111, 0b101_101_110_101_101,
    0b100_100_100_100_111, 0b101_111_111_101_101, 0b101_111_111_111_101, 0b111_101_101_101_111,
    0b110_101_110_100_100, 0b111_101_101_111_001, 0b110_101_110_101_101, 0b111_100_111_001_111,
    0b111_010_010_010_010, 0b101_101_101_101_111, 0b101_101_101_101_010, 0b101_101_111_111_101,
    0b101_101_010_101_101, 0b101_101_010_010_010, 0b111_001_010_100_111, 0b110_100_100_100_110,
    0b100_100_010_001_001, 0b011_001_001_001_011, 0b010_101_000_000_000, 0b000_000_000_000_111,
    0b100_010_000_000_000, 0b000_111_001_111_111, 0b100_100_110_101_110, 0b000_111_100_100_111,
    0b001_001_111_101_111, 0b000_111_110_100_111, 0b011_100_110_100_100, 0b000_111_101_111_001,
    0b100_100_110_101_101, 0b010_000_010_010_010, 0b001_000_001_101_010, 0b100_101_110_101_101,
    0b100_100_100_100_111, 0b000_110_111_101_101, 0b000_110_101_101_101, 0b000_111_101_101_111,
    0b000_110_101_110_100, 0b000_111_101_111_001, 0b000_110_101_100_100, 0b000_111_110_001_111,
    0b010_111_010_010_011, 0b000_101_101_101_111, 0b000_101_101_101_010, 0b000_101_101_111_010,
    0b000_101_010_010_101, 0b000_101_101_111_001, 0b000_111_001_010_111, 0b011_010_110_010_011,
    0b010_010_010_010_010, 0b110_010_011_010_110, 0b000_011_110_000_000,
];

fn glyph_rows(ch: char) -> u16 {
    let index = (ch as u32).wrapping_sub(FIRST_GLYPH as u32) as usize;
    GLYPHS.get(index).copied().unwrap_or(FALLBACK_GLYPH)
}

pub fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale.max(1)
}

pub fn line_height(scale: i32) -> i32 {
    GLYPH_HEIGHT * scale.max(1)
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    count * glyph_advance(scale) - scale.max(1)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_text(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    text: &str,
    scale: i32,
    color: Rgba,
) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_glyph(frame, width, height, x, y, glyph_rows(ch), scale, color);
        x += glyph_advance(scale);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_glyph(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rows: u16,
    scale: i32,
    color: Rgba,
) {
    for row in 0..GLYPH_HEIGHT {
        let bits = (rows >> (GLYPH_WIDTH * (GLYPH_HEIGHT - 1 - row))) & 0b111;
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            fill_rect(
                frame,
                width,
                height,
                x + col * scale,
                y + row * scale,
                scale,
                scale,
                color,
            );
        }
    }
}
