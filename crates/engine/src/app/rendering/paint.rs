//! Clipped RGBA8 raster primitives over a row-major frame buffer.
//!
//! Every function takes the frame plus its pixel dimensions and silently drops
//! writes outside the buffer, so callers can hand over unclipped geometry.

pub type Rgba = [u8; 4];

pub(crate) fn write_pixel_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: Rgba,
) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width as usize)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    blend_into(&mut frame[byte_offset..end], color);
}

fn blend_into(dst: &mut [u8], color: Rgba) {
    match color[3] {
        0 => {}
        255 => dst.copy_from_slice(&color),
        alpha => {
            let a = u16::from(alpha);
            let inv = 255 - a;
            for channel in 0..3 {
                let mixed = (u16::from(color[channel]) * a + u16::from(dst[channel]) * inv) / 255;
                dst[channel] = mixed as u8;
            }
            dst[3] = 255;
        }
    }
}

/// Fills the half-open span `[x0, x1)` of row `y`.
pub(crate) fn fill_span(
    frame: &mut [u8],
    width: u32,
    height: u32,
    y: i32,
    x0: i32,
    x1: i32,
    color: Rgba,
) {
    if y < 0 || y >= height as i32 {
        return;
    }
    let start = x0.max(0);
    let end = x1.min(width as i32);
    if end <= start {
        return;
    }
    let row = y as usize * width as usize * 4;
    let Some(slice) = frame.get_mut(row + start as usize * 4..row + end as usize * 4) else {
        return;
    };
    if color[3] == 255 {
        for chunk in slice.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    } else {
        for chunk in slice.chunks_exact_mut(4) {
            blend_into(chunk, color);
        }
    }
}

pub(crate) fn fill_all(frame: &mut [u8], color: Rgba) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn fill_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: Rgba,
) {
    if rect_width <= 0 || rect_height <= 0 {
        return;
    }
    let top = y.max(0);
    let bottom = y.saturating_add(rect_height).min(height as i32);
    for row in top..bottom {
        fill_span(frame, width, height, row, x, x.saturating_add(rect_width), color);
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    thickness: i32,
    color: Rgba,
) {
    if rect_width <= 1 || rect_height <= 1 || thickness <= 0 {
        return;
    }
    let t = thickness.min(rect_width / 2).min(rect_height / 2).max(1);
    fill_rect(frame, width, height, x, y, rect_width, t, color);
    fill_rect(frame, width, height, x, y + rect_height - t, rect_width, t, color);
    fill_rect(frame, width, height, x, y + t, t, rect_height - 2 * t, color);
    fill_rect(frame, width, height, x + rect_width - t, y + t, t, rect_height - 2 * t, color);
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn fill_rounded_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: f32,
    y: f32,
    rect_width: f32,
    rect_height: f32,
    radius: f32,
    color: Rgba,
) {
    if !(rect_width > 0.0 && rect_height > 0.0) {
        return;
    }
    let radius = radius.max(0.0).min(rect_width * 0.5).min(rect_height * 0.5);
    let top = y.round() as i32;
    let bottom = (y + rect_height).round() as i32;
    for row in top..bottom {
        let center_y = row as f32 + 0.5;
        let from_top = center_y - y;
        let from_bottom = y + rect_height - center_y;
        let edge_distance = from_top.min(from_bottom);
        let inset = if edge_distance < radius {
            let dy = radius - edge_distance;
            radius - (radius * radius - dy * dy).max(0.0).sqrt()
        } else {
            0.0
        };
        let x0 = (x + inset).round() as i32;
        let x1 = (x + rect_width - inset).round() as i32;
        fill_span(frame, width, height, row, x0, x1, color);
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn fill_ellipse(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    color: Rgba,
) {
    if !(rx > 0.0 && ry > 0.0) || !cx.is_finite() || !cy.is_finite() {
        return;
    }
    let top = (cy - ry).floor() as i32;
    let bottom = (cy + ry).ceil() as i32;
    for row in top.max(0)..bottom.min(height as i32) {
        let dy = (row as f32 + 0.5 - cy) / ry;
        if dy.abs() > 1.0 {
            continue;
        }
        let half = rx * (1.0 - dy * dy).sqrt();
        let x0 = (cx - half).round() as i32;
        let x1 = (cx + half).round() as i32;
        fill_span(frame, width, height, row, x0, x1, color);
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn ring(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: f32,
    cy: f32,
    radius: f32,
    thickness: f32,
    color: Rgba,
) {
    if !(radius > 0.0) || !(thickness > 0.0) || !cx.is_finite() || !cy.is_finite() {
        return;
    }
    let inner = (radius - thickness).max(0.0);
    let top = (cy - radius).floor() as i32;
    let bottom = (cy + radius).ceil() as i32;
    for row in top.max(0)..bottom.min(height as i32) {
        let dy = row as f32 + 0.5 - cy;
        if dy.abs() > radius {
            continue;
        }
        let outer_half = (radius * radius - dy * dy).sqrt();
        let x_outer_left = (cx - outer_half).round() as i32;
        let x_outer_right = (cx + outer_half).round() as i32;
        if dy.abs() >= inner {
            fill_span(frame, width, height, row, x_outer_left, x_outer_right, color);
            continue;
        }
        let inner_half = (inner * inner - dy * dy).sqrt();
        let x_inner_left = (cx - inner_half).round() as i32;
        let x_inner_right = (cx + inner_half).round() as i32;
        fill_span(frame, width, height, row, x_outer_left, x_inner_left, color);
        fill_span(frame, width, height, row, x_inner_right, x_outer_right, color);
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn thick_line(
    frame: &mut [u8],
    width: u32,
    height: u32,
    from: (f32, f32),
    to: (f32, f32),
    thickness: f32,
    color: Rgba,
) {
    let half = (thickness * 0.5).max(0.5);
    let values = [from.0, from.1, to.0, to.1];
    if values.iter().any(|value| !value.is_finite()) {
        return;
    }
    let min_x = (from.0.min(to.0) - half).floor().max(0.0) as i32;
    let max_x = (from.0.max(to.0) + half).ceil().min(width as f32) as i32;
    let min_y = (from.1.min(to.1) - half).floor().max(0.0) as i32;
    let max_y = (from.1.max(to.1) + half).ceil().min(height as f32) as i32;
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length_sq = dx * dx + dy * dy;
    for py in min_y..max_y {
        for px in min_x..max_x {
            let (sx, sy) = (px as f32 + 0.5, py as f32 + 0.5);
            let t = if length_sq <= f32::EPSILON {
                0.0
            } else {
                (((sx - from.0) * dx + (sy - from.1) * dy) / length_sq).clamp(0.0, 1.0)
            };
            let (nx, ny) = (from.0 + dx * t - sx, from.1 + dy * t - sy);
            if nx * nx + ny * ny <= half * half {
                write_pixel_clipped(frame, width, height, px, py, color);
            }
        }
    }
}

pub(crate) fn fill_triangle(
    frame: &mut [u8],
    width: u32,
    height: u32,
    points: [(f32, f32); 3],
    color: Rgba,
) {
    if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return;
    }
    let [a, b, c] = points;
    let area = edge(a, b, c);
    if area.abs() <= f32::EPSILON {
        return;
    }
    let min_x = a.0.min(b.0).min(c.0).floor().max(0.0) as i32;
    let max_x = a.0.max(b.0).max(c.0).ceil().min(width as f32) as i32;
    let min_y = a.1.min(b.1).min(c.1).floor().max(0.0) as i32;
    let max_y = a.1.max(b.1).max(c.1).ceil().min(height as f32) as i32;
    for py in min_y..max_y {
        for px in min_x..max_x {
            let p = (px as f32 + 0.5, py as f32 + 0.5);
            let w0 = edge(b, c, p) / area;
            let w1 = edge(c, a, p) / area;
            let w2 = edge(a, b, p) / area;
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                write_pixel_clipped(frame, width, height, px, py, color);
            }
        }
    }
}

fn edge(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

pub fn lerp_color(from: Rgba, to: Rgba, t: f32) -> Rgba {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mut out = [0u8; 4];
    for (index, channel) in out.iter_mut().enumerate() {
        let value = f32::from(from[index]) + (f32::from(to[index]) - f32::from(from[index])) * t;
        *channel = value.round() as u8;
    }
    out
}

pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
    [color[0], color[1], color[2], (f32::from(color[3]) * alpha).round() as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32) -> Vec<u8> {
        vec![0; width as usize * height as usize * 4]
    }

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> Rgba {
        let offset = ((y * width + x) * 4) as usize;
        [frame[offset], frame[offset + 1], frame[offset + 2], frame[offset + 3]]
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut buffer = frame(4, 4);
        write_pixel_clipped(&mut buffer, 4, 4, -1, 0, [255; 4]);
        write_pixel_clipped(&mut buffer, 4, 4, 4, 0, [255; 4]);
        write_pixel_clipped(&mut buffer, 4, 4, 0, 9, [255; 4]);
        assert!(buffer.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn half_alpha_blends_toward_source() {
        let mut buffer = frame(1, 1);
        fill_all(&mut buffer, [0, 0, 0, 255]);
        write_pixel_clipped(&mut buffer, 1, 1, 0, 0, [255, 255, 255, 128]);
        let blended = pixel(&buffer, 1, 0, 0);
        assert!(blended[0] > 120 && blended[0] < 136);
        assert_eq!(blended[3], 255);
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut buffer = frame(8, 8);
        fill_rect(&mut buffer, 8, 8, -4, -4, 6, 6, [9, 9, 9, 255]);
        assert_eq!(pixel(&buffer, 8, 1, 1), [9, 9, 9, 255]);
        assert_eq!(pixel(&buffer, 8, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn ellipse_covers_center_not_corners() {
        let mut buffer = frame(20, 20);
        fill_ellipse(&mut buffer, 20, 20, 10.0, 10.0, 6.0, 6.0, [1, 2, 3, 255]);
        assert_eq!(pixel(&buffer, 20, 10, 10), [1, 2, 3, 255]);
        assert_eq!(pixel(&buffer, 20, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&buffer, 20, 15, 15), [0, 0, 0, 0]);
    }

    #[test]
    fn ring_leaves_center_untouched() {
        let mut buffer = frame(30, 30);
        ring(&mut buffer, 30, 30, 15.0, 15.0, 10.0, 2.0, [5, 5, 5, 255]);
        assert_eq!(pixel(&buffer, 30, 15, 15), [0, 0, 0, 0]);
        assert_eq!(pixel(&buffer, 30, 15, 6), [5, 5, 5, 255]);
    }

    #[test]
    fn rounded_rect_trims_corners() {
        let mut buffer = frame(20, 20);
        fill_rounded_rect(&mut buffer, 20, 20, 0.0, 0.0, 20.0, 20.0, 8.0, [7, 7, 7, 255]);
        assert_eq!(pixel(&buffer, 20, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&buffer, 20, 10, 0), [7, 7, 7, 255]);
        assert_eq!(pixel(&buffer, 20, 10, 10), [7, 7, 7, 255]);
    }

    #[test]
    fn triangle_winding_does_not_matter() {
        let mut clockwise = frame(16, 16);
        let mut counter = frame(16, 16);
        fill_triangle(&mut clockwise, 16, 16, [(0.0, 0.0), (15.0, 0.0), (0.0, 15.0)], [4; 4]);
        fill_triangle(&mut counter, 16, 16, [(0.0, 0.0), (0.0, 15.0), (15.0, 0.0)], [4; 4]);
        assert_eq!(clockwise, counter);
        assert_eq!(pixel(&clockwise, 16, 2, 2), [4; 4]);
    }

    #[test]
    fn non_finite_geometry_is_ignored() {
        let mut buffer = frame(8, 8);
        thick_line(&mut buffer, 8, 8, (f32::NAN, 0.0), (4.0, 4.0), 2.0, [255; 4]);
        fill_ellipse(&mut buffer, 8, 8, f32::INFINITY, 2.0, 3.0, 3.0, [255; 4]);
        assert!(buffer.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn lerp_color_hits_endpoints() {
        assert_eq!(lerp_color([0, 0, 0, 255], [200, 100, 50, 255], 0.0), [0, 0, 0, 255]);
        assert_eq!(lerp_color([0, 0, 0, 255], [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
    }
}
