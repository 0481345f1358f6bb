use std::time::Duration;

use worlds_engine::{
    ease_out_cubic, hex_color, with_alpha, HudText, RenderSurface, Rgba, RoutedInput, Shell,
    ShellRequest, UnknownWorldError, Vec2, WorldInfo, WorldRegistry,
};

const TITLE: &str = "Golf Worlds - Careers on the Green";
const SUBTITLE: &str = "Five golf careers to play and learn. Click a tile or press 1-5.";
const IDLE_STATUS: &str = "Idle";
const PLAYING_STATUS: &str = "Playing";
const MENU_FOOTER: &str = "Esc: back to menu / quit";

const MENU_TOP: Rgba = hex_color(0xe7f4f2);
const MENU_BOTTOM: Rgba = hex_color(0xd2f0ea);
const ACCENT: Rgba = hex_color(0x00695c);
const MUTED: Rgba = hex_color(0x6b6b6b);
const INK: Rgba = hex_color(0x222222);
const TILE_FILL: Rgba = [255, 255, 255, 220];
const TILE_HOVER_FILL: Rgba = [255, 255, 255, 255];
const HUD_PANEL: Rgba = [255, 255, 255, 190];
const PILL_PANEL: Rgba = [0, 0, 0, 40];
const NOTICE_COLOR: Rgba = hex_color(0xb3261e);

const TILE_WIDTH_MAX: f32 = 560.0;
const TILE_HEIGHT_MAX: f32 = 64.0;
const TILE_HEIGHT_MIN: f32 = 40.0;
const TILE_GAP: f32 = 12.0;
const MENU_TOP_MARGIN: f32 = 96.0;
const MENU_BOTTOM_RESERVE: f32 = 64.0;
const NOTICE_DURATION: Duration = Duration::from_millis(2500);
const HOVER_EASE_MS: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TileRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl TileRect {
    fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    shown_at: Option<Duration>,
}

/// Menu tiles and HUD, painted straight onto the shared surface.
#[derive(Debug)]
pub(crate) struct GolfShell {
    surface_size: Vec2,
    hover: Option<usize>,
    hover_since: Duration,
    notice: Option<Notice>,
}

impl Default for GolfShell {
    fn default() -> Self {
        Self {
            surface_size: Vec2::new(800.0, 480.0),
            hover: None,
            hover_since: Duration::ZERO,
            notice: None,
        }
    }
}

impl GolfShell {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn tile_rects(&self, count: usize) -> Vec<TileRect> {
        let width = (self.surface_size.x - 80.0).min(TILE_WIDTH_MAX);
        let x = (self.surface_size.x - width) * 0.5;
        let available = self.surface_size.y - MENU_TOP_MARGIN - MENU_BOTTOM_RESERVE;
        let height =
            (available / count.max(1) as f32 - TILE_GAP).clamp(TILE_HEIGHT_MIN, TILE_HEIGHT_MAX);
        (0..count)
            .map(|index| TileRect {
                x,
                y: MENU_TOP_MARGIN + index as f32 * (height + TILE_GAP),
                width,
                height,
            })
            .collect()
    }

    fn tile_at(&self, point: Vec2, count: usize) -> Option<usize> {
        self.tile_rects(count)
            .iter()
            .position(|rect| rect.contains(point))
    }

    fn paint_tile(
        &self,
        surface: &mut RenderSurface,
        rect: TileRect,
        index: usize,
        info: &WorldInfo,
        lift: f32,
    ) {
        let y = rect.y - lift * 4.0;
        let fill = if lift > 0.0 { TILE_HOVER_FILL } else { TILE_FILL };
        if lift > 0.0 {
            surface.fill_rounded_rect(
                rect.x + 2.0,
                y + 6.0,
                rect.width,
                rect.height,
                8.0,
                [0, 0, 0, 30],
            );
        }
        surface.fill_rounded_rect(rect.x, y, rect.width, rect.height, 8.0, fill);

        let thumb_x = rect.x + 8.0;
        let thumb_y = y + 8.0;
        let thumb_height = rect.height - 16.0;
        surface.fill_rounded_rect(thumb_x, thumb_y, 64.0, thumb_height, 6.0, info.accent);
        surface.text_centered(
            thumb_x + 32.0,
            thumb_y + (thumb_height - 15.0) * 0.5,
            &initials(info.name),
            3,
            hex_color(0x333333),
        );

        let text_x = thumb_x + 76.0;
        surface.text(text_x, y + 8.0, info.name, 2, INK);
        let max_chars = ((rect.width - 190.0) / 4.0).max(10.0) as usize;
        let max_lines = ((rect.height - 24.0) / 8.0).max(1.0) as usize;
        for (line_index, line) in wrap_text(info.summary, max_chars)
            .iter()
            .take(max_lines)
            .enumerate()
        {
            surface.text(text_x, y + 24.0 + line_index as f32 * 8.0, line, 1, MUTED);
        }

        let button_x = rect.x + rect.width - 96.0;
        let button_y = y + (rect.height - 28.0) * 0.5;
        surface.fill_rounded_rect(button_x, button_y, 84.0, 28.0, 8.0, ACCENT);
        surface.text_centered(
            button_x + 42.0,
            button_y + 9.0,
            &format!("Play {}", index + 1),
            2,
            [255; 4],
        );
    }

    fn notice_alpha(&self, now: Duration) -> Option<(&str, f32)> {
        let notice = self.notice.as_ref()?;
        let shown_at = notice.shown_at.unwrap_or(now);
        let age = now.saturating_sub(shown_at);
        if age >= NOTICE_DURATION {
            return None;
        }
        let remaining = 1.0 - age.as_secs_f32() / NOTICE_DURATION.as_secs_f32();
        Some((notice.text.as_str(), ease_out_cubic(remaining)))
    }
}

impl Shell for GolfShell {
    fn world_started(&mut self, _info: &WorldInfo) {
        self.notice = None;
        self.hover = None;
    }

    fn menu_shown(&mut self) {
        self.hover = None;
    }

    fn start_failed(&mut self, error: &UnknownWorldError) {
        self.notice = Some(Notice {
            text: format!("No world named '{}'", error.id),
            shown_at: None,
        });
    }

    fn menu_input(&mut self, input: &RoutedInput, registry: &WorldRegistry) -> ShellRequest {
        let count = registry.len();
        match input {
            RoutedInput::PointerMove(pointer) => {
                let hover = self.tile_at(Vec2::new(pointer.x, pointer.y), count);
                if hover != self.hover {
                    self.hover = hover;
                    self.hover_since = Duration::ZERO;
                }
                ShellRequest::Nothing
            }
            RoutedInput::PointerDown(pointer) => self
                .tile_at(Vec2::new(pointer.x, pointer.y), count)
                .and_then(|index| registry.infos().nth(index))
                .map(|info| ShellRequest::StartWorld(info.id.to_string()))
                .unwrap_or(ShellRequest::Nothing),
            RoutedInput::KeyDown(code) => digit_index(code)
                .and_then(|index| registry.infos().nth(index))
                .map(|info| ShellRequest::StartWorld(info.id.to_string()))
                .unwrap_or(ShellRequest::Nothing),
            RoutedInput::PointerLeave(_) => {
                self.hover = None;
                ShellRequest::Nothing
            }
            RoutedInput::PointerUp(_) | RoutedInput::KeyUp(_) => ShellRequest::Nothing,
        }
    }

    fn paint_menu(&mut self, surface: &mut RenderSurface, registry: &WorldRegistry, now: Duration) {
        self.surface_size = surface.size();
        if self.hover.is_some() && self.hover_since == Duration::ZERO {
            self.hover_since = now;
        }
        if let Some(notice) = self.notice.as_mut() {
            notice.shown_at.get_or_insert(now);
        }

        let (width, height) = (self.surface_size.x, self.surface_size.y);
        surface.vertical_gradient(0.0, height, MENU_TOP, MENU_BOTTOM);
        surface.text_centered(width * 0.5, 36.0, TITLE, 3, ACCENT);
        surface.text_centered(width * 0.5, 66.0, SUBTITLE, 2, MUTED);

        let infos: Vec<WorldInfo> = registry.infos().collect();
        let rects = self.tile_rects(infos.len());
        for (index, (rect, info)) in rects.iter().zip(infos.iter()).enumerate() {
            let lift = if self.hover == Some(index) {
                let since = now.saturating_sub(self.hover_since).as_secs_f32() * 1000.0;
                ease_out_cubic(since / HOVER_EASE_MS)
            } else {
                0.0
            };
            self.paint_tile(surface, *rect, index, info, lift);
        }

        let footer_y = height - 40.0;
        paint_pill(surface, width * 0.5, footer_y, &format!("{IDLE_STATUS}  |  {MENU_FOOTER}"));

        if let Some((text, alpha)) = self.notice_alpha(now) {
            surface.text_centered(
                width * 0.5,
                footer_y - 30.0,
                text,
                2,
                with_alpha(NOTICE_COLOR, alpha),
            );
        }
    }

    fn paint_hud(&mut self, surface: &mut RenderSurface, hud: &HudText, info: &WorldInfo) {
        self.surface_size = surface.size();
        let (width, height) = (self.surface_size.x, self.surface_size.y);

        let title_width = surface.text_width(&hud.title, 2);
        let subtitle_width = surface.text_width(&hud.subtitle, 1);
        let panel_width = (title_width.max(subtitle_width) + 28.0).clamp(160.0, width * 0.6);
        let max_chars = ((panel_width - 28.0) / 4.0).max(8.0) as usize;
        let subtitle = wrap_text(&hud.subtitle, max_chars);
        let subtitle_lines = subtitle.len().min(2);
        let panel_height = 32.0 + subtitle_lines as f32 * 8.0;
        surface.fill_rounded_rect(20.0, 20.0, panel_width, panel_height, 8.0, HUD_PANEL);
        surface.fill_rect(20.0, 26.0, 4.0, panel_height - 12.0, info.accent);
        surface.text(32.0, 28.0, &hud.title, 2, INK);
        for (index, line) in subtitle.iter().take(subtitle_lines).enumerate() {
            surface.text(32.0, 44.0 + index as f32 * 8.0, line, 1, MUTED);
        }

        let status = if hud.status.is_empty() {
            PLAYING_STATUS
        } else {
            hud.status.as_str()
        };
        let bar = if hud.hint.is_empty() {
            format!("Esc: Menu  |  {status}")
        } else {
            format!("Esc: Menu  |  {status}  |  {}", hud.hint)
        };
        paint_pill(surface, width * 0.5, height - 34.0, &bar);
    }
}

fn paint_pill(surface: &mut RenderSurface, center_x: f32, y: f32, text: &str) {
    let text_width = surface.text_width(text, 1);
    let pill_width = text_width + 24.0;
    surface.fill_rounded_rect(
        center_x - pill_width * 0.5,
        y - 6.0,
        pill_width,
        18.0,
        9.0,
        PILL_PANEL,
    );
    surface.text_centered(center_x, y, text, 1, INK);
}

/// First letter of each word, as on the menu thumbnails.
pub(crate) fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

fn digit_index(code: &str) -> Option<usize> {
    let digit = code.strip_prefix("Digit")?.parse::<usize>().ok()?;
    digit.checked_sub(1)
}

/// Greedy word wrap on character count.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use worlds_engine::PointerState;

    use super::*;
    use crate::worlds::build_registry;

    fn pointer(x: f32, y: f32) -> PointerState {
        PointerState { x, y, is_down: true }
    }

    #[test]
    fn initials_follow_word_starts() {
        assert_eq!(initials("Pro Golfer"), "PG");
        assert_eq!(initials("Caddy (Carrying)"), "C(");
        assert_eq!(initials("Greenskeeper"), "G");
    }

    #[test]
    fn wrap_text_respects_width() {
        let lines = wrap_text("Paint terrain, place hazards, test play lines", 16);
        assert!(lines.iter().all(|line| line.chars().count() <= 16));
        assert_eq!(lines.join(" "), "Paint terrain, place hazards, test play lines");
    }

    #[test]
    fn digit_keys_pick_worlds_in_menu_order() {
        let registry = build_registry();
        let mut shell = GolfShell::new();
        assert_eq!(
            shell.menu_input(&RoutedInput::KeyDown("Digit1".to_string()), &registry),
            ShellRequest::StartWorld("pro".to_string())
        );
        assert_eq!(
            shell.menu_input(&RoutedInput::KeyDown("Digit5".to_string()), &registry),
            ShellRequest::StartWorld("manager".to_string())
        );
        assert_eq!(
            shell.menu_input(&RoutedInput::KeyDown("Digit6".to_string()), &registry),
            ShellRequest::Nothing
        );
        assert_eq!(
            shell.menu_input(&RoutedInput::KeyDown("Digit0".to_string()), &registry),
            ShellRequest::Nothing
        );
    }

    #[test]
    fn clicking_a_tile_requests_its_world() {
        let registry = build_registry();
        let mut shell = GolfShell::new();
        let rects = shell.tile_rects(registry.len());
        let third = rects[2];
        let request = shell.menu_input(
            &RoutedInput::PointerDown(pointer(third.x + 20.0, third.y + 20.0)),
            &registry,
        );
        assert_eq!(request, ShellRequest::StartWorld("greens".to_string()));

        let miss = shell.menu_input(&RoutedInput::PointerDown(pointer(2.0, 2.0)), &registry);
        assert_eq!(miss, ShellRequest::Nothing);
    }

    #[test]
    fn start_failure_notice_fades_out() {
        let registry = build_registry();
        let mut shell = GolfShell::new();
        shell.start_failed(&UnknownWorldError {
            id: "ghost".to_string(),
        });
        let mut surface = RenderSurface::new();
        shell.paint_menu(&mut surface, &registry, Duration::from_secs(1));
        assert!(shell.notice_alpha(Duration::from_secs(1)).is_some());
        assert!(shell.notice_alpha(Duration::from_secs(4)).is_none());
    }
}
