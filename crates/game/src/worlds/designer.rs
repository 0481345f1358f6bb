use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use worlds_engine::{
    hex_color, FrameControl, FrameTick, PointerState, RenderSurface, Rgba, TimerTag, Vec2, World,
    WorldContext,
};

const COLUMNS: usize = 80;
const MIN_ROWS: usize = 1;
const ROTATE_STEP: f32 = 0.05;
const CHARGE_RATE: f32 = 2.0;
const MAX_POWER: f32 = 200.0;
const POWER_TO_SPEED: f32 = 0.05;
const STOP_SPEED: f32 = 0.1;
const HOLE_SHARE: f32 = 0.36;
const TEE_SHARE: f32 = 0.32;
const BALL_SHARE: f32 = 0.3;
const ARROW_SHARE: f32 = 3.2;
const BUTTON_WIDTH: f32 = 120.0;
const BUTTON_HEIGHT: f32 = 36.0;
const MESSAGE_DURATION: Duration = Duration::from_millis(1800);
const MESSAGE_TIMER: u32 = 1;

const FIELD: Rgba = hex_color(0xa7d39a);
const GRASS: Rgba = hex_color(0x2fa14a);
const SAND: Rgba = hex_color(0xe6d4a6);
const WATER: Rgba = hex_color(0x8fbbe6);
const GREEN: Rgba = hex_color(0x76d27e);
const WHITE: Rgba = hex_color(0xffffff);
const BLACK: Rgba = hex_color(0x000000);
const INK: Rgba = hex_color(0x111111);
const ERASER_INK: Rgba = hex_color(0xd32f2f);
const BALL: Rgba = hex_color(0xe53935);
const HOVER: Rgba = [255, 255, 255, 120];
const POWER_FILL: Rgba = hex_color(0x2e7d32);
const MESSAGE_PANEL: Rgba = [17, 17, 17, 200];

/// Play mode was requested before the course had both markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum PlacementError {
    #[error("Place both tee and hole first! (T / H, then click)")]
    MissingTeeAndHole,
    #[error("Place a tee first! (T, then click)")]
    MissingTee,
    #[error("Place a hole first! (H, then click)")]
    MissingHole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Terrain {
    #[default]
    Grass,
    Sand,
    Water,
    Green,
}

impl Terrain {
    /// Per-frame velocity retention for a ball rolling over this cell.
    pub(crate) fn friction(self) -> f32 {
        match self {
            Self::Grass => 0.98,
            Self::Sand => 0.9,
            Self::Water => 0.85,
            Self::Green => 0.95,
        }
    }

    fn color(self) -> Rgba {
        match self {
            Self::Grass => GRASS,
            Self::Sand => SAND,
            Self::Water => WATER,
            Self::Green => GREEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Brush {
    Paint(Terrain),
    Eraser,
}

impl Brush {
    fn label(self) -> &'static str {
        match self {
            Self::Paint(Terrain::Grass) => "grass",
            Self::Paint(Terrain::Sand) => "sand",
            Self::Paint(Terrain::Water) => "water",
            Self::Paint(Terrain::Green) => "green",
            Self::Eraser => "eraser",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placing {
    Nothing,
    Hole,
    Tee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) row: usize,
    pub(crate) column: usize,
}

/// Terrain per cell plus the pixel size of one cell on the current surface.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CourseGrid {
    rows: usize,
    cells: Vec<Terrain>,
    cell_width: f32,
    cell_height: f32,
}

impl CourseGrid {
    pub(crate) fn for_surface(width: f32, height: f32) -> Self {
        let rows = ((height / width) * COLUMNS as f32).round().max(MIN_ROWS as f32) as usize;
        let mut grid = Self {
            rows,
            cells: vec![Terrain::Grass; rows * COLUMNS],
            cell_width: 0.0,
            cell_height: 0.0,
        };
        grid.fit(width, height);
        grid
    }

    /// Keeps the painted cells and re-derives cell sizes.
    pub(crate) fn fit(&mut self, width: f32, height: f32) {
        self.cell_width = width / COLUMNS as f32;
        self.cell_height = height / self.rows as f32;
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn cell_size(&self) -> (f32, f32) {
        (self.cell_width, self.cell_height)
    }

    /// Truncating division by cell size, clamped onto the grid.
    pub(crate) fn cell_at(&self, point: Vec2) -> Cell {
        let index = |value: f32, size: f32, count: usize| {
            let raw = (value / size).floor();
            if raw.is_finite() {
                raw.clamp(0.0, (count - 1) as f32) as usize
            } else {
                0
            }
        };
        Cell {
            row: index(point.y, self.cell_height, self.rows),
            column: index(point.x, self.cell_width, COLUMNS),
        }
    }

    pub(crate) fn terrain(&self, cell: Cell) -> Terrain {
        self.cells[cell.row * COLUMNS + cell.column]
    }

    fn set(&mut self, cell: Cell, terrain: Terrain) {
        self.cells[cell.row * COLUMNS + cell.column] = terrain;
    }

    fn center(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            cell.column as f32 * self.cell_width + self.cell_width * 0.5,
            cell.row as f32 * self.cell_height + self.cell_height * 0.5,
        )
    }

    fn min_edge(&self) -> f32 {
        self.cell_width.min(self.cell_height)
    }

    fn paint(&self, surface: &mut RenderSurface) {
        for row in 0..self.rows {
            for column in 0..COLUMNS {
                let terrain = self.cells[row * COLUMNS + column];
                surface.fill_rect(
                    column as f32 * self.cell_width,
                    row as f32 * self.cell_height,
                    self.cell_width.ceil(),
                    self.cell_height.ceil(),
                    terrain.color(),
                );
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PlayBall {
    position: Vec2,
    velocity: Vec2,
    moving: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PlayState {
    ball: PlayBall,
    aim: f32,
    power: f32,
    charging: bool,
    strokes: u32,
}

#[derive(Debug, Clone, PartialEq)]
struct Message {
    text: String,
    serial: u64,
}

/// Paint a course on a grid, mark tee and hole, then putt across it.
pub(crate) struct DesignerWorld {
    grid: CourseGrid,
    surface_size: Vec2,
    brush: Brush,
    placing: Placing,
    hole: Option<Cell>,
    tee: Option<Cell>,
    hover: Option<Cell>,
    play: Option<PlayState>,
    message: Option<Message>,
    message_serial: u64,
}

impl DesignerWorld {
    pub(crate) fn new() -> Self {
        Self {
            grid: CourseGrid::for_surface(800.0, 480.0),
            surface_size: Vec2::new(800.0, 480.0),
            brush: Brush::Paint(Terrain::Sand),
            placing: Placing::Nothing,
            hole: None,
            tee: None,
            hover: None,
            play: None,
            message: None,
            message_serial: 0,
        }
    }

    fn toolbar_origin(&self) -> Vec2 {
        Vec2::new(self.surface_size.x - 280.0, 20.0)
    }

    fn play_button(&self) -> (f32, f32) {
        let origin = self.toolbar_origin();
        (origin.x, origin.y)
    }

    fn eraser_button(&self) -> (f32, f32) {
        let origin = self.toolbar_origin();
        (origin.x + 140.0, origin.y)
    }

    fn back_button(&self) -> (f32, f32) {
        (self.surface_size.x - 140.0, 20.0)
    }

    fn show_message(&mut self, text: impl Into<String>, ctx: &mut WorldContext<'_>) {
        self.message_serial += 1;
        self.message = Some(Message {
            text: text.into(),
            serial: self.message_serial,
        });
        ctx.schedule(
            MESSAGE_DURATION,
            TimerTag::stamped(MESSAGE_TIMER, self.message_serial),
        );
    }

    fn design_status(&self, ctx: &mut WorldContext<'_>) {
        ctx.set_status(format!("Designer mode - brush: {}", self.brush.label()));
    }

    fn paint_at(&mut self, point: Vec2) {
        let cell = self.grid.cell_at(point);
        match self.placing {
            Placing::Hole => {
                self.hole = Some(cell);
                self.placing = Placing::Nothing;
                return;
            }
            Placing::Tee => {
                self.tee = Some(cell);
                self.placing = Placing::Nothing;
                return;
            }
            Placing::Nothing => {}
        }

        match self.brush {
            Brush::Eraser => {
                if self.hole == Some(cell) {
                    self.hole = None;
                }
                if self.tee == Some(cell) {
                    self.tee = None;
                }
                self.grid.set(cell, Terrain::Grass);
            }
            Brush::Paint(terrain) => self.grid.set(cell, terrain),
        }
    }

    pub(crate) fn enter_play(&mut self) -> Result<(), PlacementError> {
        let tee = match (self.tee, self.hole) {
            (None, None) => return Err(PlacementError::MissingTeeAndHole),
            (None, Some(_)) => return Err(PlacementError::MissingTee),
            (Some(_), None) => return Err(PlacementError::MissingHole),
            (Some(tee), Some(_)) => tee,
        };
        self.play = Some(PlayState {
            ball: PlayBall {
                position: self.grid.center(tee),
                velocity: Vec2::ZERO,
                moving: false,
            },
            aim: 0.0,
            power: 0.0,
            charging: false,
            strokes: 0,
        });
        self.placing = Placing::Nothing;
        Ok(())
    }

    fn try_play(&mut self, ctx: &mut WorldContext<'_>) {
        match self.enter_play() {
            Ok(()) => {
                info!(tee = ?self.tee, hole = ?self.hole, "designer_play_started");
                ctx.set_status("Play mode - Strokes 0");
                ctx.set_hint("Left/Right aim, hold Space for power. Back returns to the editor.");
            }
            Err(error) => {
                debug!(%error, "designer_play_rejected");
                self.show_message(error.to_string(), ctx);
            }
        }
    }

    /// Blank grass course with no markers, back in design mode.
    fn reset_course(&mut self) {
        self.grid = CourseGrid::for_surface(self.surface_size.x, self.surface_size.y);
        self.placing = Placing::Nothing;
        self.hole = None;
        self.tee = None;
        self.play = None;
    }

    fn leave_play(&mut self, ctx: &mut WorldContext<'_>) {
        self.reset_course();
        ctx.set_hint(DESIGN_HINT);
        self.design_status(ctx);
    }

    fn step_play(&mut self, scale: f32, ctx: &mut WorldContext<'_>) {
        let Some(hole) = self.hole else {
            return;
        };
        let hole_center = self.grid.center(hole);
        let capture = self.grid.min_edge() * HOLE_SHARE;
        let Some(play) = self.play.as_mut() else {
            return;
        };

        if play.charging {
            play.power = (play.power + CHARGE_RATE * scale).min(MAX_POWER);
        }
        if !play.ball.moving {
            if ctx.is_key_down("ArrowLeft") {
                play.aim -= ROTATE_STEP * scale;
            }
            if ctx.is_key_down("ArrowRight") {
                play.aim += ROTATE_STEP * scale;
            }
            return;
        }

        let ball = &mut play.ball;
        ball.position += ball.velocity * scale;
        ball.position.x = ball.position.x.clamp(0.0, self.surface_size.x);
        ball.position.y = ball.position.y.clamp(0.0, self.surface_size.y);
        let friction = self.grid.terrain(self.grid.cell_at(ball.position)).friction();
        ball.velocity = ball.velocity * friction.powf(scale);
        if ball.velocity.x.abs() < STOP_SPEED && ball.velocity.y.abs() < STOP_SPEED {
            ball.moving = false;
            ball.velocity = Vec2::ZERO;
        }

        if ball.position.distance(hole_center) < capture {
            let strokes = play.strokes;
            info!(strokes, "designer_hole_completed");
            self.leave_play(ctx);
            self.show_message(format!("Hole completed in {strokes} strokes!"), ctx);
        }
    }

    fn release_shot(&mut self, ctx: &mut WorldContext<'_>) {
        let Some(play) = self.play.as_mut() else {
            return;
        };
        if !play.charging {
            return;
        }
        play.charging = false;
        let speed = play.power * POWER_TO_SPEED;
        play.ball.velocity = Vec2::new(play.aim.cos() * speed, play.aim.sin() * speed);
        play.ball.moving = true;
        play.strokes += 1;
        play.power = 0.0;
        ctx.set_status(format!("Play mode - Strokes {}", play.strokes));
    }

    fn paint(&self, surface: &mut RenderSurface) {
        surface.fill(FIELD);
        self.grid.paint(surface);
        let edge = self.grid.min_edge();

        if let Some(hole) = self.hole {
            surface.fill_circle(self.grid.center(hole), edge * HOLE_SHARE, BLACK);
        }

        match &self.play {
            None => {
                if let Some(tee) = self.tee {
                    surface.fill_circle(self.grid.center(tee), edge * TEE_SHARE, WHITE);
                }
                if let Some(cell) = self.hover {
                    let (width, height) = self.grid.cell_size();
                    surface.stroke_rect(
                        cell.column as f32 * width,
                        cell.row as f32 * height,
                        width,
                        height,
                        1.0,
                        HOVER,
                    );
                }
                self.paint_toolbar(surface);
            }
            Some(play) => self.paint_play(surface, play, edge),
        }

        if let Some(message) = &self.message {
            let width = surface.text_width(&message.text, 2) + 32.0;
            let center = self.surface_size * 0.5;
            surface.fill_rounded_rect(
                center.x - width * 0.5,
                center.y - 20.0,
                width,
                40.0,
                8.0,
                MESSAGE_PANEL,
            );
            surface.text_centered(center.x, center.y - 5.0, &message.text, 2, WHITE);
        }
    }

    fn paint_toolbar(&self, surface: &mut RenderSurface) {
        let (play_x, play_y) = self.play_button();
        surface.fill_rounded_rect(play_x, play_y, BUTTON_WIDTH, BUTTON_HEIGHT, 8.0, WHITE);
        surface.text_centered(play_x + BUTTON_WIDTH * 0.5, play_y + 11.0, "Play", 3, BLACK);

        let (eraser_x, eraser_y) = self.eraser_button();
        surface.fill_rounded_rect(eraser_x, eraser_y, BUTTON_WIDTH, BUTTON_HEIGHT, 8.0, WHITE);
        surface.text_centered(
            eraser_x + BUTTON_WIDTH * 0.5,
            eraser_y + 11.0,
            "Eraser",
            3,
            ERASER_INK,
        );

        let label = match self.placing {
            Placing::Hole => "Click to place the hole".to_string(),
            Placing::Tee => "Click to place the tee".to_string(),
            Placing::Nothing => format!("Brush: {}", self.brush.label()),
        };
        surface.text(play_x + 10.0, play_y + BUTTON_HEIGHT + 12.0, &label, 2, INK);
    }

    fn paint_play(&self, surface: &mut RenderSurface, play: &PlayState, edge: f32) {
        let ball = play.ball.position;
        surface.fill_circle(ball, edge * BALL_SHARE, BALL);
        if !play.ball.moving {
            let reach = edge * ARROW_SHARE;
            let tip = ball + Vec2::new(play.aim.cos() * reach, play.aim.sin() * reach);
            surface.line(ball, tip, 5.0, WHITE);
        }

        let bar_y = self.surface_size.y - 70.0;
        surface.fill_rect(20.0, bar_y, MAX_POWER, 16.0, WHITE);
        surface.fill_rect(20.0, bar_y, play.power.min(MAX_POWER), 16.0, POWER_FILL);

        let (back_x, back_y) = self.back_button();
        surface.fill_rounded_rect(back_x, back_y, BUTTON_WIDTH, BUTTON_HEIGHT, 8.0, INK);
        surface.text_centered(back_x + BUTTON_WIDTH * 0.5, back_y + 11.0, "Back", 3, WHITE);
    }
}

const DESIGN_HINT: &str = "Drag to paint. 1-4 terrain, 5 eraser, H hole, T tee, then Play.";

fn inside((x, y): (f32, f32), point: Vec2) -> bool {
    point.x >= x && point.x <= x + BUTTON_WIDTH && point.y >= y && point.y <= y + BUTTON_HEIGHT
}

impl World for DesignerWorld {
    fn start(&mut self, ctx: &mut WorldContext<'_>) {
        self.surface_size = ctx.surface().size();
        self.reset_course();
        self.brush = Brush::Paint(Terrain::Sand);
        self.hover = None;
        self.message = None;
        ctx.set_hint(DESIGN_HINT);
        self.design_status(ctx);
    }

    fn frame(&mut self, tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl {
        if self.play.is_some() {
            self.step_play(tick.frame_scale(), ctx);
        }
        self.paint(ctx.surface_mut());
        FrameControl::Continue
    }

    fn on_pointer_move(&mut self, pointer: PointerState, _ctx: &mut WorldContext<'_>) {
        if self.play.is_some() {
            return;
        }
        let point = Vec2::new(pointer.x, pointer.y);
        self.hover = Some(self.grid.cell_at(point));
        if pointer.is_down {
            self.paint_at(point);
        }
    }

    fn on_pointer_down(&mut self, pointer: PointerState, ctx: &mut WorldContext<'_>) {
        let point = Vec2::new(pointer.x, pointer.y);
        if self.play.is_some() {
            if inside(self.back_button(), point) {
                self.leave_play(ctx);
            }
            return;
        }
        if inside(self.play_button(), point) {
            self.try_play(ctx);
        } else if inside(self.eraser_button(), point) {
            self.brush = Brush::Eraser;
            self.design_status(ctx);
        } else {
            self.paint_at(point);
        }
    }

    fn on_pointer_leave(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {
        self.hover = None;
    }

    fn on_key_down(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
        if let Some(play) = self.play.as_mut() {
            if code == "Space" && !play.ball.moving {
                play.charging = true;
            }
            return;
        }
        let brush = match code {
            "Digit1" => Brush::Paint(Terrain::Grass),
            "Digit2" => Brush::Paint(Terrain::Sand),
            "Digit3" => Brush::Paint(Terrain::Water),
            "Digit4" => Brush::Paint(Terrain::Green),
            "Digit5" => Brush::Eraser,
            "KeyH" => {
                self.placing = Placing::Hole;
                return;
            }
            "KeyT" => {
                self.placing = Placing::Tee;
                return;
            }
            "KeyP" | "Enter" => {
                self.try_play(ctx);
                return;
            }
            _ => return,
        };
        self.brush = brush;
        self.design_status(ctx);
    }

    fn on_key_up(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
        if code == "Space" {
            self.release_shot(ctx);
        }
    }

    fn on_resize(&mut self, ctx: &mut WorldContext<'_>) {
        let size = ctx.surface().size();
        let ratio = Vec2::new(size.x / self.surface_size.x, size.y / self.surface_size.y);
        self.surface_size = size;
        self.grid.fit(size.x, size.y);
        if let Some(play) = self.play.as_mut() {
            play.ball.position = Vec2::new(
                play.ball.position.x * ratio.x,
                play.ball.position.y * ratio.y,
            );
        }
    }

    fn on_timer(&mut self, tag: TimerTag, _ctx: &mut WorldContext<'_>) {
        if tag.kind == MESSAGE_TIMER
            && self.message.as_ref().is_some_and(|message| message.serial == tag.stamp)
        {
            self.message = None;
        }
    }
}
