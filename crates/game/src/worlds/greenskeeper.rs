use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::{debug, info};
use worlds_engine::{
    clamp, hex_color, with_alpha, FrameControl, FrameTick, PointerState, RenderSurface, Rgba, Vec2,
    World, WorldContext,
};

const COLUMNS: usize = 22;
const ROWS: usize = 10;
const PAD: f32 = 12.0;
const ROUND_MS: f32 = 90_000.0;
const MOISTURE_MIN: f32 = 0.2;
const MOISTURE_SPAN: f32 = 0.7;
const DRYING_MIN: f32 = 0.00001;
const DRYING_SPAN: f32 = 0.00002;
const DRY_MARK: f32 = 0.25;
const WATER_SCORE: u32 = 20;
const SPRINKLER_UNLOCK: u32 = 10;
const SPRINKLER_RADIUS: f32 = 75.0;
const SPRINKLER_MS: f32 = 3000.0;
const SPLASH_ALPHA: f32 = 0.8;
const SPLASH_SIZE: f32 = 4.0;
const SPLASH_FADE: f32 = 0.04;
const SPLASH_GROWTH: f32 = 0.6;

const LAWN: Rgba = hex_color(0xdff5e7);
const WHITE: Rgba = hex_color(0xffffff);
const DRY_MARKER: Rgba = [255, 255, 255, 204];
const SPRINKLER_ZONE: Rgba = [0, 200, 255, 51];
const SCORE_PANEL: Rgba = [0, 0, 0, 46];
const RESULT_SCRIM: Rgba = [0, 0, 0, 102];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Patch {
    pub(crate) moisture: f32,
    /// Moisture lost per millisecond.
    pub(crate) drying_rate: f32,
}

impl Patch {
    fn dry(&mut self, elapsed_ms: f32) {
        self.moisture = (self.moisture - self.drying_rate * elapsed_ms).max(0.0);
    }

    fn color(&self) -> Rgba {
        let moisture = clamp(self.moisture, 0.0, 1.0);
        [
            (140.0 + 80.0 * (1.0 - moisture)) as u8,
            (200.0 + 30.0 * moisture) as u8,
            (100.0 + 60.0 * moisture) as u8,
            255,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Splash {
    center: Vec2,
    alpha: f32,
    size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PatchLayout {
    cell_width: f32,
    cell_height: f32,
}

impl PatchLayout {
    fn for_surface(size: Vec2) -> Self {
        Self {
            cell_width: (size.x - PAD * 2.0) / COLUMNS as f32,
            cell_height: (size.y - PAD * 2.0) / ROWS as f32,
        }
    }

    fn origin(&self, index: usize) -> Vec2 {
        Vec2::new(
            PAD + (index % COLUMNS) as f32 * self.cell_width,
            PAD + (index / COLUMNS) as f32 * self.cell_height,
        )
    }

    fn center(&self, index: usize) -> Vec2 {
        self.origin(index) + Vec2::new(self.cell_width * 0.5, self.cell_height * 0.5)
    }

    /// Nearest patch, clamped onto the field.
    fn index_at(&self, point: Vec2) -> usize {
        let axis = |value: f32, size: f32, count: usize| {
            let raw = ((value - PAD) / size).floor();
            if raw.is_finite() {
                raw.clamp(0.0, (count - 1) as f32) as usize
            } else {
                0
            }
        };
        axis(point.y, self.cell_height, ROWS) * COLUMNS + axis(point.x, self.cell_width, COLUMNS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Watering {
    Single(usize),
    Sprinkler { patches: usize },
}

/// Keep the turf watered against the clock; every tenth job earns a sprinkler.
pub(crate) struct GreenskeeperWorld {
    rng: Pcg32,
    layout: PatchLayout,
    surface_size: Vec2,
    patches: Vec<Patch>,
    splashes: Vec<Splash>,
    score: u32,
    tasks_done: u32,
    time_left_ms: f32,
    sprinkler_ms: f32,
    pointer: Option<Vec2>,
    game_over: bool,
}

impl GreenskeeperWorld {
    pub(crate) fn new(seed: u64) -> Self {
        let surface_size = Vec2::new(800.0, 480.0);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            layout: PatchLayout::for_surface(surface_size),
            surface_size,
            patches: Vec::new(),
            splashes: Vec::new(),
            score: 0,
            tasks_done: 0,
            time_left_ms: ROUND_MS,
            sprinkler_ms: 0.0,
            pointer: None,
            game_over: false,
        }
    }

    fn reset(&mut self, ctx: &mut WorldContext<'_>) {
        self.surface_size = ctx.surface().size();
        self.layout = PatchLayout::for_surface(self.surface_size);
        let rng = &mut self.rng;
        self.patches = (0..COLUMNS * ROWS)
            .map(|_| Patch {
                moisture: MOISTURE_MIN + rng.random_range(0.0..MOISTURE_SPAN),
                drying_rate: DRYING_MIN + rng.random_range(0.0..DRYING_SPAN),
            })
            .collect();
        self.splashes.clear();
        self.score = 0;
        self.tasks_done = 0;
        self.time_left_ms = ROUND_MS;
        self.sprinkler_ms = 0.0;
        self.game_over = false;
        ctx.set_hint("Click dry patches to water them. Every 10 jobs unlocks a sprinkler.");
        self.update_status(ctx);
    }

    fn sprinkler_active(&self) -> bool {
        self.sprinkler_ms > 0.0
    }

    fn update_status(&self, ctx: &mut WorldContext<'_>) {
        let seconds = (self.time_left_ms / 1000.0).ceil().max(0.0) as u32;
        if self.sprinkler_active() {
            ctx.set_status(format!("Time {seconds}s - Sprinkler!"));
        } else {
            ctx.set_status(format!("Time {seconds}s"));
        }
    }

    pub(crate) fn water(&mut self, point: Vec2) -> Watering {
        let watering = if self.sprinkler_active() {
            let reach = SPRINKLER_RADIUS * SPRINKLER_RADIUS;
            let mut count = 0;
            for (index, patch) in self.patches.iter_mut().enumerate() {
                let offset = self.layout.center(index) - point;
                if offset.x * offset.x + offset.y * offset.y <= reach {
                    patch.moisture = 1.0;
                    count += 1;
                }
            }
            self.score += WATER_SCORE * count as u32;
            Watering::Sprinkler { patches: count }
        } else {
            let index = self.layout.index_at(point);
            if let Some(patch) = self.patches.get_mut(index) {
                patch.moisture = 1.0;
            }
            self.score += WATER_SCORE;
            self.tasks_done += 1;
            if self.tasks_done % SPRINKLER_UNLOCK == 0 {
                self.sprinkler_ms = SPRINKLER_MS;
                info!(tasks_done = self.tasks_done, "sprinkler_unlocked");
            }
            Watering::Single(index)
        };

        self.splashes.push(Splash {
            center: point,
            alpha: SPLASH_ALPHA,
            size: SPLASH_SIZE,
        });
        watering
    }

    fn update(&mut self, tick: &FrameTick, ctx: &mut WorldContext<'_>) {
        let elapsed = tick.dt_millis();
        for patch in &mut self.patches {
            patch.dry(elapsed);
        }
        if self.sprinkler_active() {
            self.sprinkler_ms = (self.sprinkler_ms - elapsed).max(0.0);
        }

        let scale = tick.frame_scale();
        for splash in &mut self.splashes {
            splash.alpha -= SPLASH_FADE * scale;
            splash.size += SPLASH_GROWTH * scale;
        }
        self.splashes.retain(|splash| splash.alpha > 0.0);

        self.time_left_ms -= elapsed;
        self.update_status(ctx);
        if self.time_left_ms <= 0.0 {
            self.game_over = true;
            info!(score = self.score, tasks_done = self.tasks_done, "greens_round_over");
            ctx.set_hint("Time up - results finalized. Click to play again.");
        }
    }

    fn paint(&self, surface: &mut RenderSurface) {
        surface.fill(LAWN);
        let PatchLayout {
            cell_width,
            cell_height,
        } = self.layout;

        for (index, patch) in self.patches.iter().enumerate() {
            let origin = self.layout.origin(index);
            surface.fill_rect(
                origin.x + 2.0,
                origin.y + 2.0,
                cell_width - 4.0,
                cell_height - 4.0,
                patch.color(),
            );
            if patch.moisture < DRY_MARK {
                surface.fill_circle(self.layout.center(index), 6.0, DRY_MARKER);
            }
        }

        for splash in &self.splashes {
            surface.stroke_circle(splash.center, splash.size, 2.0, with_alpha(WHITE, splash.alpha));
        }

        if let (true, Some(pointer)) = (self.sprinkler_active(), self.pointer) {
            surface.fill_circle(pointer, SPRINKLER_RADIUS, SPRINKLER_ZONE);
        }

        let panel_x = self.surface_size.x - 250.0;
        surface.fill_rounded_rect(panel_x, 10.0, 240.0, 32.0, 8.0, SCORE_PANEL);
        surface.text(
            panel_x + 12.0,
            19.0,
            &format!("Score: {}  Tasks: {}", self.score, self.tasks_done),
            2,
            WHITE,
        );

        if self.game_over {
            let center = self.surface_size * 0.5;
            surface.fill_rect(0.0, 0.0, self.surface_size.x, self.surface_size.y, RESULT_SCRIM);
            surface.text_centered(
                center.x,
                center.y - 24.0,
                &format!("Game Over - Score: {}", self.score),
                4,
                WHITE,
            );
            surface.text_centered(
                center.x,
                center.y + 16.0,
                "Click to play again or Esc for the menu",
                2,
                WHITE,
            );
        }
    }
}

impl World for GreenskeeperWorld {
    fn start(&mut self, ctx: &mut WorldContext<'_>) {
        self.pointer = None;
        self.reset(ctx);
    }

    fn frame(&mut self, tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl {
        if !self.game_over {
            self.update(tick, ctx);
        }
        self.paint(ctx.surface_mut());
        if self.game_over {
            FrameControl::Halt
        } else {
            FrameControl::Continue
        }
    }

    fn on_pointer_move(&mut self, pointer: PointerState, _ctx: &mut WorldContext<'_>) {
        self.pointer = Some(Vec2::new(pointer.x, pointer.y));
    }

    fn on_pointer_leave(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {
        self.pointer = None;
    }

    fn on_pointer_down(&mut self, pointer: PointerState, ctx: &mut WorldContext<'_>) {
        let point = Vec2::new(pointer.x, pointer.y);
        self.pointer = Some(point);
        if self.game_over {
            self.reset(ctx);
            ctx.resume_frames();
            return;
        }
        match self.water(point) {
            Watering::Single(index) => debug!(index, score = self.score, "patch_watered"),
            Watering::Sprinkler { patches } => {
                debug!(patches, score = self.score, "sprinkler_watered")
            }
        }
        self.update_status(ctx);
    }

    fn on_key_down(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
        if self.game_over && code == "Enter" {
            self.reset(ctx);
            ctx.resume_frames();
        }
    }

    fn on_resize(&mut self, ctx: &mut WorldContext<'_>) {
        self.surface_size = ctx.surface().size();
        self.layout = PatchLayout::for_surface(self.surface_size);
        if self.game_over {
            self.paint(ctx.surface_mut());
        }
    }
}
