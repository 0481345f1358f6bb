use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::{debug, info};
use worlds_engine::{
    clamp, hex_color, with_alpha, FrameControl, FrameTick, PointerState, RenderSurface, Rgba,
    TimerTag, Vec2, World, WorldContext,
};

const CADDY_SPEED: f32 = 2.2;
const CADDY_RADIUS: f32 = 10.0;
const MAX_STAMINA: f32 = 100.0;
const REGEN_PER_MS: f32 = 0.05;
const DRAIN_PER_MS: f32 = 0.02;
const DRAIN_GROWTH: f32 = 0.2;
const START_X: f32 = 60.0;
const EDGE_X: f32 = 16.0;
const EDGE_Y: f32 = 50.0;
const PICKUP_RANGE: f32 = 20.0;
const TRAP_MARGIN: f32 = 10.0;
const BAG_CLEARANCE: f32 = 20.0;
const GOLFER_RANGE: f32 = 30.0;
const GOLFER_RADIUS: f32 = 20.0;
const MAX_TRAPS: u32 = 10;
const COURSE_END_MARGIN: f32 = 40.0;
const PLACEMENT_ATTEMPTS: usize = 64;
const OPTION_WIDTH: f32 = 180.0;
const OPTION_HEIGHT: f32 = 35.0;
const OPTION_SPACING: f32 = 45.0;
const CORRECT_DELAY: Duration = Duration::from_millis(1000);
const INCORRECT_DELAY: Duration = Duration::from_millis(800);
const BANNER_FADE_IN: f32 = 0.02;
const BANNER_FADE_OUT: f32 = 0.03;
const BANNER_HOLD_MS: f32 = 1000.0;

const NEXT_ROUND_TIMER: u32 = 1;
const GAME_OVER_TIMER: u32 = 2;

const SKY: Rgba = hex_color(0xcfeee6);
const FAIRWAY: Rgba = hex_color(0x3a7e52);
const TRAP: Rgba = hex_color(0xaa3333);
const BAG: Rgba = hex_color(0xb5651d);
const GOLFER: Rgba = hex_color(0xffd54f);
const WHITE: Rgba = hex_color(0xffffff);
const BLACK: Rgba = hex_color(0x000000);
const STAMINA_TRACK: Rgba = [0, 0, 0, 136];
const STAMINA_FILL: Rgba = hex_color(0xff7043);
const RIGHT_ANSWER: Rgba = hex_color(0x4caf50);
const WRONG_ANSWER: Rgba = hex_color(0xf44336);
const SCRIM: Rgba = [0, 0, 0, 178];

struct Question {
    prompt: &'static str,
    options: [&'static str; 3],
    answer: usize,
}

const QUESTIONS: [Question; 5] = [
    Question {
        prompt: "Ball is in a bunker near the green. What club do you use?",
        options: ["Driver", "Sand Wedge", "Putter"],
        answer: 1,
    },
    Question {
        prompt: "You're 150 yards from the hole on the fairway. What do you use?",
        options: ["7 Iron", "Putter", "Wedge"],
        answer: 0,
    },
    Question {
        prompt: "You're on the green, 20 feet from the hole. What club?",
        options: ["Putter", "9 Iron", "Driver"],
        answer: 0,
    },
    Question {
        prompt: "Ball stuck in rough grass, close to green. What should you use?",
        options: ["Pitching Wedge", "Driver", "Putter"],
        answer: 0,
    },
    Question {
        prompt: "You're teeing off on a long par 5. What club do you start with?",
        options: ["Driver", "9 Iron", "Putter"],
        answer: 0,
    },
];

/// How a round scales with its number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RoundPlan {
    pub(crate) traps: u32,
    pub(crate) bags: u32,
    pub(crate) course_length: f32,
    /// Stamina drain multiplier while carrying.
    pub(crate) drain_scale: f32,
}

impl RoundPlan {
    pub(crate) fn for_round(round: u32, width: f32) -> Self {
        let wanted = width * (0.4 + 0.1 * round as f32);
        Self {
            traps: (3 + round).min(MAX_TRAPS),
            bags: 2 + round / 2,
            course_length: wanted.min(width - COURSE_END_MARGIN),
            drain_scale: 1.0 + (round.saturating_sub(1)) as f32 * DRAIN_GROWTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Trap {
    center: Vec2,
    radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BagState {
    Waiting,
    Carried,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bag {
    position: Vec2,
    state: BagState,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Walking,
    Question { index: usize, picked: Option<usize> },
    GameOver(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BannerStage {
    FadeIn,
    Hold(f32),
    FadeOut,
}

#[derive(Debug, Clone, PartialEq)]
struct Banner {
    text: String,
    alpha: f32,
    stage: BannerStage,
}

impl Banner {
    fn new(text: String) -> Self {
        Self {
            text,
            alpha: 0.0,
            stage: BannerStage::FadeIn,
        }
    }

    /// Returns false once fully faded out.
    fn advance(&mut self, scale: f32, elapsed_ms: f32) -> bool {
        match self.stage {
            BannerStage::FadeIn => {
                self.alpha += BANNER_FADE_IN * scale;
                if self.alpha >= 1.0 {
                    self.alpha = 1.0;
                    self.stage = BannerStage::Hold(BANNER_HOLD_MS);
                }
            }
            BannerStage::Hold(remaining) => {
                let remaining = remaining - elapsed_ms;
                self.stage = if remaining <= 0.0 {
                    BannerStage::FadeOut
                } else {
                    BannerStage::Hold(remaining)
                };
            }
            BannerStage::FadeOut => {
                self.alpha -= BANNER_FADE_OUT * scale;
            }
        }
        self.alpha > 0.0 || self.stage == BannerStage::FadeIn
    }
}

/// Carry every bag to the golfer across a trapped fairway, then pick the right club.
pub(crate) struct CaddyWorld {
    rng: Pcg32,
    surface_size: Vec2,
    round: u32,
    plan: RoundPlan,
    caddy: Vec2,
    stamina: f32,
    traps: Vec<Trap>,
    bags: Vec<Bag>,
    golfer: Vec2,
    phase: Phase,
    banner: Option<Banner>,
}

impl CaddyWorld {
    pub(crate) fn new(seed: u64) -> Self {
        let surface_size = Vec2::new(800.0, 480.0);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            surface_size,
            round: 1,
            plan: RoundPlan::for_round(1, surface_size.x),
            caddy: Vec2::new(START_X, surface_size.y - 140.0),
            stamina: MAX_STAMINA,
            traps: Vec::new(),
            bags: Vec::new(),
            golfer: Vec2::ZERO,
            phase: Phase::Walking,
            banner: None,
        }
    }

    fn setup_round(&mut self, ctx: &mut WorldContext<'_>) {
        self.surface_size = ctx.surface().size();
        let Vec2 {
            x: width,
            y: height,
        } = self.surface_size;
        self.plan = RoundPlan::for_round(self.round, width);
        let course = self.plan.course_length;

        self.caddy = Vec2::new(START_X, height - 140.0);
        self.stamina = MAX_STAMINA;
        self.phase = Phase::Walking;

        let rng = &mut self.rng;
        self.traps = (0..self.plan.traps)
            .map(|_| Trap {
                center: Vec2::new(
                    150.0 + rng.random_range(0.0..1.0) * (course - 200.0).max(1.0),
                    height - 160.0 + rng.random_range(0.0..20.0),
                ),
                radius: 12.0 + rng.random_range(0.0..4.0),
            })
            .collect();

        self.bags = Vec::with_capacity(self.plan.bags as usize);
        for _ in 0..self.plan.bags {
            let mut candidate = Vec2::ZERO;
            for _ in 0..PLACEMENT_ATTEMPTS {
                candidate = Vec2::new(
                    120.0 + self.rng.random_range(0.0..1.0) * (course - 150.0).max(1.0),
                    height - 140.0,
                );
                let clear = self
                    .traps
                    .iter()
                    .all(|trap| candidate.distance(trap.center) >= trap.radius + BAG_CLEARANCE);
                if clear {
                    break;
                }
            }
            self.bags.push(Bag {
                position: candidate,
                state: BagState::Waiting,
            });
        }

        self.golfer = Vec2::new(course, height - 150.0);
        info!(
            round = self.round,
            traps = self.plan.traps,
            bags = self.plan.bags,
            course_length = course,
            "caddy_round_started"
        );
        ctx.set_hint(format!(
            "Round {}: arrows move. Carry every bag to the golfer without hitting traps.",
            self.round
        ));
        self.update_status(ctx);
    }

    fn delivered(&self) -> usize {
        self.bags
            .iter()
            .filter(|bag| bag.state == BagState::Delivered)
            .count()
    }

    fn update_status(&self, ctx: &mut WorldContext<'_>) {
        ctx.set_status(format!(
            "Round {} - Bags {}/{}",
            self.round,
            self.delivered(),
            self.bags.len()
        ));
    }

    fn game_over(&mut self, message: &'static str, ctx: &mut WorldContext<'_>) {
        info!(round = self.round, reason = message, "caddy_game_over");
        self.phase = Phase::GameOver(message);
        ctx.set_status(format!("Game over - round {}", self.round));
    }

    fn restart(&mut self, ctx: &mut WorldContext<'_>) {
        self.round = 1;
        self.banner = None;
        self.setup_round(ctx);
    }

    fn walk(&mut self, tick: &FrameTick, ctx: &mut WorldContext<'_>) {
        let scale = tick.frame_scale();
        let elapsed = tick.dt_millis();
        let axis = |negative: &str, positive: &str| {
            (ctx.is_key_down(positive) as i32 - ctx.is_key_down(negative) as i32) as f32
        };
        let direction = Vec2::new(axis("ArrowLeft", "ArrowRight"), axis("ArrowUp", "ArrowDown"));

        self.caddy += direction * (CADDY_SPEED * scale);
        self.caddy.x = clamp(self.caddy.x, EDGE_X, self.surface_size.x - EDGE_X);
        self.caddy.y = clamp(self.caddy.y, EDGE_Y, self.surface_size.y - EDGE_Y);

        if direction == Vec2::ZERO {
            self.stamina = (self.stamina + REGEN_PER_MS * elapsed).min(MAX_STAMINA);
        }

        let mut picked_up = false;
        for bag in &mut self.bags {
            if bag.state == BagState::Waiting && self.caddy.distance(bag.position) < PICKUP_RANGE {
                bag.state = BagState::Carried;
                picked_up = true;
            }
            if bag.state == BagState::Carried {
                bag.position = self.caddy + Vec2::new(10.0, 0.0);
                self.stamina -= DRAIN_PER_MS * elapsed * self.plan.drain_scale;
            }
        }
        if picked_up {
            ctx.set_status("Picked up bag!");
        }
        if self.stamina <= 0.0 {
            self.stamina = 0.0;
            self.game_over("You collapsed from exhaustion!", ctx);
            return;
        }

        let caddy = self.caddy;
        if self
            .traps
            .iter()
            .any(|trap| caddy.distance(trap.center) < trap.radius + TRAP_MARGIN)
        {
            self.game_over("You got caught in a trap! Game Over.", ctx);
            return;
        }

        if caddy.distance(self.golfer) < GOLFER_RANGE {
            let mut handed_over = 0;
            for bag in &mut self.bags {
                if bag.state == BagState::Carried {
                    bag.state = BagState::Delivered;
                    handed_over += 1;
                }
            }
            if handed_over > 0 {
                debug!(handed_over, round = self.round, "caddy_bags_delivered");
                self.update_status(ctx);
            }
            if self.delivered() == self.bags.len() {
                let index = self.rng.random_range(0..QUESTIONS.len());
                self.phase = Phase::Question {
                    index,
                    picked: None,
                };
            }
        }
    }

    fn option_rect(&self, option: usize) -> (f32, f32) {
        (
            self.surface_size.x * 0.5 - OPTION_WIDTH * 0.5,
            self.surface_size.y * 0.5 + option as f32 * OPTION_SPACING,
        )
    }

    fn option_at(&self, point: Vec2) -> Option<usize> {
        (0..3).find(|&option| {
            let (x, y) = self.option_rect(option);
            point.x > x && point.x < x + OPTION_WIDTH && point.y > y && point.y < y + OPTION_HEIGHT
        })
    }

    fn answer(&mut self, option: usize, ctx: &mut WorldContext<'_>) {
        let Phase::Question { index, picked } = &mut self.phase else {
            return;
        };
        if picked.is_some() {
            return;
        }
        *picked = Some(option);
        let correct = QUESTIONS[*index].answer == option;
        debug!(round = self.round, option, correct, "caddy_question_answered");
        let stamp = u64::from(self.round);
        if correct {
            ctx.schedule(CORRECT_DELAY, TimerTag::stamped(NEXT_ROUND_TIMER, stamp));
        } else {
            ctx.schedule(INCORRECT_DELAY, TimerTag::stamped(GAME_OVER_TIMER, stamp));
        }
    }

    fn is_answered(&self) -> bool {
        matches!(self.phase, Phase::Question { picked: Some(_), .. })
    }

    fn paint(&self, surface: &mut RenderSurface) {
        let Vec2 {
            x: width,
            y: height,
        } = self.surface_size;
        surface.fill(SKY);
        surface.fill_rect(0.0, height - 150.0, width, 150.0, FAIRWAY);

        for trap in &self.traps {
            surface.fill_circle(trap.center, trap.radius, TRAP);
        }
        for bag in &self.bags {
            if bag.state != BagState::Delivered {
                surface.fill_rect(bag.position.x - 8.0, bag.position.y - 8.0, 16.0, 16.0, BAG);
            }
        }
        surface.fill_circle(self.golfer, GOLFER_RADIUS, GOLFER);
        surface.fill_circle(self.caddy, CADDY_RADIUS, WHITE);

        surface.fill_rounded_rect(width - 160.0, 20.0, 140.0, 12.0, 6.0, STAMINA_TRACK);
        let filled = self.stamina / MAX_STAMINA * 138.0;
        if filled > 0.0 {
            surface.fill_rounded_rect(width - 159.0, 21.0, filled, 10.0, 5.0, STAMINA_FILL);
        }

        if let Some(banner) = &self.banner {
            surface.text_centered(
                width * 0.5,
                height * 0.5 - 14.0,
                &banner.text,
                5,
                with_alpha(WHITE, banner.alpha),
            );
        }

        match &self.phase {
            Phase::Walking => {}
            Phase::Question { index, picked } => {
                self.paint_question(surface, &QUESTIONS[*index], *picked)
            }
            Phase::GameOver(message) => {
                surface.fill_rect(0.0, 0.0, width, height, SCRIM);
                surface.text_centered(width * 0.5, height * 0.5 - 16.0, message, 3, WHITE);
                surface.text_centered(
                    width * 0.5,
                    height * 0.5 + 24.0,
                    "Click or press Enter to restart",
                    2,
                    WHITE,
                );
            }
        }
    }

    fn paint_question(
        &self,
        surface: &mut RenderSurface,
        question: &Question,
        picked: Option<usize>,
    ) {
        let Vec2 {
            x: width,
            y: height,
        } = self.surface_size;
        surface.fill_rect(0.0, 0.0, width, height, SCRIM);
        surface.text_centered(width * 0.5, height * 0.5 - 84.0, "Golf Situation!", 3, WHITE);
        surface.text_centered(width * 0.5, height * 0.5 - 44.0, question.prompt, 2, WHITE);

        for (option, label) in question.options.iter().enumerate() {
            let (x, y) = self.option_rect(option);
            let fill = match picked {
                Some(_) if option == question.answer => RIGHT_ANSWER,
                Some(choice) if choice == option => WRONG_ANSWER,
                _ => WHITE,
            };
            surface.fill_rounded_rect(x, y, OPTION_WIDTH, OPTION_HEIGHT, 10.0, fill);
            surface.text_centered(
                width * 0.5,
                y + 13.0,
                &format!("{}. {label}", option + 1),
                2,
                BLACK,
            );
        }

        if let Some(choice) = picked {
            let verdict = if choice == question.answer {
                "Correct!"
            } else {
                "Incorrect! Game Over."
            };
            surface.text_centered(width * 0.5, height * 0.5 + 150.0, verdict, 2, WHITE);
        }
    }
}

impl World for CaddyWorld {
    fn start(&mut self, ctx: &mut WorldContext<'_>) {
        self.restart(ctx);
    }

    fn frame(&mut self, tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl {
        if self.phase == Phase::Walking {
            self.walk(tick, ctx);
        }
        if let Some(banner) = self.banner.as_mut() {
            if !banner.advance(tick.frame_scale(), tick.dt_millis()) {
                self.banner = None;
            }
        }
        self.paint(ctx.surface_mut());
        FrameControl::Continue
    }

    fn on_pointer_down(&mut self, pointer: PointerState, ctx: &mut WorldContext<'_>) {
        let point = Vec2::new(pointer.x, pointer.y);
        match self.phase {
            Phase::GameOver(_) => self.restart(ctx),
            Phase::Question { picked: None, .. } => {
                if let Some(option) = self.option_at(point) {
                    self.answer(option, ctx);
                }
            }
            _ => {}
        }
    }

    fn on_key_down(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
        let answering = matches!(self.phase, Phase::Question { picked: None, .. });
        match code {
            "Enter" if matches!(self.phase, Phase::GameOver(_)) => self.restart(ctx),
            "Digit1" if answering => self.answer(0, ctx),
            "Digit2" if answering => self.answer(1, ctx),
            "Digit3" if answering => self.answer(2, ctx),
            _ => {}
        }
    }

    fn on_resize(&mut self, ctx: &mut WorldContext<'_>) {
        let size = ctx.surface().size();
        let shift = size.y - self.surface_size.y;
        self.surface_size = size;
        let moved = Vec2::new(0.0, shift);
        self.caddy += moved;
        self.golfer += moved;
        for trap in &mut self.traps {
            trap.center += moved;
        }
        for bag in &mut self.bags {
            bag.position += moved;
        }
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut WorldContext<'_>) {
        if tag.stamp != u64::from(self.round) || !self.is_answered() {
            return;
        }
        match tag.kind {
            NEXT_ROUND_TIMER => {
                self.round += 1;
                self.banner = Some(Banner::new(format!("Round {}", self.round)));
                self.setup_round(ctx);
            }
            GAME_OVER_TIMER => self.game_over("Incorrect! Game Over.", ctx),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use worlds_engine::WorldSandbox;

    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn started() -> (WorldSandbox, CaddyWorld) {
        let mut sandbox = WorldSandbox::new(800.0, 480.0);
        let mut world = CaddyWorld::new(3);
        sandbox.start(&mut world);
        (sandbox, world)
    }

    /// Clears hazards and lines the bags up next to the caddy.
    fn open_course(world: &mut CaddyWorld) {
        world.traps.clear();
        let caddy = world.caddy;
        for (offset, bag) in world.bags.iter_mut().enumerate() {
            bag.position = caddy + Vec2::new(5.0 + offset as f32, 0.0);
        }
        world.golfer = caddy + Vec2::new(200.0, 0.0);
    }

    fn carry_to_golfer(sandbox: &mut WorldSandbox, world: &mut CaddyWorld) {
        sandbox.frame(world, FRAME);
        world.caddy = world.golfer - Vec2::new(10.0, 0.0);
        sandbox.frame(world, FRAME);
    }

    #[test]
    fn rounds_scale_difficulty() {
        let first = RoundPlan::for_round(1, 800.0);
        assert_eq!((first.traps, first.bags), (4, 2));
        assert!((first.course_length - 400.0).abs() < 1e-3);
        assert_eq!(first.drain_scale, 1.0);

        let third = RoundPlan::for_round(3, 800.0);
        assert_eq!((third.traps, third.bags), (6, 3));
        assert!((third.drain_scale - 1.4).abs() < 1e-5);

        let late = RoundPlan::for_round(12, 800.0);
        assert_eq!(late.traps, MAX_TRAPS);
        assert_eq!(late.course_length, 800.0 - COURSE_END_MARGIN);
    }

    #[test]
    fn start_builds_round_one() {
        let (sandbox, world) = started();
        assert_eq!(world.round, 1);
        assert_eq!(world.traps.len(), 4);
        assert_eq!(world.bags.len(), 2);
        assert_eq!(world.caddy, Vec2::new(START_X, 340.0));
        assert_eq!(sandbox.hud().status, "Round 1 - Bags 0/2");
        assert!(world.bags.iter().all(|bag| bag.state == BagState::Waiting));
    }

    #[test]
    fn held_arrow_moves_the_caddy() {
        let (mut sandbox, mut world) = started();
        world.traps.clear();
        sandbox.key_down(&mut world, "ArrowUp");
        sandbox.frames(&mut world, 10, FRAME);
        sandbox.key_up(&mut world, "ArrowUp");
        let travelled = 340.0 - world.caddy.y;
        assert!((travelled - 10.0 * CADDY_SPEED * 0.96).abs() < 0.1, "{travelled}");
    }

    #[test]
    fn carrying_drains_and_resting_regenerates() {
        let (mut sandbox, mut world) = started();
        open_course(&mut world);
        sandbox.frame(&mut world, FRAME);
        assert!(world.bags.iter().all(|bag| bag.state == BagState::Carried));
        let drained = MAX_STAMINA - world.stamina;
        let expected = 2.0 * DRAIN_PER_MS * 16.0;
        assert!((drained - expected).abs() < 1e-3, "{drained}");

        world.bags.iter_mut().for_each(|bag| bag.state = BagState::Waiting);
        world.bags.iter_mut().for_each(|bag| bag.position = Vec2::new(700.0, 100.0));
        world.stamina = 50.0;
        sandbox.frame(&mut world, FRAME);
        assert!((world.stamina - (50.0 + REGEN_PER_MS * 16.0)).abs() < 1e-3);
    }

    #[test]
    fn exhaustion_ends_the_run() {
        let (mut sandbox, mut world) = started();
        open_course(&mut world);
        world.stamina = 0.1;
        sandbox.key_down(&mut world, "ArrowDown");
        sandbox.frame(&mut world, FRAME);
        assert_eq!(world.phase, Phase::GameOver("You collapsed from exhaustion!"));
    }

    #[test]
    fn touching_a_trap_ends_the_run() {
        let (mut sandbox, mut world) = started();
        world.traps = vec![Trap {
            center: world.caddy + Vec2::new(15.0, 0.0),
            radius: 12.0,
        }];
        sandbox.frame(&mut world, FRAME);
        assert!(matches!(world.phase, Phase::GameOver(_)));

        sandbox.press_key(&mut world, "Enter");
        assert_eq!(world.phase, Phase::Walking);
        assert_eq!(world.round, 1);
    }

    #[test]
    fn delivering_every_bag_asks_a_question() {
        let (mut sandbox, mut world) = started();
        open_course(&mut world);
        carry_to_golfer(&mut sandbox, &mut world);
        assert!(matches!(world.phase, Phase::Question { picked: None, .. }));
        assert_eq!(world.delivered(), 2);
    }

    #[test]
    fn golfer_without_bags_keeps_walking() {
        let (mut sandbox, mut world) = started();
        world.traps.clear();
        world.golfer = world.caddy + Vec2::new(5.0, 0.0);
        sandbox.frame(&mut world, FRAME);
        assert_eq!(world.phase, Phase::Walking);
    }

    fn answer_with(world: &mut CaddyWorld, sandbox: &mut WorldSandbox, correct: bool) {
        open_course(world);
        carry_to_golfer(sandbox, world);
        let Phase::Question { index, .. } = world.phase else {
            panic!("no question");
        };
        let right = QUESTIONS[index].answer;
        let option = if correct { right } else { (right + 1) % 3 };
        let (x, y) = world.option_rect(option);
        sandbox.click(world, x + 10.0, y + 10.0);
    }

    #[test]
    fn correct_answer_starts_next_round_after_delay() {
        let (mut sandbox, mut world) = started();
        answer_with(&mut world, &mut sandbox, true);
        assert!(world.is_answered());

        sandbox.advance(&mut world, Duration::from_millis(999));
        assert_eq!(world.round, 1);
        sandbox.advance(&mut world, Duration::from_millis(1));
        assert_eq!(world.round, 2);
        assert_eq!(world.phase, Phase::Walking);
        assert_eq!(world.traps.len(), 5);
        assert_eq!(world.bags.len(), 3);
        assert_eq!(world.banner.as_ref().map(|banner| banner.text.as_str()), Some("Round 2"));
    }

    #[test]
    fn wrong_answer_ends_the_run_after_delay() {
        let (mut sandbox, mut world) = started();
        answer_with(&mut world, &mut sandbox, false);
        sandbox.advance(&mut world, Duration::from_millis(799));
        assert!(world.is_answered());
        sandbox.advance(&mut world, Duration::from_millis(1));
        assert_eq!(world.phase, Phase::GameOver("Incorrect! Game Over."));

        sandbox.click(&mut world, 10.0, 10.0);
        assert_eq!(world.phase, Phase::Walking);
    }

    #[test]
    fn answer_timer_is_dropped_after_stop() {
        let (mut sandbox, mut world) = started();
        answer_with(&mut world, &mut sandbox, true);
        sandbox.stop(&mut world);
        sandbox.advance(&mut world, Duration::from_secs(2));
        assert_eq!(world.round, 1);
    }

    #[test]
    fn banner_fades_in_holds_and_fades_out() {
        let mut banner = Banner::new("Round 2".to_string());
        let mut frames = 0;
        while banner.advance(1.0, 16.0) {
            frames += 1;
            assert!(frames < 1000, "banner never finished");
        }
        assert!(frames > 50 + 60);
        assert!(banner.alpha <= 0.0);
    }
}
