use std::f32::consts::PI;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::debug;
use worlds_engine::{
    clamp, hex_color, FrameControl, FrameTick, PointerState, RenderSurface, Rgba, Vec2, World,
    WorldContext,
};

const GROUND_SHARE: f32 = 0.20;
const TEE_SHARE: f32 = 0.12;
const HOLE_SHARE: f32 = 0.82;
const HOLE_LIFT: f32 = 6.0;
const HOLE_RADIUS: f32 = 10.0;
pub(crate) const BALL_RADIUS: f32 = 8.0;
const GRAVITY: f32 = 0.45;
const AIR_FRICTION: f32 = 0.995;
const ROLL_FRICTION: f32 = 0.96;
const ROLL_STOP_SPEED: f32 = 0.05;
const WIND_RANGE: f32 = 0.8;
const WIND_SCALE: f32 = 0.01;
const BOUNCE_SPEED: f32 = 1.5;
const BOUNCE_RETAIN: f32 = -0.2;
const BOUNCE_DRAG: f32 = 0.8;
const SETTLE_DRAG: f32 = 0.9;
const CAPTURE_MARGIN: f32 = 10.0;
pub(crate) const CAPTURE_SPEED: f32 = 1.6;
const DEFLECT_IMPULSE: f32 = 0.8;
const MIN_ANGLE: f32 = 0.12;
const MAX_ANGLE: f32 = PI * 0.75;
const ANGLE_STEP: f32 = 0.04;
const CHARGE_RATE: f32 = 1.6;
const MAX_POWER: f32 = 100.0;
const MIN_SHOT_POWER: f32 = 2.0;
const POWER_TO_SPEED: f32 = 3.5;
const GRAB_RADIUS: f32 = 40.0;
const PAR: u32 = 3;
const OUT_MARGIN_X: f32 = 50.0;
const OUT_MARGIN_BELOW: f32 = 200.0;
const BUTTON_WIDTH: f32 = 160.0;
const BUTTON_HEIGHT: f32 = 40.0;

const SKY_TOP: Rgba = hex_color(0xbfefff);
const SKY_BOTTOM: Rgba = hex_color(0x8ed09b);
const FAR_HILL: Rgba = hex_color(0x6dbb7b);
const NEAR_HILL: Rgba = hex_color(0x4a9b66);
const GROUND: Rgba = hex_color(0x1e7b4a);
const TEE_BOX: Rgba = hex_color(0x0c5c38);
const FLAG_POLE: Rgba = hex_color(0x333333);
const FLAG: Rgba = hex_color(0xf44336);
const BALL: Rgba = hex_color(0xffffff);
const BALL_EDGE: Rgba = hex_color(0xdddddd);
const AIM_LINE: Rgba = [255, 255, 255, 153];
const BAR_TRACK: Rgba = [255, 255, 255, 36];
const BAR_FILL: Rgba = hex_color(0x00c853);
const WHITE: Rgba = hex_color(0xffffff);
const SCRIM: Rgba = [0, 0, 0, 82];
const BUTTON_INK: Rgba = hex_color(0x003b2e);

/// Result of comparing the ball against the cup for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum HoleOutcome {
    Miss,
    Captured,
    /// Too fast to drop: the lip kicks the ball away with this velocity.
    Deflected(Vec2),
}

/// Capture needs the ball both inside the cup radius and nearly still.
pub(crate) fn evaluate_hole(position: Vec2, velocity: Vec2, hole: Vec2) -> HoleOutcome {
    let offset = position - hole;
    let distance = offset.length();
    if distance >= BALL_RADIUS + CAPTURE_MARGIN {
        return HoleOutcome::Miss;
    }
    if velocity.length() <= CAPTURE_SPEED {
        return HoleOutcome::Captured;
    }
    let direction = if distance > 0.0 { offset.x / distance } else { offset.x };
    HoleOutcome::Deflected(Vec2::new(
        velocity.x + direction * DEFLECT_IMPULSE,
        velocity.y - DEFLECT_IMPULSE,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ball {
    position: Vec2,
    velocity: Vec2,
    on_ground: bool,
}

impl Ball {
    fn is_resting(&self) -> bool {
        self.on_ground && self.velocity.x == 0.0
    }

    /// Ground contact: a hard landing bounces, a soft one settles into a roll.
    fn land(&mut self, ground_y: f32) {
        self.position.y = ground_y;
        if self.velocity.y.abs() > BOUNCE_SPEED {
            self.velocity.y *= BOUNCE_RETAIN;
            self.velocity.x *= BOUNCE_DRAG;
            self.on_ground = false;
        } else {
            self.velocity.y = 0.0;
            self.velocity.x *= SETTLE_DRAG;
            self.on_ground = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Course {
    width: f32,
    height: f32,
    ground_height: f32,
    tee_x: f32,
    hole: Vec2,
}

impl Course {
    fn for_surface(width: f32, height: f32) -> Self {
        let ground_height = (height * GROUND_SHARE).floor();
        Self {
            width,
            height,
            ground_height,
            tee_x: (width * TEE_SHARE).floor(),
            hole: Vec2::new((width * HOLE_SHARE).floor(), height - ground_height - HOLE_LIFT),
        }
    }

    fn ground_line(&self) -> f32 {
        self.height - self.ground_height
    }

    fn ball_rest_y(&self) -> f32 {
        self.ground_line() - BALL_RADIUS
    }

    fn is_out_of_bounds(&self, position: Vec2) -> bool {
        position.x < -OUT_MARGIN_X
            || position.x > self.width + OUT_MARGIN_X
            || position.y > self.height + OUT_MARGIN_BELOW
    }

    fn play_again_button(&self) -> (f32, f32) {
        (self.width * 0.5 - BUTTON_WIDTH - 10.0, self.height * 0.5 + 8.0)
    }

    fn menu_button(&self) -> (f32, f32) {
        (self.width * 0.5 + 10.0, self.height * 0.5 + 8.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    Holed(u32),
    ParExceeded,
    OutOfBounds,
}

impl RoundEnd {
    fn message(self) -> String {
        match self {
            Self::Holed(1) => "Hole in 1 stroke!".to_string(),
            Self::Holed(strokes) => format!("Hole in {strokes} strokes!"),
            Self::ParExceeded => "Par exceeded. Play again?".to_string(),
            Self::OutOfBounds => "Ball out of bounds".to_string(),
        }
    }
}

/// Side-on par 3: aim, charge, launch, and try to drop the ball in the cup.
pub(crate) struct ProGolferWorld {
    rng: Pcg32,
    course: Course,
    ball: Ball,
    strokes: u32,
    charging: bool,
    power: f32,
    angle: f32,
    wind: f32,
    round_end: Option<RoundEnd>,
}

impl ProGolferWorld {
    pub(crate) fn new(seed: u64) -> Self {
        let course = Course::for_surface(800.0, 480.0);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            course,
            ball: Self::ball_on_tee(&course),
            strokes: 0,
            charging: false,
            power: 0.0,
            angle: PI / 4.0,
            wind: 0.0,
            round_end: None,
        }
    }

    fn ball_on_tee(course: &Course) -> Ball {
        Ball {
            position: Vec2::new(course.tee_x, course.ball_rest_y()),
            velocity: Vec2::ZERO,
            on_ground: true,
        }
    }

    fn reset_round(&mut self, ctx: &mut WorldContext<'_>) {
        self.course = Course::for_surface(ctx.width(), ctx.height());
        self.ball = Self::ball_on_tee(&self.course);
        self.strokes = 0;
        self.charging = false;
        self.power = 0.0;
        self.round_end = None;
        self.wind = self.rng.random_range(-WIND_RANGE..WIND_RANGE);
        self.update_status(ctx);
    }

    fn update_status(&self, ctx: &mut WorldContext<'_>) {
        ctx.set_status(format!("Par {PAR} - Strokes {}/{PAR}", self.strokes));
    }

    fn set_angle(&mut self, angle: f32) {
        self.angle = clamp(angle, MIN_ANGLE, MAX_ANGLE);
    }

    fn begin_charge(&mut self) {
        if self.ball.is_resting() && !self.charging && self.round_end.is_none() {
            self.charging = true;
            self.power = 0.0;
        }
    }

    fn launch(&mut self, ctx: &mut WorldContext<'_>) {
        if !self.charging || !self.ball.is_resting() {
            return;
        }
        self.charging = false;
        let speed = clamp(self.power, MIN_SHOT_POWER, MAX_POWER) / POWER_TO_SPEED;
        self.ball.velocity = Vec2::new(self.angle.cos() * speed, -self.angle.sin() * speed);
        self.ball.on_ground = false;
        self.strokes += 1;
        debug!(strokes = self.strokes, power = self.power, angle = self.angle, "shot_taken");
        self.update_status(ctx);
        if self.strokes > PAR {
            self.round_end = Some(RoundEnd::ParExceeded);
        }
    }

    fn step_ball(&mut self, scale: f32) {
        let ball = &mut self.ball;
        if ball.on_ground {
            if ball.velocity.x != 0.0 {
                ball.position.x += ball.velocity.x * scale;
                ball.velocity.x *= ROLL_FRICTION.powf(scale);
                if ball.velocity.x.abs() < ROLL_STOP_SPEED {
                    ball.velocity.x = 0.0;
                }
            }
        } else {
            ball.velocity.y += GRAVITY * scale;
            ball.velocity.x *= AIR_FRICTION.powf(scale);
            ball.velocity.x += self.wind * WIND_SCALE * scale;
            ball.position += ball.velocity * scale;
            let rest_y = self.course.ball_rest_y();
            if ball.position.y >= rest_y {
                ball.land(rest_y);
            }
        }

        if self.course.is_out_of_bounds(self.ball.position) {
            self.round_end = Some(RoundEnd::OutOfBounds);
        }
    }

    fn check_hole(&mut self, ctx: &mut WorldContext<'_>) {
        match evaluate_hole(self.ball.position, self.ball.velocity, self.course.hole) {
            HoleOutcome::Miss => {}
            HoleOutcome::Captured => {
                self.round_end = Some(RoundEnd::Holed(self.strokes));
                self.ball.velocity = Vec2::ZERO;
                ctx.set_status("Hole!");
            }
            HoleOutcome::Deflected(velocity) => {
                self.ball.velocity = velocity;
                self.ball.on_ground = false;
            }
        }
    }

    fn paint(&self, surface: &mut RenderSurface) {
        let Course {
            width,
            height,
            ground_height,
            tee_x,
            hole,
        } = self.course;

        surface.fill(SKY_BOTTOM);
        surface.vertical_gradient(0.0, height * 0.6, SKY_TOP, SKY_BOTTOM);
        surface.fill_ellipse(
            Vec2::new(width * 0.3, height * 0.55),
            width * 0.4,
            height * 0.18,
            FAR_HILL,
        );
        surface.fill_ellipse(
            Vec2::new(width * 0.85, height * 0.6),
            width * 0.3,
            height * 0.14,
            NEAR_HILL,
        );
        surface.fill_rect(0.0, height - ground_height, width, ground_height, GROUND);
        surface.fill_rect(tee_x - 20.0, self.course.ground_line() - 6.0, 44.0, 10.0, TEE_BOX);

        surface.fill_circle(hole, HOLE_RADIUS, [0, 0, 0, 255]);
        surface.fill_rect(hole.x - 2.0, hole.y - 60.0, 4.0, 60.0, FLAG_POLE);
        surface.fill_triangle(
            Vec2::new(hole.x + 2.0, hole.y - 60.0),
            Vec2::new(hole.x + 28.0, hole.y - 48.0),
            Vec2::new(hole.x + 2.0, hole.y - 36.0),
            FLAG,
        );

        surface.fill_circle(self.ball.position, BALL_RADIUS, BALL);
        surface.stroke_circle(self.ball.position, BALL_RADIUS, 1.0, BALL_EDGE);

        if self.ball.is_resting() {
            let reach = 60.0 + self.power * 0.6;
            let from = self.ball.position + Vec2::new(0.0, -2.0);
            let to = from + Vec2::new(self.angle.cos() * reach, -self.angle.sin() * reach);
            surface.line(from, to, 2.0, AIM_LINE);

            let bar_width = 220.0;
            let bar_x = width * 0.5 - bar_width * 0.5;
            let bar_y = height - 72.0;
            surface.fill_rounded_rect(bar_x, bar_y, bar_width, 12.0, 6.0, BAR_TRACK);
            let filled = clamp(self.power / MAX_POWER, 0.0, 1.0) * (bar_width - 2.0);
            if filled > 0.0 {
                surface.fill_rounded_rect(bar_x + 1.0, bar_y + 1.0, filled, 10.0, 5.0, BAR_FILL);
            }
            surface.text(
                bar_x + bar_width + 10.0,
                bar_y + 1.0,
                &format!("POWER: {}%", self.power.round() as i32),
                2,
                WHITE,
            );
        }

        let readout_x = width - 200.0;
        surface.text(
            readout_x,
            24.0,
            &format!("Par {PAR}  Strokes {}/{PAR}", self.strokes),
            2,
            WHITE,
        );
        surface.text(readout_x, 44.0, &format!("Wind: {:.2}", self.wind), 2, WHITE);

        if let Some(end) = self.round_end {
            self.paint_overlay(surface, end);
        }
    }

    fn paint_overlay(&self, surface: &mut RenderSurface, end: RoundEnd) {
        let Course { width, height, .. } = self.course;
        surface.fill_rect(0.0, 0.0, width, height, SCRIM);
        surface.text_centered(width * 0.5, height * 0.5 - 36.0, &end.message(), 4, WHITE);

        for ((x, y), label) in [
            (self.course.play_again_button(), "Play Again"),
            (self.course.menu_button(), "Menu"),
        ] {
            surface.fill_rect(x, y, BUTTON_WIDTH, BUTTON_HEIGHT, WHITE);
            surface.text_centered(x + BUTTON_WIDTH * 0.5, y + 13.0, label, 3, BUTTON_INK);
        }
    }

    fn overlay_click(&mut self, point: Vec2, ctx: &mut WorldContext<'_>) {
        let hit = |(x, y): (f32, f32)| {
            point.x >= x
                && point.x <= x + BUTTON_WIDTH
                && point.y >= y
                && point.y <= y + BUTTON_HEIGHT
        };
        if hit(self.course.play_again_button()) {
            self.reset_round(ctx);
        } else if hit(self.course.menu_button()) {
            ctx.request_menu();
        }
    }
}

impl World for ProGolferWorld {
    fn start(&mut self, ctx: &mut WorldContext<'_>) {
        self.angle = PI / 4.0;
        self.reset_round(ctx);
        ctx.set_hint("Hold Space or press near the ball to charge. Up/Down aims.");
    }

    fn frame(&mut self, tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl {
        if self.round_end.is_none() {
            let scale = tick.frame_scale();
            if self.charging && self.ball.is_resting() {
                self.power = (self.power + CHARGE_RATE * scale).min(MAX_POWER);
            }
            self.step_ball(scale);
            if self.round_end.is_none() {
                self.check_hole(ctx);
            }
        }
        self.paint(ctx.surface_mut());
        FrameControl::Continue
    }

    fn on_key_down(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
        if self.round_end.is_some() {
            if matches!(code, "Enter" | "KeyR") {
                self.reset_round(ctx);
            }
            return;
        }
        match code {
            "Space" => self.begin_charge(),
            "ArrowUp" => self.set_angle(self.angle + ANGLE_STEP),
            "ArrowDown" => self.set_angle(self.angle - ANGLE_STEP),
            _ => {}
        }
    }

    fn on_key_up(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
        if code == "Space" {
            self.launch(ctx);
        }
    }

    fn on_pointer_move(&mut self, pointer: PointerState, _ctx: &mut WorldContext<'_>) {
        if self.ball.is_resting() && !self.charging && self.round_end.is_none() {
            let dx = pointer.x - self.ball.position.x;
            let dy = self.ball.position.y - pointer.y;
            self.set_angle(dy.atan2(dx));
        }
    }

    fn on_pointer_down(&mut self, pointer: PointerState, ctx: &mut WorldContext<'_>) {
        let point = Vec2::new(pointer.x, pointer.y);
        if self.round_end.is_some() {
            self.overlay_click(point, ctx);
            return;
        }
        if point.distance(self.ball.position) < GRAB_RADIUS {
            self.begin_charge();
        }
    }

    fn on_pointer_up(&mut self, _pointer: PointerState, ctx: &mut WorldContext<'_>) {
        self.launch(ctx);
    }

    fn on_pointer_leave(&mut self, _pointer: PointerState, _ctx: &mut WorldContext<'_>) {
        self.charging = false;
        self.power = 0.0;
    }

    fn on_resize(&mut self, ctx: &mut WorldContext<'_>) {
        let resting = self.ball.is_resting();
        self.course = Course::for_surface(ctx.width(), ctx.height());
        if resting {
            self.ball.position.y = self.course.ball_rest_y();
            if self.strokes == 0 {
                self.ball.position.x = self.course.tee_x;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use worlds_engine::{SessionRequest, WorldSandbox};

    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn started() -> (WorldSandbox, ProGolferWorld) {
        let mut sandbox = WorldSandbox::new(800.0, 480.0);
        let mut world = ProGolferWorld::new(7);
        sandbox.start(&mut world);
        (sandbox, world)
    }

    #[test]
    fn resting_ball_inside_cup_radius_is_captured() {
        let hole = Vec2::new(600.0, 300.0);
        let near = hole + Vec2::new(BALL_RADIUS + 9.0, 0.0);
        assert_eq!(evaluate_hole(near, Vec2::ZERO, hole), HoleOutcome::Captured);
        assert_eq!(evaluate_hole(near, Vec2::new(1.0, 1.0), hole), HoleOutcome::Captured);
    }

    #[test]
    fn fast_ball_is_deflected_instead_of_captured() {
        let hole = Vec2::new(600.0, 300.0);
        let position = hole + Vec2::new(-5.0, -2.0);
        let velocity = Vec2::new(6.0, 1.0);
        match evaluate_hole(position, velocity, hole) {
            HoleOutcome::Deflected(kicked) => {
                assert!(kicked.x < velocity.x, "pushed back toward the incoming side");
                assert!(kicked.y < velocity.y, "popped upward");
            }
            other => panic!("expected deflection, got {other:?}"),
        }
    }

    #[test]
    fn ball_outside_radius_is_a_miss() {
        let hole = Vec2::new(600.0, 300.0);
        let far = hole + Vec2::new(BALL_RADIUS + CAPTURE_MARGIN, 0.0);
        assert_eq!(evaluate_hole(far, Vec2::ZERO, hole), HoleOutcome::Miss);
    }

    #[test]
    fn hard_landing_bounces_and_soft_landing_settles() {
        let mut ball = Ball {
            position: Vec2::new(100.0, 390.0),
            velocity: Vec2::new(4.0, 5.0),
            on_ground: false,
        };
        ball.land(376.0);
        assert!(!ball.on_ground);
        assert!((ball.velocity.y + 1.0).abs() < 1e-5);
        assert!((ball.velocity.x - 3.2).abs() < 1e-5);

        ball.velocity.y = 1.0;
        ball.land(376.0);
        assert!(ball.on_ground);
        assert_eq!(ball.velocity.y, 0.0);
        assert!((ball.velocity.x - 2.88).abs() < 1e-5);
    }

    #[test]
    fn start_places_ball_on_the_tee() {
        let (sandbox, world) = started();
        assert_eq!(world.ball.position.x, (800.0 * TEE_SHARE).floor());
        assert_eq!(world.ball.position.y, 480.0 - (480.0 * GROUND_SHARE).floor() - BALL_RADIUS);
        assert!((-WIND_RANGE..WIND_RANGE).contains(&world.wind));
        assert_eq!(sandbox.hud().status, "Par 3 - Strokes 0/3");
    }

    #[test]
    fn aim_is_clamped_to_the_allowed_arc() {
        let (mut sandbox, mut world) = started();
        for _ in 0..100 {
            sandbox.press_key(&mut world, "ArrowUp");
        }
        assert!((world.angle - MAX_ANGLE).abs() < 1e-5);
        for _ in 0..100 {
            sandbox.press_key(&mut world, "ArrowDown");
        }
        assert!((world.angle - MIN_ANGLE).abs() < 1e-5);
    }

    #[test]
    fn charging_ramps_power_and_release_launches() {
        let (mut sandbox, mut world) = started();
        sandbox.key_down(&mut world, "Space");
        sandbox.frames(&mut world, 10, FRAME);
        assert!((world.power - 16.0).abs() < 0.1, "power {}", world.power);

        sandbox.frames(&mut world, 100, FRAME);
        assert_eq!(world.power, MAX_POWER);

        sandbox.key_up(&mut world, "Space");
        assert_eq!(world.strokes, 1);
        assert!(!world.ball.on_ground);
        assert!(world.ball.velocity.x > 0.0 && world.ball.velocity.y < 0.0);
        assert_eq!(sandbox.hud().status, "Par 3 - Strokes 1/3");
    }

    #[test]
    fn pointer_press_near_ball_charges() {
        let (mut sandbox, mut world) = started();
        let ball = world.ball.position;
        sandbox.pointer_down(&mut world, ball.x + 10.0, ball.y);
        assert!(world.charging);
        sandbox.frame(&mut world, FRAME);
        sandbox.pointer_up(&mut world, ball.x + 10.0, ball.y);
        assert_eq!(world.strokes, 1);

        let mut far = ProGolferWorld::new(1);
        sandbox.start(&mut far);
        sandbox.pointer_down(&mut far, 700.0, 50.0);
        assert!(!far.charging);
    }

    #[test]
    fn a_ball_launched_offscreen_ends_the_round() {
        let (mut sandbox, mut world) = started();
        world.ball.position = Vec2::new(-60.0, 100.0);
        world.ball.velocity = Vec2::new(-3.0, 0.0);
        world.ball.on_ground = false;
        sandbox.frame(&mut world, FRAME);
        assert_eq!(world.round_end, Some(RoundEnd::OutOfBounds));
    }

    #[test]
    fn exceeding_par_shows_overlay_and_play_again_resets() {
        let (mut sandbox, mut world) = started();
        world.strokes = PAR;
        sandbox.press_key(&mut world, "Space");
        assert_eq!(world.round_end, Some(RoundEnd::ParExceeded));

        let (x, y) = world.course.play_again_button();
        sandbox.click(&mut world, x + 5.0, y + 5.0);
        assert_eq!(world.round_end, None);
        assert_eq!(world.strokes, 0);
        assert!(world.ball.is_resting());
    }

    #[test]
    fn overlay_menu_button_requests_the_menu() {
        let (mut sandbox, mut world) = started();
        world.round_end = Some(RoundEnd::OutOfBounds);
        let (x, y) = world.course.menu_button();
        sandbox.pointer_down(&mut world, x + 20.0, y + 20.0);
        assert_eq!(sandbox.take_request(), Some(SessionRequest::Menu));
    }

    #[test]
    fn slow_ball_rolling_into_the_cup_is_holed() {
        let (mut sandbox, mut world) = started();
        world.strokes = 2;
        world.ball.position = Vec2::new(world.course.hole.x - 4.0, world.course.ball_rest_y());
        world.ball.velocity = Vec2::new(0.5, 0.0);
        sandbox.frame(&mut world, FRAME);
        assert_eq!(world.round_end, Some(RoundEnd::Holed(2)));
        assert_eq!(sandbox.hud().status, "Hole!");
    }

    #[test]
    fn resize_rederives_ground_line() {
        let (mut sandbox, mut world) = started();
        sandbox.resize(&mut world, 1000.0, 600.0);
        assert_eq!(world.course.ground_height, 120.0);
        assert_eq!(world.ball.position.y, 600.0 - 120.0 - BALL_RADIUS);
        assert_eq!(world.ball.position.x, 120.0);
    }
}
