use std::time::Duration;

use tracing::{debug, info};
use worlds_engine::{
    hex_color, FrameControl, FrameTick, PointerState, RenderSurface, Rgba, TimerTag, Vec2, World,
    WorldContext,
};

const STARTING_BUDGET: u32 = 2000;
const BASE_SATISFACTION: u32 = 40;
const REJECTION_DURATION: Duration = Duration::from_millis(1000);
const BOOKING_DURATION: Duration = Duration::from_millis(2200);
const MESSAGE_TIMER: u32 = 1;

const PANEL_TOP: f32 = 80.0;
const ITEM_TOP: f32 = 130.0;
const ITEM_SPACING: f32 = 56.0;
const ITEM_LEFT: f32 = 36.0;
const ITEM_WIDTH: f32 = 320.0;
const ITEM_HEIGHT: f32 = 44.0;
const BOOK_WIDTH: f32 = 200.0;
const BOOK_HEIGHT: f32 = 44.0;

const BACKDROP: Rgba = hex_color(0xeef6fb);
const PANEL: Rgba = hex_color(0xffffff);
const CHOSEN: Rgba = hex_color(0xd7ffd9);
const UNCHOSEN: Rgba = hex_color(0xf9f9f9);
const INK: Rgba = hex_color(0x222222);
const BODY: Rgba = hex_color(0x333333);
const MUTED: Rgba = hex_color(0x666666);
const BOOK_BUTTON: Rgba = hex_color(0x00695c);
const BOOKED_BUTTON: Rgba = hex_color(0x8a9a98);
const WHITE: Rgba = hex_color(0xffffff);
const MESSAGE_BAND: Rgba = [0, 0, 0, 102];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EventItem {
    pub(crate) name: &'static str,
    pub(crate) cost: u32,
    /// Satisfaction points added while chosen.
    pub(crate) benefit: u32,
}

pub(crate) const CATALOG: [EventItem; 5] = [
    EventItem {
        name: "Catering",
        cost: 400,
        benefit: 60,
    },
    EventItem {
        name: "PR Campaign",
        cost: 300,
        benefit: 40,
    },
    EventItem {
        name: "Prizes",
        cost: 450,
        benefit: 70,
    },
    EventItem {
        name: "Security",
        cost: 250,
        benefit: 30,
    },
    EventItem {
        name: "Extra Greens Crew",
        cost: 200,
        benefit: 25,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Toggle {
    Chosen,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToggleRejected {
    OverBudget,
    Locked,
}

impl ToggleRejected {
    fn message(self) -> &'static str {
        match self {
            Self::OverBudget => "Not enough budget for that item.",
            Self::Locked => "Event already booked. Selections are locked.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Message {
    text: String,
    serial: u64,
}

/// Spend a fixed budget on event items, then book the event.
pub(crate) struct ManagerWorld {
    surface_size: Vec2,
    chosen: [bool; CATALOG.len()],
    budget: u32,
    satisfaction: u32,
    booked: bool,
    message: Option<Message>,
    message_serial: u64,
}

impl ManagerWorld {
    pub(crate) fn new() -> Self {
        Self {
            surface_size: Vec2::new(800.0, 480.0),
            chosen: [false; CATALOG.len()],
            budget: STARTING_BUDGET,
            satisfaction: BASE_SATISFACTION,
            booked: false,
            message: None,
            message_serial: 0,
        }
    }

    pub(crate) fn budget(&self) -> u32 {
        self.budget
    }

    pub(crate) fn satisfaction(&self) -> u32 {
        self.satisfaction
    }

    /// Selects or releases one catalog item, keeping budget and satisfaction exact.
    pub(crate) fn toggle(&mut self, index: usize) -> Result<Toggle, ToggleRejected> {
        if self.booked {
            return Err(ToggleRejected::Locked);
        }
        let item = CATALOG[index];
        if self.chosen[index] {
            self.chosen[index] = false;
            self.budget += item.cost;
            self.satisfaction -= item.benefit;
            return Ok(Toggle::Released);
        }
        if self.budget < item.cost {
            return Err(ToggleRejected::OverBudget);
        }
        self.chosen[index] = true;
        self.budget -= item.cost;
        self.satisfaction += item.benefit;
        Ok(Toggle::Chosen)
    }

    fn show_message(
        &mut self,
        text: impl Into<String>,
        duration: Duration,
        ctx: &mut WorldContext<'_>,
    ) {
        self.message_serial += 1;
        self.message = Some(Message {
            text: text.into(),
            serial: self.message_serial,
        });
        ctx.schedule(duration, TimerTag::stamped(MESSAGE_TIMER, self.message_serial));
    }

    fn select(&mut self, index: usize, ctx: &mut WorldContext<'_>) {
        match self.toggle(index) {
            Ok(change) => {
                debug!(
                    item = CATALOG[index].name,
                    ?change,
                    budget = self.budget,
                    satisfaction = self.satisfaction,
                    "manager_item_toggled"
                );
                self.update_status(ctx);
            }
            Err(rejected) => self.show_message(rejected.message(), REJECTION_DURATION, ctx),
        }
    }

    fn book(&mut self, ctx: &mut WorldContext<'_>) {
        self.booked = true;
        info!(
            budget_left = self.budget,
            satisfaction = self.satisfaction,
            "manager_event_booked"
        );
        self.show_message(
            format!("Event Booked! Final satisfaction {}%", self.satisfaction),
            BOOKING_DURATION,
            ctx,
        );
        ctx.set_status(format!("Booked - satisfaction {}%", self.satisfaction));
    }

    fn update_status(&self, ctx: &mut WorldContext<'_>) {
        ctx.set_status(format!("Budget ${} - satisfaction {}%", self.budget, self.satisfaction));
    }

    fn item_row(index: usize) -> f32 {
        ITEM_TOP + index as f32 * ITEM_SPACING
    }

    fn item_at(point: Vec2) -> Option<usize> {
        (0..CATALOG.len()).find(|&index| {
            let top = Self::item_row(index) - 24.0;
            point.x >= ITEM_LEFT
                && point.x <= ITEM_LEFT + ITEM_WIDTH
                && point.y >= top
                && point.y <= top + ITEM_HEIGHT
        })
    }

    fn book_button(&self) -> (f32, f32) {
        (self.surface_size.x - 320.0, self.surface_size.y - 100.0)
    }

    fn paint(&self, surface: &mut RenderSurface) {
        let Vec2 {
            x: width,
            y: height,
        } = self.surface_size;
        surface.fill(BACKDROP);

        surface.fill_rounded_rect(20.0, PANEL_TOP, 360.0, height - PANEL_TOP - 20.0, 12.0, PANEL);
        surface.text(40.0, PANEL_TOP + 16.0, "Event Options", 2, INK);
        for (index, item) in CATALOG.iter().enumerate() {
            let y = Self::item_row(index);
            let fill = if self.chosen[index] { CHOSEN } else { UNCHOSEN };
            surface.fill_rounded_rect(ITEM_LEFT, y - 24.0, ITEM_WIDTH, ITEM_HEIGHT, 8.0, fill);
            surface.text(
                48.0,
                y - 14.0,
                &format!("{}. {} - ${}", index + 1, item.name, item.cost),
                2,
                BODY,
            );
            surface.text(
                48.0,
                y + 4.0,
                &format!("Benefit: +{}% satisfaction", item.benefit),
                1,
                MUTED,
            );
        }

        let right = width - 380.0;
        surface.fill_rounded_rect(right, PANEL_TOP, 340.0, height - PANEL_TOP - 20.0, 12.0, PANEL);
        surface.text(right + 20.0, PANEL_TOP + 16.0, "Budget", 2, INK);
        surface.text(
            right + 20.0,
            PANEL_TOP + 48.0,
            &format!("Remaining: ${}", self.budget),
            2,
            BODY,
        );
        surface.text(
            right + 20.0,
            PANEL_TOP + 72.0,
            &format!("Expected satisfaction: {}%", self.satisfaction),
            2,
            BODY,
        );

        let (book_x, book_y) = self.book_button();
        let (fill, label) = if self.booked {
            (BOOKED_BUTTON, "Booked")
        } else {
            (BOOK_BUTTON, "Book Event")
        };
        surface.fill_rounded_rect(book_x, book_y, BOOK_WIDTH, BOOK_HEIGHT, 8.0, fill);
        surface.text_centered(book_x + BOOK_WIDTH * 0.5, book_y + 15.0, label, 2, WHITE);

        if let Some(message) = &self.message {
            surface.fill_rect(0.0, height * 0.5 - 24.0, width, 48.0, MESSAGE_BAND);
            surface.text_centered(width * 0.5, height * 0.5 - 6.0, &message.text, 2, WHITE);
        }
    }
}

impl World for ManagerWorld {
    fn start(&mut self, ctx: &mut WorldContext<'_>) {
        self.surface_size = ctx.surface().size();
        self.chosen = [false; CATALOG.len()];
        self.budget = STARTING_BUDGET;
        self.satisfaction = BASE_SATISFACTION;
        self.booked = false;
        self.message = None;
        ctx.set_hint("Click options (or 1-5) to toggle, then Book Event (Enter).");
        self.update_status(ctx);
    }

    fn frame(&mut self, _tick: &FrameTick, ctx: &mut WorldContext<'_>) -> FrameControl {
        self.paint(ctx.surface_mut());
        FrameControl::Continue
    }

    fn on_pointer_down(&mut self, pointer: PointerState, ctx: &mut WorldContext<'_>) {
        let point = Vec2::new(pointer.x, pointer.y);
        if let Some(index) = Self::item_at(point) {
            self.select(index, ctx);
            return;
        }
        let (x, y) = self.book_button();
        if point.x >= x && point.x <= x + BOOK_WIDTH && point.y >= y && point.y <= y + BOOK_HEIGHT {
            self.book(ctx);
        }
    }

    fn on_key_down(&mut self, code: &str, ctx: &mut WorldContext<'_>) {
        match code {
            "Digit1" => self.select(0, ctx),
            "Digit2" => self.select(1, ctx),
            "Digit3" => self.select(2, ctx),
            "Digit4" => self.select(3, ctx),
            "Digit5" => self.select(4, ctx),
            "Enter" => self.book(ctx),
            _ => {}
        }
    }

    fn on_resize(&mut self, ctx: &mut WorldContext<'_>) {
        self.surface_size = ctx.surface().size();
    }

    fn on_timer(&mut self, tag: TimerTag, _ctx: &mut WorldContext<'_>) {
        if tag.kind == MESSAGE_TIMER
            && self.message.as_ref().is_some_and(|message| message.serial == tag.stamp)
        {
            self.message = None;
        }
    }
}
