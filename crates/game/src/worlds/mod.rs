//! The five career worlds and their menu metadata.

mod caddy;
mod designer;
mod greenskeeper;
mod manager;
mod pro_golfer;

use worlds_engine::{hex_color, WorldInfo, WorldRegistry};

pub(crate) use caddy::CaddyWorld;
pub(crate) use designer::DesignerWorld;
pub(crate) use greenskeeper::GreenskeeperWorld;
pub(crate) use manager::ManagerWorld;
pub(crate) use pro_golfer::ProGolferWorld;

pub(crate) const PRO: WorldInfo = WorldInfo {
    id: "pro",
    name: "Pro Golfer",
    summary: "Power, angle, and course strategy. Play par-3 course. Realistic ball flight and putts.",
    accent: hex_color(0xa6f0c6),
};

pub(crate) const DESIGNER: WorldInfo = WorldInfo {
    id: "designer",
    name: "Course Designer",
    summary: "Paint terrain, place hazards, test play lines and difficulty.",
    accent: hex_color(0xffe9a3),
};

pub(crate) const GREENS: WorldInfo = WorldInfo {
    id: "greens",
    name: "Greenskeeper",
    summary: "Repair damage, manage irrigation, and keep turf healthy under time pressure.",
    accent: hex_color(0xc8e7ff),
};

pub(crate) const CADDY: WorldInfo = WorldInfo {
    id: "caddy",
    name: "Caddy (Carrying)",
    summary: "Carry gear, manage stamina, accurately place the bag and clubs under constraints.",
    accent: hex_color(0xffd6da),
};

pub(crate) const MANAGER: WorldInfo = WorldInfo {
    id: "manager",
    name: "Club Manager",
    summary: "Plan events, manage budget & logistics - keep players happy.",
    accent: hex_color(0xe6d1ff),
};

/// Registers every world in menu order. Randomised worlds get a fresh seed per instance.
pub(crate) fn build_registry() -> WorldRegistry {
    let mut registry = WorldRegistry::new();
    registry.register(PRO, || ProGolferWorld::new(rand::random()));
    registry.register(DESIGNER, DesignerWorld::new);
    registry.register(GREENS, || GreenskeeperWorld::new(rand::random()));
    registry.register(CADDY, || CaddyWorld::new(rand::random()));
    registry.register(MANAGER, ManagerWorld::new);
    registry
}
