use thiserror::Error;

use super::rendering::Rgba;
use super::world::World;

/// Static display metadata for one world, passed through to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
    pub accent: Rgba,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown world `{id}`")]
pub struct UnknownWorldError {
    pub id: String,
}

pub type WorldFactory = Box<dyn Fn() -> Box<dyn World>>;

struct RegistryEntry {
    info: WorldInfo,
    factory: WorldFactory,
}

/// Id to factory table, populated once at startup.
#[derive(Default)]
pub struct WorldRegistry {
    entries: Vec<RegistryEntry>,
}

impl WorldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a world. Registering an id twice replaces the earlier entry in place.
    pub fn register<F, W>(&mut self, info: WorldInfo, factory: F)
    where
        F: Fn() -> W + 'static,
        W: World + 'static,
    {
        let factory: WorldFactory = Box::new(move || Box::new(factory()) as Box<dyn World>);
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.info.id == info.id) {
            entry.info = info;
            entry.factory = factory;
        } else {
            self.entries.push(RegistryEntry { info, factory });
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.info.id == id)
    }

    pub fn info(&self, id: &str) -> Result<WorldInfo, UnknownWorldError> {
        self.entries
            .iter()
            .find(|entry| entry.info.id == id)
            .map(|entry| entry.info)
            .ok_or_else(|| UnknownWorldError { id: id.to_string() })
    }

    /// Builds a fresh, independent instance of world `id`.
    pub fn create(&self, id: &str) -> Result<(Box<dyn World>, WorldInfo), UnknownWorldError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.info.id == id)
            .ok_or_else(|| UnknownWorldError { id: id.to_string() })?;
        Ok(((entry.factory)(), entry.info))
    }

    /// Registration order, which is also menu order.
    pub fn infos(&self) -> impl Iterator<Item = WorldInfo> + '_ {
        self.entries.iter().map(|entry| entry.info)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
