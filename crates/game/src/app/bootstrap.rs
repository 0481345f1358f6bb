use tracing::info;
use tracing_subscriber::EnvFilter;
use worlds_engine::{LoopConfig, WorldRegistry};

use super::config::{self, ConfigError};
use super::shell::GolfShell;
use crate::worlds;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) registry: WorldRegistry,
    pub(crate) shell: GolfShell,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Golf Worlds Startup ===");

    let config = config::resolve_loop_config()?;
    let registry = worlds::build_registry();
    info!(
        worlds = registry.len(),
        start_world = config.initial_world.as_deref().unwrap_or("menu"),
        "app_wired"
    );

    Ok(AppWiring {
        config,
        registry,
        shell: GolfShell::new(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
