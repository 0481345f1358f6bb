use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use worlds_engine::LoopConfig;

pub(crate) const CONFIG_ENV_VAR: &str = "GOLF_WORLDS_CONFIG";
pub(crate) const START_WORLD_ENV_VAR: &str = "GOLF_WORLDS_START";

const MAX_WINDOW_EDGE: u32 = 8192;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}' at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value at {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// On-disk overrides for [`LoopConfig`]; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AppConfigFile {
    pub(crate) window_title: Option<String>,
    pub(crate) window_width: Option<u32>,
    pub(crate) window_height: Option<u32>,
    pub(crate) max_frame_delta_ms: Option<u64>,
    pub(crate) metrics_log_interval_ms: Option<u64>,
    /// 0 disables the cap.
    pub(crate) max_render_fps: Option<u32>,
    pub(crate) start_world: Option<String>,
}

impl AppConfigFile {
    pub(crate) fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file: Self = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let field = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                field: if field.is_empty() { ".".to_string() } else { field },
                source: error.into_inner(),
            }
        })?;
        file.validate()?;
        Ok(file)
    }

    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("window_width", self.window_width),
            ("window_height", self.window_height),
        ] {
            if let Some(value) = value {
                if value == 0 || value > MAX_WINDOW_EDGE {
                    return Err(ConfigError::Invalid {
                        field,
                        message: format!("expected 1..={MAX_WINDOW_EDGE}, got {value}"),
                    });
                }
            }
        }
        if self.max_frame_delta_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_frame_delta_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn apply(self, config: &mut LoopConfig) {
        if let Some(title) = self.window_title {
            config.window_title = title;
        }
        if let Some(width) = self.window_width {
            config.window_width = width;
        }
        if let Some(height) = self.window_height {
            config.window_height = height;
        }
        if let Some(ms) = self.max_frame_delta_ms {
            config.max_frame_delta = Duration::from_millis(ms);
        }
        if let Some(ms) = self.metrics_log_interval_ms {
            config.metrics_log_interval = Duration::from_millis(ms);
        }
        if let Some(fps) = self.max_render_fps {
            config.max_render_fps = (fps > 0).then_some(fps);
        }
        if let Some(world) = self.start_world {
            config.initial_world = non_empty(world);
        }
    }
}

/// Defaults, then the optional config file, then the start-world env override.
pub(crate) fn resolve_loop_config() -> Result<LoopConfig, ConfigError> {
    let mut config = LoopConfig::default();
    if let Some(path) = env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        let path = PathBuf::from(path);
        let file = AppConfigFile::load(&path)?;
        info!(path = %path.display(), "config_loaded");
        file.apply(&mut config);
    }
    apply_start_override(&mut config, env::var(START_WORLD_ENV_VAR).ok());
    Ok(config)
}

pub(crate) fn apply_start_override(config: &mut LoopConfig, raw: Option<String>) {
    let Some(raw) = raw else {
        return;
    };
    match non_empty(raw) {
        Some(world) => config.initial_world = Some(world),
        None => warn!(env_var = START_WORLD_ENV_VAR, "empty start world ignored"),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
