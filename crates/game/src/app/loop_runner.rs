use std::process::ExitCode;

use tracing::error;
use worlds_engine::run_app;

use super::bootstrap::AppWiring;
use super::config::ConfigError;

pub(crate) fn run(app: Result<AppWiring, ConfigError>) -> ExitCode {
    let app = match app {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "config_failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run_app(app.config, app.registry, app.shell) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
