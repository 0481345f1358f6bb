use std::process::ExitCode;

mod app;
mod worlds;

fn main() -> ExitCode {
    app::run(app::build_app())
}
