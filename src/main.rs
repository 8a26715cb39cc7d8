// main.rs
//
// Headless runner: builds one scene, hangs its first mass on the first
// spring and logs the oscillation.
//
//     masses-springs [intro|vector|energy|lab|path/to/scene.json]

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use masses_springs::{ConfigError, MassId, SceneConfig, SimulationModel, SimulationPlugin};
use std::process::ExitCode;
use std::time::Duration;

fn load_config(arg: Option<String>) -> Result<SceneConfig, ConfigError> {
    match arg {
        None => Ok(SceneConfig::default()),
        Some(path) if path.ends_with(".json") => SceneConfig::from_file(path),
        Some(name) => SceneConfig::by_name(&name),
    }
}

fn main() -> ExitCode {
    let config = match load_config(std::env::args().nth(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let exit = App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(SimulationPlugin { config })
        .add_systems(Startup, hang_first_mass)
        .run();

    match exit {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(_) => ExitCode::FAILURE,
    }
}

fn hang_first_mass(mut model: ResMut<SimulationModel>) {
    let Some(spring) = model.springs().first() else {
        return;
    };
    let target = Vec2::new(spring.anchor().x, spring.bottom());
    if model.masses().is_empty() {
        return;
    }

    let mass = MassId(0);
    model.grab_mass(mass);
    model.drag_mass(mass, target);
    model.release_mass(mass);
    info!("Hung {} on {}", mass, model.springs()[0].id());
}
