// plugin.rs

use crate::model::SimulationModel;
use crate::scene::SceneConfig;
use bevy::prelude::*;
use std::time::Duration;

/// Seconds between periodic read-outs in the log
const READOUT_INTERVAL: f32 = 1.0;

/// Hosts a [`SimulationModel`] as a resource and advances it every frame
pub struct SimulationPlugin {
    pub config: SceneConfig,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        SimulationPlugin {
            config: SceneConfig::default(),
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimulationModel::new(self.config.clone()))
            .insert_resource(ReadoutTimer(Timer::new(
                Duration::from_secs_f32(READOUT_INTERVAL),
                TimerMode::Repeating,
            )))
            .add_systems(Startup, announce_scene)
            .add_systems(Update, (step_simulation, log_readouts).chain());
    }
}

#[derive(Resource)]
pub struct ReadoutTimer(pub Timer);

fn announce_scene(model: Res<SimulationModel>) {
    let config = model.config();
    info!(
        "Scene '{}': {} springs, {} masses, damping {}",
        config.name,
        model.springs().len(),
        model.masses().len(),
        model.damping().get()
    );
}

/// Advance the model by the frame delta
pub fn step_simulation(time: Res<Time>, mut model: ResMut<SimulationModel>) {
    model.step(time.delta_secs());
}

/// Report every hanging mass once per interval
fn log_readouts(time: Res<Time>, mut timer: ResMut<ReadoutTimer>, model: Res<SimulationModel>) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    for mass in model.masses().iter().filter(|m| m.is_attached()) {
        let id = mass.id();
        let (Some(energy), Some(period)) = (model.energy(id), model.period(id)) else {
            continue;
        };
        info!(
            "{} at y={:.3} v={:.3} | KE {:.4} PE {:.4} EPE {:.4} thermal {:.4} | T {:.3}s",
            id,
            mass.position.value().y,
            mass.vertical_velocity.get(),
            energy.kinetic,
            energy.gravitational,
            energy.elastic,
            energy.thermal,
            period
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MassId;
    use crate::model::constants::shelf_y;

    fn test_app(config: SceneConfig) -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_plugins(SimulationPlugin { config });
        app
    }

    fn advance(app: &mut App, seconds: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(seconds));
        app.update();
    }

    #[test]
    fn test_plugin_inserts_model() {
        let mut app = test_app(SceneConfig::lab());
        app.update();

        let model = app.world().resource::<SimulationModel>();
        assert_eq!(model.config().name, "lab");
        assert_eq!(model.springs().len(), 1);
    }

    #[test]
    fn test_update_steps_free_fall() {
        let mut app = test_app(SceneConfig::lab());
        {
            let mut model = app.world_mut().resource_mut::<SimulationModel>();
            model.grab_mass(MassId(0));
            model.drag_mass(MassId(0), Vec2::new(0.2, 0.4));
            model.release_mass(MassId(0));
        }

        advance(&mut app, 0.05);

        let model = app.world().resource::<SimulationModel>();
        let y = model.masses()[0].position.get().y;
        assert!(y > 0.4 && y < shelf_y());
    }

    #[test]
    fn test_paused_model_ignores_frames() {
        let mut app = test_app(SceneConfig::lab());
        {
            let mut model = app.world_mut().resource_mut::<SimulationModel>();
            model.grab_mass(MassId(0));
            model.drag_mass(MassId(0), Vec2::new(0.2, 0.4));
            model.release_mass(MassId(0));
            model.set_playing(false);
        }

        for _ in 0..5 {
            advance(&mut app, 0.1);
        }

        let model = app.world().resource::<SimulationModel>();
        assert_eq!(model.masses()[0].position.get().y, 0.4);
    }
}
