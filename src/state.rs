// state.rs
//
// Serializable snapshots of a whole model, for saving a session or comparing
// two runs step for step.

use crate::model::{Body, MassId, SimSpeed, SimulationModel, SpringId, SpringState};
use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a snapshot could not be applied
#[derive(Debug)]
pub enum StateError {
    Json(serde_json::Error),
    SpringCount { expected: usize, found: usize },
    MassCount { expected: usize, found: usize },
    UnknownMass { spring: SpringId, mass: MassId },
    /// The spring and mass sides of an attachment disagree
    Attachment { spring: SpringId, mass: MassId },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Json(e) => write!(f, "Invalid state JSON: {}", e),
            StateError::SpringCount { expected, found } => {
                write!(f, "Expected {} springs, snapshot has {}", expected, found)
            }
            StateError::MassCount { expected, found } => {
                write!(f, "Expected {} masses, snapshot has {}", expected, found)
            }
            StateError::UnknownMass { spring, mass } => {
                write!(f, "{} holds {} which does not exist", spring, mass)
            }
            StateError::Attachment { spring, mass } => {
                write!(f, "{} and {} disagree about their attachment", spring, mass)
            }
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Json(e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassState {
    pub mass: f32,
    pub position: [f32; 2],
    pub vertical_velocity: f32,
    pub spring: Option<SpringId>,
    pub user_controlled: bool,
}

/// Everything needed to put a model back where it was. Intro scene slots
/// are not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub gravity: f32,
    pub damping: f32,
    pub body: Body,
    pub playing: bool,
    pub sim_speed: SimSpeed,
    pub timer_running: bool,
    pub timer_seconds: f32,
    pub springs: Vec<SpringState>,
    pub masses: Vec<MassState>,
}

impl ModelState {
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check that the snapshot fits a model with these counts and that every
    /// attachment is recorded on both sides
    fn validate(&self, springs: usize, masses: usize) -> Result<(), StateError> {
        if self.springs.len() != springs {
            return Err(StateError::SpringCount {
                expected: springs,
                found: self.springs.len(),
            });
        }
        if self.masses.len() != masses {
            return Err(StateError::MassCount {
                expected: masses,
                found: self.masses.len(),
            });
        }

        for (index, spring) in self.springs.iter().enumerate() {
            let spring_id = SpringId(index);
            let Some(mass_id) = spring.mass_attached else {
                continue;
            };
            let mass = self
                .masses
                .get(mass_id.index())
                .ok_or(StateError::UnknownMass {
                    spring: spring_id,
                    mass: mass_id,
                })?;
            if mass.spring != Some(spring_id) {
                return Err(StateError::Attachment {
                    spring: spring_id,
                    mass: mass_id,
                });
            }
        }

        for (index, mass) in self.masses.iter().enumerate() {
            let mass_id = MassId(index);
            if let Some(spring_id) = mass.spring {
                let attached = self
                    .springs
                    .get(spring_id.index())
                    .and_then(|s| s.mass_attached);
                if attached != Some(mass_id) {
                    return Err(StateError::Attachment {
                        spring: spring_id,
                        mass: mass_id,
                    });
                }
            }
        }

        Ok(())
    }
}

impl SimulationModel {
    pub fn snapshot(&self) -> ModelState {
        ModelState {
            gravity: self.gravity.get(),
            damping: self.damping.get(),
            body: self.body.get(),
            playing: self.playing.get(),
            sim_speed: self.sim_speed.get(),
            timer_running: self.timer_running.get(),
            timer_seconds: self.timer_seconds.get(),
            springs: self.springs.iter().map(|s| s.spring_state()).collect(),
            masses: self
                .masses
                .iter()
                .map(|m| {
                    let position = m.position.get();
                    MassState {
                        mass: m.mass.get(),
                        position: [position.x, position.y],
                        vertical_velocity: m.vertical_velocity.get(),
                        spring: m.spring.get(),
                        user_controlled: m.user_controlled.get(),
                    }
                })
                .collect(),
        }
    }

    /// Apply a snapshot taken from a model built from the same scene. The
    /// model is left untouched if the snapshot does not fit.
    pub fn restore(&mut self, state: &ModelState) -> Result<(), StateError> {
        state.validate(self.springs.len(), self.masses.len())?;

        for spring in &mut self.springs {
            spring.remove_mass(&mut self.masses);
        }

        self.body.set(state.body);
        self.gravity.set(state.gravity);
        self.set_damping(state.damping);
        self.playing.set(state.playing);
        self.sim_speed.set(state.sim_speed);
        self.timer_running.set(state.timer_running);
        self.timer_seconds.set(state.timer_seconds);

        for (mass, saved) in self.masses.iter_mut().zip(&state.masses) {
            mass.mass.set(saved.mass);
            mass.position.set(Vec2::from_array(saved.position));
            mass.vertical_velocity.set(saved.vertical_velocity);
            mass.user_controlled.set(saved.user_controlled);
        }

        // set_mass recomputes the displacement from the mass and picks up
        // its velocity as the oscillation velocity
        for (spring, saved) in self.springs.iter_mut().zip(&state.springs) {
            spring.set_spring_state(saved);
            if let Some(mass_id) = saved.mass_attached {
                spring.set_mass(&mut self.masses[mass_id.index()]);
            }
        }

        self.rebaseline_energies();
        log::info!("Restored '{}' model from snapshot", self.config.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneConfig;

    fn busy_lab() -> SimulationModel {
        let mut model = SimulationModel::new(SceneConfig::lab());
        let spring = &model.springs()[0];
        let target = Vec2::new(spring.anchor().x, spring.bottom());

        model.grab_mass(MassId(2));
        model.drag_mass(MassId(2), target);
        model.release_mass(MassId(2));
        model.set_gravity(12.0);
        for _ in 0..20 {
            model.step(1.0 / 60.0);
        }
        model
    }

    #[test]
    fn test_restore_reproduces_trajectory() {
        let mut source = busy_lab();
        let state = source.snapshot();

        let mut copy = SimulationModel::new(SceneConfig::lab());
        copy.restore(&state).unwrap();
        let restored = copy.snapshot();
        assert_eq!(restored.masses, state.masses);
        assert_eq!(restored.gravity, 12.0);
        assert_eq!(restored.body, Body::Custom);

        for _ in 0..30 {
            source.step(1.0 / 60.0);
            copy.step(1.0 / 60.0);
        }
        let a = source.masses()[2].position.get().y;
        let b = copy.masses()[2].position.get().y;
        assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
    }

    #[test]
    fn test_json_round_trip() {
        let state = busy_lab().snapshot();
        let json = state.to_json().unwrap();
        assert_eq!(ModelState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_rejects_snapshot_from_other_scene() {
        let state = busy_lab().snapshot();
        let mut intro = SimulationModel::new(SceneConfig::intro());
        let before = intro.snapshot();

        assert!(matches!(
            intro.restore(&state),
            Err(StateError::SpringCount {
                expected: 2,
                found: 1
            })
        ));
        assert_eq!(intro.snapshot(), before);
    }

    #[test]
    fn test_rejects_one_sided_attachment() {
        let mut state = busy_lab().snapshot();
        state.masses[2].spring = None;

        let mut model = SimulationModel::new(SceneConfig::lab());
        assert!(matches!(
            model.restore(&state),
            Err(StateError::Attachment { .. })
        ));

        let mut state = busy_lab().snapshot();
        state.springs[0].mass_attached = Some(MassId(9));
        assert!(matches!(
            model.restore(&state),
            Err(StateError::UnknownMass { .. })
        ));
    }

    #[test]
    fn test_restored_mass_below_floor_lands_on_next_step() {
        let mut model = SimulationModel::new(SceneConfig::lab());
        let floor = model.floor_y();
        let mut state = model.snapshot();
        state.masses[1].position = [0.2, floor + 0.1];
        state.masses[1].vertical_velocity = 0.5;

        model.restore(&state).unwrap();
        assert_eq!(model.masses()[1].position.get().y, floor + 0.1);

        model.step(1.0 / 60.0);
        assert_eq!(model.masses()[1].position.get(), Vec2::new(0.2, floor));
        assert_eq!(model.masses()[1].vertical_velocity.get(), 0.0);
    }

    #[test]
    fn test_rejects_garbage_json() {
        assert!(matches!(
            ModelState::from_json("{\"gravity\": 3}"),
            Err(StateError::Json(_))
        ));
    }
}
