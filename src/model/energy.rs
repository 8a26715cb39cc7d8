// model/energy.rs

use serde::{Deserialize, Serialize};

/// Energy bar-graph values for one mass, in joules
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    pub kinetic: f32,
    /// Relative to the shelf the masses start on
    pub gravitational: f32,
    pub elastic: f32,
    /// Mechanical energy lost to damping since the oscillation started
    pub thermal: f32,
}

impl Energy {
    pub fn mechanical(&self) -> f32 {
        self.kinetic + self.gravitational + self.elastic
    }

    pub fn total(&self) -> f32 {
        self.mechanical() + self.thermal
    }
}

/// Force vectors acting on one mass, along +y (down), in newtons
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Forces {
    pub gravity: f32,
    pub spring: f32,
    pub damping: f32,
    pub net: f32,
    /// Net force over mass, m/s²
    pub acceleration: f32,
}

/// Which force arrows the vector screen shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForcesMode {
    /// Individual gravity and spring arrows
    #[default]
    Forces,
    /// A single net-force arrow
    NetForce,
}

pub fn kinetic_energy(mass: f32, velocity: f32) -> f32 {
    0.5 * mass * velocity * velocity
}

pub fn gravitational_energy(mass: f32, gravity: f32, height: f32) -> f32 {
    mass * gravity * height
}

pub fn elastic_energy(spring_constant: f32, displacement: f32) -> f32 {
    0.5 * spring_constant * displacement * displacement
}
