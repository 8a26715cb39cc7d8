// lib.rs

pub mod model;
pub mod plugin;
pub mod property;
pub mod scene;
pub mod state;
pub mod utils;

pub use model::{Body, Mass, MassId, SimulationModel, Spring, SpringId};
pub use plugin::SimulationPlugin;
pub use property::{ListenerId, Property};
pub use scene::{ConfigError, SceneConfig};
pub use state::{ModelState, StateError};
