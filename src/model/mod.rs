mod body;
pub mod constants;
mod energy;
mod mass;
mod oscillator;
mod simulation;
mod spring;

pub use body::Body;
pub use energy::{Energy, Forces, ForcesMode};
pub use mass::{Mass, MassId, MassOptions};
pub use oscillator::DampedOscillator;
pub use simulation::{DisplayOptions, SimSpeed, SimulationModel};
pub use spring::{Spring, SpringId, SpringLoad, SpringState};
