mod config;
mod intro;

pub use config::{ConfigError, MassPreset, SceneConfig, SceneFeatures};
pub use intro::{ConstantMode, IntroControls, SceneMode, SceneState};
