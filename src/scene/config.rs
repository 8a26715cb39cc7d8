// scene/config.rs

use crate::model::constants::{RIGHT_SPRING_X, SPRING_SPACING};
use crate::model::MassOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One mass on a scene's shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassPreset {
    /// kg
    pub value: f32,
    /// Home x on the shelf
    pub x: f32,
    pub color: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub options: MassOptions,
}

impl MassPreset {
    fn new(value: f32, x: f32, color: &str) -> Self {
        MassPreset {
            value,
            x,
            color: color.to_string(),
            label: None,
            options: MassOptions::default(),
        }
    }

    fn mystery(mut self) -> Self {
        self.options.mystery = true;
        self
    }

    fn adjustable(mut self, label: &str) -> Self {
        self.options.adjustable = true;
        self.label = Some(label.to_string());
        self
    }
}

/// Which read-outs and controls a scene offers its collaborators.
///
/// `vectors` and `energy` are hints for the views: the model answers
/// `forces` and `energy` queries on every scene. `intro_scenes` decides
/// whether the model carries [`IntroControls`](super::IntroControls).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneFeatures {
    /// Velocity, acceleration and force arrows
    #[serde(default)]
    pub vectors: bool,
    /// Energy bar graph
    #[serde(default)]
    pub energy: bool,
    /// Same-length / adjustable-length scenes with the constant-parameter panel
    #[serde(default)]
    pub intro_scenes: bool,
}

/// Everything that distinguishes one screen's model from another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub name: String,
    /// Anchor x of each spring, left to right
    pub spring_xs: Vec<f32>,
    /// Initial global damping
    #[serde(default)]
    pub damping: f32,
    /// Pins every spring to this coefficient instead of following the global
    /// damping control
    #[serde(default)]
    pub spring_damping: Option<f32>,
    pub masses: Vec<MassPreset>,
    #[serde(default)]
    pub features: SceneFeatures,
}

/// Problems found while loading a scene description
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    SpringCount(usize),
    InvalidMass { index: usize, value: f32 },
    NegativeDamping(f32),
    IntroNeedsTwoSprings(usize),
    UnknownScene(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Could not read scene file: {}", e),
            ConfigError::Json(e) => write!(f, "Invalid scene JSON: {}", e),
            ConfigError::SpringCount(n) => {
                write!(f, "A scene needs one or two springs, got {}", n)
            }
            ConfigError::InvalidMass { index, value } => {
                write!(f, "Mass {} has non-positive value {}", index, value)
            }
            ConfigError::NegativeDamping(d) => write!(f, "Damping must be >= 0, got {}", d),
            ConfigError::IntroNeedsTwoSprings(n) => {
                write!(f, "Intro scenes need exactly two springs, got {}", n)
            }
            ConfigError::UnknownScene(name) => write!(f, "Unknown scene '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

fn default_springs() -> Vec<f32> {
    vec![RIGHT_SPRING_X - SPRING_SPACING, RIGHT_SPRING_X]
}

/// Seven-mass shelf shared by the intro and vector screens
fn default_masses() -> Vec<MassPreset> {
    vec![
        MassPreset::new(0.250, 0.12, "rgb(153, 153, 153)"),
        MassPreset::new(0.100, 0.20, "rgb(153, 153, 153)"),
        MassPreset::new(0.100, 0.28, "rgb(153, 153, 153)"),
        MassPreset::new(0.050, 0.33, "rgb(153, 153, 153)"),
        MassPreset::new(0.200, 0.63, "rgb(250, 186, 75)").mystery(),
        MassPreset::new(0.150, 0.56, "rgb(0, 222, 224)").mystery(),
        MassPreset::new(0.075, 0.49, "rgb(246, 164, 255)").mystery(),
    ]
}

impl SceneConfig {
    pub const NAMES: [&'static str; 4] = ["intro", "vector", "energy", "lab"];

    /// Two springs, seven masses, same-length and adjustable-length scenes
    pub fn intro() -> Self {
        SceneConfig {
            name: "intro".to_string(),
            spring_xs: default_springs(),
            damping: 0.0,
            spring_damping: None,
            masses: default_masses(),
            features: SceneFeatures {
                intro_scenes: true,
                ..SceneFeatures::default()
            },
        }
    }

    pub fn vector() -> Self {
        SceneConfig {
            name: "vector".to_string(),
            spring_xs: default_springs(),
            damping: 0.0,
            spring_damping: None,
            masses: default_masses(),
            features: SceneFeatures {
                vectors: true,
                ..SceneFeatures::default()
            },
        }
    }

    pub fn energy() -> Self {
        let spring_x = RIGHT_SPRING_X - SPRING_SPACING;
        SceneConfig {
            name: "energy".to_string(),
            spring_xs: vec![spring_x],
            damping: 0.0,
            spring_damping: None,
            masses: vec![
                MassPreset::new(0.100, 0.20, "rgb(153, 153, 153)").adjustable("adjustable"),
                MassPreset::new(0.250, 0.30, "rgb(153, 153, 153)"),
                MassPreset::new(0.150, spring_x - 0.15, "rgb(0, 222, 224)").mystery(),
            ],
            features: SceneFeatures {
                energy: true,
                ..SceneFeatures::default()
            },
        }
    }

    /// One spring with a low-damping default and the full set of read-outs
    pub fn lab() -> Self {
        let spring_x = RIGHT_SPRING_X - SPRING_SPACING;
        SceneConfig {
            name: "lab".to_string(),
            spring_xs: vec![spring_x],
            damping: 0.05,
            spring_damping: None,
            masses: vec![
                MassPreset::new(0.100, 0.20, "rgb(153, 153, 153)").adjustable("adjustable"),
                MassPreset::new(0.125, spring_x - 0.22, "red"),
                MassPreset::new(0.150, spring_x - 0.15, "green"),
            ],
            features: SceneFeatures {
                vectors: true,
                energy: true,
                intro_scenes: false,
            },
        }
    }

    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "intro" => Ok(Self::intro()),
            "vector" => Ok(Self::vector()),
            "energy" => Ok(Self::energy()),
            "lab" => Ok(Self::lab()),
            other => Err(ConfigError::UnknownScene(other.to_string())),
        }
    }

    /// Parse and validate a scene description
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let springs = self.spring_xs.len();
        if !(1..=2).contains(&springs) {
            return Err(ConfigError::SpringCount(springs));
        }

        if self.features.intro_scenes && springs != 2 {
            return Err(ConfigError::IntroNeedsTwoSprings(springs));
        }

        if self.damping < 0.0 {
            return Err(ConfigError::NegativeDamping(self.damping));
        }
        if let Some(d) = self.spring_damping.filter(|d| *d < 0.0) {
            return Err(ConfigError::NegativeDamping(d));
        }

        for (index, mass) in self.masses.iter().enumerate() {
            if mass.value <= 0.0 || !mass.value.is_finite() {
                return Err(ConfigError::InvalidMass {
                    index,
                    value: mass.value,
                });
            }
        }

        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig::intro()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for name in SceneConfig::NAMES {
            let config = SceneConfig::by_name(name).unwrap();
            assert!(config.validate().is_ok(), "{} failed validation", name);
            assert_eq!(config.name, name);
        }
    }

    #[test]
    fn test_intro_has_three_mystery_masses() {
        let config = SceneConfig::intro();
        assert_eq!(config.spring_xs.len(), 2);
        assert_eq!(config.masses.len(), 7);
        assert_eq!(config.masses.iter().filter(|m| m.options.mystery).count(), 3);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SceneConfig::lab();
        let json = config.to_json().unwrap();
        assert_eq!(SceneConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "name": "custom",
            "spring_xs": [0.5],
            "masses": [{ "value": 0.2, "x": 0.1, "color": "blue", "mystery": true }]
        }"#;

        let config = SceneConfig::from_json(json).unwrap();
        assert_eq!(config.damping, 0.0);
        assert_eq!(config.spring_damping, None);
        assert!(config.masses[0].options.mystery);
        assert!(!config.features.intro_scenes);
    }

    #[test]
    fn test_rejects_bad_scenes() {
        let three = r#"{ "name": "x", "spring_xs": [0.1, 0.4, 0.7], "masses": [] }"#;
        assert!(matches!(
            SceneConfig::from_json(three),
            Err(ConfigError::SpringCount(3))
        ));

        let heavy = r#"{ "name": "x", "spring_xs": [0.1], "masses": [{ "value": 0.0, "x": 0.2, "color": "red" }] }"#;
        assert!(matches!(
            SceneConfig::from_json(heavy),
            Err(ConfigError::InvalidMass { index: 0, .. })
        ));

        let intro = r#"{ "name": "x", "spring_xs": [0.1], "masses": [], "features": { "intro_scenes": true } }"#;
        assert!(matches!(
            SceneConfig::from_json(intro),
            Err(ConfigError::IntroNeedsTwoSprings(1))
        ));

        assert!(matches!(
            SceneConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            SceneConfig::from_file("/nonexistent/scene.json"),
            Err(ConfigError::Io(_))
        ));
        assert!(matches!(
            SceneConfig::by_name("playground"),
            Err(ConfigError::UnknownScene(_))
        ));
    }
}
