// model/body.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Celestial body selected in the gravity panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Moon,
    Earth,
    Jupiter,
    PlanetX,
    ZeroG,
    Custom,
}

impl Body {
    /// Gravitational acceleration in m/s², `None` for a user-chosen value
    pub fn gravity(self) -> Option<f32> {
        match self {
            Body::Moon => Some(1.62),
            Body::Earth => Some(super::constants::EARTH_GRAVITY),
            Body::Jupiter => Some(24.79),
            Body::PlanetX => Some(14.94),
            Body::ZeroG => Some(0.0),
            Body::Custom => None,
        }
    }

    /// Planet X hides its gravity value from the user
    pub fn is_mystery(self) -> bool {
        self == Body::PlanetX
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Body::Moon => "Moon",
            Body::Earth => "Earth",
            Body::Jupiter => "Jupiter",
            Body::PlanetX => "Planet X",
            Body::ZeroG => "Zero G",
            Body::Custom => "Custom",
        };
        write!(f, "{}", name)
    }
}
