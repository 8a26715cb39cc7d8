// model/mass.rs

use super::constants::{MASS_RANGE, shelf_y};
use super::spring::SpringId;
use crate::property::Property;
use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a mass in its model, in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MassId(pub usize);

impl MassId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mass{}", self.0 + 1)
    }
}

/// Cosmetic and range options for [`Mass::new`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MassOptions {
    /// Hide the numeric value in the UI
    #[serde(default)]
    pub mystery: bool,
    /// Allow the user to change the value within [`MASS_RANGE`]
    #[serde(default)]
    pub adjustable: bool,
}

/// Landing squash settings (cosmetic only)
const SQUASH_PER_SPEED: f32 = 0.08;
const MAX_SQUASH: f32 = 0.3;
const SQUASH_RECOVERY: f32 = 6.0;

/// A hookable mass
#[derive(Debug)]
pub struct Mass {
    id: MassId,
    /// Value in kg
    pub mass: Property<f32>,
    /// Centre of the hook, in model coordinates
    pub position: Property<Vec2>,
    /// Positive when moving down
    pub vertical_velocity: Property<f32>,
    pub spring: Property<Option<SpringId>>,
    /// Set while the user is dragging the mass
    pub user_controlled: Property<bool>,
    /// Where the mass sits on the shelf at start-up
    home_x: f32,
    color: String,
    label: Option<String>,
    options: MassOptions,
    /// Mechanical energy captured when the current oscillation began
    reference_energy: Option<f32>,
    /// Visual squash after landing on the shelf, 0..=MAX_SQUASH
    squash: f32,
}

impl Mass {
    pub fn new(
        id: MassId,
        value: f32,
        x: f32,
        color: &str,
        label: Option<&str>,
        options: MassOptions,
    ) -> Self {
        debug_assert!(value > 0.0, "mass must be positive: {}", value);

        let mass = if options.adjustable {
            Property::with_range(value, MASS_RANGE.0, MASS_RANGE.1)
        } else {
            Property::new(value)
        };

        Mass {
            id,
            mass,
            position: Property::new(Vec2::new(x, shelf_y())),
            vertical_velocity: Property::new(0.0),
            spring: Property::new(None),
            user_controlled: Property::new(false),
            home_x: x,
            color: color.to_string(),
            label: label.map(str::to_string),
            options,
            reference_energy: None,
            squash: 0.0,
        }
    }

    pub fn id(&self) -> MassId {
        self.id
    }

    pub fn value(&self) -> f32 {
        self.mass.get()
    }

    pub fn home_x(&self) -> f32 {
        self.home_x
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_mystery(&self) -> bool {
        self.options.mystery
    }

    pub fn is_adjustable(&self) -> bool {
        self.options.adjustable
    }

    pub fn is_attached(&self) -> bool {
        self.spring.value().is_some()
    }

    pub fn is_user_controlled(&self) -> bool {
        self.user_controlled.get()
    }

    pub fn squash(&self) -> f32 {
        self.squash
    }

    pub fn reference_energy(&self) -> Option<f32> {
        self.reference_energy
    }

    pub(crate) fn set_reference_energy(&mut self, energy: Option<f32>) {
        self.reference_energy = energy;
    }

    /// Free fall for unattached masses. Attached masses are moved by their
    /// spring and held masses by the drag handler, so both are left alone.
    pub fn step(&mut self, gravity: f32, floor_y: f32, dt: f32, animation_dt: f32) {
        // Ease the landing squash back with real time, even in slow motion
        self.squash = (self.squash - SQUASH_RECOVERY * self.squash * animation_dt).max(0.0);

        if self.is_attached() || self.is_user_controlled() {
            return;
        }

        let position = self.position.get();
        if position.y > floor_y {
            // dropped below the floor: put it back on top
            self.position.set(Vec2::new(position.x, floor_y));
            self.vertical_velocity.set(0.0);
            return;
        }
        if position.y == floor_y && self.vertical_velocity.get() <= 0.0 {
            // resting on the floor
            return;
        }

        let velocity = self.vertical_velocity.get() + gravity * dt;
        let y = position.y + velocity * dt;

        if y >= floor_y {
            self.squash = (velocity * SQUASH_PER_SPEED).min(MAX_SQUASH);
            self.position.set(Vec2::new(position.x, floor_y));
            self.vertical_velocity.set(0.0);
        } else {
            self.position.set(Vec2::new(position.x, y));
            self.vertical_velocity.set(velocity);
        }
    }

    /// Forget the spring without moving; the user is usually mid-drag
    pub fn detach(&mut self) {
        self.spring.set(None);
        self.reference_energy = None;
    }

    pub fn reset(&mut self) {
        self.mass.reset();
        self.position.reset();
        self.vertical_velocity.reset();
        self.spring.reset();
        self.user_controlled.reset();
        self.reference_energy = None;
        self.squash = 0.0;
    }
}
