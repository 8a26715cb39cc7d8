// model/spring.rs

use super::constants::{
    COIL_LIMIT, DEFAULT_SPRING_CONSTANT, DEFAULT_SPRING_LENGTH, DEFAULT_THICKNESS, FLOOR_Y,
    NUMBER_OF_LOOPS,
};
use super::mass::{Mass, MassId};
use super::oscillator::DampedOscillator;
use crate::property::Property;
use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a spring in its model, in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpringId(pub usize);

impl SpringId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SpringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spring{}", self.0 + 1)
    }
}

/// What is hanging from a spring during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpringLoad {
    /// Nothing attached
    Free,
    /// A mass is attached but the user is holding it
    Held,
    /// A mass of this many kg hangs and oscillates
    Hanging { mass: f32 },
}

/// Snapshot used when the intro screen swaps scenes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringState {
    pub natural_resting_length: f32,
    pub spring_constant: f32,
    pub thickness: f32,
    pub displacement: f32,
    pub mass_attached: Option<MassId>,
}

/// A vertical spring hanging from the ceiling
#[derive(Debug)]
pub struct Spring {
    id: SpringId,
    /// Anchor point at the top of the spring
    pub position: Property<Vec2>,
    pub natural_resting_length: Property<f32>,
    pub spring_constant: Property<f32>,
    pub thickness: Property<f32>,
    pub damping_coefficient: Property<f32>,
    /// Stretch beyond the natural length, positive when stretched
    pub displacement: Property<f32>,
    pub mass_attached: Property<Option<MassId>>,
    /// Rate of change of displacement while a mass oscillates
    displacement_velocity: f32,
    /// Accumulated oscillation angle, read by coil renderers
    oscillation_phase: f32,
}

impl Spring {
    pub fn new(id: SpringId, position: Vec2, natural_resting_length: f32, damping: f32) -> Self {
        debug_assert!(natural_resting_length > 0.0, "natural length must be positive");
        debug_assert!(damping >= 0.0, "damping must be non-negative: {}", damping);

        Spring {
            id,
            position: Property::new(position),
            natural_resting_length: Property::new(natural_resting_length),
            spring_constant: Property::new(DEFAULT_SPRING_CONSTANT),
            thickness: Property::new(DEFAULT_THICKNESS),
            damping_coefficient: Property::with_range(damping, 0.0, f32::MAX),
            displacement: Property::new(0.0),
            mass_attached: Property::new(None),
            displacement_velocity: 0.0,
            oscillation_phase: 0.0,
        }
    }

    pub fn id(&self) -> SpringId {
        self.id
    }

    pub fn anchor(&self) -> Vec2 {
        self.position.get()
    }

    pub fn has_mass(&self) -> bool {
        self.mass_attached.value().is_some()
    }

    pub fn displacement_velocity(&self) -> f32 {
        self.displacement_velocity
    }

    pub fn oscillation_phase(&self) -> f32 {
        self.oscillation_phase
    }

    /// y of the hook at the bottom of the spring
    pub fn bottom(&self) -> f32 {
        self.position.value().y + self.natural_resting_length.get() + self.displacement.get()
    }

    /// Hooke's law along +y (down), so a stretched spring pulls up
    pub fn restoring_force(&self) -> f32 {
        -self.spring_constant.get() * self.displacement.get()
    }

    /// Force opposing the current stretch rate
    pub fn damping_force(&self) -> f32 {
        -self.damping_coefficient.get() * self.displacement_velocity
    }

    /// Displacement at which a hanging `mass` would rest
    pub fn equilibrium_displacement(&self, mass: f32, gravity: f32) -> f32 {
        mass * gravity / self.spring_constant.get()
    }

    pub fn equilibrium_y(&self, mass: f32, gravity: f32) -> f32 {
        self.position.value().y
            + self.natural_resting_length.get()
            + self.equilibrium_displacement(mass, gravity)
    }

    /// Undamped oscillation period for `mass`
    pub fn period(&self, mass: f32) -> f32 {
        self.oscillator(mass).period()
    }

    /// Highest point (smallest y) a hanging mass can be pushed to before the
    /// coils close up
    pub fn coil_limit_y(&self) -> f32 {
        let extent =
            self.thickness.get() * NUMBER_OF_LOOPS.evaluate(self.natural_resting_length.get());
        FLOOR_Y - COIL_LIMIT.evaluate(extent)
    }

    // === Attachment ===

    /// Hook `mass` onto this spring. The slot must be free.
    pub fn set_mass(&mut self, mass: &mut Mass) {
        debug_assert!(
            !self.has_mass(),
            "{} already holds {:?}",
            self.id,
            self.mass_attached.value()
        );
        if self.has_mass() {
            return;
        }

        self.mass_attached.set(Some(mass.id()));
        mass.spring.set(Some(self.id));
        self.displacement_velocity = mass.vertical_velocity.get();
        self.update_displacement(mass.position.value().y);
        log::debug!("{} attached to {}", mass.id(), self.id);
    }

    /// Unhook the current mass, if any
    pub fn remove_mass(&mut self, masses: &mut [Mass]) -> Option<MassId> {
        let id = self.mass_attached.get()?;
        if let Some(mass) = masses.get_mut(id.index()) {
            mass.detach();
        }
        self.mass_attached.set(None);
        self.displacement.reset();
        self.displacement_velocity = 0.0;
        log::debug!("{} removed from {}", id, self.id);
        Some(id)
    }

    // === Derived state ===

    pub fn update_displacement(&mut self, mass_y: f32) {
        let length = mass_y - self.position.value().y;
        self.displacement.set(length - self.natural_resting_length.get());
    }

    /// Stiffer springs get thicker coils, longer springs thinner ones
    pub fn update_thickness(&mut self, natural_length: f32, spring_constant: f32) {
        let thickness = self.thickness.initial_value()
            * (spring_constant / self.spring_constant.initial_value())
            * (self.natural_resting_length.initial_value() / natural_length);
        self.thickness.set(thickness);
    }

    /// Thicker coils make a stiffer spring, longer springs a softer one
    pub fn update_spring_constant(&mut self, natural_length: f32, thickness: f32) {
        let spring_constant = self.spring_constant.initial_value()
            * (thickness / self.thickness.initial_value())
            * (self.natural_resting_length.initial_value() / natural_length);
        self.spring_constant.set(spring_constant);
    }

    // === Stepping ===

    /// Advance the attached oscillation by `dt`. Returns the new bottom y when
    /// a mass is hanging.
    pub fn step(&mut self, dt: f32, gravity: f32, load: SpringLoad) -> Option<f32> {
        match load {
            SpringLoad::Free | SpringLoad::Held => {
                self.displacement_velocity = 0.0;
                None
            }
            SpringLoad::Hanging { mass } => {
                let oscillator = self.oscillator(mass);
                let equilibrium = self.equilibrium_displacement(mass, gravity);
                let offset = self.displacement.get() - equilibrium;

                let (offset, velocity) =
                    oscillator.advance(offset, self.displacement_velocity, dt);

                self.displacement_velocity = velocity;
                self.displacement.set(equilibrium + offset);
                self.oscillation_phase = (self.oscillation_phase
                    + dt * (self.spring_constant.get() / mass).sqrt())
                    % std::f32::consts::TAU;
                Some(self.bottom())
            }
        }
    }

    fn oscillator(&self, mass: f32) -> DampedOscillator {
        DampedOscillator {
            mass,
            stiffness: self.spring_constant.get(),
            damping: self.damping_coefficient.get(),
        }
    }

    // === Snapshots ===

    pub fn spring_state(&self) -> SpringState {
        SpringState {
            natural_resting_length: self.natural_resting_length.get(),
            spring_constant: self.spring_constant.get(),
            thickness: self.thickness.get(),
            displacement: self.displacement.get(),
            mass_attached: self.mass_attached.get(),
        }
    }

    /// Restore geometry and physics. The attachment is handled by the owning
    /// model so that both sides of the relation stay consistent.
    pub fn set_spring_state(&mut self, state: &SpringState) {
        self.natural_resting_length.set(state.natural_resting_length);
        self.spring_constant.set(state.spring_constant);
        self.thickness.set(state.thickness);
        self.displacement.set(state.displacement);
        self.displacement_velocity = 0.0;
    }

    /// Restore construction defaults, unhooking any mass first
    pub fn reset(&mut self, masses: &mut [Mass]) {
        self.remove_mass(masses);
        self.position.reset();
        self.natural_resting_length.reset();
        self.spring_constant.reset();
        self.thickness.reset();
        self.damping_coefficient.reset();
        self.displacement.reset();
        self.mass_attached.reset();
        self.displacement_velocity = 0.0;
        self.oscillation_phase = 0.0;
    }
}

impl Default for Spring {
    fn default() -> Self {
        Spring::new(
            SpringId(0),
            Vec2::new(super::constants::RIGHT_SPRING_X, super::constants::CEILING_Y),
            DEFAULT_SPRING_LENGTH,
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mass::MassOptions;
    use crate::utils::approx_eq;

    fn test_mass(y: f32) -> Mass {
        let mut mass = Mass::new(MassId(0), 0.25, 0.95, "gray", None, MassOptions::default());
        mass.position.set(Vec2::new(0.95, y));
        mass
    }

    #[test]
    fn test_displacement_is_length_minus_natural_length() {
        let mut spring = Spring::default();
        for y in [0.2, 0.5, 0.73, 1.1] {
            spring.update_displacement(y);
            assert!(approx_eq(spring.displacement.get(), (y - 0.0) - 0.5, 1e-6));
        }
    }

    #[test]
    fn test_bottom_follows_displacement() {
        let mut spring = Spring::default();
        spring.update_displacement(0.8);
        assert!(approx_eq(spring.bottom(), 0.8, 1e-6));
    }

    #[test]
    fn test_set_mass_links_both_sides() {
        let mut spring = Spring::default();
        let mut mass = test_mass(0.6);

        spring.set_mass(&mut mass);

        assert_eq!(spring.mass_attached.get(), Some(MassId(0)));
        assert_eq!(mass.spring.get(), Some(SpringId(0)));
        assert!(approx_eq(spring.displacement.get(), 0.1, 1e-6));
    }

    #[test]
    fn test_remove_mass_clears_both_sides() {
        let mut spring = Spring::default();
        let mut masses = vec![test_mass(0.6)];

        spring.set_mass(&mut masses[0]);
        assert_eq!(spring.remove_mass(&mut masses), Some(MassId(0)));

        assert!(!spring.has_mass());
        assert_eq!(masses[0].spring.get(), None);
        assert_eq!(spring.displacement.get(), 0.0);
        assert_eq!(spring.remove_mass(&mut masses), None);
    }

    #[test]
    fn test_thickness_tracks_constant_and_length() {
        let mut spring = Spring::default();

        spring.update_thickness(0.25, DEFAULT_SPRING_CONSTANT);
        assert!(approx_eq(spring.thickness.get(), 6.0, 1e-5));

        spring.update_thickness(0.5, DEFAULT_SPRING_CONSTANT * 2.0);
        assert!(approx_eq(spring.thickness.get(), 6.0, 1e-5));

        spring.update_thickness(0.5, DEFAULT_SPRING_CONSTANT);
        assert!(approx_eq(spring.thickness.get(), DEFAULT_THICKNESS, 1e-5));
    }

    #[test]
    fn test_spring_constant_tracks_thickness_and_length() {
        let mut spring = Spring::default();

        spring.update_spring_constant(0.25, DEFAULT_THICKNESS);
        assert!(approx_eq(spring.spring_constant.get(), 18.0, 1e-4));

        spring.update_spring_constant(1.0, DEFAULT_THICKNESS);
        assert!(approx_eq(spring.spring_constant.get(), 4.5, 1e-4));
    }

    #[test]
    fn test_hanging_mass_settles_at_equilibrium() {
        let mut spring = Spring::default();
        spring.damping_coefficient.set(0.8);
        let mut mass = test_mass(0.5);
        spring.set_mass(&mut mass);

        let mut bottom = None;
        for _ in 0..2000 {
            bottom = spring.step(1.0 / 60.0, 9.81, SpringLoad::Hanging { mass: 0.25 });
        }

        let expected = spring.equilibrium_y(0.25, 9.81);
        assert!(approx_eq(bottom.unwrap(), expected, 1e-3));
    }

    #[test]
    fn test_held_mass_does_not_oscillate() {
        let mut spring = Spring::default();
        let mut mass = test_mass(0.7);
        spring.set_mass(&mut mass);
        let before = spring.displacement.get();

        assert_eq!(spring.step(0.1, 9.81, SpringLoad::Held), None);
        assert_eq!(spring.displacement.get(), before);
    }

    #[test]
    fn test_reset_unhooks_mass() {
        let mut spring = Spring::default();
        let mut masses = vec![test_mass(0.7)];
        spring.set_mass(&mut masses[0]);
        spring.natural_resting_length.set(0.2);

        spring.reset(&mut masses);

        assert!(!spring.has_mass());
        assert!(!masses[0].is_attached());
        assert_eq!(spring.natural_resting_length.get(), DEFAULT_SPRING_LENGTH);
        assert_eq!(spring.displacement.get(), 0.0);
    }

    #[test]
    fn test_coil_limit_sits_below_ceiling() {
        let spring = Spring::default();
        let limit = spring.coil_limit_y();
        assert!(limit > 0.0 && limit < spring.natural_resting_length.get());
    }

    #[test]
    fn test_state_round_trip() {
        let mut spring = Spring::default();
        spring.natural_resting_length.set(0.3);
        spring.spring_constant.set(12.0);
        let state = spring.spring_state();

        spring.reset(&mut []);
        assert_eq!(spring.spring_constant.get(), DEFAULT_SPRING_CONSTANT);

        spring.set_spring_state(&state);
        assert_eq!(spring.spring_state(), state);
    }
}
