// scene/intro.rs

use crate::model::constants::DEFAULT_SPRING_LENGTH;
use crate::model::{Mass, Spring, SpringState};
use crate::property::Property;
use serde::{Deserialize, Serialize};

/// Which of the two intro layouts is on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneMode {
    /// Both springs share the default natural length
    #[default]
    SameLength,
    /// Spring 1's natural length has a slider
    AdjustableLength,
}

/// Quantity held fixed while spring 1's natural length changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstantMode {
    #[default]
    SpringConstant,
    SpringThickness,
    None,
}

/// Saved spring parameters for one intro layout, indexed like the springs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub springs: Vec<SpringState>,
}

impl SceneState {
    pub fn capture(springs: &[Spring]) -> Self {
        SceneState {
            springs: springs.iter().map(Spring::spring_state).collect(),
        }
    }
}

/// Scene and constant-parameter logic for the intro screen.
///
/// The model injects this when its scene config asks for intro scenes and
/// routes length, spring-constant and mode changes through it.
#[derive(Debug)]
pub struct IntroControls {
    scene_mode: Property<SceneMode>,
    constant_mode: Property<ConstantMode>,
    same_length: SceneState,
    adjustable_length: SceneState,
}

impl IntroControls {
    /// Record the starting layout of both scenes. Springs must be at their
    /// defaults with nothing attached.
    pub fn new(springs: &mut [Spring]) -> Self {
        let mut controls = IntroControls {
            scene_mode: Property::new(SceneMode::default()),
            constant_mode: Property::new(ConstantMode::default()),
            same_length: SceneState::default(),
            adjustable_length: SceneState::default(),
        };
        controls.initialize_scenes(springs);
        controls
    }

    pub fn scene_mode(&self) -> &Property<SceneMode> {
        &self.scene_mode
    }

    pub fn constant_mode(&self) -> &Property<ConstantMode> {
        &self.constant_mode
    }

    /// The stored snapshot for `mode`. The slot for the current mode is stale;
    /// the springs themselves hold the live values.
    pub fn saved_state(&self, mode: SceneMode) -> &SceneState {
        match mode {
            SceneMode::SameLength => &self.same_length,
            SceneMode::AdjustableLength => &self.adjustable_length,
        }
    }

    fn slot_mut(&mut self, mode: SceneMode) -> &mut SceneState {
        match mode {
            SceneMode::SameLength => &mut self.same_length,
            SceneMode::AdjustableLength => &mut self.adjustable_length,
        }
    }

    fn initialize_scenes(&mut self, springs: &mut [Spring]) {
        self.same_length = SceneState::capture(springs);

        if let Some(spring1) = springs.first_mut() {
            let saved = spring1.spring_state();
            spring1
                .natural_resting_length
                .set(DEFAULT_SPRING_LENGTH / 2.0);
            Self::hold_constant(self.constant_mode.get(), spring1);
            self.adjustable_length = SceneState::capture(springs);

            springs[0].set_spring_state(&saved);
        }
    }

    // === Transitions ===

    /// Stash the springs for the scene being left and bring back the springs
    /// of the scene being entered
    pub fn set_scene_mode(&mut self, mode: SceneMode, springs: &mut [Spring], masses: &mut [Mass]) {
        let leaving = self.scene_mode.get();
        if leaving == mode {
            return;
        }

        Self::reset_masses(springs, masses);
        *self.slot_mut(leaving) = SceneState::capture(springs);

        let entering = self.saved_state(mode).clone();
        // slots are captured after the masses go home, so they never carry
        // an attachment
        for (spring, state) in springs.iter_mut().zip(&entering.springs) {
            spring.set_spring_state(state);
        }

        self.scene_mode.set(mode);
        log::info!("Intro scene switched from {:?} to {:?}", leaving, mode);
    }

    /// Reset the newly held quantity and recompute the other from the
    /// current length. Re-selecting the current mode changes nothing.
    pub fn set_constant_mode(&mut self, mode: ConstantMode, springs: &mut [Spring]) {
        if !self.constant_mode.set(mode) {
            return;
        }

        let Some(spring1) = springs.first_mut() else {
            return;
        };
        match mode {
            ConstantMode::SpringConstant => {
                spring1.spring_constant.reset();
            }
            ConstantMode::SpringThickness => {
                spring1.thickness.reset();
            }
            ConstantMode::None => {}
        }
        Self::hold_constant(mode, spring1);
    }

    /// Apply a new natural length to a spring, keeping the held quantity
    /// fixed on spring 1 in the adjustable-length scene
    pub fn natural_length_changed(&self, index: usize, spring: &mut Spring) {
        if index == 0 && self.scene_mode.get() == SceneMode::AdjustableLength {
            Self::hold_constant(self.constant_mode.get(), spring);
        }
    }

    /// In the same-length scene a stiffer spring is drawn with thicker coils
    pub fn spring_constant_changed(&self, spring: &mut Spring) {
        if self.scene_mode.get() == SceneMode::SameLength {
            let length = spring.natural_resting_length.get();
            let spring_constant = spring.spring_constant.get();
            spring.update_thickness(length, spring_constant);
        }
    }

    /// Restore both scenes to their starting layouts. Springs must already be
    /// reset.
    pub fn reset(&mut self, springs: &mut [Spring]) {
        self.scene_mode.reset();
        self.constant_mode.reset();
        self.initialize_scenes(springs);
    }

    fn hold_constant(mode: ConstantMode, spring: &mut Spring) {
        let length = spring.natural_resting_length.get();
        match mode {
            ConstantMode::SpringConstant => {
                let spring_constant = spring.spring_constant.get();
                spring.update_thickness(length, spring_constant);
            }
            ConstantMode::SpringThickness => {
                let thickness = spring.thickness.get();
                spring.update_spring_constant(length, thickness);
            }
            ConstantMode::None => {}
        }
    }

    /// Put every mass back on the shelf and let the springs relax, leaving
    /// spring geometry alone
    fn reset_masses(springs: &mut [Spring], masses: &mut [Mass]) {
        for spring in springs.iter_mut() {
            spring.remove_mass(masses);
        }
        for mass in masses.iter_mut() {
            mass.reset();
        }
    }
}
