// model/simulation.rs

use super::body::Body;
use super::constants::{
    CEILING_Y, DAMPING_RANGE, EARTH_GRAVITY, GRABBING_DISTANCE, GRAVITY_RANGE, MAX_DT,
    RELEASE_DISTANCE, SIM_DT_RATIO, SPRING_CONSTANT_RANGE, SPRING_LENGTH_RANGE, STEP_FORWARD_DT,
    DEFAULT_SPRING_LENGTH, shelf_y,
};
use super::energy::{
    Energy, Forces, ForcesMode, elastic_energy, gravitational_energy, kinetic_energy,
};
use super::mass::{Mass, MassId, MassOptions};
use super::spring::{Spring, SpringId, SpringLoad};
use crate::property::Property;
use crate::scene::{ConstantMode, IntroControls, SceneConfig, SceneMode};
use bevy::math::Vec2;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Playback speed selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimSpeed {
    #[default]
    Normal,
    /// Physics runs at 1 / SIM_DT_RATIO of real time
    Slow,
}

/// Visibility toggles for tools and overlays. The model only stores and
/// resets these.
#[derive(Debug)]
pub struct DisplayOptions {
    pub ruler_visible: Property<bool>,
    pub timer_visible: Property<bool>,
    pub movable_line_visible: Property<bool>,
    pub equilibrium_position_visible: Property<bool>,
    /// Also drives the displacement arrow
    pub natural_length_visible: Property<bool>,
    pub velocity_vector_visible: Property<bool>,
    pub acceleration_vector_visible: Property<bool>,
    pub gravity_vector_visible: Property<bool>,
    pub spring_vector_visible: Property<bool>,
    pub forces_mode: Property<ForcesMode>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            ruler_visible: Property::new(false),
            timer_visible: Property::new(false),
            movable_line_visible: Property::new(false),
            equilibrium_position_visible: Property::new(false),
            natural_length_visible: Property::new(false),
            velocity_vector_visible: Property::new(false),
            acceleration_vector_visible: Property::new(false),
            gravity_vector_visible: Property::new(false),
            spring_vector_visible: Property::new(false),
            forces_mode: Property::new(ForcesMode::default()),
        }
    }
}

impl DisplayOptions {
    pub fn reset(&mut self) {
        self.ruler_visible.reset();
        self.timer_visible.reset();
        self.movable_line_visible.reset();
        self.equilibrium_position_visible.reset();
        self.natural_length_visible.reset();
        self.velocity_vector_visible.reset();
        self.acceleration_vector_visible.reset();
        self.gravity_vector_visible.reset();
        self.spring_vector_visible.reset();
        self.forces_mode.reset();
    }
}

/// Springs, masses and the global controls of one screen
#[derive(Debug, Resource)]
pub struct SimulationModel {
    pub(crate) config: SceneConfig,
    pub(crate) springs: Vec<Spring>,
    pub(crate) masses: Vec<Mass>,
    pub(crate) gravity: Property<f32>,
    pub(crate) damping: Property<f32>,
    pub(crate) body: Property<Body>,
    pub(crate) playing: Property<bool>,
    pub(crate) sim_speed: Property<SimSpeed>,
    pub(crate) timer_running: Property<bool>,
    pub(crate) timer_seconds: Property<f32>,
    pub display: DisplayOptions,
    intro: Option<IntroControls>,
    /// Last gravity chosen with the slider, brought back when leaving Planet X
    custom_gravity: f32,
}

impl SimulationModel {
    pub fn new(config: SceneConfig) -> Self {
        let mut model = SimulationModel {
            gravity: Property::with_range(EARTH_GRAVITY, GRAVITY_RANGE.0, GRAVITY_RANGE.1),
            damping: Property::with_range(config.damping, DAMPING_RANGE.0, DAMPING_RANGE.1),
            body: Property::new(Body::Earth),
            playing: Property::new(true),
            sim_speed: Property::new(SimSpeed::default()),
            timer_running: Property::new(false),
            timer_seconds: Property::with_range(0.0, 0.0, f32::INFINITY),
            display: DisplayOptions::default(),
            springs: Vec::new(),
            masses: Vec::new(),
            intro: None,
            custom_gravity: EARTH_GRAVITY,
            config,
        };

        for x in model.config.spring_xs.clone() {
            model.create_spring(x);
        }
        for preset in model.config.masses.clone() {
            model.create_mass(
                preset.value,
                preset.x,
                &preset.color,
                preset.label.as_deref(),
                preset.options,
            );
        }

        if model.config.features.intro_scenes {
            model.intro = Some(IntroControls::new(&mut model.springs));
        }

        log::info!(
            "Created '{}' model with {} springs and {} masses",
            model.config.name,
            model.springs.len(),
            model.masses.len()
        );
        model
    }

    pub fn create_spring(&mut self, x: f32) -> SpringId {
        let id = SpringId(self.springs.len());
        let damping = self.config.spring_damping.unwrap_or(self.damping.get());
        self.springs.push(Spring::new(
            id,
            Vec2::new(x, CEILING_Y),
            DEFAULT_SPRING_LENGTH,
            damping,
        ));
        id
    }

    pub fn create_mass(
        &mut self,
        value: f32,
        x: f32,
        color: &str,
        label: Option<&str>,
        options: MassOptions,
    ) -> MassId {
        let id = MassId(self.masses.len());
        self.masses.push(Mass::new(id, value, x, color, label, options));
        id
    }

    // === Query Methods ===

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn masses(&self) -> &[Mass] {
        &self.masses
    }

    pub fn spring(&self, id: SpringId) -> Option<&Spring> {
        self.springs.get(id.index())
    }

    pub fn mass(&self, id: MassId) -> Option<&Mass> {
        self.masses.get(id.index())
    }

    pub fn gravity(&self) -> &Property<f32> {
        &self.gravity
    }

    pub fn damping(&self) -> &Property<f32> {
        &self.damping
    }

    pub fn body(&self) -> &Property<Body> {
        &self.body
    }

    pub fn playing(&self) -> &Property<bool> {
        &self.playing
    }

    pub fn sim_speed(&self) -> &Property<SimSpeed> {
        &self.sim_speed
    }

    pub fn timer_running(&self) -> &Property<bool> {
        &self.timer_running
    }

    pub fn timer_seconds(&self) -> &Property<f32> {
        &self.timer_seconds
    }

    /// Present only on screens with intro scenes
    pub fn intro(&self) -> Option<&IntroControls> {
        self.intro.as_ref()
    }

    /// y the masses fall onto
    pub fn floor_y(&self) -> f32 {
        shelf_y()
    }

    // === Global controls ===

    /// Manual gravity changes switch the body to Custom
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity.set(gravity);
        let gravity = self.gravity.get();

        let body = self.body.get();
        if body != Body::Custom && body.gravity() != Some(gravity) {
            self.body.set(Body::Custom);
        }
        if !self.body.get().is_mystery() {
            self.custom_gravity = gravity;
        }
        self.rebaseline_energies();
    }

    pub fn set_body(&mut self, body: Body) {
        let previous = self.body.get();
        if !self.body.set(body) {
            return;
        }

        match body.gravity() {
            Some(gravity) => {
                self.gravity.set(gravity);
            }
            // back from Planet X: show the last gravity the user could see
            None if previous == Body::PlanetX => {
                self.gravity.set(self.custom_gravity);
            }
            None => {}
        }
        if !body.is_mystery() {
            self.custom_gravity = self.gravity.get();
        }

        log::debug!("Body changed from {} to {} ({} m/s²)", previous, body, self.gravity.get());
        self.rebaseline_energies();
    }

    /// Global damping, mirrored onto each spring unless the scene pins it
    pub fn set_damping(&mut self, damping: f32) {
        debug_assert!(damping >= 0.0, "damping must be non-negative: {}", damping);
        self.damping.set(damping);

        if self.config.spring_damping.is_none() {
            let damping = self.damping.get();
            for spring in &mut self.springs {
                spring.damping_coefficient.set(damping);
            }
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing.set(playing);
    }

    pub fn set_sim_speed(&mut self, speed: SimSpeed) {
        self.sim_speed.set(speed);
    }

    pub fn set_timer_running(&mut self, running: bool) {
        self.timer_running.set(running);
    }

    pub fn reset_timer(&mut self) {
        self.timer_running.reset();
        self.timer_seconds.reset();
    }

    // === Spring and mass parameters ===

    /// Slider entry point for a spring's natural length. A hanging mass keeps
    /// its position and the displacement absorbs the change.
    pub fn set_natural_resting_length(&mut self, id: SpringId, length: f32) {
        let length = length.clamp(SPRING_LENGTH_RANGE.0, SPRING_LENGTH_RANGE.1);
        let Some(spring) = self.springs.get_mut(id.index()) else {
            return;
        };

        spring.natural_resting_length.set(length);
        if let Some(intro) = &self.intro {
            intro.natural_length_changed(id.index(), spring);
        }

        if let Some(mass) = spring
            .mass_attached
            .get()
            .and_then(|mass_id| self.masses.get(mass_id.index()))
        {
            spring.update_displacement(mass.position.value().y);
        }
    }

    pub fn set_spring_constant(&mut self, id: SpringId, spring_constant: f32) {
        let spring_constant =
            spring_constant.clamp(SPRING_CONSTANT_RANGE.0, SPRING_CONSTANT_RANGE.1);
        let Some(spring) = self.springs.get_mut(id.index()) else {
            return;
        };

        spring.spring_constant.set(spring_constant);
        if let Some(intro) = &self.intro {
            intro.spring_constant_changed(spring);
        }
        if let Some(mass_id) = spring.mass_attached.get() {
            self.rebaseline_energy(mass_id);
        }
    }

    /// Only adjustable masses accept a new value
    pub fn set_mass_value(&mut self, id: MassId, value: f32) {
        let Some(mass) = self.masses.get_mut(id.index()) else {
            return;
        };
        debug_assert!(mass.is_adjustable(), "{} is not adjustable", id);
        if !mass.is_adjustable() {
            return;
        }

        mass.mass.set(value);
        self.rebaseline_energy(id);
    }

    pub fn set_scene_mode(&mut self, mode: SceneMode) {
        match &mut self.intro {
            Some(intro) => intro.set_scene_mode(mode, &mut self.springs, &mut self.masses),
            None => log::warn!("Scene mode {:?} ignored: no intro scenes here", mode),
        }
    }

    pub fn set_constant_mode(&mut self, mode: ConstantMode) {
        match &mut self.intro {
            Some(intro) => intro.set_constant_mode(mode, &mut self.springs),
            None => log::warn!("Constant mode {:?} ignored: no intro scenes here", mode),
        }
    }

    // === Dragging ===

    /// The user picked up a mass
    pub fn grab_mass(&mut self, id: MassId) {
        if let Some(mass) = self.masses.get_mut(id.index()) {
            mass.user_controlled.set(true);
            mass.vertical_velocity.set(0.0);
        }
    }

    /// Move a held mass and let it hook onto or leave a spring
    pub fn drag_mass(&mut self, id: MassId, position: Vec2) {
        let Some(mass) = self.masses.get_mut(id.index()) else {
            return;
        };
        mass.position.set(position);
        self.adjust_dragged_mass_position(id);
    }

    /// The user let go. A hooked mass starts oscillating from rest.
    pub fn release_mass(&mut self, id: MassId) {
        let Some(mass) = self.masses.get_mut(id.index()) else {
            return;
        };
        mass.user_controlled.set(false);
        mass.vertical_velocity.set(0.0);
        self.rebaseline_energy(id);
    }

    /// Detach, snap or attach a mass after its drag position changed
    pub fn adjust_dragged_mass_position(&mut self, id: MassId) {
        let Some(mass) = self.masses.get_mut(id.index()) else {
            return;
        };
        let position = mass.position.get();

        // Attempt to detach
        if let Some(spring_id) = mass.spring.get() {
            let spring = &mut self.springs[spring_id.index()];
            if (spring.anchor().x - position.x).abs() > RELEASE_DISTANCE {
                spring.remove_mass(&mut self.masses);
            }
        }

        let mass = &mut self.masses[id.index()];
        if !mass.is_attached() {
            // Springs are far enough apart that at most one can match
            if let Some(spring) = self.springs.iter_mut().find(|spring| {
                (position.x - spring.anchor().x).abs() < GRABBING_DISTANCE
                    && (position.y - spring.bottom()).abs() < GRABBING_DISTANCE
                    && !spring.has_mass()
            }) {
                spring.set_mass(mass);
            }
        }

        let Some(spring_id) = mass.spring.get() else {
            return;
        };
        let spring = &mut self.springs[spring_id.index()];
        let anchor_x = spring.anchor().x;

        if position.x != anchor_x {
            mass.position.set(Vec2::new(anchor_x, position.y));
        }
        spring.update_displacement(position.y);

        // The coils close up before the mass reaches the anchor
        let limit = spring.coil_limit_y();
        if mass.position.value().y < limit {
            mass.position.set(Vec2::new(anchor_x, limit));
            spring.update_displacement(limit);
        }
    }

    // === Stepping ===

    /// Frame callback. Large deltas are capped and nothing moves while paused.
    pub fn step(&mut self, dt: f32) {
        let dt = dt.min(MAX_DT);
        if self.playing.get() {
            self.model_step(dt);
        }
    }

    /// Single step, even while paused
    pub fn step_forward(&mut self, dt: f32) {
        self.model_step(dt);
    }

    /// The step button: one nominal step, even while paused
    pub fn single_step(&mut self) {
        self.step_forward(STEP_FORWARD_DT);
    }

    fn model_step(&mut self, dt: f32) {
        let animation_dt = dt;
        let dt = if self.sim_speed.get() == SimSpeed::Slow && self.playing.get() {
            dt / SIM_DT_RATIO
        } else {
            dt
        };

        let gravity = self.gravity.get();
        let floor_y = self.floor_y();

        for mass in &mut self.masses {
            mass.step(gravity, floor_y, dt, animation_dt);
        }

        if self.timer_running.get() {
            let seconds = self.timer_seconds.get() + animation_dt;
            self.timer_seconds.set(seconds);
        }

        for spring in &mut self.springs {
            let load = match spring.mass_attached.get() {
                None => SpringLoad::Free,
                Some(mass_id) => match &self.masses[mass_id.index()] {
                    mass if mass.is_user_controlled() => SpringLoad::Held,
                    mass => SpringLoad::Hanging { mass: mass.value() },
                },
            };

            if let Some(bottom) = spring.step(dt, gravity, load) {
                if let Some(mass_id) = spring.mass_attached.get() {
                    let mass = &mut self.masses[mass_id.index()];
                    let x = spring.anchor().x;
                    mass.position.set(Vec2::new(x, bottom));
                    mass.vertical_velocity.set(spring.displacement_velocity());
                }
            }
        }
    }

    // === Read-outs ===

    /// Energy bar values for a mass
    pub fn energy(&self, id: MassId) -> Option<Energy> {
        let mass = self.masses.get(id.index())?;
        let mut energy = self.mechanical_energy(mass);
        if let Some(reference) = mass.reference_energy() {
            energy.thermal = (reference - energy.mechanical()).max(0.0);
        }
        Some(energy)
    }

    /// Forces on a mass along +y. Held masses and masses resting on the
    /// shelf are supported, so their net force is zero.
    pub fn forces(&self, id: MassId) -> Option<Forces> {
        let mass = self.masses.get(id.index())?;
        let value = mass.value();
        let gravity = value * self.gravity.get();

        let (spring, damping) = match mass.spring.get().and_then(|s| self.spring(s)) {
            Some(spring) => (spring.restoring_force(), spring.damping_force()),
            None => (0.0, 0.0),
        };

        let supported = mass.is_user_controlled()
            || (!mass.is_attached()
                && mass.position.value().y >= self.floor_y()
                && mass.vertical_velocity.get() == 0.0);

        let net = if supported {
            0.0
        } else {
            gravity + spring + damping
        };

        Some(Forces {
            gravity,
            spring,
            damping,
            net,
            acceleration: net / value,
        })
    }

    /// Undamped period of a hanging mass
    pub fn period(&self, id: MassId) -> Option<f32> {
        let mass = self.masses.get(id.index())?;
        let spring = self.spring(mass.spring.get()?)?;
        Some(spring.period(mass.value()))
    }

    fn mechanical_energy(&self, mass: &Mass) -> Energy {
        let value = mass.value();
        let height = self.floor_y() - mass.position.value().y;
        let elastic = mass
            .spring
            .get()
            .and_then(|s| self.spring(s))
            .map_or(0.0, |spring| {
                elastic_energy(spring.spring_constant.get(), spring.displacement.get())
            });

        Energy {
            kinetic: kinetic_energy(value, mass.vertical_velocity.get()),
            gravitational: gravitational_energy(value, self.gravity.get(), height),
            elastic,
            thermal: 0.0,
        }
    }

    /// Start counting thermal energy from the current state
    fn rebaseline_energy(&mut self, id: MassId) {
        let Some(mass) = self.masses.get(id.index()) else {
            return;
        };
        let reference = mass
            .is_attached()
            .then(|| self.mechanical_energy(mass).mechanical());
        self.masses[id.index()].set_reference_energy(reference);
    }

    pub(crate) fn rebaseline_energies(&mut self) {
        for index in 0..self.masses.len() {
            self.rebaseline_energy(MassId(index));
        }
    }

    // === Reset ===

    pub fn reset(&mut self) {
        self.damping.reset();
        self.gravity.reset();
        self.body.reset();
        self.playing.reset();
        self.sim_speed.reset();
        self.timer_running.reset();
        self.timer_seconds.reset();
        self.display.reset();
        self.custom_gravity = EARTH_GRAVITY;

        for spring in &mut self.springs {
            spring.reset(&mut self.masses);
        }
        for mass in &mut self.masses {
            mass.reset();
        }
        if let Some(intro) = &mut self.intro {
            intro.reset(&mut self.springs);
        }

        log::info!("Reset '{}' model", self.config.name);
    }
}

impl Default for SimulationModel {
    fn default() -> Self {
        SimulationModel::new(SceneConfig::default())
    }
}
