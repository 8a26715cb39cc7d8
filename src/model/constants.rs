// model/constants.rs
//
// Model coordinates are metres with y pointing down: springs hang from the
// ceiling at y = 0 and masses rest on a shelf just above the floor.

use crate::utils::LinearFunction;

// ============================================================================
// WORLD GEOMETRY
// ============================================================================

/// Height of the ceiling the springs hang from
pub const CEILING_Y: f32 = 0.0;

/// Distance from the ceiling down to the floor
pub const FLOOR_Y: f32 = 1.36;

/// Masses rest on a shelf this far above the floor
pub const SHELF_HEIGHT: f32 = 0.02;

/// x of the right-hand spring; the left one sits 0.3 m further left
pub const RIGHT_SPRING_X: f32 = 0.95;

/// Spacing between the two default springs
pub const SPRING_SPACING: f32 = 0.3;

/// Resting y for masses on the shelf
pub const fn shelf_y() -> f32 {
    FLOOR_Y - SHELF_HEIGHT
}

// ============================================================================
// SPRING DEFAULTS
// ============================================================================

pub const DEFAULT_SPRING_LENGTH: f32 = 0.5;
pub const DEFAULT_SPRING_CONSTANT: f32 = 9.0;
pub const DEFAULT_THICKNESS: f32 = 3.0;

pub const SPRING_LENGTH_RANGE: (f32, f32) = (0.1, 0.5);
pub const SPRING_CONSTANT_RANGE: (f32, f32) = (3.0, 15.0);

// ============================================================================
// MASS DEFAULTS
// ============================================================================

/// Range for user-adjustable masses, in kg
pub const MASS_RANGE: (f32, f32) = (0.05, 0.3);

// ============================================================================
// GLOBAL PARAMETERS
// ============================================================================

pub const EARTH_GRAVITY: f32 = 9.81;
pub const GRAVITY_RANGE: (f32, f32) = (0.0, 30.0);
pub const DAMPING_RANGE: (f32, f32) = (0.0, 1.5);

/// Slow motion divides physics dt by this ratio
pub const SIM_DT_RATIO: f32 = 4.0;

/// Larger frame deltas are treated as a resumed tab, not real elapsed time
pub const MAX_DT: f32 = 0.3;

/// Nominal dt used by the single-step button
pub const STEP_FORWARD_DT: f32 = 0.01;

// ============================================================================
// GRAB / RELEASE
// ============================================================================

/// Horizontal and vertical reach for hooking a mass onto a spring
pub const GRABBING_DISTANCE: f32 = 0.1;

/// Horizontal distance at which a dragged mass leaves its spring
pub const RELEASE_DISTANCE: f32 = 0.1;

// ============================================================================
// COIL GEOMETRY
// ============================================================================

/// Number of drawn coil loops for a given natural length
pub const NUMBER_OF_LOOPS: LinearFunction = LinearFunction::new(
    SPRING_LENGTH_RANGE.0,
    SPRING_LENGTH_RANGE.1,
    6.0,
    12.0,
);

/// Coil extent (thickness × loops) to the highest point a hanging mass may
/// reach, measured upward from the floor
pub const COIL_LIMIT: LinearFunction = LinearFunction::new(20.0, 60.0, 1.353, 1.265);
