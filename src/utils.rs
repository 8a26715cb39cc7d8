// utils.rs

/// Linear map from `[domain_min, domain_max]` onto `[range_min, range_max]`.
/// Inputs outside the domain extrapolate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFunction {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearFunction {
    pub const fn new(domain_min: f32, domain_max: f32, range_min: f32, range_max: f32) -> Self {
        LinearFunction {
            domain_min,
            domain_max,
            range_min,
            range_max,
        }
    }

    pub fn evaluate(&self, x: f32) -> f32 {
        let t = (x - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }
}

/// Approximate float comparison for derived quantities
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}
