// model/oscillator.rs

/// Closed-form motion of a damped harmonic oscillator about its equilibrium.
///
/// Solves `m·u'' + b·u' + k·u = 0` exactly over one step, so a hanging mass
/// never gains energy no matter how large the frame delta is.
#[derive(Debug, Clone, Copy)]
pub struct DampedOscillator {
    /// Mass in kg
    pub mass: f32,
    /// Spring constant in N/m
    pub stiffness: f32,
    /// Damping coefficient in N·s/m
    pub damping: f32,
}

impl DampedOscillator {
    /// Advance offset `u0` and velocity `v0` by `t` seconds
    pub fn advance(&self, u0: f32, v0: f32, t: f32) -> (f32, f32) {
        if self.mass <= 0.0 || self.stiffness <= 0.0 || t <= 0.0 {
            return (u0, v0);
        }

        let beta = self.damping / (2.0 * self.mass);
        let omega0 = (self.stiffness / self.mass).sqrt();
        let envelope = (-beta * t).exp();

        if (beta - omega0).abs() <= f32::EPSILON * omega0.max(1.0) {
            // critically damped
            let b = v0 + beta * u0;
            let u = envelope * (u0 + b * t);
            let v = envelope * (b - beta * (u0 + b * t));
            (u, v)
        } else if beta < omega0 {
            // underdamped
            let omega1 = (omega0 * omega0 - beta * beta).sqrt();
            let a = u0;
            let b = (v0 + beta * u0) / omega1;
            let (sin, cos) = (omega1 * t).sin_cos();
            let u = envelope * (a * cos + b * sin);
            let v = envelope * ((b * omega1 - beta * a) * cos - (a * omega1 + beta * b) * sin);
            (u, v)
        } else {
            // overdamped
            let omega2 = (beta * beta - omega0 * omega0).sqrt();
            let a = u0;
            let b = (v0 + beta * u0) / omega2;
            let (sinh, cosh) = ((omega2 * t).sinh(), (omega2 * t).cosh());
            let u = envelope * (a * cosh + b * sinh);
            let v = envelope * ((b * omega2 - beta * a) * cosh + (a * omega2 - beta * b) * sinh);
            (u, v)
        }
    }

    /// Undamped period, 2π·√(m/k)
    pub fn period(&self) -> f32 {
        std::f32::consts::TAU * (self.mass / self.stiffness).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::approx_eq;

    #[test]
    fn test_undamped_returns_after_one_period() {
        let osc = DampedOscillator {
            mass: 0.25,
            stiffness: 9.0,
            damping: 0.0,
        };

        let (u, v) = osc.advance(0.1, 0.0, osc.period());
        assert!(approx_eq(u, 0.1, 1e-4));
        assert!(approx_eq(v, 0.0, 1e-3));
    }

    #[test]
    fn test_undamped_conserves_energy_over_many_steps() {
        let osc = DampedOscillator {
            mass: 0.1,
            stiffness: 6.0,
            damping: 0.0,
        };
        let energy = |u: f32, v: f32| 0.5 * osc.stiffness * u * u + 0.5 * osc.mass * v * v;

        let (mut u, mut v) = (0.05, 0.3);
        let start = energy(u, v);
        for _ in 0..600 {
            (u, v) = osc.advance(u, v, 1.0 / 60.0);
        }

        assert!(approx_eq(energy(u, v), start, start * 1e-3));
    }

    #[test]
    fn test_damping_decays_all_regimes() {
        for damping in [0.5, 2.0 * (9.0_f32 * 0.25).sqrt(), 6.0] {
            let osc = DampedOscillator {
                mass: 0.25,
                stiffness: 9.0,
                damping,
            };
            let (u, v) = osc.advance(0.2, 0.0, 5.0);
            assert!(u.abs() < 0.02, "damping {} left offset {}", damping, u);
            assert!(v.abs() < 0.05, "damping {} left velocity {}", damping, v);
        }
    }

    #[test]
    fn test_velocity_matches_finite_difference() {
        let osc = DampedOscillator {
            mass: 0.2,
            stiffness: 5.0,
            damping: 3.0,
        };
        let h = 1e-3;
        let (u1, v1) = osc.advance(0.1, -0.2, 0.5);
        let (u2, _) = osc.advance(0.1, -0.2, 0.5 + h);
        assert!(approx_eq((u2 - u1) / h, v1, 5e-3));
    }
}
