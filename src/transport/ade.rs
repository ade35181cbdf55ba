//! One-dimensional advection-dispersion breakthrough model.
//!
//! For a continuous injection at relative concentration 1 the analytical
//! solution at distance L is
//!
//! ```text
//! C/C0 = 1/2 erfc[ (L - v t / R) / (2 sqrt(D t / R)) ]
//! ```
//!
//! with D the longitudinal dispersion coefficient (dispersivity times pore
//! velocity) and R the compound's retardation factor.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdeParameters {
    /// Longitudinal dispersivity, m.
    pub dispersivity: f64,
    /// Pore velocity, m/day.
    pub velocity: f64,
    /// Travel distance to the observation point, m.
    pub distance: f64,
}

impl AdeParameters {
    /// Longitudinal dispersion coefficient, m2/day.
    pub fn dispersion(&self) -> f64 {
        self.dispersivity * self.velocity
    }

    /// Modelled C/C0 at `t_days` for a compound with retardation `r`.
    /// Before the injection starts nothing has arrived.
    pub fn relative_concentration(&self, t_days: f64, r: f64) -> f64 {
        if t_days <= 0.0 {
            return 0.0;
        }
        let tr = t_days / r;
        let arg = (self.distance - self.velocity * tr) / (2.0 * (self.dispersion() * tr).sqrt());
        0.5 * erfc(arg)
    }

    /// Breakthrough curve over a series of times.
    pub fn curve(&self, times_days: &[f64], r: f64) -> Vec<f64> {
        times_days
            .iter()
            .map(|&t| self.relative_concentration(t, r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> AdeParameters {
        AdeParameters {
            dispersivity: 0.4,
            velocity: 0.2,
            distance: 4.0,
        }
    }

    #[test]
    fn nothing_arrives_before_injection() {
        assert_eq!(model().relative_concentration(0.0, 1.0), 0.0);
        assert_eq!(model().relative_concentration(-5.0, 2.0), 0.0);
    }

    #[test]
    fn half_breakthrough_at_the_retarded_travel_time() {
        let m = model();
        for r in [1.0, 2.5] {
            // t = L R / v puts the erfc argument at zero.
            let t = m.distance * r / m.velocity;
            let c = m.relative_concentration(t, r);
            assert!((c - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn curve_rises_monotonically_towards_one() {
        let m = model();
        let times: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let curve = m.curve(&times, 1.5);
        for pair in curve.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(curve[curve.len() - 1] > 0.9);
        assert!(curve.iter().all(|&c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn retardation_delays_the_front() {
        let m = model();
        let t = 30.0;
        assert!(m.relative_concentration(t, 1.0) > m.relative_concentration(t, 3.0));
    }
}
