//! Geometric simulated-annealing schedule.
//!
//! The temperature decays as `T(n) = T0 * alpha^n` until `n = sweeps_anneal`,
//! where it lands on the target `T`; afterwards it stays at `T`.

use crate::error::{Result, SpinError};

/// Lowest accepted per-sweep decay ratio.
pub const MIN_ALPHA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Temperature follows the geometric schedule.
    Annealing,
    /// Temperature fixed at the target.
    Equilibrating,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealingSchedule {
    kt_initial: f64,
    kt_final: f64,
    sweeps_anneal: u64,
    alpha: f64,
}

impl AnnealingSchedule {
    /// Schedule from `kt_initial` down to `kt_final` over `sweeps_anneal` sweeps.
    ///
    /// # Errors
    /// [`SpinError::InvalidAnnealingSchedule`] unless both temperatures are
    /// positive and `alpha = exp(ln(kt_final / kt_initial) / sweeps_anneal)`
    /// lies in `[0.5, 1.0)`.
    pub fn new(kt_initial: f64, kt_final: f64, sweeps_anneal: u64) -> Result<Self> {
        let alpha = (((kt_final / kt_initial).ln()) / sweeps_anneal as f64).exp();
        let positive = |t: f64| t.is_finite() && t > 0.0;
        if !positive(kt_initial) || !positive(kt_final) || !(MIN_ALPHA..1.0).contains(&alpha) {
            return Err(SpinError::InvalidAnnealingSchedule { alpha });
        }
        Ok(Self { kt_initial, kt_final, sweeps_anneal, alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn kt_initial(&self) -> f64 {
        self.kt_initial
    }

    pub fn kt_final(&self) -> f64 {
        self.kt_final
    }

    pub fn sweeps_anneal(&self) -> u64 {
        self.sweeps_anneal
    }

    pub fn phase(&self, n_sweeps: u64) -> Phase {
        if n_sweeps < self.sweeps_anneal {
            Phase::Annealing
        } else {
            Phase::Equilibrating
        }
    }

    /// Temperature after `n_sweeps` sweeps.
    pub fn temperature(&self, n_sweeps: u64) -> f64 {
        match self.phase(n_sweeps) {
            Phase::Annealing => self.kt_initial * self.alpha.powf(n_sweeps as f64),
            Phase::Equilibrating => self.kt_final,
        }
    }

    pub fn beta(&self, n_sweeps: u64) -> f64 {
        1.0 / self.temperature(n_sweeps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_alpha() {
        let schedule = AnnealingSchedule::new(1.0, 0.4, 100).unwrap();
        assert_relative_eq!(schedule.alpha(), (0.4_f64.ln() / 100.0).exp(), epsilon = 1e-15);
        assert_relative_eq!(schedule.alpha(), 0.99088, epsilon = 1e-4);
    }

    #[test]
    fn test_reaches_target_and_decreases() {
        for &(t0, t, n) in &[(1.0, 0.4, 100u64), (2.5, 1.3, 7), (10.0, 0.01, 10), (1.0, 0.999, 1)] {
            let schedule = AnnealingSchedule::new(t0, t, n).unwrap();
            // closed form at the threshold, not only the clamped value
            assert_relative_eq!(t0 * schedule.alpha().powf(n as f64), t, max_relative = 1e-10);
            assert_eq!(schedule.temperature(n), t);
            for k in 0..n {
                assert!(schedule.temperature(k + 1) < schedule.temperature(k));
            }
            assert_eq!(schedule.temperature(0), t0);
        }
    }

    #[test]
    fn test_rejects_out_of_range_alpha() {
        let cases = [
            (1.0, 0.1, 2),   // alpha ~ 0.316, decays faster than halving
            (1.0, 1.0, 100), // alpha = 1, constant temperature
            (1.0, 2.0, 100), // heating
            (1.0, 0.4, 0),   // no annealing sweeps
            (-1.0, -0.4, 100),
            (1.0, 0.0, 100),
        ];
        for (t0, t, n) in cases {
            assert!(
                matches!(
                    AnnealingSchedule::new(t0, t, n),
                    Err(SpinError::InvalidAnnealingSchedule { .. })
                ),
                "accepted T0={t0} T={t} n={n}"
            );
        }
    }

    #[test]
    fn test_halving_bound() {
        assert!(AnnealingSchedule::new(1.0, 0.26, 2).is_ok());
        assert!(AnnealingSchedule::new(1.0, 0.24, 2).is_err());
    }

    #[test]
    fn test_phase_transition() {
        let schedule = AnnealingSchedule::new(1.0, 0.4, 100).unwrap();
        assert_eq!(schedule.phase(99), Phase::Annealing);
        assert_eq!(schedule.phase(100), Phase::Equilibrating);
        assert_relative_eq!(schedule.beta(400), 2.5);
    }
}
