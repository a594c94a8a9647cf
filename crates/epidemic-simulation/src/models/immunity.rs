//! Vaccine-conferred protection
//!
//! The vaccinated population splits into a primary-only share (`coverage - booster_coverage`)
//! and a boosted share (`booster_coverage`). Primary efficacy against transmission decays
//! linearly from `transmission_eff` on day 0 to `residual_floor` on `waning_days`, then holds.
//! Boosted efficacy stays at `transmission_eff` for the whole horizon.
//!
//! Severity protection scales mortality by the vaccinated share of the population and does not
//! wane; it never touches the transmission term.

use crate::params::ResolvedParameters;

/// Vaccination parameters of a resolved scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Vaccination {
    pub coverage: f64,
    pub booster_coverage: f64,
    pub transmission_eff: f64,
    pub severity_eff: f64,
    pub waning_days: f64,
    pub residual_floor: f64,
}

impl Vaccination {
    /// No vaccination at all.
    pub fn none() -> Self {
        Self {
            coverage: 0.0,
            booster_coverage: 0.0,
            transmission_eff: 0.0,
            severity_eff: 0.0,
            waning_days: 1.0,
            residual_floor: 0.0,
        }
    }

    /// Transmission efficacy of a primary-only dose on `day`.
    pub fn waned_efficacy(&self, day: usize) -> f64 {
        let progress = (day as f64 / self.waning_days).min(1.0);
        self.transmission_eff + (self.residual_floor - self.transmission_eff) * progress
    }

    /// Fraction of transmission blocked on `day`, in `[0, 1]`.
    pub fn protected_fraction(&self, day: usize) -> f64 {
        let primary_only = (self.coverage - self.booster_coverage).max(0.0);
        let protection =
            primary_only * self.waned_efficacy(day) + self.booster_coverage * self.transmission_eff;
        protection.clamp(0.0, 1.0)
    }

    /// Multiplier on the mortality rate from severity protection.
    pub fn mortality_multiplier(&self) -> f64 {
        (1.0 - self.severity_eff * self.coverage).clamp(0.0, 1.0)
    }
}

/// Fraction of transmission blocked by vaccination on `day`.
pub fn protected_fraction(day: usize, params: &ResolvedParameters) -> f64 {
    params.vaccination.protected_fraction(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn vaccination() -> Vaccination {
        Vaccination {
            coverage: 0.6,
            booster_coverage: 0.0,
            transmission_eff: 0.5,
            severity_eff: 0.8,
            waning_days: 100.0,
            residual_floor: 0.1,
        }
    }

    #[test]
    fn test_day_zero_is_coverage_times_efficacy() {
        let v = vaccination();
        assert!((v.protected_fraction(0) - 0.6 * 0.5).abs() < EPS);
    }

    #[test]
    fn test_linear_waning_to_floor() {
        let v = vaccination();
        // halfway through waning
        assert!((v.protected_fraction(50) - 0.6 * 0.3).abs() < EPS);
        assert!((v.protected_fraction(100) - 0.6 * 0.1).abs() < EPS);
        // held after waning completes
        assert!((v.protected_fraction(1000) - 0.6 * 0.1).abs() < EPS);
        for day in 0..150 {
            assert!(v.protected_fraction(day + 1) <= v.protected_fraction(day) + EPS);
        }
    }

    #[test]
    fn test_coverage_without_efficacy_gives_no_protection() {
        let mut v = vaccination();
        v.transmission_eff = 0.0;
        v.residual_floor = 0.0;
        assert_eq!(v.protected_fraction(0), 0.0);
        assert_eq!(v.protected_fraction(500), 0.0);
    }

    #[test]
    fn test_boosters_do_not_wane() {
        let mut v = vaccination();
        v.booster_coverage = 0.2;
        let expected_late = 0.4 * 0.1 + 0.2 * 0.5;
        assert!((v.protected_fraction(0) - 0.6 * 0.5).abs() < EPS);
        assert!((v.protected_fraction(365) - expected_late).abs() < EPS);
    }

    #[test]
    fn test_mortality_multiplier() {
        let v = vaccination();
        assert!((v.mortality_multiplier() - (1.0 - 0.8 * 0.6)).abs() < EPS);
        assert_eq!(Vaccination::none().mortality_multiplier(), 1.0);
        assert_eq!(Vaccination::none().protected_fraction(10), 0.0);
    }
}
