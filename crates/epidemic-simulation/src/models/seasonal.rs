//! Seasonal forcing on transmission.

use std::collections::BTreeSet;

use crate::params::ResolvedParameters;

/// Weeks in the modelled year; the week index wraps here regardless of calendar year.
pub const WEEKS_PER_YEAR: usize = 52;

/// Epidemiological week index for a simulation day: `floor(day / 7) mod 52`.
///
/// Days 0..=6 are week 0, and day 364 wraps back to week 0. The index is compared
/// as-is against `peak_weeks`.
pub fn epi_week(day: usize) -> u32 {
    ((day / 7) % WEEKS_PER_YEAR) as u32
}

/// Seasonal multiplier applied during peak weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub factor: f64,
    pub peak_weeks: BTreeSet<u32>,
}

impl Seasonality {
    /// No seasonal effect.
    pub fn flat() -> Self {
        Self {
            factor: 1.0,
            peak_weeks: BTreeSet::new(),
        }
    }

    pub fn is_peak(&self, day: usize) -> bool {
        self.peak_weeks.contains(&epi_week(day))
    }

    pub fn multiplier(&self, day: usize) -> f64 {
        if self.is_peak(day) {
            self.factor
        } else {
            1.0
        }
    }
}

/// Transmission multiplier for `day`.
pub fn forcing(day: usize, params: &ResolvedParameters) -> f64 {
    params.seasonality.multiplier(day)
}
