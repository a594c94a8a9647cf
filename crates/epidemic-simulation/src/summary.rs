//! Summary statistics of a trajectory.

use serde::{Deserialize, Serialize};

use crate::params::{ModelKind, ResolvedParameters};
use crate::state::SimulationState;

/// Headline figures of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub peak_infected: f64,
    pub peak_infected_day: usize,
    /// Zero for SIR.
    pub peak_exposed: f64,
    pub peak_exposed_day: usize,
    /// `R + D` on the last day.
    pub total_infected: f64,
    pub total_deaths: f64,
    pub final_susceptible: f64,
    pub final_recovered: f64,
    pub attack_rate: f64,
    pub case_fatality_rate: f64,
    /// `beta / gamma`, taken from the parameters.
    pub r0: f64,
    pub infectious_period: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub incubation_period: Option<f64>,
    /// Fraction of transmission blocked by vaccination on day 0.
    pub initial_protection: f64,
}

/// Maximum of `values` and the first index attaining it; `(0.0, 0)` when empty.
fn peak(values: impl Iterator<Item = f64>) -> (f64, usize) {
    let mut best = (0.0, 0);
    for (day, value) in values.enumerate() {
        // strict comparison keeps the earliest day on ties
        if day == 0 || value > best.0 {
            best = (value, day);
        }
    }
    best
}

/// Summarize a (mean) trajectory.
pub fn summarize(trajectory: &[SimulationState], params: &ResolvedParameters) -> Summary {
    let (peak_infected, peak_infected_day) = peak(trajectory.iter().map(|s| s.infected));
    let (peak_exposed, peak_exposed_day) = peak(trajectory.iter().map(|s| s.exposed));

    let last = trajectory.last().copied().unwrap_or_default();
    let total_infected = last.removed();
    let case_fatality_rate = if total_infected > 0.0 {
        last.dead / total_infected
    } else {
        0.0
    };

    Summary {
        peak_infected,
        peak_infected_day,
        peak_exposed,
        peak_exposed_day,
        total_infected,
        total_deaths: last.dead,
        final_susceptible: last.susceptible,
        final_recovered: last.recovered,
        attack_rate: total_infected / params.population(),
        case_fatality_rate,
        r0: params.r0(),
        infectious_period: 1.0 / params.gamma,
        incubation_period: match params.model {
            ModelKind::Seir if params.sigma > 0.0 => Some(1.0 / params.sigma),
            _ => None,
        },
        initial_protection: params.vaccination.protected_fraction(0),
    }
}
