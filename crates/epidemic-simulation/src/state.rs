//! Per-day compartment state.

use serde::{Deserialize, Serialize};

use crate::params::{ModelKind, ResolvedParameters};

/// Compartment values for one simulated day.
///
/// Values are non-negative reals whose sum equals the population size. `E` stays zero for SIR.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationState {
    pub day: usize,
    #[serde(rename = "S")]
    pub susceptible: f64,
    #[serde(rename = "E")]
    pub exposed: f64,
    #[serde(rename = "I")]
    pub infected: f64,
    #[serde(rename = "R")]
    pub recovered: f64,
    #[serde(rename = "D")]
    pub dead: f64,
}

impl SimulationState {
    /// Day-0 state.
    ///
    /// Vaccinated individuals start in `R`; initial infections go half to `E` and half to `I`
    /// for SEIR, all to `I` for SIR. `S` takes the remainder.
    pub fn initial(params: &ResolvedParameters) -> Self {
        let size = params.population();
        let seeded = params.init_prev * size;
        let (exposed, infected) = match params.model {
            ModelKind::Seir => (seeded * 0.5, seeded * 0.5),
            ModelKind::Sir => (0.0, seeded),
        };
        let recovered = params.vaccination.coverage * size;
        let susceptible = (size - (exposed + infected + recovered)).max(0.0);

        Self {
            day: 0,
            susceptible,
            exposed,
            infected,
            recovered,
            dead: 0.0,
        }
    }

    pub fn compartments(&self) -> [f64; 5] {
        [
            self.susceptible,
            self.exposed,
            self.infected,
            self.recovered,
            self.dead,
        ]
    }

    pub fn total(&self) -> f64 {
        self.compartments().iter().sum()
    }

    /// Everyone who has left S through infection so far: recovered plus dead.
    pub fn removed(&self) -> f64 {
        self.recovered + self.dead
    }

    /// Clamp every negative compartment to 0.
    ///
    /// Non-finite values pass through untouched so that the invariant checks report them.
    pub fn clamp_non_negative(&mut self) {
        self.susceptible = floor_at_zero(self.susceptible);
        self.exposed = floor_at_zero(self.exposed);
        self.infected = floor_at_zero(self.infected);
        self.recovered = floor_at_zero(self.recovered);
        self.dead = floor_at_zero(self.dead);
    }

    /// Move any drift between the compartment total and `size` into `S`.
    pub fn reconcile(&mut self, size: f64) {
        let drift = size - self.total();
        self.susceptible = floor_at_zero(self.susceptible + drift);
    }

    pub fn is_finite(&self) -> bool {
        self.compartments().iter().all(|c| c.is_finite())
    }
}

// `f64::max` would turn NaN into 0.
fn floor_at_zero(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}
