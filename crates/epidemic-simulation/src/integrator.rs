//! Compartmental Integrator
//!
//! Forward-Euler update with one-day granularity. Each flow is capped by the compartment it
//! drains, the result is clamped to non-negative values, and any remaining drift from the
//! population size is reconciled into `S`.

//-----------------------------------------------------------------------------
// Imports
//-----------------------------------------------------------------------------

use rand::Rng;

use crate::error::SimResult;
use crate::models::ContactSampler;
use crate::params::{ModelKind, ResolvedParameters};
use crate::state::SimulationState;

//-----------------------------------------------------------------------------
// Daily Flows
//-----------------------------------------------------------------------------

/// Flows between compartments computed for one day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DailyFlows {
    /// S -> E (SEIR) or S -> I (SIR)
    pub new_exposed: f64,
    /// E -> I; equal to `new_exposed` for SIR
    pub new_infectious: f64,
    pub new_recoveries: f64,
    pub new_deaths: f64,
    /// Transmission rate after seasonal, contact and immunity adjustment.
    pub beta_eff: f64,
}

//-----------------------------------------------------------------------------
// Integrator
//-----------------------------------------------------------------------------

/// Steps one replication's state forward day by day.
#[derive(Debug, Clone)]
pub struct Integrator<'a> {
    params: &'a ResolvedParameters,
    contacts: ContactSampler,
}

impl<'a> Integrator<'a> {
    pub fn new(params: &'a ResolvedParameters) -> SimResult<Self> {
        Ok(Self {
            params,
            contacts: ContactSampler::new(&params.network)?,
        })
    }

    /// Flows for the transition into `day` from `state`. Draws one contact sample when the
    /// network is stochastic.
    pub fn flows<R: Rng + ?Sized>(&self, state: &SimulationState, day: usize, rng: &mut R) -> DailyFlows {
        let p = self.params;
        let size = p.population();

        let seasonal = p.seasonality.multiplier(day);
        let contact_scale = self.contacts.scale(rng);
        let protection = p.vaccination.protected_fraction(day);
        let beta_eff = if protection < 1.0 {
            p.beta * seasonal * contact_scale * (1.0 - protection)
        } else {
            0.0
        };

        // Per-capita fractions are capped at 1 before they touch a compartment, so an
        // overflowing rate product drains at most the whole compartment and never yields NaN.
        let infectious_share = state.infected / size;
        let force_of_infection = if infectious_share > 0.0 {
            (beta_eff * infectious_share).min(1.0)
        } else {
            0.0
        };
        let new_exposed = force_of_infection * state.susceptible;

        let new_infectious = match p.model {
            ModelKind::Seir => p.sigma.min(1.0) * state.exposed,
            ModelKind::Sir => new_exposed,
        };

        let mu_eff = p.mu * p.vaccination.mortality_multiplier();
        let (recovery_fraction, death_fraction) = outflow_fractions(p.gamma, mu_eff);
        let new_recoveries = recovery_fraction * state.infected;
        let new_deaths = death_fraction * state.infected;

        DailyFlows {
            new_exposed,
            new_infectious,
            new_recoveries,
            new_deaths,
            beta_eff,
        }
    }

    /// Advance `state` to `day`.
    pub fn step<R: Rng + ?Sized>(&self, state: &SimulationState, day: usize, rng: &mut R) -> SimulationState {
        let flows = self.flows(state, day, rng);

        let exposed = match self.params.model {
            ModelKind::Seir => (state.exposed - flows.new_infectious) + flows.new_exposed,
            ModelKind::Sir => 0.0,
        };

        let mut next = SimulationState {
            day,
            susceptible: state.susceptible - flows.new_exposed,
            exposed,
            infected: (state.infected - flows.new_recoveries - flows.new_deaths) + flows.new_infectious,
            recovered: state.recovered + flows.new_recoveries,
            dead: state.dead + flows.new_deaths,
        };
        next.clamp_non_negative();
        next.reconcile(self.params.population());
        next
    }

    /// Full trajectory of `duration_days` states, starting from the initial state on day 0.
    pub fn trajectory<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<SimulationState> {
        let mut states = Vec::with_capacity(self.params.duration_days);
        let mut current = SimulationState::initial(self.params);
        states.push(current);
        for day in 1..self.params.duration_days {
            current = self.step(&current, day, rng);
            states.push(current);
        }
        states
    }
}

/// Daily fractions of `I` leaving to `R` and to `D`.
///
/// When `gamma + mu_eff` exceeds 1 the whole of `I` leaves, split in proportion to the rates.
/// The split is computed on rates rescaled by their maximum so that a sum beyond `f64::MAX`
/// still divides cleanly.
fn outflow_fractions(gamma: f64, mu_eff: f64) -> (f64, f64) {
    if gamma + mu_eff <= 1.0 {
        return (gamma, mu_eff);
    }
    let largest = gamma.max(mu_eff);
    let (g, d) = (gamma / largest, mu_eff / largest);
    (g / (g + d), d / (g + d))
}

/// Advance `state` to `day` under `params`.
pub fn step<R: Rng + ?Sized>(
    state: &SimulationState,
    params: &ResolvedParameters,
    day: usize,
    rng: &mut R,
) -> SimResult<SimulationState> {
    Ok(Integrator::new(params)?.step(state, day, rng))
}
