//! Scenario parameters
//!
//! [`ScenarioParameters`] is the record an outside caller builds (UI form, scenario file, preset).
//! Required rates are optional here so that the validator can report them as missing.
//! [`ResolvedParameters`] is the fully concrete form that the sub-models and the integrator consume;
//! it can only be obtained from a scenario that passed validation.

//-----------------------------------------------------------------------------
// Imports
//-----------------------------------------------------------------------------

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SimResult, SimulationError};
use crate::models::contact::ContactNetwork;
use crate::models::immunity::Vaccination;
use crate::models::seasonal::Seasonality;
use crate::validation::validate;

//-----------------------------------------------------------------------------
// Defaults
//-----------------------------------------------------------------------------

/// Contacts per day used as the network baseline when none is given.
pub const DEFAULT_CONTACTS: f64 = 10.0;
/// Days for primary vaccine protection to wane to its residual floor.
pub const DEFAULT_WANING_DAYS: i64 = 180;
/// Replications per run when none is given.
pub const DEFAULT_REPLICATIONS: i64 = 10;

//-----------------------------------------------------------------------------
// Model Kind
//-----------------------------------------------------------------------------

/// Compartmental structure of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelKind {
    /// Susceptible, Infected, Recovered (+ Dead)
    #[serde(rename = "SIR", alias = "sir")]
    Sir,
    /// Susceptible, Exposed, Infected, Recovered (+ Dead)
    #[default]
    #[serde(rename = "SEIR", alias = "seir")]
    Seir,
}

impl ModelKind {
    pub fn has_exposed(self) -> bool {
        matches!(self, Self::Seir)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sir => write!(f, "SIR"),
            Self::Seir => write!(f, "SEIR"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SIR" => Ok(Self::Sir),
            "SEIR" => Ok(Self::Seir),
            other => Err(SimulationError::Configuration(format!(
                "unknown model kind '{}', expected SIR or SEIR",
                other
            ))),
        }
    }
}

//-----------------------------------------------------------------------------
// Scenario Parameters
//-----------------------------------------------------------------------------

/// Input record describing one epidemic scenario.
///
/// Integer-valued fields are signed so that out-of-range input (e.g. a negative population)
/// reaches the validator as a finding instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParameters {
    pub disease_name: String,
    pub model: ModelKind,

    /// Initial infected fraction of the population.
    pub init_prev: Option<f64>,
    /// Transmission rate per day.
    pub beta: Option<f64>,
    /// Recovery rate per day.
    pub gamma: Option<f64>,
    /// Mortality rate per day of infection.
    pub mu: Option<f64>,
    /// Incubation progression rate (SEIR only).
    pub sigma: Option<f64>,
    /// Mean incubation period in days, used only to cross-check `sigma`.
    pub incubation_period: Option<f64>,

    pub size: Option<i64>,
    pub duration_days: Option<i64>,

    pub seasonal_factor: f64,
    pub peak_weeks: Vec<u32>,

    pub vaccination_coverage: f64,
    pub booster_coverage: f64,
    pub vax_transmission_eff: f64,
    pub vax_severity_eff: f64,
    pub waning_days: i64,
    pub residual_transmission_floor: f64,

    pub network_n_contacts: f64,
    pub network_poisson_lam: Option<f64>,

    pub n_reps: i64,
    pub random_seed: Option<u64>,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            disease_name: "custom".to_string(),
            model: ModelKind::default(),
            init_prev: None,
            beta: None,
            gamma: None,
            mu: None,
            sigma: None,
            incubation_period: None,
            size: None,
            duration_days: None,
            seasonal_factor: 1.0,
            peak_weeks: Vec::new(),
            vaccination_coverage: 0.0,
            booster_coverage: 0.0,
            vax_transmission_eff: 0.0,
            vax_severity_eff: 0.0,
            waning_days: DEFAULT_WANING_DAYS,
            residual_transmission_floor: 0.0,
            network_n_contacts: DEFAULT_CONTACTS,
            network_poisson_lam: None,
            n_reps: DEFAULT_REPLICATIONS,
            random_seed: None,
        }
    }
}

impl ScenarioParameters {
    /// Basic reproduction number implied by the supplied rates, if both are present.
    pub fn r0(&self) -> Option<f64> {
        match (self.beta, self.gamma) {
            (Some(beta), Some(gamma)) if gamma > 0.0 => Some(beta / gamma),
            _ => None,
        }
    }
}

//-----------------------------------------------------------------------------
// Resolved Parameters
//-----------------------------------------------------------------------------

/// Concrete, validated parameter set consumed by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters {
    pub disease_name: String,
    pub model: ModelKind,
    pub init_prev: f64,
    pub beta: f64,
    pub gamma: f64,
    pub mu: f64,
    /// Zero for SIR.
    pub sigma: f64,
    pub size: u64,
    pub duration_days: usize,
    pub seasonality: Seasonality,
    pub vaccination: Vaccination,
    pub network: ContactNetwork,
    pub n_reps: usize,
    pub random_seed: Option<u64>,
}

impl ResolvedParameters {
    /// Validate `params` and build the concrete record.
    ///
    /// Warnings and suggestions are logged; errors abort with [`SimulationError::Validation`].
    pub fn resolve(params: &ScenarioParameters) -> SimResult<Self> {
        let report = validate(params);
        if !report.valid {
            return Err(SimulationError::Validation(report));
        }
        for warning in &report.warnings {
            warn!(disease = %params.disease_name, "{}", warning);
        }
        for suggestion in &report.suggestions {
            warn!(disease = %params.disease_name, "suggestion: {}", suggestion);
        }

        let sigma = match params.model {
            ModelKind::Seir => required(params.sigma, "sigma")?,
            ModelKind::Sir => 0.0,
        };

        Ok(Self {
            disease_name: params.disease_name.clone(),
            model: params.model,
            init_prev: required(params.init_prev, "init_prev")?,
            beta: required(params.beta, "beta")?,
            gamma: required(params.gamma, "gamma")?,
            mu: required(params.mu, "mu")?,
            sigma,
            size: required(params.size, "size")? as u64,
            duration_days: required(params.duration_days, "duration_days")? as usize,
            seasonality: Seasonality {
                factor: params.seasonal_factor,
                peak_weeks: params.peak_weeks.iter().copied().collect::<BTreeSet<_>>(),
            },
            vaccination: Vaccination {
                coverage: params.vaccination_coverage,
                booster_coverage: params.booster_coverage,
                transmission_eff: params.vax_transmission_eff,
                severity_eff: params.vax_severity_eff,
                waning_days: params.waning_days as f64,
                residual_floor: params.residual_transmission_floor,
            },
            network: ContactNetwork {
                n_contacts: params.network_n_contacts,
                poisson_lam: params.network_poisson_lam.filter(|lam| *lam > 0.0),
            },
            n_reps: params.n_reps as usize,
            random_seed: params.random_seed,
        })
    }

    /// Population size as a real number, for rate arithmetic.
    pub fn population(&self) -> f64 {
        self.size as f64
    }

    pub fn r0(&self) -> f64 {
        self.beta / self.gamma
    }
}

fn required<T>(value: Option<T>, name: &str) -> SimResult<T> {
    value.ok_or_else(|| {
        SimulationError::Configuration(format!("missing required parameter after validation: {}", name))
    })
}

//-----------------------------------------------------------------------------
// Parameter Descriptions
//-----------------------------------------------------------------------------

const PARAMETER_DESCRIPTIONS: &[(&str, &str)] = &[
    ("init_prev", "Initial prevalence - proportion of population initially infected"),
    ("beta", "Transmission rate - rate of disease spread per contact"),
    ("sigma", "Incubation rate - rate of progression from exposed to infected (1/incubation_period)"),
    ("gamma", "Recovery rate - rate of recovery from infection (1/infectious_period)"),
    ("mu", "Mortality rate - rate of death from infection"),
    ("incubation_period", "Average time from exposure to becoming infectious (days)"),
    ("size", "Population size"),
    ("duration_days", "Number of simulated days"),
    ("seasonal_factor", "Seasonal amplification factor during peak periods"),
    ("peak_weeks", "Epidemiological weeks when seasonal factor applies"),
    ("vaccination_coverage", "Proportion of population vaccinated"),
    ("booster_coverage", "Proportion of population boosted (subset of the vaccinated)"),
    ("vax_transmission_eff", "Reduction in transmission conferred by vaccination"),
    ("vax_severity_eff", "Reduction in mortality conferred by vaccination"),
    ("waning_days", "Days for primary vaccine protection to wane to the residual floor"),
    ("residual_transmission_floor", "Transmission protection retained after full waning"),
    ("network_n_contacts", "Average contacts per day (network baseline)"),
    ("network_poisson_lam", "Mean of the Poisson-distributed daily contact count; fixed contacts when unset"),
    ("n_reps", "Number of stochastic replications averaged into the reported trajectory"),
    ("random_seed", "Seed for reproducible runs"),
];

/// Human-readable description of every scenario parameter, in declaration order.
pub fn parameter_descriptions() -> &'static [(&'static str, &'static str)] {
    PARAMETER_DESCRIPTIONS
}
