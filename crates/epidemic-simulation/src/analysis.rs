//! Scenario analysis
//!
//! One-at-a-time parameter sweeps and SEIR/SIR comparison. Both are thin drivers over
//! [`crate::simulate`]: every point is a full, independently validated run.

//-----------------------------------------------------------------------------
// Imports
//-----------------------------------------------------------------------------

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SimResult, SimulationError};
use crate::params::{ModelKind, ScenarioParameters};
use crate::summary::Summary;

/// Transmission boost applied to the SIR arm of a comparison, standing in for the latent period
/// the SIR structure lacks.
pub const SIR_BETA_ADJUSTMENT: f64 = 1.1;

//-----------------------------------------------------------------------------
// Sensitivity
//-----------------------------------------------------------------------------

/// Parameters that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    Beta,
    Gamma,
    Sigma,
    Mu,
    InitPrev,
    SeasonalFactor,
    VaccinationCoverage,
    VaxTransmissionEff,
    NetworkPoissonLam,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 9] = [
        Self::Beta,
        Self::Gamma,
        Self::Sigma,
        Self::Mu,
        Self::InitPrev,
        Self::SeasonalFactor,
        Self::VaccinationCoverage,
        Self::VaxTransmissionEff,
        Self::NetworkPoissonLam,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Beta => "beta",
            Self::Gamma => "gamma",
            Self::Sigma => "sigma",
            Self::Mu => "mu",
            Self::InitPrev => "init_prev",
            Self::SeasonalFactor => "seasonal_factor",
            Self::VaccinationCoverage => "vaccination_coverage",
            Self::VaxTransmissionEff => "vax_transmission_eff",
            Self::NetworkPoissonLam => "network_poisson_lam",
        }
    }

    /// Override this parameter in `params`.
    pub fn apply(self, params: &mut ScenarioParameters, value: f64) {
        match self {
            Self::Beta => params.beta = Some(value),
            Self::Gamma => params.gamma = Some(value),
            Self::Sigma => params.sigma = Some(value),
            Self::Mu => params.mu = Some(value),
            Self::InitPrev => params.init_prev = Some(value),
            Self::SeasonalFactor => params.seasonal_factor = value,
            Self::VaccinationCoverage => params.vaccination_coverage = value,
            Self::VaxTransmissionEff => params.vax_transmission_eff = value,
            Self::NetworkPoissonLam => params.network_poisson_lam = Some(value),
        }
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepParameter {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                SimulationError::Configuration(format!(
                    "cannot sweep '{}', expected one of: {}",
                    s,
                    Self::ALL.map(Self::name).join(", ")
                ))
            })
    }
}

/// Outcome of one sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub parameter_value: f64,
    pub peak_infected: f64,
    pub peak_infected_day: usize,
    pub total_infected: f64,
    pub attack_rate: f64,
    pub case_fatality_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub parameter: SweepParameter,
    pub entries: Vec<SensitivityEntry>,
}

/// Run `base` once per value of `parameter`, in the order given.
///
/// A value that makes the scenario invalid fails the whole sweep with that validation error.
pub fn sensitivity(
    base: &ScenarioParameters,
    parameter: SweepParameter,
    values: &[f64],
) -> SimResult<SensitivityReport> {
    info!(%parameter, points = values.len(), "starting sensitivity sweep");
    let entries = values
        .iter()
        .map(|&value| {
            let mut params = base.clone();
            parameter.apply(&mut params, value);
            let summary = crate::simulate(&params)?.summary;
            Ok(SensitivityEntry {
                parameter_value: value,
                peak_infected: summary.peak_infected,
                peak_infected_day: summary.peak_infected_day,
                total_infected: summary.total_infected,
                attack_rate: summary.attack_rate,
                case_fatality_rate: summary.case_fatality_rate,
            })
        })
        .collect::<SimResult<Vec<_>>>()?;

    Ok(SensitivityReport { parameter, entries })
}

//-----------------------------------------------------------------------------
// Model Comparison
//-----------------------------------------------------------------------------

/// One metric under both model structures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPair {
    pub seir: f64,
    pub sir: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub seir: Summary,
    pub sir: Summary,
    pub peak_infected: MetricPair,
    pub total_infected: MetricPair,
    pub attack_rate: MetricPair,
}

/// Run `base` as SEIR and as SIR (with `beta` scaled by [`SIR_BETA_ADJUSTMENT`]).
pub fn compare_models(base: &ScenarioParameters) -> SimResult<ModelComparison> {
    let seir_params = ScenarioParameters {
        model: ModelKind::Seir,
        ..base.clone()
    };
    let sir_params = ScenarioParameters {
        model: ModelKind::Sir,
        beta: base.beta.map(|beta| beta * SIR_BETA_ADJUSTMENT),
        ..base.clone()
    };

    let seir = crate::simulate(&seir_params)?.summary;
    let sir = crate::simulate(&sir_params)?.summary;

    Ok(ModelComparison {
        peak_infected: MetricPair {
            seir: seir.peak_infected,
            sir: sir.peak_infected,
        },
        total_infected: MetricPair {
            seir: seir.total_infected,
            sir: sir.total_infected,
        },
        attack_rate: MetricPair {
            seir: seir.attack_rate,
            sir: sir.attack_rate,
        },
        seir,
        sir,
    })
}
