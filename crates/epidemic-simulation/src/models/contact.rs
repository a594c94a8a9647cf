//! Contact heterogeneity
//!
//! Approximates a contact network by scaling transmission with the day's contact count
//! relative to the network baseline. With a Poisson mean configured, one count is drawn per
//! simulated day per replication; otherwise the baseline is used and no randomness is consumed.

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::error::{SimResult, SimulationError};
use crate::params::ResolvedParameters;

/// Lower bound on a sampled contact count, so that a zero draw cannot end an epidemic on its own.
pub const CONTACT_FLOOR: f64 = 1e-3;

/// Contact network parameters of a resolved scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactNetwork {
    /// Average contacts per day; the baseline against which samples are normalized.
    pub n_contacts: f64,
    /// Poisson mean for sampled contacts. `None` means fixed contacts.
    pub poisson_lam: Option<f64>,
}

/// Source of the daily effective contact count.
#[derive(Debug, Clone)]
pub enum ContactSampler {
    Fixed(f64),
    Poisson { baseline: f64, distribution: Poisson<f64> },
}

impl ContactSampler {
    pub fn new(network: &ContactNetwork) -> SimResult<Self> {
        match network.poisson_lam {
            Some(lam) if lam > 0.0 => {
                let distribution = Poisson::new(lam).map_err(|e| {
                    SimulationError::Configuration(format!(
                        "invalid network_poisson_lam {}: {:?}",
                        lam, e
                    ))
                })?;
                Ok(Self::Poisson {
                    baseline: network.n_contacts,
                    distribution,
                })
            }
            _ => Ok(Self::Fixed(network.n_contacts)),
        }
    }

    pub fn baseline(&self) -> f64 {
        match self {
            Self::Fixed(baseline) => *baseline,
            Self::Poisson { baseline, .. } => *baseline,
        }
    }

    /// Effective contacts for one day.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Fixed(contacts) => *contacts,
            Self::Poisson { distribution, .. } => distribution.sample(rng).max(CONTACT_FLOOR),
        }
    }

    /// Effective contacts for one day normalized to the baseline (1.0 at baseline).
    pub fn scale<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sample(rng) / self.baseline()
    }
}

/// Effective contacts for one day of `params`.
pub fn effective_contacts<R: Rng + ?Sized>(
    params: &ResolvedParameters,
    rng: &mut R,
) -> SimResult<f64> {
    Ok(ContactSampler::new(&params.network)?.sample(rng))
}
