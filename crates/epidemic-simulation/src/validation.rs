// Purpose: Checks a scenario for completeness, range validity and cross-field consistency.
//
// The validator is pure: it never mutates its input and never fails. Every finding is returned
// in the ValidationResult, and `valid` is false exactly when `errors` is non-empty.

use serde::{Deserialize, Serialize};

use crate::params::{ModelKind, ScenarioParameters};

/// R0 below which a scenario is flagged as unlikely to spread.
pub const R0_LOW_WARNING: f64 = 0.5;
/// R0 above which a scenario is flagged as an unrealistic epidemic.
pub const R0_HIGH_WARNING: f64 = 5.0;
/// Allowed gap between `sigma` and `1 / incubation_period`.
pub const SIGMA_TOLERANCE: f64 = 0.1;
/// Longest horizon accepted, one hundred years of days.
pub const MAX_DURATION_DAYS: i64 = 36_500;
/// Most replications accepted for one run.
pub const MAX_REPLICATIONS: i64 = 10_000;

/// Findings produced by [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Blocking problems.
    pub errors: Vec<String>,
    /// Numerically suspicious but runnable.
    pub warnings: Vec<String>,
    /// Parameter-derived inconsistencies.
    pub suggestions: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl ValidationResult {
    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn suggestion(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    /// True if any error message mentions `parameter`.
    pub fn has_error_for(&self, parameter: &str) -> bool {
        self.errors.iter().any(|e| e.contains(parameter))
    }
}

fn is_fraction(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Validate a scenario.
pub fn validate(params: &ScenarioParameters) -> ValidationResult {
    let mut result = ValidationResult::default();

    // Required fields
    let required = [
        ("init_prev", params.init_prev.is_some()),
        ("beta", params.beta.is_some()),
        ("gamma", params.gamma.is_some()),
        ("mu", params.mu.is_some()),
        ("size", params.size.is_some()),
        ("duration_days", params.duration_days.is_some()),
    ];
    for (name, present) in required {
        if !present {
            result.error(format!("Missing required parameter: {}", name));
        }
    }
    if params.model == ModelKind::Seir && params.sigma.is_none() {
        result.error("Missing required parameter: sigma (required for SEIR)");
    }

    // Core ranges
    if let Some(init_prev) = params.init_prev {
        if !is_fraction(init_prev) {
            result.error("init_prev must be between 0 and 1");
        }
    }
    if let Some(beta) = params.beta {
        if !is_non_negative(beta) {
            result.error("beta must be non-negative");
        }
    }
    if let Some(gamma) = params.gamma {
        if !is_positive(gamma) {
            result.error("gamma must be positive");
        }
    }
    if let Some(mu) = params.mu {
        if !is_non_negative(mu) {
            result.error("mu must be non-negative");
        }
    }
    if let Some(size) = params.size {
        if size <= 0 {
            result.error("size must be positive");
        }
    }
    if let Some(duration_days) = params.duration_days {
        if duration_days <= 0 {
            result.error("duration_days must be positive");
        } else if duration_days > MAX_DURATION_DAYS {
            result.error(format!("duration_days must not exceed {}", MAX_DURATION_DAYS));
        }
    }
    if let Some(sigma) = params.sigma {
        if !is_positive(sigma) {
            result.error("sigma must be positive");
        }
    }
    if let Some(incubation_period) = params.incubation_period {
        if !is_positive(incubation_period) {
            result.error("incubation_period must be positive");
        }
    }

    // Seasonality
    if !(params.seasonal_factor.is_finite() && params.seasonal_factor >= 1.0) {
        result.error("seasonal_factor must be at least 1");
    }
    for week in &params.peak_weeks {
        if !(1..=52).contains(week) {
            result.error(format!("peak_weeks entry {} must be between 1 and 52", week));
        }
    }

    // Vaccination
    let fractions = [
        ("vaccination_coverage", params.vaccination_coverage),
        ("booster_coverage", params.booster_coverage),
        ("vax_transmission_eff", params.vax_transmission_eff),
        ("vax_severity_eff", params.vax_severity_eff),
        ("residual_transmission_floor", params.residual_transmission_floor),
    ];
    for (name, value) in fractions {
        if !is_fraction(value) {
            result.error(format!("{} must be between 0 and 1", name));
        }
    }
    if params.booster_coverage > params.vaccination_coverage {
        result.error("booster_coverage must not exceed vaccination_coverage");
    }
    if params.waning_days <= 0 {
        result.error("waning_days must be positive");
    }
    if let Some(init_prev) = params.init_prev {
        if init_prev + params.vaccination_coverage > 1.0 {
            result.error("init_prev + vaccination_coverage must not exceed 1");
        }
    }
    if params.residual_transmission_floor > params.vax_transmission_eff {
        result.warning(format!(
            "residual_transmission_floor ({:.2}) exceeds vax_transmission_eff ({:.2}), protection will grow while waning",
            params.residual_transmission_floor, params.vax_transmission_eff
        ));
    }

    // Contact network and run controls
    if !is_positive(params.network_n_contacts) {
        result.error("network_n_contacts must be positive");
    }
    if let Some(lam) = params.network_poisson_lam {
        if !is_non_negative(lam) {
            result.error("network_poisson_lam must be non-negative");
        }
    }
    if params.n_reps < 1 {
        result.error("n_reps must be at least 1");
    } else if params.n_reps > MAX_REPLICATIONS {
        result.error(format!("n_reps must not exceed {}", MAX_REPLICATIONS));
    }

    // Derived checks
    if let (Some(beta), Some(gamma)) = (params.beta, params.gamma) {
        if is_non_negative(beta) && is_positive(gamma) {
            let r0 = beta / gamma;
            if r0 < R0_LOW_WARNING {
                result.warning(format!("R0 = {:.2} is very low, disease may not spread", r0));
            } else if r0 > R0_HIGH_WARNING {
                result.warning(format!(
                    "R0 = {:.2} is very high, may cause unrealistic epidemics",
                    r0
                ));
            }
        }
    }
    if let (Some(sigma), Some(incubation_period)) = (params.sigma, params.incubation_period) {
        if is_positive(incubation_period) {
            let expected_sigma = 1.0 / incubation_period;
            if (sigma - expected_sigma).abs() > SIGMA_TOLERANCE {
                result.suggestion(format!(
                    "sigma ({:.3}) doesn't match incubation_period ({} days). Expected sigma ≈ {:.3}",
                    sigma, incubation_period, expected_sigma
                ));
            }
        }
    }

    result.valid = result.errors.is_empty();
    result
}
