//! Disease presets
//!
//! Ready-made SEIR scenarios for the respiratory diseases the engine is usually pointed at. All
//! presets model a population of 10 000 over one year; callers override fields as needed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::params::{ModelKind, ScenarioParameters};

const PRESET_POPULATION: i64 = 10_000;
const PRESET_DURATION_DAYS: i64 = 365;

/// Diseases with a built-in preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disease {
    #[serde(rename = "COVID")]
    Covid,
    Flu,
    #[serde(rename = "RSV")]
    Rsv,
}

impl Disease {
    pub const ALL: [Disease; 3] = [Disease::Covid, Disease::Flu, Disease::Rsv];
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Covid => write!(f, "COVID"),
            Self::Flu => write!(f, "Flu"),
            Self::Rsv => write!(f, "RSV"),
        }
    }
}

impl FromStr for Disease {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "covid" | "covid-19" | "covid19" => Ok(Self::Covid),
            "flu" | "influenza" => Ok(Self::Flu),
            "rsv" => Ok(Self::Rsv),
            _ => Err(SimulationError::Configuration(format!(
                "unknown disease preset '{}', expected one of COVID, Flu, RSV",
                s
            ))),
        }
    }
}

/// Northern-hemisphere winter season: weeks 1-12 and `late_start`-52.
fn winter_weeks(late_start: u32) -> Vec<u32> {
    (1..=12).chain(late_start..=52).collect()
}

/// Complete scenario parameters for `disease`.
pub fn preset(disease: Disease) -> ScenarioParameters {
    let base = ScenarioParameters {
        disease_name: disease.to_string(),
        model: ModelKind::Seir,
        size: Some(PRESET_POPULATION),
        duration_days: Some(PRESET_DURATION_DAYS),
        ..ScenarioParameters::default()
    };

    match disease {
        Disease::Covid => ScenarioParameters {
            init_prev: Some(0.005),
            beta: Some(0.315),
            sigma: Some(0.2),
            gamma: Some(0.1),
            mu: Some(0.00126),
            incubation_period: Some(5.0),
            seasonal_factor: 1.03,
            peak_weeks: winter_weeks(49),
            vaccination_coverage: 0.633,
            booster_coverage: 0.14,
            vax_transmission_eff: 0.50,
            vax_severity_eff: 0.85,
            waning_days: 180,
            residual_transmission_floor: 0.12,
            ..base
        },
        Disease::Flu => ScenarioParameters {
            init_prev: Some(0.002),
            beta: Some(0.3446),
            sigma: Some(0.5),
            gamma: Some(0.1429),
            mu: Some(0.000598),
            incubation_period: Some(2.0),
            seasonal_factor: 1.56,
            peak_weeks: winter_weeks(49),
            vaccination_coverage: 0.265,
            vax_transmission_eff: 0.40,
            vax_severity_eff: 0.60,
            waning_days: 365,
            residual_transmission_floor: 0.0,
            ..base
        },
        Disease::Rsv => ScenarioParameters {
            init_prev: Some(0.0005),
            beta: Some(0.165),
            sigma: Some(0.25),
            gamma: Some(0.125),
            mu: Some(0.00011),
            incubation_period: Some(4.0),
            seasonal_factor: 1.91,
            peak_weeks: winter_weeks(45),
            vaccination_coverage: 0.15,
            vax_transmission_eff: 0.40,
            vax_severity_eff: 0.75,
            waning_days: 180,
            ..base
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn test_every_preset_is_valid() {
        for disease in Disease::ALL {
            let report = validate(&preset(disease));
            assert!(report.valid, "{} preset invalid: {:?}", disease, report.errors);
            assert!(report.suggestions.is_empty(), "{}: {:?}", disease, report.suggestions);
        }
    }

    #[test]
    fn test_parse_disease_names() {
        assert_eq!("COVID".parse::<Disease>().unwrap(), Disease::Covid);
        assert_eq!("flu".parse::<Disease>().unwrap(), Disease::Flu);
        assert_eq!("Rsv".parse::<Disease>().unwrap(), Disease::Rsv);
        assert!("measles".parse::<Disease>().is_err());
    }

    #[test]
    fn test_peak_weeks() {
        let covid = preset(Disease::Covid);
        assert_eq!(covid.peak_weeks.len(), 16);
        assert_eq!(covid.peak_weeks.first(), Some(&1));
        assert_eq!(covid.peak_weeks.last(), Some(&52));
        assert_eq!(preset(Disease::Rsv).peak_weeks.len(), 20);
    }

    #[test]
    fn test_preset_defaults() {
        let rsv = preset(Disease::Rsv);
        assert_eq!(rsv.disease_name, "RSV");
        assert_eq!(rsv.size, Some(10_000));
        assert_eq!(rsv.duration_days, Some(365));
        assert_eq!(rsv.booster_coverage, 0.0);
        assert_eq!(rsv.r0(), Some(0.165 / 0.125));
    }
}
