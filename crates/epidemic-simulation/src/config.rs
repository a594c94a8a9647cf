//! Configuration for Simulation
//!
//! Defines the engine configuration and scenario file loading.

//-----------------------------------------------------------------------------
// Imports
//-----------------------------------------------------------------------------

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};
use crate::params::ScenarioParameters;

//-----------------------------------------------------------------------------
// Configuration Structures
//-----------------------------------------------------------------------------

/// Settings that change how a scenario is executed, never what it computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Check conservation, non-negativity and monotone removals after every step.
    pub check_invariants: bool,
    /// Allowed conservation drift, relative to the population size.
    pub conservation_tolerance: f64,
    /// Run replications on the blocking thread pool.
    pub parallel: bool,
    /// Replications in flight at once when running in parallel; unbounded when unset.
    pub max_parallelism: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_invariants: true,
            conservation_tolerance: 1e-6,
            parallel: false,
            max_parallelism: None,
        }
    }
}

impl EngineConfig {
    /// Read a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        if config.max_parallelism == Some(0) {
            return Err(SimulationError::Configuration(
                "max_parallelism must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

//-----------------------------------------------------------------------------
// Scenario Files
//-----------------------------------------------------------------------------

/// Supported scenario file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Toml,
    Json,
    Yaml,
}

impl ScenarioFormat {
    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> SimResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(SimulationError::Configuration(format!(
                "unsupported scenario file '{}': expected .toml, .json, .yaml or .yml",
                path.display()
            ))),
        }
    }

    pub fn parse(self, content: &str) -> SimResult<ScenarioParameters> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
        })
    }
}

/// Load scenario parameters from a `.toml`, `.json` or `.yaml` file.
pub fn load_scenario(path: impl AsRef<Path>) -> SimResult<ScenarioParameters> {
    let path = path.as_ref();
    let format = ScenarioFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    format.parse(&content)
}
