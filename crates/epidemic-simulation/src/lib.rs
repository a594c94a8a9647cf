//! Epidemic Scenario Simulation
//!
//! This crate runs compartmental (SIR/SEIR) epidemic scenarios with seasonal forcing, waning
//! vaccine protection and stochastic contact heterogeneity, and reduces them to a mean
//! trajectory plus headline statistics.
//!
//! ## Core Components
//!
//! - **Validation**: structured findings (errors, warnings, suggestions) for a scenario
//! - **Models**: seasonal forcing, immunity and contact sampling sub-models
//! - **Integrator**: forward-Euler daily update with clamp-and-reconcile conservation
//! - **Invariants**: conservation, non-negativity and monotone removals checked every step
//! - **ReplicationRunner**: seeded replications, sequential or on the tokio blocking pool
//! - **Summary**: peaks, attack rate, case-fatality rate and R0
//! - **Presets / Analysis**: COVID, Flu and RSV presets, parameter sweeps and model comparison
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use epidemic_simulation::{simulate, ModelKind, ScenarioParameters};
//!
//! let params = ScenarioParameters {
//!     model: ModelKind::Sir,
//!     init_prev: Some(0.01),
//!     beta: Some(0.3),
//!     gamma: Some(0.1),
//!     mu: Some(0.001),
//!     size: Some(10_000),
//!     duration_days: Some(100),
//!     n_reps: 1,
//!     ..Default::default()
//! };
//! let result = simulate(&params).unwrap();
//! println!("attack rate {:.2}", result.summary.attack_rate);
//! ```

use std::sync::Arc;

pub mod analysis;
pub mod config;
pub mod error;
pub mod integrator;
pub mod invariant;
pub mod models;
pub mod params;
pub mod presets;
pub mod randomness;
pub mod runner;
pub mod state;
pub mod summary;
pub mod validation;

// Core exports
pub use analysis::{compare_models, sensitivity, ModelComparison, SensitivityReport, SweepParameter};
pub use config::{load_scenario, EngineConfig};
pub use error::{SimResult, SimulationError};
pub use integrator::{step, Integrator};
pub use invariant::{InvariantChecker, InvariantObserver, InvariantResult, InvariantType};
pub use models::{effective_contacts, forcing, protected_fraction};
pub use params::{parameter_descriptions, ModelKind, ResolvedParameters, ScenarioParameters};
pub use presets::{preset, Disease};
pub use randomness::SeededRng;
pub use runner::{CancellationFlag, ReplicationRunner, SimulationResult};
pub use state::SimulationState;
pub use summary::{summarize, Summary};
pub use validation::{validate, ValidationResult};

/// Validate and run a scenario with the default engine configuration.
///
/// Invalid parameters come back as [`SimulationError::Validation`] before any integration work.
pub fn simulate(params: &ScenarioParameters) -> SimResult<SimulationResult> {
    simulate_with(params, &EngineConfig::default(), &CancellationFlag::new())
}

/// Validate and run a scenario on the calling thread.
pub fn simulate_with(
    params: &ScenarioParameters,
    config: &EngineConfig,
    cancel: &CancellationFlag,
) -> SimResult<SimulationResult> {
    let resolved = ResolvedParameters::resolve(params)?;
    ReplicationRunner::new(config.clone()).run(&resolved, cancel)
}

/// Validate and run a scenario with replications spread over the tokio blocking pool.
pub async fn simulate_concurrent(
    params: &ScenarioParameters,
    config: &EngineConfig,
    cancel: CancellationFlag,
) -> SimResult<SimulationResult> {
    let resolved = Arc::new(ResolvedParameters::resolve(params)?);
    ReplicationRunner::new(config.clone())
        .run_concurrent(resolved, cancel)
        .await
}
