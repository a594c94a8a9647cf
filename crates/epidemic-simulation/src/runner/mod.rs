// Purpose: Runs the replications of a scenario, sequentially or on the blocking thread pool, and
// aggregates them into a simulation result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::task::{self, JoinHandle};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{SimResult, SimulationError};
use crate::params::{ModelKind, ResolvedParameters};
use crate::randomness::SeededRng;
use crate::state::SimulationState;
use crate::summary::{summarize, Summary};

pub mod aggregate;
pub mod replication;

pub use aggregate::mean_trajectory;
pub use replication::run_replication;

//-----------------------------------------------------------------------------
// Cancellation
//-----------------------------------------------------------------------------

/// Cooperative cancellation shared between a caller and a running batch of replications.
///
/// Checked before each replication starts; a replication in progress always completes.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

//-----------------------------------------------------------------------------
// Result
//-----------------------------------------------------------------------------

/// Output of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub disease_name: String,
    pub model: ModelKind,
    /// Mean trajectory across replications, one entry per simulated day.
    pub time_series: Vec<SimulationState>,
    pub summary: Summary,
    pub replications: usize,
    /// Seed of each replication, in replication order.
    pub replication_seeds: Vec<u64>,
}

//-----------------------------------------------------------------------------
// Runner
//-----------------------------------------------------------------------------

/// Executes the `n_reps` replications of a resolved scenario.
#[derive(Debug, Clone, Default)]
pub struct ReplicationRunner {
    config: EngineConfig,
}

impl ReplicationRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Seeds for every replication: `random_seed + index`, or fresh entropy per replication.
    pub fn replication_seeds(params: &ResolvedParameters) -> Vec<u64> {
        (0..params.n_reps)
            .map(|index| SeededRng::for_replication(params.random_seed, index).get_seed())
            .collect()
    }

    /// Run every replication on the calling thread.
    pub fn run(&self, params: &ResolvedParameters, cancel: &CancellationFlag) -> SimResult<SimulationResult> {
        let seeds = Self::replication_seeds(params);
        info!(
            disease = %params.disease_name,
            model = %params.model,
            replications = seeds.len(),
            days = params.duration_days,
            "starting simulation"
        );

        let mut trajectories = Vec::with_capacity(seeds.len());
        for (index, seed) in seeds.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(cancelled(index, seeds.len()));
            }
            trajectories.push(run_replication(params, &self.config, index, *seed)?);
        }

        Ok(self.finish(params, &trajectories, seeds))
    }

    /// Run replications concurrently on the tokio blocking pool, at most `max_parallelism` at a time.
    ///
    /// Produces the same result as [`ReplicationRunner::run`] for the same seeds.
    pub async fn run_concurrent(
        &self,
        params: Arc<ResolvedParameters>,
        cancel: CancellationFlag,
    ) -> SimResult<SimulationResult> {
        let seeds = Self::replication_seeds(&params);
        let requested = seeds.len();
        let chunk_size = self.config.max_parallelism.unwrap_or(requested).max(1);
        info!(
            disease = %params.disease_name,
            model = %params.model,
            replications = requested,
            days = params.duration_days,
            chunk_size,
            "starting concurrent simulation"
        );

        let mut trajectories = Vec::with_capacity(requested);
        let indexed: Vec<(usize, u64)> = seeds.iter().copied().enumerate().collect();
        for chunk in indexed.chunks(chunk_size) {
            let mut handles = Vec::with_capacity(chunk.len());
            for &(index, seed) in chunk {
                if cancel.is_cancelled() {
                    // replications already spawned in this chunk still count as completed
                    join_chunk(handles, &mut trajectories).await?;
                    return Err(cancelled(trajectories.len(), requested));
                }
                let params = Arc::clone(&params);
                let config = self.config.clone();
                handles.push(task::spawn_blocking(move || {
                    run_replication(&params, &config, index, seed)
                }));
            }

            debug!(chunk = chunk.len(), "waiting for replication chunk");
            join_chunk(handles, &mut trajectories).await?;
        }

        Ok(self.finish(&params, &trajectories, seeds))
    }

    fn finish(
        &self,
        params: &ResolvedParameters,
        trajectories: &[Vec<SimulationState>],
        seeds: Vec<u64>,
    ) -> SimulationResult {
        let time_series = mean_trajectory(trajectories);
        let summary = summarize(&time_series, params);
        info!(
            disease = %params.disease_name,
            peak_infected = summary.peak_infected,
            peak_day = summary.peak_infected_day,
            attack_rate = summary.attack_rate,
            "simulation finished"
        );

        SimulationResult {
            disease_name: params.disease_name.clone(),
            model: params.model,
            time_series,
            summary,
            replications: trajectories.len(),
            replication_seeds: seeds,
        }
    }
}

/// Wait for a chunk of replication tasks and append their trajectories in spawn order.
async fn join_chunk(
    handles: Vec<JoinHandle<SimResult<Vec<SimulationState>>>>,
    trajectories: &mut Vec<Vec<SimulationState>>,
) -> SimResult<()> {
    for joined in join_all(handles).await {
        let trajectory =
            joined.map_err(|e| SimulationError::Runtime(format!("replication task failed: {}", e)))??;
        trajectories.push(trajectory);
    }
    Ok(())
}

fn cancelled(completed: usize, requested: usize) -> SimulationError {
    info!(completed, requested, "simulation cancelled");
    SimulationError::Cancelled { completed, requested }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactNetwork, Seasonality, Vaccination};

    fn params(n_reps: usize) -> ResolvedParameters {
        ResolvedParameters {
            disease_name: "test".to_string(),
            model: ModelKind::Sir,
            init_prev: 0.01,
            beta: 0.3,
            gamma: 0.1,
            mu: 0.001,
            sigma: 0.0,
            size: 10_000,
            duration_days: 120,
            seasonality: Seasonality::flat(),
            vaccination: Vaccination::none(),
            network: ContactNetwork {
                n_contacts: 10.0,
                poisson_lam: Some(10.0),
            },
            n_reps,
            random_seed: Some(42),
        }
    }

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_sequential_run_records_seeds() {
        let result = ReplicationRunner::default()
            .run(&params(3), &CancellationFlag::new())
            .unwrap();
        assert_eq!(result.replications, 3);
        assert_eq!(result.replication_seeds, vec![42, 43, 44]);
        assert_eq!(result.time_series.len(), 120);
        assert_eq!(result.model, ModelKind::Sir);
    }

    #[tokio::test]
    async fn test_join_chunk_counts_spawned_replications() {
        let p = Arc::new(params(2));
        let handles = (0..2)
            .map(|index| {
                let p = Arc::clone(&p);
                task::spawn_blocking(move || run_replication(&p, &EngineConfig::default(), index, 42 + index as u64))
            })
            .collect();
        let mut trajectories = Vec::new();
        join_chunk(handles, &mut trajectories).await.unwrap();
        assert_eq!(trajectories.len(), 2);
        assert!(matches!(
            cancelled(trajectories.len(), 4),
            SimulationError::Cancelled {
                completed: 2,
                requested: 4
            }
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = CancellationFlag::new();
        flag.cancel();
        let err = ReplicationRunner::default().run(&params(2), &flag).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Cancelled {
                completed: 0,
                requested: 2
            }
        ));
    }

    #[test]
    fn test_mean_matches_individual_replications() {
        let p = params(2);
        let config = EngineConfig::default();
        let a = run_replication(&p, &config, 0, 42).unwrap();
        let b = run_replication(&p, &config, 1, 43).unwrap();
        let result = ReplicationRunner::new(config).run(&p, &CancellationFlag::new()).unwrap();
        assert_eq!(result.time_series, mean_trajectory(&[a, b]));
    }
}
