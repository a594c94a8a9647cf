// Purpose: Merges replication trajectories into the reported mean trajectory.

use crate::state::SimulationState;

/// Per-day, per-compartment mean across replications.
///
/// Replications are summed in the order given, so callers must pass them ordered by index for
/// the result to be independent of how they were executed. The output is as long as the
/// shortest input.
pub fn mean_trajectory(replications: &[Vec<SimulationState>]) -> Vec<SimulationState> {
    if replications.is_empty() {
        return Vec::new();
    }
    let days = replications.iter().map(Vec::len).min().unwrap_or(0);
    let n = replications.len() as f64;

    (0..days)
        .map(|day| {
            let mut sum = SimulationState {
                day,
                ..SimulationState::default()
            };
            for trajectory in replications {
                let state = &trajectory[day];
                sum.susceptible += state.susceptible;
                sum.exposed += state.exposed;
                sum.infected += state.infected;
                sum.recovered += state.recovered;
                sum.dead += state.dead;
            }
            SimulationState {
                day,
                susceptible: sum.susceptible / n,
                exposed: sum.exposed / n,
                infected: sum.infected / n,
                recovered: sum.recovered / n,
                dead: sum.dead / n,
            }
        })
        .collect()
}
