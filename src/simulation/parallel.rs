//! Parallel simulation execution
//!
//! Uses Rayon to run matches concurrently. Each match gets its own Bevy app
//! with a single task-pool thread.

use bevy::log::warn;
use rayon::prelude::*;

use crate::tuning::FightTuning;

use super::config::SimConfig;
use super::metrics::MatchResult;
use super::runner::run_match;

/// Size the global Rayon pool. Only the first call takes effect.
pub fn init_parallel(threads: usize) {
    if threads == 0 {
        return;
    }
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        warn!("Rayon pool already configured: {}", e);
    }
}

/// Run one match per seed in parallel; results keep the order of `seeds`
pub fn run_matches_parallel(config: &SimConfig, tuning: FightTuning, seeds: &[u64]) -> Result<Vec<MatchResult>, String> {
    seeds
        .par_iter()
        .map(|&seed| run_match(config, tuning, seed, true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_matches_sequential() {
        let config = SimConfig {
            frame_ms: 20,
            max_match_seconds: 3.0,
            tick_sample_ms: 0,
            ..Default::default()
        };
        let tuning = FightTuning {
            ready_ms: 100,
            countdown_start: 1,
            countdown_step_ms: 100,
            ..Default::default()
        };
        let seeds = [1, 2, 3];
        let parallel = run_matches_parallel(&config, tuning, &seeds).unwrap();
        assert_eq!(parallel.len(), 3);
        for (result, &seed) in parallel.iter().zip(&seeds) {
            let alone = run_match(&config, tuning, seed, true).unwrap();
            assert_eq!(result.seed, seed);
            assert_eq!(result.left, alone.left);
            assert_eq!(result.right, alone.right);
        }
    }
}
