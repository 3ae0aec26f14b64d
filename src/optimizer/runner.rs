//! Parallel coordinator: fans the annealing loop out across a fixed worker
//! pool, then picks the single best result.

use crate::corpus::NormTables;
use crate::error::EngineResult;
use crate::layout::{Layout, PinMask};
use crate::stats::Registry;
use rayon::prelude::*;

use super::{run_worker, AnnealParams, WorkerOutcome};

/// Splits `total_iterations` evenly across `worker_count` workers (the
/// remainder, if any, is simply not run -- each worker gets the floor
/// share) and runs them independently via rayon, then returns the
/// highest-scoring outcome. Ties are broken toward the lower worker id.
pub fn run(
    input: &Layout,
    pins: &PinMask,
    tables: &NormTables,
    registry: &Registry,
    total_iterations: usize,
    worker_count: usize,
    params: AnnealParams,
    base_seed: u64,
    mut on_progress: impl FnMut(usize, usize, f32) + Send,
) -> EngineResult<WorkerOutcome> {
    let per_worker = total_iterations / worker_count.max(1);

    let outcomes: Vec<EngineResult<WorkerOutcome>> = (0..worker_count)
        .into_par_iter()
        .map(|worker_id| {
            let seed = base_seed ^ splitmix_constant(worker_id as u64);
            run_worker(
                worker_id,
                input,
                pins,
                tables,
                registry,
                per_worker,
                params,
                seed,
                |_, _, _| {},
            )
        })
        .collect();

    let mut best: Option<WorkerOutcome> = None;
    for outcome in outcomes {
        let outcome = outcome?;
        on_progress(outcome.worker_id, worker_count, outcome.best_score);
        best = match best {
            None => Some(outcome),
            Some(current) if outcome.best_score > current.best_score => Some(outcome),
            Some(current) => Some(current),
        };
    }

    best.ok_or_else(|| {
        crate::error::EngineError::OptimizerInvariantViolated("no workers ran".to_string())
    })
}

/// A distinct odd multiplier per worker id so adjacent ids don't produce
/// correlated RNG streams after XOR-ing with the shared base seed.
fn splitmix_constant(worker_id: u64) -> u64 {
    let mut z = worker_id.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::AlphabetMap;
    use crate::corpus::collector::Collector;
    use crate::corpus::normalize::normalize;
    use crate::grid::{COLS, ROWS};
    use crate::layout::UNUSED;
    use crate::scoring::score_layout;

    fn fixture() -> (Layout, NormTables, Registry) {
        let alphabet = AlphabetMap::from_codepoints(&"  AaBbCc".chars().collect::<Vec<_>>()).unwrap();
        let mut collector = Collector::new(&alphabet);
        collector.feed_str("ABCABCACBABCCBA");
        let tables = normalize(&collector.into_tables());

        let mut registry = Registry::build().unwrap();
        let mut weights = std::collections::HashMap::new();
        weights.insert("Same-Finger Bigram".to_string(), vec![-50.0]);
        weights.insert("Roll".to_string(), vec![10.0]);
        registry.apply_weights(&weights);
        registry.clean();

        let mut matrix = vec![UNUSED; ROWS * COLS];
        matrix[0] = 1;
        matrix[1] = 2;
        matrix[2] = 3;
        let layout = Layout::new("fixture", matrix).unwrap();
        (layout, tables, registry)
    }

    #[test]
    fn picks_best_across_workers() {
        let (layout, tables, registry) = fixture();
        let pins = PinMask::none();
        let outcome = run(
            &layout,
            &pins,
            &tables,
            &registry,
            400,
            4,
            AnnealParams::default(),
            123,
            |_, _, _| {},
        )
        .unwrap();
        let baseline = score_layout(&layout, &tables, &registry).aggregate;
        assert!(outcome.best_score >= baseline);
    }

    #[test]
    fn worker_seeds_are_distinct() {
        let seeds: Vec<u64> = (0..8).map(splitmix_constant).collect();
        let mut sorted = seeds.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), seeds.len());
    }

    #[test]
    fn single_worker_matches_direct_call() {
        let (layout, tables, registry) = fixture();
        let pins = PinMask::none();
        let via_runner = run(
            &layout,
            &pins,
            &tables,
            &registry,
            100,
            1,
            AnnealParams::default(),
            7,
            |_, _, _| {},
        )
        .unwrap();
        let direct = super::super::run_worker(
            0,
            &layout,
            &pins,
            &tables,
            &registry,
            100,
            AnnealParams::default(),
            7 ^ splitmix_constant(0),
            |_, _, _| {},
        )
        .unwrap();
        assert_eq!(via_runner.best.matrix, direct.best.matrix);
        assert_eq!(via_runner.best_score.to_bits(), direct.best_score.to_bits());
    }
}
