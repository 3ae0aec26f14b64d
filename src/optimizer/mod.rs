//! Parallel simulated-annealing optimizer.
//!
//! Each worker runs an independent annealing loop over its own clone of the
//! input layout; workers never communicate with each other, and the
//! coordinator's arg-max over their final results is the only point where
//! their work is compared.

pub mod mutation;
pub mod runner;

use crate::corpus::NormTables;
use crate::error::{EngineError, EngineResult};
use crate::layout::{Layout, PinMask};
use crate::scoring::score_layout;
use crate::stats::Registry;

/// Default annealing schedule parameters.
#[derive(Debug, Clone, Copy)]
pub struct AnnealParams {
    pub initial_temperature: f32,
    pub max_temperature_ceiling: f32,
    pub temperature_floor: f32,
    pub initial_swap_count: usize,
    /// Divides the per-worker iteration budget for the adaptive-cooling
    /// checkpoint (R/20).
    pub cooling_window_frac: usize,
    /// Divides the per-worker iteration budget for reheating (R/10).
    pub reheat_cadence_frac: usize,
    /// Divides the per-worker iteration budget for jolting (R/50).
    pub jolt_cadence_frac: usize,
    pub cooling_rate_threshold: f32,
}

impl Default for AnnealParams {
    fn default() -> Self {
        AnnealParams {
            initial_temperature: 1000.0,
            max_temperature_ceiling: 1500.0,
            temperature_floor: 1.0,
            initial_swap_count: crate::grid::P / 2,
            cooling_window_frac: 20,
            reheat_cadence_frac: 10,
            jolt_cadence_frac: 50,
            cooling_rate_threshold: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    pub worker_id: usize,
    pub best: Layout,
    pub best_score: f32,
}

#[inline]
fn logistic(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Runs one worker's full annealing loop for `iterations` steps starting
/// from `input`.
///
/// `best` tracks the highest-scoring layout this worker has ever produced
/// and is therefore strictly non-decreasing across iterations: it is only
/// ever overwritten when the freshly mutated `working` layout scores
/// strictly higher than it. The probabilistic acceptance branch (`Δ <= 0`,
/// accepted with probability `σ(10Δ/T)`) lets `working` keep wandering
/// through a worse state to escape local optima, without ever regressing
/// `best` (see DESIGN.md for the reasoning behind this split).
#[allow(clippy::too_many_arguments)]
pub fn run_worker(
    worker_id: usize,
    input: &Layout,
    pins: &PinMask,
    tables: &NormTables,
    registry: &Registry,
    iterations: usize,
    params: AnnealParams,
    seed: u64,
    mut on_progress: impl FnMut(usize, usize, f32),
) -> EngineResult<WorkerOutcome> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut working = input.clone();
    let mut best = input.clone();
    let mut best_score = score_layout(&best, tables, registry).aggregate;

    let mut t = params.initial_temperature;
    let mut max_t = params.initial_temperature;
    let mut improvement_counter: usize = 0;

    let window20 = (iterations / params.cooling_window_frac).max(1);
    let window10 = (iterations / params.reheat_cadence_frac).max(1);
    let window50 = (iterations / params.jolt_cadence_frac).max(1);

    for i in 0..iterations {
        let swap_count = ((params.initial_swap_count as f32) * (t / max_t))
            .round()
            .clamp(1.0, params.initial_swap_count as f32) as usize;

        let moves = mutation::apply_random_swaps(&mut working, pins, swap_count, &mut rng);
        let working_score = score_layout(&working, tables, registry).aggregate;
        let delta = working_score - best_score;

        if delta > 0.0 {
            best = working.clone();
            best_score = working_score;
            improvement_counter += 1;
        } else {
            let accept_probability = logistic(10.0 * delta / t);
            if rng.f32() >= accept_probability {
                mutation::undo_swaps(&mut working, &moves);
            } else {
                // Probabilistic accept: `working` keeps the mutated state
                // and counts as an accepted move for the cooling rate,
                // but `best`/`best_score` are untouched.
                improvement_counter += 1;
            }
        }

        let step = i + 1;
        if step % window20 == 0 {
            let rate = improvement_counter as f32 / window20 as f32;
            max_t *= if rate > params.cooling_rate_threshold {
                0.95
            } else {
                1.05
            };
            max_t = max_t.clamp(t, params.max_temperature_ceiling);
            improvement_counter = 0;
        }
        if step % window10 == 0 {
            t = max_t;
        }
        if step % window50 == 0 {
            t = (t * (1.0 + rng.f32() * 0.3)).min(max_t);
        }
        // End-of-step linear cool, always applied regardless of whether a
        // reheat or jolt fired this same step.
        t = (max_t * (1.0 - step as f32 / iterations as f32)).max(params.temperature_floor);

        if worker_id == 0 {
            on_progress(step, iterations, best_score);
        }
    }

    verify_pins_preserved(input, &best, pins)?;
    verify_pins_preserved(input, &working, pins)?;

    Ok(WorkerOutcome {
        worker_id,
        best,
        best_score,
    })
}

/// Hard check backing the `OptimizerInvariantViolated` error: a pinned
/// position's occupant must never change. Move generation already
/// excludes pinned positions by construction, so this should never trip
/// outside a bug.
fn verify_pins_preserved(input: &Layout, output: &Layout, pins: &PinMask) -> EngineResult<()> {
    for (i, (&before, &after)) in input.matrix.iter().zip(&output.matrix).enumerate() {
        if pins.is_pinned_index(i) && before != after {
            return Err(EngineError::OptimizerInvariantViolated(format!(
                "pinned position {i} changed from {before} to {after}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::AlphabetMap;
    use crate::corpus::collector::Collector;
    use crate::corpus::normalize::normalize;
    use crate::grid::{COLS, ROWS};
    use crate::layout::UNUSED;

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
    fn all_pinned_is_a_no_op() {
        let (layout, tables, registry) = fixture();
        let mut pins = PinMask::none();
        for i in 0..ROWS * COLS {
            pins.set_pinned_index(i, true);
        }
        let outcome = run_worker(0, &layout, &pins, &tables, &registry, 40, AnnealParams::default(), 1, |_, _, _| {}).unwrap();
        assert_eq!(outcome.best.matrix, layout.matrix);
        assert_eq!(outcome.best_score, score_layout(&layout, &tables, &registry).aggregate);
    }

    #[test]
    fn pins_are_never_mutated() {
        let (layout, tables, registry) = fixture();
        let mut pins = PinMask::none();
        pins.set_pinned_index(0, true);
        let before = layout.matrix[0];
        let outcome = run_worker(0, &layout, &pins, &tables, &registry, 200, AnnealParams::default(), 42, |_, _, _| {}).unwrap();
        assert_eq!(outcome.best.matrix[0], before);
    }

    #[test]
    fn best_score_is_monotone_non_decreasing() {
        let (layout, tables, registry) = fixture();
        let pins = PinMask::none();
        let mut last = f32::MIN;
        let outcome = run_worker(
            0,
            &layout,
            &pins,
            &tables,
            &registry,
            300,
            AnnealParams::default(),
            9,
            |_, _, best_score| {
                assert!(best_score >= last);
                last = best_score;
            },
        )
        .unwrap();
        assert!(outcome.best_score >= score_layout(&layout, &tables, &registry).aggregate);
    }

    #[test]
    fn deterministic_given_same_seed() {
        let (layout, tables, registry) = fixture();
        let pins = PinMask::none();
        let a = run_worker(0, &layout, &pins, &tables, &registry, 100, AnnealParams::default(), 55, |_, _, _| {}).unwrap();
        let b = run_worker(0, &layout, &pins, &tables, &registry, 100, AnnealParams::default(), 55, |_, _, _| {}).unwrap();
        assert_eq!(a.best.matrix, b.best.matrix);
        assert_eq!(a.best_score.to_bits(), b.best_score.to_bits());
    }
}
