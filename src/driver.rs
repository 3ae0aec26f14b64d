//! Driver modes: analyze, compare, rank, generate, improve, benchmark.
//!
//! Each function takes the already-built ambient context (alphabet,
//! normalized tables, statistic registry) plus whatever the mode itself
//! needs, and returns a plain result struct; `main` hands the result to
//! `reporting` for display. Keeping file IO here (rather than behind the
//! scoring/optimizer engine) matches the source's separation between
//! `mode.c` (drivers) and `stats.c`/`analyze.c` (engine).

use crate::alphabet::AlphabetMap;
use crate::config::Context;
use crate::corpus::NormTables;
use crate::error::{EngineError, EngineResult};
use crate::layout::{Layout, PinMask};
use crate::optimizer::{self, AnnealParams, WorkerOutcome};
use crate::scoring::{diff_reports, score_layout, ScoreReport};
use crate::stats::Registry;
use std::path::Path;

pub struct AnalyzeOutcome {
    pub layout: Layout,
    pub report: ScoreReport,
}

/// Analyze: load one layout, score it.
pub fn analyze(ctx: &Context, alphabet: &AlphabetMap, tables: &NormTables, registry: &Registry) -> EngineResult<AnalyzeOutcome> {
    let name = ctx
        .layout
        .as_deref()
        .ok_or_else(|| EngineError::ConfigurationMissing("layout (-1/--layout)".into()))?;
    let layout = load_layout(&ctx.layout_file_path(name), name, alphabet)?;
    let report = score_layout(&layout, tables, registry);
    Ok(AnalyzeOutcome { layout, report })
}

pub struct CompareOutcome {
    pub a: Layout,
    pub b: Layout,
    pub diff: Layout,
    pub report_a: ScoreReport,
    pub report_b: ScoreReport,
    pub diff_report: ScoreReport,
}

/// Compare: load two layouts, score both, and produce the diff layout and
/// diff score report (§4.9, §8 E2/diff-symmetry).
pub fn compare(ctx: &Context, alphabet: &AlphabetMap, tables: &NormTables, registry: &Registry) -> EngineResult<CompareOutcome> {
    let name_a = ctx
        .layout
        .as_deref()
        .ok_or_else(|| EngineError::ConfigurationMissing("layout (-1/--layout)".into()))?;
    let name_b = ctx
        .layout2
        .as_deref()
        .ok_or_else(|| EngineError::ConfigurationMissing("layout2 (-2/--layout2)".into()))?;

    let a = load_layout(&ctx.layout_file_path(name_a), name_a, alphabet)?;
    let b = load_layout(&ctx.layout_file_path(name_b), name_b, alphabet)?;

    let report_a = score_layout(&a, tables, registry);
    let report_b = score_layout(&b, tables, registry);
    let diff_report = diff_reports(&report_a, &report_b);

    let diff_matrix = Layout::diff_matrix(&a, &b);
    let diff = Layout::new(format!("{} - {}", a.name, b.name), diff_matrix)?;

    Ok(CompareOutcome {
        a,
        b,
        diff,
        report_a,
        report_b,
        diff_report,
    })
}

/// Inserts `(name, score)` into a list kept sorted by strictly descending
/// score, stable at ties: a newly inserted node with a score equal to an
/// existing one is placed after it, preserving insertion order (mirrors
/// `util.c::create_node`'s `>=` traversal).
pub fn insert_ranked(list: &mut Vec<(String, f32)>, name: String, score: f32) {
    let pos = list.iter().position(|(_, s)| *s < score).unwrap_or(list.len());
    list.insert(pos, (name, score));
}

/// Rank: score every layout file in the language's layout directory and
/// return them in strictly-descending, tie-stable order.
pub fn rank(ctx: &Context, alphabet: &AlphabetMap, tables: &NormTables, registry: &Registry) -> EngineResult<Vec<(String, f32)>> {
    let dir = Path::new("data").join(&ctx.lang).join("layouts");
    let mut names = Vec::new();
    if dir.is_dir() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("glg") {
                names.push(path);
            }
        }
    }
    names.sort();
    let mut ranking = Vec::new();
    for path in names {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("layout")
            .to_string();
        let layout = load_layout(&path, &stem, alphabet)?;
        let report = score_layout(&layout, tables, registry);
        insert_ranked(&mut ranking, stem, report.aggregate);
    }
    Ok(ranking)
}

pub struct OptimizeOutcome {
    pub starting_score: f32,
    pub outcome: WorkerOutcome,
}

/// Generate: clear the pin mask, load a layout purely for its alphabet
/// membership, shuffle its matrix, and hand the shuffled layout to the
/// optimizer as a random start.
pub fn generate(
    ctx: &Context,
    alphabet: &AlphabetMap,
    tables: &NormTables,
    registry: &Registry,
    seed: u64,
) -> EngineResult<OptimizeOutcome> {
    let name = ctx
        .layout
        .as_deref()
        .ok_or_else(|| EngineError::ConfigurationMissing("layout (-1/--layout)".into()))?;
    let mut layout = load_layout(&ctx.layout_file_path(name), name, alphabet)?;
    let pins = PinMask::none();
    let mut rng = fastrand::Rng::with_seed(seed);
    layout.shuffle(&pins, &mut rng);
    run_optimizer(&layout, &pins, tables, registry, ctx, seed)
}

/// Improve: load a layout, honor the configured pin mask, and hand it to
/// the optimizer without shuffling.
pub fn improve(
    ctx: &Context,
    alphabet: &AlphabetMap,
    tables: &NormTables,
    registry: &Registry,
    seed: u64,
) -> EngineResult<OptimizeOutcome> {
    let name = ctx
        .layout
        .as_deref()
        .ok_or_else(|| EngineError::ConfigurationMissing("layout (-1/--layout)".into()))?;
    let layout = load_layout(&ctx.layout_file_path(name), name, alphabet)?;
    run_optimizer(&layout, &ctx.pins, tables, registry, ctx, seed)
}

fn run_optimizer(
    layout: &Layout,
    pins: &PinMask,
    tables: &NormTables,
    registry: &Registry,
    ctx: &Context,
    seed: u64,
) -> EngineResult<OptimizeOutcome> {
    let starting_score = score_layout(layout, tables, registry).aggregate;
    let worker_count = ctx.threads.max(1);
    let outcome = optimizer::runner::run(
        layout,
        pins,
        tables,
        registry,
        ctx.repetitions,
        worker_count,
        AnnealParams::default(),
        seed,
        |worker_id, iterations, best_score| {
            if worker_id == 0 {
                tracing::info!(iterations, best_score, "worker 0 progress");
            }
        },
    )?;
    Ok(OptimizeOutcome {
        starting_score,
        outcome,
    })
}

#[derive(Debug, Clone)]
pub struct BenchmarkEntry {
    pub workers: usize,
    pub iterations_per_second: f64,
}

/// Benchmark: fix the iteration budget and run generate at a sequence of
/// worker counts (powers of 2 up to the machine's parallelism, plus
/// core-count multiples), reporting iterations/second for each.
pub fn benchmark(
    ctx: &Context,
    alphabet: &AlphabetMap,
    tables: &NormTables,
    registry: &Registry,
    seed: u64,
) -> EngineResult<Vec<BenchmarkEntry>> {
    let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);

    let mut worker_counts = Vec::new();
    let mut p = 1usize;
    while p <= cores {
        worker_counts.push(p);
        p *= 2;
    }
    for mult in [1usize, 2, 4] {
        let n = cores * mult;
        if !worker_counts.contains(&n) {
            worker_counts.push(n);
        }
    }
    worker_counts.sort_unstable();
    worker_counts.dedup();

    let name = ctx
        .layout
        .as_deref()
        .ok_or_else(|| EngineError::ConfigurationMissing("layout (-1/--layout)".into()))?;
    let layout = load_layout(&ctx.layout_file_path(name), name, alphabet)?;
    let pins = PinMask::none();

    let mut results = Vec::with_capacity(worker_counts.len());
    for workers in worker_counts {
        let mut shuffled = layout.clone();
        let mut rng = fastrand::Rng::with_seed(seed ^ workers as u64);
        shuffled.shuffle(&pins, &mut rng);

        let start = std::time::Instant::now();
        optimizer::runner::run(
            &shuffled,
            &pins,
            tables,
            registry,
            ctx.repetitions,
            workers,
            AnnealParams::default(),
            seed,
            |_, _, _| {},
        )?;
        let elapsed = start.elapsed().as_secs_f64().max(1e-9);
        results.push(BenchmarkEntry {
            workers,
            iterations_per_second: ctx.repetitions as f64 / elapsed,
        });
    }
    Ok(results)
}

fn load_layout(path: &Path, name: &str, alphabet: &AlphabetMap) -> EngineResult<Layout> {
    let body = std::fs::read_to_string(path)?;
    Layout::parse(name, &body, alphabet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_ranked_is_descending_and_tie_stable() {
        let mut list = Vec::new();
        insert_ranked(&mut list, "a".into(), 10.0);
        insert_ranked(&mut list, "b".into(), 20.0);
        insert_ranked(&mut list, "c".into(), 10.0);
        insert_ranked(&mut list, "d".into(), 15.0);
        assert_eq!(
            list,
            vec![
                ("b".to_string(), 20.0),
                ("d".to_string(), 15.0),
                ("a".to_string(), 10.0),
                ("c".to_string(), 10.0),
            ]
        );
    }
}
