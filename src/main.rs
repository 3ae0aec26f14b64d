//! CLI entry point: parses flags, merges them with `config.conf`, loads the
//! alphabet/corpus/weights, builds the statistic registry, dispatches to
//! the requested driver mode, and reports the result. See spec §6 for the
//! full external-interface contract this binary implements.

use clap::{CommandFactory, Parser};
use ngramforge::config::{self, BackendMode, Cli, Context, OutputMode, RunMode};
use ngramforge::error::{EngineError, EngineResult};
use ngramforge::{alphabet, corpus, driver, reporting, stats, weights};
use std::process::ExitCode;

const CONFIG_PATH: &str = "config.conf";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the stdout `tracing` subscriber at a level keyed to the
/// resolved output mode so spec §7's "non-fatal skips ... are silent in
/// Quiet mode" also covers the informational/warning diagnostics emitted
/// outside the reporting module itself (e.g. a missing weight file, or an
/// unrecognized weight-file entry surfaced from deep in `stats::Registry`).
fn init_tracing(output_mode: OutputMode) {
    let max_level = match output_mode {
        OutputMode::Quiet => tracing::Level::ERROR,
        OutputMode::Normal | OutputMode::Verbose => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .with_target(false)
        .without_time()
        .with_max_level(max_level)
        .init();
}

fn run() -> EngineResult<()> {
    let cli = Cli::parse();

    let ctx = load_context(&cli)?;
    init_tracing(ctx.output_mode);

    if ctx.run_mode == RunMode::Help {
        Cli::command().print_help().ok();
        println!();
        return Ok(());
    }
    if ctx.run_mode == RunMode::Info {
        println!("ngramforge {}", env!("CARGO_PKG_VERSION"));
        println!("grid: {}x{} ({} positions)", ngramforge::grid::ROWS, ngramforge::grid::COLS, ngramforge::grid::P);
        return Ok(());
    }

    if ctx.backend_mode == BackendMode::Gpu {
        tracing::warn!("backend_mode=gpu requested; only the CPU backend is implemented, falling back");
    }

    let lang_body = std::fs::read_to_string(ctx.lang_file_path())?;
    let alphabet = alphabet::AlphabetMap::from_lang_file(&lang_body)?;

    let tables = corpus::load_tables(&alphabet, &ctx.corpus_text_path(), &ctx.corpus_cache_path())?;

    let mut registry = stats::Registry::build()?;
    if let Some(weight_name) = &ctx.weight {
        let body = std::fs::read_to_string(ctx.weight_file_path(weight_name))?;
        let parsed = weights::parse(&body)?;
        registry.apply_weights(&parsed);
    } else {
        tracing::warn!("no weight file configured; every statistic keeps its sentinel weight and is excluded");
    }
    registry.clean();

    let seed = splitmix_seed();

    match ctx.run_mode {
        RunMode::Analyze => {
            let outcome = driver::analyze(&ctx, &alphabet, &tables, &registry)?;
            reporting::print_report(ctx.output_mode, &outcome.layout, &alphabet, &registry, &outcome.report);
        }
        RunMode::Compare => {
            let outcome = driver::compare(&ctx, &alphabet, &tables, &registry)?;
            println!("=== {} ===", outcome.a.name);
            reporting::print_report(ctx.output_mode, &outcome.a, &alphabet, &registry, &outcome.report_a);
            println!("\n=== {} ===", outcome.b.name);
            reporting::print_report(ctx.output_mode, &outcome.b, &alphabet, &registry, &outcome.report_b);
            println!("\n=== diff ===");
            reporting::print_report(ctx.output_mode, &outcome.diff, &alphabet, &registry, &outcome.diff_report);
        }
        RunMode::Rank => {
            let ranking = driver::rank(&ctx, &alphabet, &tables, &registry)?;
            reporting::print_ranking(&ranking);
        }
        RunMode::Generate => {
            let outcome = driver::generate(&ctx, &alphabet, &tables, &registry, seed)?;
            report_optimize(&ctx, &alphabet, &registry, &tables, outcome);
        }
        RunMode::Improve => {
            let outcome = driver::improve(&ctx, &alphabet, &tables, &registry, seed)?;
            report_optimize(&ctx, &alphabet, &registry, &tables, outcome);
        }
        RunMode::Benchmark => {
            let results = driver::benchmark(&ctx, &alphabet, &tables, &registry, seed)?;
            for entry in results {
                println!("workers={:<4} {:.1} iterations/sec", entry.workers, entry.iterations_per_second);
            }
        }
        RunMode::Help | RunMode::Info => unreachable!("handled above"),
    }

    Ok(())
}

fn report_optimize(
    ctx: &Context,
    alphabet: &alphabet::AlphabetMap,
    registry: &stats::Registry,
    tables: &ngramforge::corpus::NormTables,
    outcome: driver::OptimizeOutcome,
) {
    if !matches!(ctx.output_mode, OutputMode::Quiet) {
        println!(
            "starting score: {:.2} -> best score: {:.2}",
            outcome.starting_score, outcome.outcome.best_score
        );
    }
    let report = ngramforge::scoring::score_layout(&outcome.outcome.best, tables, registry);
    reporting::print_report(ctx.output_mode, &outcome.outcome.best, alphabet, registry, &report);
}

fn load_context(cli: &Cli) -> EngineResult<Context> {
    let body = std::fs::read_to_string(CONFIG_PATH).map_err(|_| {
        EngineError::ConfigurationMissing(format!("{CONFIG_PATH} not found in working directory"))
    })?;
    config::build_context(&body, cli)
}

/// A fresh, unpredictable base seed for the optimizer's per-worker RNG
/// streams: the process ID mixed with the address of a freshly allocated
/// stack value, avalanched through splitmix64. Avoids a `SystemTime` read
/// so two invocations in the same clock tick still diverge.
fn splitmix_seed() -> u64 {
    let marker = 0u8;
    let mut z = (std::process::id() as u64) ^ (&marker as *const u8 as u64);
    z = z.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
