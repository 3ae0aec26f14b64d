//! Three-verbosity-level rendering of layouts, per-statistic scores, and
//! rankings: Quiet (layout + aggregate only), Normal (quiet plus every
//! non-skipped statistic grouped by tag), and Verbose (currently identical
//! to Normal, per spec).

use crate::alphabet::AlphabetMap;
use crate::config::OutputMode;
use crate::layout::Layout;
use crate::scoring::ScoreReport;
use crate::stats::Registry;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

/// Renders a layout's matrix as an R-row grid, one cell per key; `@` marks
/// an unused position.
pub fn render_layout_grid(layout: &Layout, alphabet: &AlphabetMap) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    for row in 0..crate::grid::ROWS {
        let mut cells = Vec::with_capacity(crate::grid::COLS);
        for col in 0..crate::grid::COLS {
            let v = layout.matrix[row * crate::grid::COLS + col];
            let ch = if v == crate::layout::UNUSED {
                crate::alphabet::DEAD_KEY
            } else {
                alphabet.decode(v as usize)
            };
            cells.push(Cell::new(ch.to_string()).set_alignment(CellAlignment::Center));
        }
        table.add_row(cells);
    }
    format!("{table}")
}

/// Quiet mode: the layout's name, grid, and aggregate score only.
pub fn print_quiet(layout: &Layout, alphabet: &AlphabetMap, aggregate: f32) {
    println!("\nLayout: {}", layout.name);
    println!("{}", render_layout_grid(layout, alphabet));
    println!("Score: {aggregate:.2}");
}

/// One table per non-meta family, skipping any statistic the registry
/// marked `skip`; skipgrams render as a nine-column per-gap row.
fn stat_table(name: &str, rows: Vec<(String, f32)>) -> Option<Table> {
    if rows.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new("Score").add_attribute(Attribute::Bold),
    ]);
    for (stat_name, score) in rows {
        table.add_row(vec![
            Cell::new(stat_name),
            Cell::new(format!("{score:.3}")).set_alignment(CellAlignment::Right),
        ]);
    }
    Some(table)
}

fn skip_table(registry: &Registry, report: &ScoreReport) -> Option<Table> {
    let rows: Vec<_> = registry
        .skip
        .iter()
        .zip(&report.skip)
        .filter(|(s, _)| !s.skip)
        .collect();
    if rows.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![Cell::new("Skipgram").add_attribute(Attribute::Bold)];
    for d in 1..=9 {
        header.push(Cell::new(format!("d={d}")));
    }
    table.add_row(header);
    for (stat, scores) in rows {
        let mut row = vec![Cell::new(&stat.name)];
        for &s in scores {
            row.push(Cell::new(format!("{s:.2}")).set_alignment(CellAlignment::Right));
        }
        table.add_row(row);
    }
    Some(table)
}

/// Normal mode: quiet plus every non-skipped statistic's score, grouped by
/// tag (mono, bi, tri, quad, skip, meta). Verbose currently renders
/// identically (placeholder for future detail, per spec).
pub fn print_normal(layout: &Layout, alphabet: &AlphabetMap, registry: &Registry, report: &ScoreReport) {
    print_quiet(layout, alphabet, report.aggregate);

    let group = |label: &str, stats: &[crate::stats::Stat], scores: &[f32]| {
        let rows: Vec<_> = stats
            .iter()
            .zip(scores)
            .filter(|(s, _)| !s.skip)
            .map(|(s, &v)| (s.name.clone(), v))
            .collect();
        if let Some(table) = stat_table(label, rows) {
            println!("\n{table}");
        }
    };

    group("Monogram", &registry.mono, &report.mono);
    group("Bigram", &registry.bi, &report.bi);
    group("Trigram", &registry.tri, &report.tri);
    group("Quadgram", &registry.quad, &report.quad);
    if let Some(table) = skip_table(registry, report) {
        println!("\n{table}");
    }
    let meta_rows: Vec<_> = registry
        .meta
        .iter()
        .zip(&report.meta)
        .filter(|(s, _)| !s.skip)
        .map(|(s, &v)| (s.name.clone(), v))
        .collect();
    if let Some(table) = stat_table("Meta", meta_rows) {
        println!("\n{table}");
    }
}

/// Dispatches on the configured verbosity. Verbose is identical to Normal
/// (spec §4.10: "placeholder for future detail").
pub fn print_report(
    mode: OutputMode,
    layout: &Layout,
    alphabet: &AlphabetMap,
    registry: &Registry,
    report: &ScoreReport,
) {
    match mode {
        OutputMode::Quiet => print_quiet(layout, alphabet, report.aggregate),
        OutputMode::Normal | OutputMode::Verbose => print_normal(layout, alphabet, registry, report),
    }
}

/// Renders a descending ranking list as produced by `driver::rank`.
pub fn print_ranking(entries: &[(String, f32)]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Layout").add_attribute(Attribute::Bold),
        Cell::new("Score").add_attribute(Attribute::Bold),
    ]);
    for (name, score) in entries {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{score:.3}")).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::UNUSED;

    #[test]
    fn render_layout_grid_marks_unused_with_dead_key() {
        let alphabet = AlphabetMap::from_codepoints(&"  ab".chars().collect::<Vec<_>>()).unwrap();
        let mut matrix = vec![UNUSED; crate::grid::ROWS * crate::grid::COLS];
        matrix[0] = 1;
        let layout = Layout::new("t", matrix).unwrap();
        let rendered = render_layout_grid(&layout, &alphabet);
        assert!(rendered.contains('a'));
        assert!(rendered.contains('@'));
    }
}
