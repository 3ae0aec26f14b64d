//! Scoring engine: given a layout, the normalized frequency tables, and the
//! statistic registry, produces per-statistic scores and one aggregate
//! score.
//!
//! Numeric semantics are single-precision float throughout, with
//! accumulation strictly ordered by family (mono -> bi -> tri -> quad ->
//! skip -> meta), then by statistic within a family, then by grid-ngram
//! index within a statistic, so that two runs over identical inputs are
//! bit-for-bit identical.

use crate::corpus::NormTables;
use crate::grid::{unflatten, Pos};
use crate::layout::{Layout, UNUSED};
use crate::stats::{Registry, SkipStat, Stat, StatRef};

/// Per-statistic scores plus the single weighted aggregate for one layout,
/// computed against one registry/table pair.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub mono: Vec<f32>,
    pub bi: Vec<f32>,
    pub tri: Vec<f32>,
    pub quad: Vec<f32>,
    /// `skip[s][d]` is statistic `s`'s score at gap `d` (d in [0,9)).
    pub skip: Vec<[f32; 9]>,
    pub meta: Vec<f32>,
    pub aggregate: f32,
}

pub fn score_layout(layout: &Layout, tables: &NormTables, registry: &Registry) -> ScoreReport {
    let mono = score_mono(&registry.mono, layout, tables);
    let bi = score_pair(&registry.bi, layout, tables, |t, i, j| t.idx_bi(i, j), &tables.bi);
    let tri = score_tri(&registry.tri, layout, tables);
    let quad = score_quad(&registry.quad, layout, tables);
    let skip = score_skip(&registry.skip, layout, tables);

    let mut aggregate = 0.0f32;
    for (stat, &score) in registry.mono.iter().zip(&mono) {
        if !stat.skip {
            aggregate += score * stat.weight;
        }
    }
    for (stat, &score) in registry.bi.iter().zip(&bi) {
        if !stat.skip {
            aggregate += score * stat.weight;
        }
    }
    for (stat, &score) in registry.tri.iter().zip(&tri) {
        if !stat.skip {
            aggregate += score * stat.weight;
        }
    }
    for (stat, &score) in registry.quad.iter().zip(&quad) {
        if !stat.skip {
            aggregate += score * stat.weight;
        }
    }
    for (stat, scores) in registry.skip.iter().zip(&skip) {
        if stat.skip {
            continue;
        }
        for (d, &s) in scores.iter().enumerate() {
            aggregate += s * stat.weights[d];
        }
    }

    let meta = score_meta(registry, &mono, &bi, &tri, &quad, &skip);
    for (stat, &score) in registry.meta.iter().zip(&meta) {
        if !stat.skip {
            aggregate += score * stat.weight;
        }
    }

    ScoreReport {
        mono,
        bi,
        tri,
        quad,
        skip,
        meta,
        aggregate,
    }
}

fn score_mono(stats: &[Stat], layout: &Layout, tables: &NormTables) -> Vec<f32> {
    stats
        .iter()
        .map(|stat| {
            if stat.skip {
                return 0.0;
            }
            let mut acc = 0.0f32;
            for &g in &stat.indices {
                let pos = Pos::from_index(g as usize);
                let occ = layout.get(pos);
                if occ == UNUSED {
                    continue;
                }
                acc += tables.mono[occ as usize];
            }
            acc
        })
        .collect()
}

fn score_pair(
    stats: &[Stat],
    layout: &Layout,
    tables: &NormTables,
    idx_of: impl Fn(&NormTables, usize, usize) -> usize,
    table: &[f32],
) -> Vec<f32> {
    stats
        .iter()
        .map(|stat| {
            if stat.skip {
                return 0.0;
            }
            let mut acc = 0.0f32;
            for &g in &stat.indices {
                let positions = unflatten(g as usize, 2);
                let a = layout.get(positions[0]);
                let b = layout.get(positions[1]);
                if a == UNUSED || b == UNUSED {
                    continue;
                }
                acc += table[idx_of(tables, a as usize, b as usize)];
            }
            acc
        })
        .collect()
}

fn score_tri(stats: &[Stat], layout: &Layout, tables: &NormTables) -> Vec<f32> {
    stats
        .iter()
        .map(|stat| {
            if stat.skip {
                return 0.0;
            }
            let mut acc = 0.0f32;
            for &g in &stat.indices {
                let positions = unflatten(g as usize, 3);
                let a = layout.get(positions[0]);
                let b = layout.get(positions[1]);
                let c = layout.get(positions[2]);
                if a == UNUSED || b == UNUSED || c == UNUSED {
                    continue;
                }
                acc += tables.tri[tables.idx_tri(a as usize, b as usize, c as usize)];
            }
            acc
        })
        .collect()
}

fn score_quad(stats: &[Stat], layout: &Layout, tables: &NormTables) -> Vec<f32> {
    stats
        .iter()
        .map(|stat| {
            if stat.skip {
                return 0.0;
            }
            let mut acc = 0.0f32;
            for &g in &stat.indices {
                let positions = unflatten(g as usize, 4);
                let a = layout.get(positions[0]);
                let b = layout.get(positions[1]);
                let c = layout.get(positions[2]);
                let d = layout.get(positions[3]);
                if a == UNUSED || b == UNUSED || c == UNUSED || d == UNUSED {
                    continue;
                }
                acc += tables.quad[tables.idx_quad(a as usize, b as usize, c as usize, d as usize)];
            }
            acc
        })
        .collect()
}

fn score_skip(stats: &[SkipStat], layout: &Layout, tables: &NormTables) -> Vec<[f32; 9]> {
    stats
        .iter()
        .map(|stat| {
            let mut acc = [0.0f32; 9];
            if stat.skip {
                return acc;
            }
            for &g in &stat.indices {
                let positions = unflatten(g as usize, 2);
                let a = layout.get(positions[0]);
                let b = layout.get(positions[1]);
                if a == UNUSED || b == UNUSED {
                    continue;
                }
                let idx = tables.idx_bi(a as usize, b as usize);
                for d in 0..9 {
                    acc[d] += tables.skip[d][idx];
                }
            }
            acc
        })
        .collect()
}

/// The raw (un-weighted) score of a previously computed statistic, typed
/// by family and index so meta evaluation never does a name lookup.
/// Skipgram statistics have no single raw score; meta terms referencing
/// one use the gap-weighted sum, matching how a skipgram contributes to
/// the aggregate everywhere else.
fn raw_score(
    stat_ref: StatRef,
    mono: &[f32],
    bi: &[f32],
    tri: &[f32],
    quad: &[f32],
    skip: &[[f32; 9]],
    registry: &Registry,
) -> f32 {
    match stat_ref {
        StatRef::Mono(i) => mono[i],
        StatRef::Bi(i) => bi[i],
        StatRef::Tri(i) => tri[i],
        StatRef::Quad(i) => quad[i],
        StatRef::Skip(i) => {
            let weights = registry.skip[i].weights;
            skip[i].iter().zip(weights.iter()).map(|(s, w)| s * w).sum()
        }
    }
}

fn score_meta(
    registry: &Registry,
    mono: &[f32],
    bi: &[f32],
    tri: &[f32],
    quad: &[f32],
    skip: &[[f32; 9]],
) -> Vec<f32> {
    registry
        .meta
        .iter()
        .map(|meta| {
            if meta.skip {
                return 0.0;
            }
            let mut acc = 0.0f32;
            for term in &meta.terms {
                acc += term.coeff * raw_score(term.stat, mono, bi, tri, quad, skip, registry);
            }
            if meta.abs {
                acc.abs()
            } else {
                acc
            }
        })
        .collect()
}

/// Elementwise difference of two reports: every per-statistic field and
/// the aggregate are plain A - B.
pub fn diff_reports(a: &ScoreReport, b: &ScoreReport) -> ScoreReport {
    let sub = |x: &[f32], y: &[f32]| x.iter().zip(y).map(|(a, b)| a - b).collect::<Vec<_>>();
    let sub_skip = |x: &[[f32; 9]], y: &[[f32; 9]]| {
        x.iter()
            .zip(y)
            .map(|(a, b)| {
                let mut out = [0.0f32; 9];
                for d in 0..9 {
                    out[d] = a[d] - b[d];
                }
                out
            })
            .collect::<Vec<_>>()
    };
    ScoreReport {
        mono: sub(&a.mono, &b.mono),
        bi: sub(&a.bi, &b.bi),
        tri: sub(&a.tri, &b.tri),
        quad: sub(&a.quad, &b.quad),
        skip: sub_skip(&a.skip, &b.skip),
        meta: sub(&a.meta, &b.meta),
        aggregate: a.aggregate - b.aggregate,
    }
}
