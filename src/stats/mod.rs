//! Statistic registry: a compile-time-fixed catalog of named positional
//! predicates over position-ngrams, enumerated once at startup into dense
//! index lists.
//!
//! Each statistic's index list is built directly via enumeration + filter
//! into a contiguous `Vec<u32>`; there is no intermediate linked list and
//! no padding/partition step to trim afterward -- the list is already a
//! tight prefix the moment it is built.

pub mod catalog;
pub mod predicates;

use crate::error::{EngineError, EngineResult};
use crate::grid::{unflatten, N1, N2, N3, N4};
use std::collections::HashMap;

/// One non-meta statistic: a name, its dense grid-ngram index list, and a
/// scalar weight. Populated with a sentinel weight until a weight file is
/// loaded.
#[derive(Debug, Clone)]
pub struct Stat {
    pub name: String,
    pub indices: Vec<u32>,
    pub weight: f32,
    pub skip: bool,
}

pub const SENTINEL_WEIGHT: f32 = f32::NAN;

impl Stat {
    fn new(name: String, indices: Vec<u32>) -> Self {
        Stat {
            name,
            indices,
            weight: SENTINEL_WEIGHT,
            skip: false,
        }
    }
}

/// A skipgram statistic: same shape as `Stat` but with a length-9 weight
/// vector, one per gap distance.
#[derive(Debug, Clone)]
pub struct SkipStat {
    pub name: String,
    pub indices: Vec<u32>,
    pub weights: [f32; 9],
    pub skip: bool,
}

impl SkipStat {
    fn new(name: String, indices: Vec<u32>) -> Self {
        SkipStat {
            name,
            indices,
            weights: [SENTINEL_WEIGHT; 9],
            skip: false,
        }
    }
}

/// Reference to a non-meta statistic by family and index, resolved once at
/// registry build time so meta evaluation never does a name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatRef {
    Mono(usize),
    Bi(usize),
    Tri(usize),
    Quad(usize),
    Skip(usize),
}

#[derive(Debug, Clone)]
pub struct MetaTerm {
    pub stat: StatRef,
    pub coeff: f32,
}

#[derive(Debug, Clone)]
pub struct MetaStat {
    pub name: String,
    pub terms: Vec<MetaTerm>,
    pub abs: bool,
    pub weight: f32,
    pub skip: bool,
}

/// The full catalog, family order mono -> bi -> tri -> quad -> skip -> meta
/// throughout.
#[derive(Debug, Clone)]
pub struct Registry {
    pub mono: Vec<Stat>,
    pub bi: Vec<Stat>,
    pub tri: Vec<Stat>,
    pub quad: Vec<Stat>,
    pub skip: Vec<SkipStat>,
    pub meta: Vec<MetaStat>,
}

impl Registry {
    /// Builds the full catalog by enumerating every grid-ngram of each
    /// arity once and evaluating every predicate of that arity against it.
    /// Fails only on a duplicate stat name or a meta stat naming an
    /// unregistered statistic.
    pub fn build() -> EngineResult<Self> {
        let mono = build_family::<1>(catalog::mono_catalog(), N1)?;
        let bi = build_family::<2>(catalog::bi_catalog(), N2)?;
        let tri = build_family::<3>(catalog::tri_catalog(), N3)?;
        let quad = build_family::<4>(catalog::quad_catalog(), N4)?;
        let skip = build_skip_family(catalog::skip_catalog(), N2)?;

        check_unique_names(&mono, &bi, &tri, &quad, &skip)?;

        let name_index = index_by_name(&mono, &bi, &tri, &quad, &skip);

        let mut meta = Vec::new();
        let mut meta_names = std::collections::HashSet::new();
        for (name, abs, terms) in catalog::meta_catalog() {
            if !meta_names.insert(name) {
                return Err(EngineError::ConfigurationInvalid(format!(
                    "duplicate meta stat name: {name}"
                )));
            }
            let mut resolved = Vec::with_capacity(terms.len());
            for (term_name, coeff) in terms {
                let stat_ref = name_index.get(term_name).copied().ok_or_else(|| {
                    EngineError::MetaDependencyUnresolved(term_name.to_string())
                })?;
                resolved.push(MetaTerm {
                    stat: stat_ref,
                    coeff,
                });
            }
            meta.push(MetaStat {
                name: name.to_string(),
                terms: resolved,
                abs,
                weight: SENTINEL_WEIGHT,
                skip: false,
            });
        }

        Ok(Registry {
            mono,
            bi,
            tri,
            quad,
            skip,
            meta,
        })
    }

    /// Applies weights loaded from a `.wght` file. Stats not mentioned keep
    /// their sentinel weight (treated as zero by `clean`). Unrecognized
    /// names are logged and otherwise ignored: the weight file format
    /// carries no stat-existence guarantee (only meta references are
    /// fatal when unresolved).
    pub fn apply_weights(&mut self, weights: &HashMap<String, Vec<f32>>) {
        let mut apply_scalar = |stats: &mut [Stat]| {
            for stat in stats.iter_mut() {
                if let Some(values) = weights.get(&stat.name) {
                    stat.weight = values.first().copied().unwrap_or(0.0);
                }
            }
        };
        apply_scalar(&mut self.mono);
        apply_scalar(&mut self.bi);
        apply_scalar(&mut self.tri);
        apply_scalar(&mut self.quad);

        for stat in self.skip.iter_mut() {
            if let Some(values) = weights.get(&stat.name) {
                for (slot, &v) in stat.weights.iter_mut().zip(values.iter()) {
                    *slot = v;
                }
                // Fewer than nine values: remaining gaps stay sentinel,
                // treated as 0 by `clean`.
                for slot in stat.weights.iter_mut().skip(values.len()) {
                    if slot.is_nan() {
                        *slot = 0.0;
                    }
                }
            }
        }
        for stat in self.meta.iter_mut() {
            if let Some(values) = weights.get(&stat.name) {
                stat.weight = values.first().copied().unwrap_or(0.0);
            }
        }

        let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
        for name in weights.keys() {
            seen.insert(name.as_str());
        }
        let known: std::collections::HashSet<&str> = self
            .mono
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.bi.iter().map(|s| s.name.as_str()))
            .chain(self.tri.iter().map(|s| s.name.as_str()))
            .chain(self.quad.iter().map(|s| s.name.as_str()))
            .chain(self.skip.iter().map(|s| s.name.as_str()))
            .chain(self.meta.iter().map(|s| s.name.as_str()))
            .collect();
        for name in weights.keys() {
            if !known.contains(name.as_str()) {
                tracing::warn!(stat = %name, "weight file references unknown statistic");
            }
        }
    }

    /// Cleans the registry: any stat with zero length or zero effective
    /// weight is skipped; any non-meta stat referenced by an un-skipped
    /// meta stat is force-included. Meta's own clean pass runs after every
    /// non-meta family.
    pub fn clean(&mut self) {
        clean_scalar(&mut self.mono);
        clean_scalar(&mut self.bi);
        clean_scalar(&mut self.tri);
        clean_scalar(&mut self.quad);
        clean_skip(&mut self.skip);

        for meta in self.meta.iter_mut() {
            let weight = zero_if_nan(meta.weight);
            meta.weight = weight;
            meta.skip = weight == 0.0 || meta.terms.is_empty();
        }
        for meta in &self.meta {
            if meta.skip {
                continue;
            }
            for term in &meta.terms {
                self.force_unskip(term.stat);
            }
        }
    }

    fn force_unskip(&mut self, stat_ref: StatRef) {
        match stat_ref {
            StatRef::Mono(i) => self.mono[i].skip = false,
            StatRef::Bi(i) => self.bi[i].skip = false,
            StatRef::Tri(i) => self.tri[i].skip = false,
            StatRef::Quad(i) => self.quad[i].skip = false,
            StatRef::Skip(i) => self.skip[i].skip = false,
        }
    }
}

fn zero_if_nan(w: f32) -> f32 {
    if w.is_nan() {
        0.0
    } else {
        w
    }
}

fn clean_scalar(stats: &mut [Stat]) {
    for stat in stats.iter_mut() {
        stat.weight = zero_if_nan(stat.weight);
        stat.skip = stat.indices.is_empty() || stat.weight == 0.0;
    }
}

fn clean_skip(stats: &mut [SkipStat]) {
    for stat in stats.iter_mut() {
        for w in stat.weights.iter_mut() {
            *w = zero_if_nan(*w);
        }
        stat.skip = stat.indices.is_empty() || stat.weights.iter().all(|&w| w == 0.0);
    }
}

fn build_family<const N: usize>(
    entries: Vec<catalog::CatalogEntry<N>>,
    count: usize,
) -> EngineResult<Vec<Stat>> {
    let mut index_lists: Vec<Vec<u32>> = vec![Vec::new(); entries.len()];
    for g in 0..count {
        let positions = unflatten(g, N);
        let arr: [crate::grid::Pos; N] = positions
            .try_into()
            .expect("unflatten(arity) must return exactly `arity` positions");
        for (list, entry) in index_lists.iter_mut().zip(entries.iter()) {
            if (entry.predicate)(&arr) {
                list.push(g as u32);
            }
        }
    }
    Ok(entries
        .into_iter()
        .zip(index_lists)
        .map(|(entry, indices)| Stat::new(entry.name, indices))
        .collect())
}

fn build_skip_family(
    entries: Vec<catalog::CatalogEntry<2>>,
    count: usize,
) -> EngineResult<Vec<SkipStat>> {
    let mut index_lists: Vec<Vec<u32>> = vec![Vec::new(); entries.len()];
    for g in 0..count {
        let positions = unflatten(g, 2);
        let arr: [crate::grid::Pos; 2] = positions
            .try_into()
            .expect("unflatten(2) must return exactly two positions");
        for (list, entry) in index_lists.iter_mut().zip(entries.iter()) {
            if (entry.predicate)(&arr) {
                list.push(g as u32);
            }
        }
    }
    Ok(entries
        .into_iter()
        .zip(index_lists)
        .map(|(entry, indices)| SkipStat::new(entry.name, indices))
        .collect())
}

fn check_unique_names(
    mono: &[Stat],
    bi: &[Stat],
    tri: &[Stat],
    quad: &[Stat],
    skip: &[SkipStat],
) -> EngineResult<()> {
    let mut seen = std::collections::HashSet::new();
    for name in mono
        .iter()
        .map(|s| &s.name)
        .chain(bi.iter().map(|s| &s.name))
        .chain(tri.iter().map(|s| &s.name))
        .chain(quad.iter().map(|s| &s.name))
        .chain(skip.iter().map(|s| &s.name))
    {
        if !seen.insert(name.as_str()) {
            return Err(EngineError::ConfigurationInvalid(format!(
                "duplicate statistic name: {name}"
            )));
        }
    }
    Ok(())
}

fn index_by_name<'a>(
    mono: &'a [Stat],
    bi: &'a [Stat],
    tri: &'a [Stat],
    quad: &'a [Stat],
    skip: &'a [SkipStat],
) -> HashMap<&'a str, StatRef> {
    let mut map = HashMap::new();
    for (i, s) in mono.iter().enumerate() {
        map.insert(s.name.as_str(), StatRef::Mono(i));
    }
    for (i, s) in bi.iter().enumerate() {
        map.insert(s.name.as_str(), StatRef::Bi(i));
    }
    for (i, s) in tri.iter().enumerate() {
        map.insert(s.name.as_str(), StatRef::Tri(i));
    }
    for (i, s) in quad.iter().enumerate() {
        map.insert(s.name.as_str(), StatRef::Quad(i));
    }
    for (i, s) in skip.iter().enumerate() {
        map.insert(s.name.as_str(), StatRef::Skip(i));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_error() {
        let registry = Registry::build().unwrap();
        assert!(!registry.mono.is_empty());
        assert!(!registry.bi.is_empty());
        assert!(!registry.tri.is_empty());
        assert!(!registry.quad.is_empty());
        assert!(!registry.skip.is_empty());
        assert_eq!(registry.meta.len(), 1);
        assert_eq!(registry.meta[0].name, "Hand Balance");
    }

    #[test]
    fn predicate_coverage_sample() {
        use crate::grid::{flatten, Pos};
        let registry = Registry::build().unwrap();
        let sfb = registry
            .bi
            .iter()
            .find(|s| s.name == "Same-Finger Bigram")
            .unwrap();
        // col 0 and col 1 share finger 0 (pinky).
        let g = flatten(&[Pos::new(0, 0), Pos::new(1, 1)]);
        assert!(sfb.indices.contains(&(g as u32)));
        // col 0 and col 6 are different fingers/hands.
        let g2 = flatten(&[Pos::new(0, 0), Pos::new(0, 6)]);
        assert!(!sfb.indices.contains(&(g2 as u32)));
    }

    #[test]
    fn clean_skips_zero_weight_and_force_includes_meta_dependency() {
        let mut registry = Registry::build().unwrap();
        let mut weights = HashMap::new();
        weights.insert("Left Hand Usage".to_string(), vec![0.0]);
        weights.insert("Right Hand Usage".to_string(), vec![0.0]);
        weights.insert("Hand Balance".to_string(), vec![3.0]);
        registry.apply_weights(&weights);
        registry.clean();

        let left = registry
            .mono
            .iter()
            .find(|s| s.name == "Left Hand Usage")
            .unwrap();
        let right = registry
            .mono
            .iter()
            .find(|s| s.name == "Right Hand Usage")
            .unwrap();
        // Force-included despite zero weight because Hand Balance is live.
        assert!(!left.skip);
        assert!(!right.skip);
        assert!(!registry.meta[0].skip);
    }

    #[test]
    fn meta_unresolved_dependency_is_fatal() {
        // Build manually with a bogus meta reference to confirm the error
        // path (the real catalog always resolves).
        let name_index: HashMap<&str, StatRef> = HashMap::new();
        let result: EngineResult<StatRef> = name_index
            .get("Nonexistent Stat")
            .copied()
            .ok_or_else(|| EngineError::MetaDependencyUnresolved("Nonexistent Stat".to_string()));
        assert!(matches!(
            result,
            Err(EngineError::MetaDependencyUnresolved(_))
        ));
    }

    #[test]
    fn stats_have_unique_names() {
        let registry = Registry::build().unwrap();
        let mut seen = std::collections::HashSet::new();
        for name in registry
            .mono
            .iter()
            .map(|s| &s.name)
            .chain(registry.bi.iter().map(|s| &s.name))
            .chain(registry.tri.iter().map(|s| &s.name))
            .chain(registry.quad.iter().map(|s| &s.name))
            .chain(registry.skip.iter().map(|s| &s.name))
        {
            assert!(seen.insert(name.clone()), "duplicate name {name}");
        }
    }
}
