//! Corpus-to-frequency pipeline: collector, sparse cache, normalizer.
//! Frequency tables are addressed by alphabet indices (base-K, K = the
//! alphabet's size), distinct from the grid-ngram indices (base-P) used by
//! the statistic registry.

pub mod cache;
pub mod collector;
pub mod normalize;

use crate::alphabet::AlphabetMap;
use std::path::Path;

/// Builds normalized frequency tables for one corpus, preferring the cache
/// file when present and otherwise streaming the raw corpus text through
/// the collector. A missing cache is not an error; after a raw read, the
/// cache is written so the next run can skip straight to it (mirrors the
/// source's `read_corpus_cache` / `cache_corpus` pair in `io.c`).
pub fn load_tables(
    alphabet: &AlphabetMap,
    corpus_text_path: &Path,
    corpus_cache_path: &Path,
) -> crate::error::EngineResult<NormTables> {
    let raw = if corpus_cache_path.exists() {
        tracing::info!(path = %corpus_cache_path.display(), "reading corpus cache");
        let body = std::fs::read_to_string(corpus_cache_path)?;
        cache::read(alphabet.len(), &body)?
    } else {
        tracing::info!(path = %corpus_text_path.display(), "cache missing, streaming raw corpus");
        let text = std::fs::read_to_string(corpus_text_path)?;
        let mut collector = collector::Collector::new(alphabet);
        collector.feed_str(&text);
        let raw = collector.into_tables();
        if let Some(parent) = corpus_cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(corpus_cache_path, cache::write(&raw))?;
        tracing::info!(path = %corpus_cache_path.display(), "wrote corpus cache");
        raw
    };
    Ok(normalize::normalize(&raw))
}

/// Raw (unnormalized) 32-bit integer counters for one corpus.
/// Overflow above ~2e9 events per cell is not supported (matches the source
/// counters' native width).
#[derive(Debug, Clone)]
pub struct RawTables {
    pub k: usize,
    pub mono: Vec<u32>,
    pub bi: Vec<u32>,
    pub tri: Vec<u32>,
    pub quad: Vec<u32>,
    /// `skip[d-1]` holds the gap-d table, d in [1,9].
    pub skip: [Vec<u32>; 9],
}

impl RawTables {
    pub fn new(k: usize) -> Self {
        RawTables {
            k,
            mono: vec![0; k],
            bi: vec![0; k * k],
            tri: vec![0; k * k * k],
            quad: vec![0; k * k * k * k],
            skip: std::array::from_fn(|_| vec![0u32; k * k]),
        }
    }

    #[inline]
    pub fn idx_bi(&self, i: usize, j: usize) -> usize {
        i * self.k + j
    }

    #[inline]
    pub fn idx_tri(&self, i: usize, j: usize, l: usize) -> usize {
        (i * self.k + j) * self.k + l
    }

    #[inline]
    pub fn idx_quad(&self, i: usize, j: usize, l: usize, m: usize) -> usize {
        ((i * self.k + j) * self.k + l) * self.k + m
    }
}

/// Normalized (percentage) tables, float32, derived from `RawTables` by the
/// normalizer.
#[derive(Debug, Clone)]
pub struct NormTables {
    pub k: usize,
    pub mono: Vec<f32>,
    pub bi: Vec<f32>,
    pub tri: Vec<f32>,
    pub quad: Vec<f32>,
    pub skip: [Vec<f32>; 9],
}

impl NormTables {
    #[inline]
    pub fn idx_bi(&self, i: usize, j: usize) -> usize {
        i * self.k + j
    }

    #[inline]
    pub fn idx_tri(&self, i: usize, j: usize, l: usize) -> usize {
        (i * self.k + j) * self.k + l
    }

    #[inline]
    pub fn idx_quad(&self, i: usize, j: usize, l: usize, m: usize) -> usize {
        ((i * self.k + j) * self.k + l) * self.k + m
    }
}
