//! Streaming corpus collector: a length-11 sliding history window producing
//! raw counts for monograms through quadgrams plus skip distances 1..9 in a
//! single pass.

use super::RawTables;
use crate::alphabet::AlphabetMap;

const HISTORY_LEN: usize = 11;

pub struct Collector<'a> {
    alphabet: &'a AlphabetMap,
    tables: RawTables,
    /// Slot 0 is newest; initialized to -1 ("invalid").
    history: [i64; HISTORY_LEN],
}

impl<'a> Collector<'a> {
    pub fn new(alphabet: &'a AlphabetMap) -> Self {
        Collector {
            alphabet,
            tables: RawTables::new(alphabet.len()),
            history: [-1; HISTORY_LEN],
        }
    }

    fn valid(idx: i64) -> bool {
        idx > 0
    }

    /// Feeds one Unicode code point through the collector.
    pub fn feed(&mut self, cp: char) {
        for i in (1..HISTORY_LEN).rev() {
            self.history[i] = self.history[i - 1];
        }
        let encoded = self.alphabet.encode(cp).map(|v| v as i64).unwrap_or(-1);
        self.history[0] = encoded;

        let s0 = self.history[0];
        if !Self::valid(s0) {
            return;
        }
        let s0 = s0 as usize;
        self.tables.mono[s0] += 1;

        for d in 1..=3usize {
            if (0..=d).all(|slot| Self::valid(self.history[slot])) {
                match d {
                    1 => {
                        let s1 = self.history[1] as usize;
                        let i = self.tables.idx_bi(s1, s0);
                        self.tables.bi[i] += 1;
                    }
                    2 => {
                        let s1 = self.history[1] as usize;
                        let s2 = self.history[2] as usize;
                        let i = self.tables.idx_tri(s2, s1, s0);
                        self.tables.tri[i] += 1;
                    }
                    3 => {
                        let s1 = self.history[1] as usize;
                        let s2 = self.history[2] as usize;
                        let s3 = self.history[3] as usize;
                        let i = self.tables.idx_quad(s3, s2, s1, s0);
                        self.tables.quad[i] += 1;
                    }
                    _ => unreachable!(),
                }
            }
        }

        for d in 1..=9usize {
            let older = self.history[d + 1];
            if Self::valid(older) {
                let older = older as usize;
                let i = self.tables.idx_bi(older, s0);
                self.tables.skip[d - 1][i] += 1;
            }
        }
    }

    pub fn feed_str(&mut self, text: &str) {
        for cp in text.chars() {
            self.feed(cp);
        }
    }

    pub fn into_tables(self) -> RawTables {
        self.tables
    }

    pub fn tables(&self) -> &RawTables {
        &self.tables
    }
}
