//! Layout: a named R×C matrix of alphabet indices (or "unused"), plus the
//! pin mask that constrains the optimizer.

use crate::alphabet::AlphabetMap;
use crate::error::{EngineError, EngineResult};
use crate::grid::{Pos, COLS, ROWS};

/// Sentinel for "key unused at this position".
pub const UNUSED: i16 = -1;

#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    /// Row-major, length ROWS*COLS. Entries are alphabet indices in
    /// [0, K) or `UNUSED`.
    pub matrix: Vec<i16>,
}

impl Layout {
    pub fn new(name: impl Into<String>, matrix: Vec<i16>) -> EngineResult<Self> {
        if matrix.len() != ROWS * COLS {
            return Err(EngineError::LayoutMalformed(format!(
                "expected {} entries, got {}",
                ROWS * COLS,
                matrix.len()
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for &v in &matrix {
            if v >= 0 && !seen.insert(v) {
                return Err(EngineError::LayoutMalformed(format!(
                    "duplicate alphabet index {v} in layout"
                )));
            }
        }
        Ok(Layout {
            name: name.into(),
            matrix,
        })
    }

    pub fn get(&self, p: Pos) -> i16 {
        self.matrix[p.index()]
    }

    pub fn set(&mut self, p: Pos, v: i16) {
        self.matrix[p.index()] = v;
    }

    /// Parses a `.glg` layout file body: R lines of C whitespace-separated
    /// code points, `@` for unused.
    pub fn parse(name: &str, body: &str, alphabet: &AlphabetMap) -> EngineResult<Self> {
        let lines: Vec<&str> = body.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() != ROWS {
            return Err(EngineError::LayoutMalformed(format!(
                "expected {ROWS} rows, got {}",
                lines.len()
            )));
        }
        let mut matrix = vec![UNUSED; ROWS * COLS];
        for (row, line) in lines.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != COLS {
                return Err(EngineError::LayoutMalformed(format!(
                    "row {row} has {} entries, expected {COLS}",
                    tokens.len()
                )));
            }
            for (col, tok) in tokens.iter().enumerate() {
                let cp = tok.chars().next().ok_or_else(|| {
                    EngineError::LayoutMalformed(format!("empty token at row {row} col {col}"))
                })?;
                let idx = if cp == crate::alphabet::DEAD_KEY {
                    UNUSED
                } else {
                    alphabet.encode(cp).ok_or_else(|| {
                        EngineError::LayoutMalformed(format!(
                            "unknown code point '{cp}' at row {row} col {col}"
                        ))
                    })? as i16
                };
                matrix[row * COLS + col] = idx;
            }
        }
        Layout::new(name, matrix)
    }

    /// Renders back to `.glg` body form.
    pub fn render(&self, alphabet: &AlphabetMap) -> String {
        let mut out = String::new();
        for row in 0..ROWS {
            let mut parts = Vec::with_capacity(COLS);
            for col in 0..COLS {
                let v = self.matrix[row * COLS + col];
                let ch = if v == UNUSED {
                    crate::alphabet::DEAD_KEY
                } else {
                    alphabet.decode(v as usize)
                };
                parts.push(ch.to_string());
            }
            out.push_str(&parts.join(" "));
            out.push('\n');
        }
        out
    }

    /// Fisher-Yates shuffle over unpinned positions, in place. Used by
    /// generate mode after clearing the pin mask; a pin mask of all-false
    /// shuffles every position.
    pub fn shuffle(&mut self, pins: &PinMask, rng: &mut fastrand::Rng) {
        let free: Vec<usize> = (0..self.matrix.len())
            .filter(|&i| !pins.is_pinned_index(i))
            .collect();
        let mut values: Vec<i16> = free.iter().map(|&i| self.matrix[i]).collect();
        // Fisher-Yates.
        for i in (1..values.len()).rev() {
            let j = rng.usize(0..=i);
            values.swap(i, j);
        }
        for (slot, v) in free.into_iter().zip(values) {
            self.matrix[slot] = v;
        }
    }

    /// Difference layout for compare mode: matrix entries equal to the
    /// shared value where A and B agree, `UNUSED` otherwise.
    pub fn diff_matrix(a: &Layout, b: &Layout) -> Vec<i16> {
        a.matrix
            .iter()
            .zip(b.matrix.iter())
            .map(|(&x, &y)| if x == y { x } else { UNUSED })
            .collect()
    }
}

/// R×C boolean pin mask; a pinned position's occupant must never change
/// under optimizer moves.
#[derive(Debug, Clone)]
pub struct PinMask {
    pinned: Vec<bool>,
}

impl PinMask {
    pub fn none() -> Self {
        PinMask {
            pinned: vec![false; ROWS * COLS],
        }
    }

    pub fn parse(s: &str) -> EngineResult<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != ROWS * COLS {
            return Err(EngineError::ConfigurationInvalid(format!(
                "pins string must have {} characters, got {}",
                ROWS * COLS,
                chars.len()
            )));
        }
        Ok(PinMask {
            pinned: chars.iter().map(|&c| c != '.').collect(),
        })
    }

    pub fn is_pinned(&self, p: Pos) -> bool {
        self.pinned[p.index()]
    }

    pub fn is_pinned_index(&self, idx: usize) -> bool {
        self.pinned[idx]
    }

    pub fn set_pinned_index(&mut self, idx: usize, pinned: bool) {
        self.pinned[idx] = pinned;
    }
}
