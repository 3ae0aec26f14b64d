//! Sparse, line-oriented persistence of raw corpus counters.

use super::RawTables;
use crate::error::{EngineError, EngineResult};
use std::fmt::Write as _;

/// Writes only non-zero entries, in deterministic (enumerate i,j,k,l) order.
pub fn write(tables: &RawTables) -> String {
    let mut out = String::new();
    let k = tables.k;

    for i in 0..k {
        let v = tables.mono[i];
        if v != 0 {
            let _ = writeln!(out, "m {i} {v}");
        }
    }
    for i in 0..k {
        for j in 0..k {
            let v = tables.bi[tables.idx_bi(i, j)];
            if v != 0 {
                let _ = writeln!(out, "b {i} {j} {v}");
            }
        }
    }
    for i in 0..k {
        for j in 0..k {
            for l in 0..k {
                let v = tables.tri[tables.idx_tri(i, j, l)];
                if v != 0 {
                    let _ = writeln!(out, "t {i} {j} {l} {v}");
                }
            }
        }
    }
    for i in 0..k {
        for j in 0..k {
            for l in 0..k {
                for m in 0..k {
                    let v = tables.quad[tables.idx_quad(i, j, l, m)];
                    if v != 0 {
                        let _ = writeln!(out, "q {i} {j} {l} {m} {v}");
                    }
                }
            }
        }
    }
    for d in 1..=9usize {
        for i in 0..k {
            for j in 0..k {
                let v = tables.skip[d - 1][tables.idx_bi(i, j)];
                if v != 0 {
                    let _ = writeln!(out, "{d} {i} {j} {v}");
                }
            }
        }
    }
    out
}

/// Readers tolerate any ordering and any subset of classes present.
pub fn read(k: usize, body: &str) -> EngineResult<RawTables> {
    let mut tables = RawTables::new(k);
    for (lineno, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let bad = || {
            EngineError::WeightMalformed(format!(
                "corpus cache: malformed line {}: {line}",
                lineno + 1
            ))
        };
        let parse_usize = |s: &str| s.parse::<usize>().map_err(|_| bad());
        let parse_u32 = |s: &str| s.parse::<u32>().map_err(|_| bad());

        match fields.first().copied() {
            Some("m") if fields.len() == 3 => {
                let i = parse_usize(fields[1])?;
                tables.mono[i] = parse_u32(fields[2])?;
            }
            Some("b") if fields.len() == 4 => {
                let i = parse_usize(fields[1])?;
                let j = parse_usize(fields[2])?;
                let idx = tables.idx_bi(i, j);
                tables.bi[idx] = parse_u32(fields[3])?;
            }
            Some("t") if fields.len() == 5 => {
                let i = parse_usize(fields[1])?;
                let j = parse_usize(fields[2])?;
                let l = parse_usize(fields[3])?;
                let idx = tables.idx_tri(i, j, l);
                tables.tri[idx] = parse_u32(fields[4])?;
            }
            Some("q") if fields.len() == 6 => {
                let i = parse_usize(fields[1])?;
                let j = parse_usize(fields[2])?;
                let l = parse_usize(fields[3])?;
                let m = parse_usize(fields[4])?;
                let idx = tables.idx_quad(i, j, l, m);
                tables.quad[idx] = parse_u32(fields[5])?;
            }
            Some(d_str) if fields.len() == 4 => {
                let d: usize = d_str.parse().map_err(|_| bad())?;
                if !(1..=9).contains(&d) {
                    return Err(bad());
                }
                let i = parse_usize(fields[1])?;
                let j = parse_usize(fields[2])?;
                let idx = tables.idx_bi(i, j);
                tables.skip[d - 1][idx] = parse_u32(fields[3])?;
            }
            _ => return Err(bad()),
        }
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::AlphabetMap;
    use crate::corpus::collector::Collector;

    #[test]
    fn round_trip_matches_raw_tables() {
        let alphabet =
            AlphabetMap::from_codepoints(&"  AaBb".chars().collect::<Vec<_>>()).unwrap();
        let mut c = Collector::new(&alphabet);
        c.feed_str("ABAB AABB");
        let raw = c.into_tables();

        let body = write(&raw);
        let reloaded = read(raw.k, &body).unwrap();

        assert_eq!(reloaded.mono, raw.mono);
        assert_eq!(reloaded.bi, raw.bi);
        assert_eq!(reloaded.tri, raw.tri);
        assert_eq!(reloaded.quad, raw.quad);
        assert_eq!(reloaded.skip, raw.skip);
    }

    #[test]
    fn reader_tolerates_any_order_and_subset() {
        let body = "b 0 1 5\nm 0 9\n3 0 1 2\n";
        let tables = read(2, body).unwrap();
        assert_eq!(tables.mono[0], 9);
        assert_eq!(tables.bi[tables.idx_bi(0, 1)], 5);
        assert_eq!(tables.skip[2][tables.idx_bi(0, 1)], 2);
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(read(2, "m notanumber 5\n").is_err());
    }
}
