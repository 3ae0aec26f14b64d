//! Converts raw counters into percentage tables normalized per ngram class.

use super::{NormTables, RawTables};

fn normalize_table(raw: &[u32]) -> Vec<f32> {
    let total: u64 = raw.iter().map(|&x| x as u64).sum();
    if total == 0 {
        // Empty class: leave every entry zero rather than dividing by zero.
        return vec![0.0; raw.len()];
    }
    raw.iter()
        .map(|&x| (x as f32) * 100.0 / (total as f32))
        .collect()
}

pub fn normalize(raw: &RawTables) -> NormTables {
    NormTables {
        k: raw.k,
        mono: normalize_table(&raw.mono),
        bi: normalize_table(&raw.bi),
        tri: normalize_table(&raw.tri),
        quad: normalize_table(&raw.quad),
        skip: std::array::from_fn(|d| normalize_table(&raw.skip[d])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_total_leaves_zero_table() {
        let raw = RawTables::new(3);
        let norm = normalize(&raw);
        assert!(norm.mono.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn nonzero_totals_sum_to_100() {
        let mut raw = RawTables::new(3);
        raw.mono[0] = 5;
        raw.mono[1] = 3;
        raw.mono[2] = 2;
        let norm = normalize(&raw);
        let sum: f32 = norm.mono.iter().sum();
        assert!((sum - 100.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn skip_gaps_normalize_independently(
            counts in proptest::collection::vec(0u32..1000, 9)
        ) {
            let mut raw = RawTables::new(2);
            for (d, &c) in counts.iter().enumerate() {
                raw.skip[d][0] = c;
            }
            let norm = normalize(&raw);
            for d in 0..9 {
                let sum: f32 = norm.skip[d].iter().sum();
                if counts[d] > 0 {
                    prop_assert!((sum - 100.0).abs() < 1e-3);
                } else {
                    prop_assert_eq!(sum, 0.0);
                }
            }
        }
    }
}
