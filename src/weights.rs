//! Weight-file parser (`./data/weights/<name>.wght`).
//!
//! Each line is `<stat name> : <w1> [w2 ... w9]`: one value for scalar
//! stats, up to nine for skipgrams (applied to gaps 1..9 in order). Stats
//! not mentioned keep the registry's sentinel weight and are excluded by
//! `Registry::clean`.

use crate::error::{EngineError, EngineResult};
use std::collections::HashMap;

pub fn parse(body: &str) -> EngineResult<HashMap<String, Vec<f32>>> {
    let mut weights = HashMap::new();
    for (lineno, raw_line) in body.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, rest) = line.split_once(':').ok_or_else(|| {
            EngineError::WeightMalformed(format!(
                "weight file line {}: missing ':' separator: {raw_line}",
                lineno + 1
            ))
        })?;
        let name = name.trim().to_string();
        let values: Vec<f32> = rest
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f32>().map_err(|_| {
                    EngineError::WeightMalformed(format!(
                        "weight file line {}: non-numeric weight '{tok}'",
                        lineno + 1
                    ))
                })
            })
            .collect::<EngineResult<Vec<f32>>>()?;
        if values.is_empty() {
            return Err(EngineError::WeightMalformed(format!(
                "weight file line {}: '{name}' has no weight values",
                lineno + 1
            )));
        }
        if values.len() > 9 {
            return Err(EngineError::WeightMalformed(format!(
                "weight file line {}: '{name}' has {} values, max 9",
                lineno + 1,
                values.len()
            )));
        }
        weights.insert(name, values);
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_and_vector_lines() {
        let body = "Same-Finger Bigram : 200.0\nSame-Finger Skipgram : 10 9 8 7 6 5 4 3 2\n";
        let weights = parse(body).unwrap();
        assert_eq!(weights["Same-Finger Bigram"], vec![200.0]);
        assert_eq!(weights["Same-Finger Skipgram"].len(), 9);
    }

    #[test]
    fn ignores_blank_lines_and_comments() {
        let body = "# comment\n\nHand Balance : 5\n";
        let weights = parse(body).unwrap();
        assert_eq!(weights.len(), 1);
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(parse("Hand Balance 5\n").is_err());
    }

    #[test]
    fn rejects_nonnumeric_weight() {
        assert!(parse("Hand Balance : abc\n").is_err());
    }

    #[test]
    fn rejects_too_many_values() {
        assert!(parse("Stat : 1 2 3 4 5 6 7 8 9 10\n").is_err());
    }
}
