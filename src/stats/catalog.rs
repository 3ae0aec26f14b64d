//! Declarative statistic catalog: name -> predicate, grouped by arity.
//!
//! Each entry's predicate is evaluated once per grid-ngram of the matching
//! arity during registry construction; the resulting index list *is* the
//! statistic. See `super::predicates` for the predicate definitions
//! themselves.

use super::predicates::*;
use crate::grid::{Hand, Pos, COLS};

/// One catalog entry: a name plus the predicate that defines its
/// membership set. Boxed so per-column/per-finger/per-hand families can be
/// generated in a loop instead of hand-written one at a time.
pub struct CatalogEntry<const N: usize> {
    pub name: String,
    pub predicate: Box<dyn Fn(&[Pos; N]) -> bool + Send + Sync>,
}

pub fn mono_catalog() -> Vec<CatalogEntry<1>> {
    let mut entries = Vec::new();

    for col in 0..COLS {
        entries.push(CatalogEntry {
            name: format!("Column {col} Usage"),
            predicate: Box::new(move |p| p[0].col as usize == col),
        });
    }
    // Named aliases for the four edge/stretch columns, alongside the
    // plain per-column stats above.
    for (name, col) in [
        ("Left Outer Usage", 0usize),
        ("Left Inner Usage", 5),
        ("Right Inner Usage", 6),
        ("Right Outer Usage", 11),
    ] {
        entries.push(CatalogEntry {
            name: name.to_string(),
            predicate: Box::new(move |p| p[0].col as usize == col),
        });
    }
    for finger in 0u8..8 {
        entries.push(CatalogEntry {
            name: format!("Finger {finger} Usage"),
            predicate: Box::new(move |p| p[0].finger() == finger),
        });
    }
    entries.push(CatalogEntry {
        name: "Left Hand Usage".to_string(),
        predicate: Box::new(|p| p[0].hand() == Hand::Left),
    });
    entries.push(CatalogEntry {
        name: "Right Hand Usage".to_string(),
        predicate: Box::new(|p| p[0].hand() == Hand::Right),
    });
    for row in 0usize..3 {
        entries.push(CatalogEntry {
            name: format!("Row {row} Usage"),
            predicate: Box::new(move |p| p[0].row as usize == row),
        });
    }
    entries
}

pub fn bi_catalog() -> Vec<CatalogEntry<2>> {
    let mut entries = Vec::new();

    entries.push(CatalogEntry {
        name: "Same-Finger Bigram".to_string(),
        predicate: Box::new(|p| p[0] != p[1] && same_finger(p[0], p[1])),
    });
    for finger in 0u8..8 {
        entries.push(CatalogEntry {
            name: format!("Same-Finger Bigram (Finger {finger})"),
            predicate: Box::new(move |p| {
                p[0] != p[1] && same_finger(p[0], p[1]) && p[0].finger() == finger
            }),
        });
    }
    entries.push(CatalogEntry {
        name: "Bad Same-Finger Bigram".to_string(),
        predicate: Box::new(|p| p[0] != p[1] && same_finger(p[0], p[1]) && row_diff(p[0], p[1]) == 2),
    });
    for finger in 0u8..8 {
        entries.push(CatalogEntry {
            name: format!("Bad Same-Finger Bigram (Finger {finger})"),
            predicate: Box::new(move |p| {
                p[0] != p[1]
                    && same_finger(p[0], p[1])
                    && row_diff(p[0], p[1]) == 2
                    && p[0].finger() == finger
            }),
        });
    }
    entries.push(CatalogEntry {
        name: "Full Russor".to_string(),
        predicate: Box::new(|p| {
            same_hand(p[0], p[1])
                && !same_finger(p[0], p[1])
                && row_diff(p[0], p[1]) == 2
                && !is_pinky_index_jump(p[0], p[1])
        }),
    });
    entries.push(CatalogEntry {
        name: "Half Russor".to_string(),
        predicate: Box::new(|p| {
            same_hand(p[0], p[1])
                && !same_finger(p[0], p[1])
                && row_diff(p[0], p[1]) == 1
                && !is_pinky_index_jump(p[0], p[1])
        }),
    });
    entries.push(CatalogEntry {
        name: "Index-Stretch".to_string(),
        predicate: Box::new(|p| {
            p[0] != p[1]
                && same_finger(p[0], p[1])
                && is_index(p[0].finger())
                && (p[0].is_stretch() || p[1].is_stretch())
        }),
    });
    entries.push(CatalogEntry {
        name: "Pinky-Stretch".to_string(),
        predicate: Box::new(|p| {
            p[0] != p[1]
                && same_finger(p[0], p[1])
                && is_pinky(p[0].finger())
                && (p[0].is_stretch() || p[1].is_stretch())
        }),
    });

    entries
}

pub fn tri_catalog() -> Vec<CatalogEntry<3>> {
    let mut entries: Vec<CatalogEntry<3>> = Vec::new();

    macro_rules! push {
        ($name:expr, $pred:expr) => {
            entries.push(CatalogEntry {
                name: $name.to_string(),
                predicate: Box::new($pred),
            });
        };
    }

    push!("Same-Finger Trigram", |p: &[Pos; 3]| {
        (p[0] != p[1] && same_finger(p[0], p[1])) || (p[1] != p[2] && same_finger(p[1], p[2]))
    });
    push!("Alternation", |p: &[Pos; 3]| is_alternation(p));
    push!("Redirect", |p: &[Pos; 3]| is_redirect(p));
    push!("Bad Redirect", |p: &[Pos; 3]| is_bad_redirect(p));
    push!("One-Hand", |p: &[Pos; 3]| is_one_hand(p));
    push!("One-Hand In", |p: &[Pos; 3]| is_one_hand_in(p));
    push!("One-Hand Out", |p: &[Pos; 3]| is_one_hand_out(p));
    push!("Same-Row One-Hand", |p: &[Pos; 3]| is_one_hand(p)
        && same_row(p));
    push!("Same-Row Redirect", |p: &[Pos; 3]| is_redirect(p)
        && same_row(p));
    push!("Same-Row Bad Redirect", |p: &[Pos; 3]| is_bad_redirect(p)
        && same_row(p));
    push!("Adjacent-Finger One-Hand", |p: &[Pos; 3]| is_one_hand(p)
        && adjacent_finger(p[0], p[1])
        && adjacent_finger(p[1], p[2]));
    push!("Adjacent-Finger Redirect", |p: &[Pos; 3]| is_redirect(p)
        && adjacent_finger(p[0], p[1])
        && adjacent_finger(p[1], p[2]));
    push!("Roll", |p: &[Pos; 3]| is_roll(p));
    push!("Roll In", |p: &[Pos; 3]| is_roll_in(p));
    push!("Roll Out", |p: &[Pos; 3]| is_roll_out(p));
    push!("Same-Row Roll", |p: &[Pos; 3]| is_roll_same_row(p));
    push!("Same-Row Roll In", |p: &[Pos; 3]| is_roll_in(p)
        && is_roll_same_row(p));
    push!("Same-Row Roll Out", |p: &[Pos; 3]| is_roll_out(p)
        && is_roll_same_row(p));
    push!("Adjacent-Finger Roll", |p: &[Pos; 3]| is_roll_adjacent_finger(p));
    push!("Adjacent-Finger Roll In", |p: &[Pos; 3]| is_roll_in(p)
        && is_roll_adjacent_finger(p));
    push!("Adjacent-Finger Roll Out", |p: &[Pos; 3]| is_roll_out(p)
        && is_roll_adjacent_finger(p));
    push!("Adjacent-Finger Same-Row Roll", |p: &[Pos; 3]| {
        is_roll_adjacent_finger(p) && is_roll_same_row(p)
    });

    entries
}

pub fn quad_catalog() -> Vec<CatalogEntry<4>> {
    let mut entries: Vec<CatalogEntry<4>> = Vec::new();

    macro_rules! push {
        ($name:expr, $pred:expr) => {
            entries.push(CatalogEntry {
                name: $name.to_string(),
                predicate: Box::new($pred),
            });
        };
    }

    // Sub-trigram windows, reusing the trigram predicates on the head and
    // tail triples of each quadgram.
    let head = |p: &[Pos; 4]| [p[0], p[1], p[2]];
    let tail = |p: &[Pos; 4]| [p[1], p[2], p[3]];

    push!("One-Hand (Quad)", |p: &[Pos; 4]| all_same_hand(&p[..])
        && is_one_hand(&head(p))
        && is_one_hand(&tail(p)));
    push!("One-Hand In (Quad)", |p: &[Pos; 4]| all_same_hand(&p[..])
        && is_one_hand_in(&head(p))
        && is_one_hand_in(&tail(p)));
    push!("One-Hand Out (Quad)", |p: &[Pos; 4]| all_same_hand(&p[..])
        && is_one_hand_out(&head(p))
        && is_one_hand_out(&tail(p)));
    push!("Redirect (Quad)", |p: &[Pos; 4]| all_same_hand(&p[..])
        && (is_redirect(&head(p)) || is_redirect(&tail(p))));
    push!("Bad Redirect (Quad)", |p: &[Pos; 4]| all_same_hand(&p[..])
        && (is_bad_redirect(&head(p)) || is_bad_redirect(&tail(p))));
    push!("Roll (Quad)", |p: &[Pos; 4]| is_roll(&head(p))
        || is_roll(&tail(p)));
    push!("Same-Row Roll (Quad)", |p: &[Pos; 4]| is_roll_same_row(&head(p))
        || is_roll_same_row(&tail(p)));
    push!("Adjacent-Finger Roll (Quad)", |p: &[Pos; 4]| {
        is_roll_adjacent_finger(&head(p)) || is_roll_adjacent_finger(&tail(p))
    });
    // Two same-hand pairs separated by a single hand switch (Glossary:
    // True Roll).
    push!("True Roll", |p: &[Pos; 4]| {
        same_hand(p[0], p[1]) && same_hand(p[2], p[3]) && !same_hand(p[1], p[2])
    });
    push!("Same-Row True Roll", |p: &[Pos; 4]| {
        same_hand(p[0], p[1])
            && same_hand(p[2], p[3])
            && !same_hand(p[1], p[2])
            && p[0].row == p[1].row
            && p[2].row == p[3].row
    });
    push!("Adjacent-Finger True Roll", |p: &[Pos; 4]| {
        same_hand(p[0], p[1])
            && same_hand(p[2], p[3])
            && !same_hand(p[1], p[2])
            && adjacent_finger(p[0], p[1])
            && adjacent_finger(p[2], p[3])
    });
    // Three rolls linked: the head and tail sub-trigrams are each a roll
    // (Glossary: Chained Roll).
    push!("Chained Roll", |p: &[Pos; 4]| is_roll(&head(p))
        && is_roll(&tail(p)));

    entries
}

pub fn skip_catalog() -> Vec<CatalogEntry<2>> {
    let mut entries = Vec::new();

    entries.push(CatalogEntry {
        name: "Same-Finger Skipgram".to_string(),
        predicate: Box::new(|p| p[0] != p[1] && same_finger(p[0], p[1])),
    });
    for finger in 0u8..8 {
        entries.push(CatalogEntry {
            name: format!("Same-Finger Skipgram (Finger {finger})"),
            predicate: Box::new(move |p| {
                p[0] != p[1] && same_finger(p[0], p[1]) && p[0].finger() == finger
            }),
        });
    }
    entries.push(CatalogEntry {
        name: "Bad Same-Finger Skipgram".to_string(),
        predicate: Box::new(|p| p[0] != p[1] && same_finger(p[0], p[1]) && row_diff(p[0], p[1]) == 2),
    });
    for finger in 0u8..8 {
        entries.push(CatalogEntry {
            name: format!("Bad Same-Finger Skipgram (Finger {finger})"),
            predicate: Box::new(move |p| {
                p[0] != p[1]
                    && same_finger(p[0], p[1])
                    && row_diff(p[0], p[1]) == 2
                    && p[0].finger() == finger
            }),
        });
    }
    entries.push(CatalogEntry {
        name: "Pinky Lateral Skipgram".to_string(),
        predicate: Box::new(|p| {
            p[0] != p[1]
                && same_finger(p[0], p[1])
                && is_pinky(p[0].finger())
                && (p[0].is_stretch() || p[1].is_stretch())
        }),
    });
    entries.push(CatalogEntry {
        name: "Index Lateral Skipgram".to_string(),
        predicate: Box::new(|p| {
            p[0] != p[1]
                && same_finger(p[0], p[1])
                && is_index(p[0].finger())
                && (p[0].is_stretch() || p[1].is_stretch())
        }),
    });

    entries
}

/// Meta stat definitions: name, abs-value flag, and terms as
/// `(monogram-stat-name, coefficient)` pairs. Currently the only meta stat
/// is Hand Balance; new meta stats reference only non-meta stats by name,
/// resolved once at registry build (see `stats::Registry`).
pub fn meta_catalog() -> Vec<(&'static str, bool, Vec<(&'static str, f32)>)> {
    vec![(
        "Hand Balance",
        true,
        vec![("Left Hand Usage", 1.0), ("Right Hand Usage", -1.0)],
    )]
}
