//! Multi-swap neighbor moves over unpinned positions.

use crate::layout::{Layout, PinMask};

/// One exchange of two positions' occupants, recorded so it can be undone.
#[derive(Debug, Clone, Copy)]
pub struct SwapMove {
    pub a: usize,
    pub b: usize,
}

/// Picks `count` unordered pairs of distinct unpinned positions uniformly
/// at random, rejecting pinned or equal pairs, and applies them to
/// `layout` in order. Returns the moves actually applied so the caller can
/// undo them in reverse order on reject.
pub fn apply_random_swaps(
    layout: &mut Layout,
    pins: &PinMask,
    count: usize,
    rng: &mut fastrand::Rng,
) -> Vec<SwapMove> {
    let free: Vec<usize> = (0..layout.matrix.len())
        .filter(|&i| !pins.is_pinned_index(i))
        .collect();

    let mut moves = Vec::with_capacity(count);
    if free.len() < 2 {
        return moves;
    }

    for _ in 0..count {
        let a = free[rng.usize(0..free.len())];
        let mut b = free[rng.usize(0..free.len())];
        while b == a {
            b = free[rng.usize(0..free.len())];
        }
        layout.matrix.swap(a, b);
        moves.push(SwapMove { a, b });
    }
    moves
}

/// Reverts a sequence of swaps in reverse order.
pub fn undo_swaps(layout: &mut Layout, moves: &[SwapMove]) {
    for mv in moves.iter().rev() {
        layout.matrix.swap(mv.a, mv.b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{COLS, ROWS};
    use crate::layout::UNUSED;

    #[test]
    fn undo_restores_original_layout() {
        let matrix: Vec<i16> = (0..(ROWS * COLS) as i16).collect();
        let original = matrix.clone();
        let mut layout = Layout::new("l", matrix).unwrap();
        let pins = PinMask::none();
        let mut rng = fastrand::Rng::with_seed(7);

        let moves = apply_random_swaps(&mut layout, &pins, 18, &mut rng);
        assert_ne!(layout.matrix, original);
        undo_swaps(&mut layout, &moves);
        assert_eq!(layout.matrix, original);
    }

    #[test]
    fn never_touches_pinned_positions() {
        let matrix = vec![UNUSED; ROWS * COLS];
        let mut layout = Layout::new("l", matrix).unwrap();
        let mut pins = PinMask::none();
        pins_pin_all_but_two(&mut pins);
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..50 {
            let moves = apply_random_swaps(&mut layout, &pins, 5, &mut rng);
            for mv in &moves {
                assert!(!pins.is_pinned_index(mv.a));
                assert!(!pins.is_pinned_index(mv.b));
            }
        }
    }

    fn pins_pin_all_but_two(pins: &mut PinMask) {
        for i in 2..ROWS * COLS {
            pins.set_pinned_index(i, true);
        }
    }
}
