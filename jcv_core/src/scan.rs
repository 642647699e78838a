//! Zigzag reordering of 8×8 blocks.

use std::ops::Index;

use crate::block::{Block, BLOCK_LEN};

/// `(row, col)` visited at each zigzag position, from the DC corner to the
/// highest-frequency corner.
#[rustfmt::skip]
pub const ZIGZAG_ORDER: [(usize, usize); BLOCK_LEN] = [
    (0, 0), (0, 1), (1, 0), (2, 0), (1, 1), (0, 2), (0, 3), (1, 2),
    (2, 1), (3, 0), (4, 0), (3, 1), (2, 2), (1, 3), (0, 4), (0, 5),
    (1, 4), (2, 3), (3, 2), (4, 1), (5, 0), (6, 0), (5, 1), (4, 2),
    (3, 3), (2, 4), (1, 5), (0, 6), (0, 7), (1, 6), (2, 5), (3, 4),
    (4, 3), (5, 2), (6, 1), (7, 0), (7, 1), (6, 2), (5, 3), (4, 4),
    (3, 5), (2, 6), (1, 7), (2, 7), (3, 6), (4, 5), (5, 4), (6, 3),
    (7, 2), (7, 3), (6, 4), (5, 5), (4, 6), (3, 7), (4, 7), (5, 6),
    (6, 5), (7, 4), (7, 5), (6, 6), (5, 7), (6, 7), (7, 6), (7, 7),
];

/// A block's 64 values in zigzag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSequence([i64; BLOCK_LEN]);

impl ScanSequence {
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.0.iter().map(|&v| v as f64).collect()
    }

    /// Put every value back at its `(row, col)`.
    pub fn to_block(&self) -> Block {
        let mut block = Block::ZERO;
        for (&value, &pos) in self.0.iter().zip(ZIGZAG_ORDER.iter()) {
            block[pos] = value;
        }
        block
    }
}

impl Index<usize> for ScanSequence {
    type Output = i64;

    fn index(&self, idx: usize) -> &i64 {
        &self.0[idx]
    }
}

/// Reorder `block` into zigzag order.
pub fn scan(block: &Block) -> ScanSequence {
    let mut out = [0i64; BLOCK_LEN];
    for (slot, &pos) in out.iter_mut().zip(ZIGZAG_ORDER.iter()) {
        *slot = block[pos];
    }
    ScanSequence(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BLOCK_DIM;

    #[test]
    fn order_is_a_bijection() {
        let mut seen = [false; BLOCK_LEN];
        for &(row, col) in ZIGZAG_ORDER.iter() {
            assert!(row < BLOCK_DIM && col < BLOCK_DIM);
            let idx = row * BLOCK_DIM + col;
            assert!(!seen[idx], "({row},{col}) visited twice");
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn neighbouring_positions_are_adjacent_cells() {
        for pair in ZIGZAG_ORDER.windows(2) {
            let (r0, c0) = pair[0];
            let (r1, c1) = pair[1];
            assert!(r0.abs_diff(r1) <= 1 && c0.abs_diff(c1) <= 1);
        }
    }

    #[test]
    fn natural_indices_match_the_standard_table() {
        let natural: Vec<usize> = ZIGZAG_ORDER.iter().map(|&(r, c)| r * 8 + c).collect();
        assert_eq!(&natural[..10], &[0, 1, 8, 16, 9, 2, 3, 10, 17, 24]);
        assert_eq!(&natural[56..], &[53, 60, 61, 54, 47, 55, 62, 63]);
    }

    #[test]
    fn scan_then_unscan_restores_the_block() {
        let values: Vec<i64> = (0..64).map(|k| k * 3 - 90).collect();
        let block = Block::from_slice(&values).unwrap();
        assert_eq!(scan(&block).to_block(), block);
    }

    #[test]
    fn natural_order_block_scans_to_its_indices() {
        let values: Vec<i64> = (0..64).collect();
        let seq = scan(&Block::from_slice(&values).unwrap());
        assert_eq!(seq[0], 0);
        assert_eq!(seq[2], 8);
        assert_eq!(seq[63], 63);
    }
}
