//! Table-based quantization of coefficient blocks.

use crate::block::{Block, Component, BLOCK_DIM};

/// Step sizes for the luma channel.
pub const LUMA_TABLE: [[i64; BLOCK_DIM]; BLOCK_DIM] = [
    [16, 11, 10, 16, 24, 40, 51, 61],
    [12, 12, 14, 19, 26, 58, 60, 55],
    [14, 13, 16, 24, 40, 57, 69, 56],
    [14, 17, 22, 29, 51, 87, 80, 62],
    [18, 22, 37, 56, 68, 109, 103, 77],
    [24, 35, 55, 64, 81, 104, 113, 92],
    [49, 64, 78, 87, 103, 121, 120, 101],
    [72, 92, 95, 98, 112, 100, 103, 99],
];

/// Step sizes shared by both chroma channels.
pub const CHROMA_TABLE: [[i64; BLOCK_DIM]; BLOCK_DIM] = [
    [17, 18, 24, 47, 99, 99, 99, 99],
    [18, 21, 26, 66, 99, 99, 99, 99],
    [24, 26, 56, 99, 99, 99, 99, 99],
    [47, 66, 99, 99, 99, 99, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
];

/// Which of the two fixed tables a channel uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantTable {
    Luma,
    Chroma,
}

impl QuantTable {
    pub fn for_component(component: Component) -> Self {
        if component.is_chroma() {
            QuantTable::Chroma
        } else {
            QuantTable::Luma
        }
    }

    pub fn steps(self) -> &'static [[i64; BLOCK_DIM]; BLOCK_DIM] {
        match self {
            QuantTable::Luma => &LUMA_TABLE,
            QuantTable::Chroma => &CHROMA_TABLE,
        }
    }
}

/// Divide `value` by positive `step`, rounding half away from zero.
#[inline]
pub fn round_div(value: i64, step: i64) -> i64 {
    debug_assert!(step > 0, "quantization steps are positive");
    let magnitude = (2 * value.abs() + step) / (2 * step);
    if value < 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Quantize a coefficient block against an explicit step table.
pub fn quantize_with(block: &Block, steps: &[[i64; BLOCK_DIM]; BLOCK_DIM]) -> Block {
    let mut out = Block::ZERO;
    for row in 0..BLOCK_DIM {
        for col in 0..BLOCK_DIM {
            out[(row, col)] = round_div(block[(row, col)], steps[row][col]);
        }
    }
    out
}

/// Quantize a coefficient block with one of the fixed tables.
pub fn quantize(block: &Block, table: QuantTable) -> Block {
    quantize_with(block, table.steps())
}
