//! Fixed-point 8×8 forward DCT.
//!
//! The cosine product for every `(u, v, i, j)` is evaluated once in floating
//! point, scaled by `scale` and truncated toward zero. Everything after that
//! is integer arithmetic:
//!
//! ```text
//! sum(u,v)   = Σ_i Σ_j input[i][j] · trunc(cos((2i+1)uπ/16) · cos((2j+1)vπ/16) · scale)
//! α(k)       = round(scale / √2)   if k == 0
//!            = scale               otherwise
//! out[u][v]  = floor(α(u) · α(v) · sum(u,v) / (4 · scale))
//! ```
//!
//! The division floors (rounds toward negative infinity). With the default
//! scale of 100 every coefficient carries an extra ×10⁴ factor relative to
//! the real-valued DCT; the comparator knows about it.

use std::f64::consts::{PI, SQRT_2};

use crate::block::{Block, BLOCK_DIM};
use crate::error::{Error, Result};

/// Default fixed-point multiplier applied to cosine products and axis weights.
pub const DEFAULT_SCALE: i64 = 100;

/// Largest accepted scale. Keeps `α·α·sum` inside `i128` for any `i64` sample.
pub const MAX_SCALE: i64 = 10_000;

/// Forward transform with a precomputed integer basis table.
#[derive(Debug, Clone)]
pub struct Transform {
    scale: i64,
    dc_weight: i64,
    /// `basis[((u * 8 + v) * 8 + i) * 8 + j]`
    basis: Vec<i64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::build(DEFAULT_SCALE)
    }
}

impl Transform {
    /// Build a transform for a scale in `1..=MAX_SCALE`.
    pub fn new(scale: i64) -> Result<Self> {
        if !(1..=MAX_SCALE).contains(&scale) {
            return Err(Error::RangeViolation {
                field: "transform scale",
                value: scale,
                width: "1..=10000",
            });
        }
        Ok(Self::build(scale))
    }

    fn build(scale: i64) -> Self {
        let n = BLOCK_DIM;
        let cos = |k: usize, f: usize| ((2 * k + 1) as f64 * f as f64 * PI / 16.0).cos();
        let mut basis = Vec::with_capacity(n * n * n * n);
        for u in 0..n {
            for v in 0..n {
                for i in 0..n {
                    for j in 0..n {
                        basis.push((cos(i, u) * cos(j, v) * scale as f64).trunc() as i64);
                    }
                }
            }
        }
        Self {
            scale,
            dc_weight: (scale as f64 / SQRT_2).round() as i64,
            basis,
        }
    }

    pub fn scale(&self) -> i64 {
        self.scale
    }

    /// Normalization weight for frequency index `k` along one axis.
    pub fn axis_weight(&self, k: usize) -> i64 {
        if k == 0 {
            self.dc_weight
        } else {
            self.scale
        }
    }

    /// Integer basis entry for output `(u, v)` and input `(i, j)`.
    pub fn basis(&self, u: usize, v: usize, i: usize, j: usize) -> i64 {
        self.basis[((u * BLOCK_DIM + v) * BLOCK_DIM + i) * BLOCK_DIM + j]
    }

    /// Transform a level-shifted sample block into a coefficient block.
    ///
    /// Intermediates are `i128`. A coefficient beyond the `i64` range, which
    /// needs samples far outside `[-128, 127]`, saturates.
    pub fn forward(&self, block: &Block) -> Block {
        let mut out = Block::ZERO;
        let divisor = 4 * self.scale as i128;
        for u in 0..BLOCK_DIM {
            for v in 0..BLOCK_DIM {
                let base = (u * BLOCK_DIM + v) * BLOCK_DIM * BLOCK_DIM;
                let sum: i128 = block
                    .iter()
                    .zip(&self.basis[base..base + BLOCK_DIM * BLOCK_DIM])
                    .map(|(sample, &b)| sample as i128 * b as i128)
                    .sum();
                let weighted = (self.axis_weight(u) * self.axis_weight(v)) as i128 * sum;
                let coefficient = weighted.div_euclid(divisor);
                out[(u, v)] = coefficient.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
            }
        }
        out
    }
}

/// Transform with the default scale.
pub fn transform(block: &Block) -> Block {
    Transform::default().forward(block)
}
