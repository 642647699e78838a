use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width and height of a block in samples.
pub const BLOCK_DIM: usize = 8;

/// Number of samples or coefficients in one block.
pub const BLOCK_LEN: usize = BLOCK_DIM * BLOCK_DIM;

/// Offset subtracted from unsigned samples to centre them on zero.
pub const LEVEL_SHIFT: i64 = 128;

// ── Component ──────────────────────────────────────────────────────────────

/// One color-separated channel of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    Y,
    Cb,
    Cr,
}

impl Component {
    /// Every component, in the order the pipeline processes them.
    pub const ALL: [Component; 3] = [Component::Y, Component::Cb, Component::Cr];

    /// Name used in hardware dump file names and stage names (`Y`, `Cb`, `Cr`).
    pub fn name(self) -> &'static str {
        match self {
            Component::Y => "Y",
            Component::Cb => "Cb",
            Component::Cr => "Cr",
        }
    }

    /// Lowercase stem used for sample block and bitstream file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            Component::Y => "y",
            Component::Cb => "cb",
            Component::Cr => "cr",
        }
    }

    /// Channel tag byte: the ordinal of the name's first character.
    ///
    /// `Cb` and `Cr` share the tag `b'C'`.
    pub fn tag(self) -> u8 {
        self.name().as_bytes()[0]
    }

    /// Chroma components share one quantization table.
    pub fn is_chroma(self) -> bool {
        !matches!(self, Component::Y)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Component {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "y" => Ok(Component::Y),
            "cb" => Ok(Component::Cb),
            "cr" => Ok(Component::Cr),
            other => Err(Error::parse(format!(
                "unknown component '{}'. Valid options: Y, Cb, Cr",
                other
            ))),
        }
    }
}

// ── Block ──────────────────────────────────────────────────────────────────

/// An 8×8 grid of signed samples or coefficients, addressed row-major.
///
/// The same type carries level-shifted sample blocks and the wider
/// coefficient blocks produced by the transform and quantizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block([[i64; BLOCK_DIM]; BLOCK_DIM]);

impl Default for Block {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Block {
    pub const ZERO: Block = Block([[0; BLOCK_DIM]; BLOCK_DIM]);

    pub fn from_rows(rows: [[i64; BLOCK_DIM]; BLOCK_DIM]) -> Self {
        Self(rows)
    }

    /// Build a block from exactly 64 row-major values.
    pub fn from_slice(values: &[i64]) -> Result<Self> {
        if values.len() != BLOCK_LEN {
            return Err(Error::ShapeMismatch {
                expected: BLOCK_LEN,
                actual: values.len(),
            });
        }
        let mut block = Self::ZERO;
        for (idx, &v) in values.iter().enumerate() {
            block.0[idx / BLOCK_DIM][idx % BLOCK_DIM] = v;
        }
        Ok(block)
    }

    /// Level-shift 64 unsigned row-major samples into a sample block.
    pub fn from_samples(samples: &[u8]) -> Result<Self> {
        let shifted: Vec<i64> = samples.iter().map(|&s| s as i64 - LEVEL_SHIFT).collect();
        Self::from_slice(&shifted)
    }

    pub fn rows(&self) -> &[[i64; BLOCK_DIM]; BLOCK_DIM] {
        &self.0
    }

    /// Row-major iterator over all 64 values.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.iter().collect()
    }

    /// Flattened values as `f64`, the form the comparator consumes.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.iter().map(|v| v as f64).collect()
    }
}

impl Index<(usize, usize)> for Block {
    type Output = i64;

    fn index(&self, (row, col): (usize, usize)) -> &i64 {
        &self.0[row][col]
    }
}

impl IndexMut<(usize, usize)> for Block {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut i64 {
        &mut self.0[row][col]
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0 {
            let line: Vec<String> = row.iter().map(|v| format!("{:5}", v)).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
