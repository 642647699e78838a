//! Run-length (AC) and delta (DC) symbol streams produced by the hardware.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::Component;

/// One AC entry: the number of zeros preceding `value`, then `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLengthPair {
    pub run: i64,
    pub value: i64,
}

impl RunLengthPair {
    pub fn new(run: i64, value: i64) -> Self {
        Self { run, value }
    }
}

/// Which of the two hardware entropy-preparation outputs a stream is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EncodingKind {
    Rle,
    Delta,
}

impl EncodingKind {
    pub const ALL: [EncodingKind; 2] = [EncodingKind::Rle, EncodingKind::Delta];

    /// Directory the hardware dumps this kind into (`RLE`, `Delta`).
    pub fn dir_name(self) -> &'static str {
        match self {
            EncodingKind::Rle => "RLE",
            EncodingKind::Delta => "Delta",
        }
    }

    /// Lowercase tag used in Huffman artifact file names.
    pub fn file_tag(self) -> &'static str {
        match self {
            EncodingKind::Rle => "rle",
            EncodingKind::Delta => "delta",
        }
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Every block's symbol streams for one component, keyed by block index.
///
/// `rle[&i]` and `delta[&i]` belong to block `i`. Either map may be empty when
/// the hardware did not dump that kind, and either may have gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStreams {
    pub component: Component,
    pub rle: BTreeMap<usize, Vec<RunLengthPair>>,
    pub delta: BTreeMap<usize, i64>,
}

impl ChannelStreams {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            rle: BTreeMap::new(),
            delta: BTreeMap::new(),
        }
    }

    /// Block indices present for one kind, ascending.
    pub fn block_indices(&self, kind: EncodingKind) -> Vec<usize> {
        match kind {
            EncodingKind::Rle => self.rle.keys().copied().collect(),
            EncodingKind::Delta => self.delta.keys().copied().collect(),
        }
    }

    /// Indices below the highest present block that have no dump of `kind`.
    pub fn missing_blocks(&self, kind: EncodingKind) -> Vec<usize> {
        let present = self.block_indices(kind);
        let Some(&last) = present.last() else {
            return Vec::new();
        };
        (0..last).filter(|i| present.binary_search(i).is_err()).collect()
    }

    /// Per-block integer symbols of one kind, in ascending block order.
    ///
    /// RLE blocks flatten to `[run, value, run, value, ...]`; delta blocks
    /// hold their single DC difference.
    pub fn block_symbols(&self, kind: EncodingKind) -> Vec<Vec<i64>> {
        match kind {
            EncodingKind::Rle => self
                .rle
                .values()
                .map(|pairs| pairs.iter().flat_map(|p| [p.run, p.value]).collect())
                .collect(),
            EncodingKind::Delta => self.delta.values().map(|&d| vec![d]).collect(),
        }
    }

    pub fn has(&self, kind: EncodingKind) -> bool {
        match kind {
            EncodingKind::Rle => !self.rle.is_empty(),
            EncodingKind::Delta => !self.delta.is_empty(),
        }
    }

    /// DC difference of the lowest-indexed block, the only one the bitstream carries.
    pub fn first_delta(&self) -> Option<i64> {
        self.delta.values().next().copied()
    }
}
