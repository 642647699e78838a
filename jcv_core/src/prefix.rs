//! Huffman code construction over integer symbol streams.
//!
//! A [`FrequencyTable`] is reduced into a [`CodeTree`] held in an arena of
//! [`Node`]s indexed by position, and the tree is walked once to produce a
//! [`CodeBook`]. The tree is discarded afterwards.
//!
//! Tie-breaking is deterministic: the min-heap is keyed by
//! `(frequency, arena index)`. Leaves enter the arena in ascending symbol
//! order and merged nodes are appended after them, so equal frequencies
//! resolve by arrival. The first node extracted becomes the left (`0`) child.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

// ── Frequencies ────────────────────────────────────────────────────────────

/// Occurrence count per symbol for one (component, encoding kind) batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable(BTreeMap<i64, u64>);

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_symbols<I: IntoIterator<Item = i64>>(symbols: I) -> Self {
        let mut table = Self::new();
        for s in symbols {
            table.add(s);
        }
        table
    }

    pub fn add(&mut self, symbol: i64) {
        *self.0.entry(symbol).or_insert(0) += 1;
    }

    pub fn count(&self, symbol: i64) -> u64 {
        self.0.get(&symbol).copied().unwrap_or(0)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Symbols in ascending order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.0.iter().map(|(&s, &c)| (s, c))
    }
}

// ── Tree ───────────────────────────────────────────────────────────────────

/// Index of a node inside a [`CodeTree`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: i64 },
    Internal { left: NodeId, right: NodeId },
}

/// Binary code tree; every internal node owns exactly two children.
#[derive(Debug, Clone, Default)]
pub struct CodeTree {
    nodes: Vec<Node>,
    weights: Vec<u64>,
    root: Option<NodeId>,
}

impl CodeTree {
    pub fn build(frequencies: &FrequencyTable) -> Self {
        let mut tree = Self::default();
        let mut heap = BinaryHeap::with_capacity(frequencies.len());

        for (symbol, count) in frequencies.iter() {
            let id = tree.push(Node::Leaf { symbol }, count);
            heap.push(Reverse((count, id)));
        }

        while heap.len() > 1 {
            let (Some(Reverse((lw, left))), Some(Reverse((rw, right)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            let id = tree.push(Node::Internal { left, right }, lw + rw);
            heap.push(Reverse((lw + rw, id)));
        }

        tree.root = heap.pop().map(|Reverse((_, id))| id);
        tree
    }

    fn push(&mut self, node: Node, weight: u64) -> NodeId {
        self.nodes.push(node);
        self.weights.push(weight);
        self.nodes.len() - 1
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Node {
        self.nodes[id]
    }

    pub fn weight(&self, id: NodeId) -> u64 {
        self.weights[id]
    }

    /// Walk the tree depth-first, left before right.
    ///
    /// A tree that is a single leaf assigns that symbol the codeword `0`.
    pub fn codebook(&self) -> CodeBook {
        let mut codes = BTreeMap::new();
        let Some(root) = self.root else {
            return CodeBook(codes);
        };
        if let Node::Leaf { symbol } = self.nodes[root] {
            codes.insert(symbol, Codeword(vec![false]));
            return CodeBook(codes);
        }

        let mut stack = vec![(root, Codeword::default())];
        while let Some((id, path)) = stack.pop() {
            match self.nodes[id] {
                Node::Leaf { symbol } => {
                    codes.insert(symbol, path);
                }
                Node::Internal { left, right } => {
                    // right pushed first so the left subtree is visited first
                    stack.push((right, path.with(true)));
                    stack.push((left, path.with(false)));
                }
            }
        }
        CodeBook(codes)
    }
}

// ── Codewords ──────────────────────────────────────────────────────────────

/// A variable-length bit string, most significant bit first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codeword(Vec<bool>);

impl Codeword {
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn with(&self, bit: bool) -> Self {
        let mut bits = Vec::with_capacity(self.0.len() + 1);
        bits.extend_from_slice(&self.0);
        bits.push(bit);
        Codeword(bits)
    }

    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Codeword {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(Error::parse(format!("invalid codeword character {:?}", other))),
            })
            .collect::<Result<Vec<bool>>>()
            .map(Codeword)
    }
}

impl Serialize for Codeword {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Codebook ───────────────────────────────────────────────────────────────

/// Code-length summary of a codebook.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CodeLengthStats {
    pub symbols: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

/// Symbol → codeword mapping, the artifact that outlives the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeBook(BTreeMap<i64, Codeword>);

impl CodeBook {
    pub fn build(frequencies: &FrequencyTable) -> Self {
        let book = CodeTree::build(frequencies).codebook();
        debug!(
            symbols = book.len(),
            total = frequencies.total(),
            "built prefix code"
        );
        book
    }

    pub fn from_entries<I: IntoIterator<Item = (i64, Codeword)>>(entries: I) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, symbol: i64) -> Option<&Codeword> {
        self.0.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &Codeword)> + '_ {
        self.0.iter().map(|(&s, c)| (s, c))
    }

    pub fn encode(&self, symbols: &[i64]) -> Result<Vec<&Codeword>> {
        symbols
            .iter()
            .map(|&s| self.get(s).ok_or(Error::MissingCodeword(s)))
            .collect()
    }

    /// Codewords of one block joined by single spaces.
    pub fn encode_line(&self, symbols: &[i64]) -> Result<String> {
        let words: Vec<String> = self.encode(symbols)?.iter().map(|c| c.to_string()).collect();
        Ok(words.join(" "))
    }

    /// Σ count × codeword length over `frequencies`.
    pub fn weighted_length(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .map(|(s, n)| n * self.get(s).map_or(0, |c| c.len() as u64))
            .sum()
    }

    pub fn is_prefix_free(&self) -> bool {
        // in lexicographic order a prefix sorts directly before some extension of it
        let mut words: Vec<&Codeword> = self.0.values().collect();
        words.sort();
        words.windows(2).all(|w| !w[0].is_prefix_of(w[1]))
    }

    pub fn length_stats(&self) -> Option<CodeLengthStats> {
        let lengths: Vec<usize> = self.0.values().map(Codeword::len).collect();
        let min = *lengths.iter().min()?;
        let max = *lengths.iter().max()?;
        Some(CodeLengthStats {
            symbols: lengths.len(),
            min,
            max,
            mean: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        })
    }
}

/// Build the codebook for a frequency table.
pub fn build_codes(frequencies: &FrequencyTable) -> CodeBook {
    CodeBook::build(frequencies)
}
