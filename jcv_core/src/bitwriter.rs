//! MSB-first bit packing of Huffman codewords.

use crate::error::Result;
use crate::prefix::{CodeBook, Codeword};

/// Accumulates bits into bytes, most significant bit first.
///
/// The final partial byte is padded with zero bits on [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct BitPacker {
    bytes: Vec<u8>,
    buffer: u8,
    filled: u8,
    bits_written: usize,
}

impl BitPacker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn put_bit(&mut self, bit: bool) {
        self.buffer = (self.buffer << 1) | bit as u8;
        self.filled += 1;
        self.bits_written += 1;
        if self.filled == 8 {
            self.bytes.push(self.buffer);
            self.buffer = 0;
            self.filled = 0;
        }
    }

    pub fn put_codeword(&mut self, code: &Codeword) {
        for &bit in code.bits() {
            self.put_bit(bit);
        }
    }

    /// Total bits written so far, excluding padding.
    pub fn bit_len(&self) -> usize {
        self.bits_written
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.buffer << (8 - self.filled));
        }
        self.bytes
    }
}

impl CodeBook {
    /// Concatenate the codewords of every block into a packed byte string.
    pub fn pack(&self, blocks: &[Vec<i64>]) -> Result<Vec<u8>> {
        let mut packer = BitPacker::new();
        for block in blocks {
            for code in self.encode(block)? {
                packer.put_codeword(code);
            }
        }
        Ok(packer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix::FrequencyTable;

    #[test]
    fn pads_the_last_byte_with_zeros() {
        let mut packer = BitPacker::new();
        for bit in [true, false, true] {
            packer.put_bit(bit);
        }
        assert_eq!(packer.bit_len(), 3);
        assert_eq!(packer.finish(), vec![0b1010_0000]);
    }

    #[test]
    fn full_bytes_are_not_padded() {
        let mut packer = BitPacker::new();
        packer.put_codeword(&"11110000".parse().unwrap());
        packer.put_codeword(&"1".parse().unwrap());
        assert_eq!(packer.finish(), vec![0xF0, 0x80]);
    }

    #[test]
    fn packs_codebook_output_in_block_order() {
        // 1 → "00", 2 → "01", 0 → "1"
        let freq = FrequencyTable::from_symbols([0, 0, 0, 1, 2]);
        let book = CodeBook::build(&freq);
        assert_eq!(book.get(0).unwrap().to_string(), "1");
        let packed = book.pack(&[vec![1, 0], vec![2, 2, 0]]).unwrap();
        // 00 1 01 01 1 → 0010_1011
        assert_eq!(packed, vec![0b0010_1011]);
    }

    #[test]
    fn empty_input_packs_to_nothing() {
        assert!(BitPacker::new().finish().is_empty());
    }
}
