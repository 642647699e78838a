//! Per-channel binary record layout.
//!
//! ```text
//! [TAG: 1 byte]                       first character of the component name
//! [DC:  2 bytes, i16 big-endian]      optional, first block's delta
//! [AC:  3 bytes × N]                  run:u8, value:i16 big-endian
//! ```
//!
//! There are no length prefixes. The optional DC is recovered from the total
//! length: `len - 1` is a multiple of 3 exactly when the DC is absent.

use crate::block::Component;
use crate::error::{Error, Result};
use crate::symbols::RunLengthPair;

/// Size of the channel tag in bytes.
pub const TAG_SIZE: usize = 1;

/// Size of the serialized DC delta in bytes.
pub const DC_SIZE: usize = 2;

/// Size of one serialized AC entry in bytes.
///   run:u8 + value:i16
///   = 1 + 2 = 3
pub const AC_ENTRY_SIZE: usize = 3;

// ── AC entry ───────────────────────────────────────────────────────────────

/// A run-length pair narrowed to its on-disk widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcEntry {
    pub run: u8,
    pub value: i16,
}

impl AcEntry {
    pub fn to_bytes(&self) -> [u8; AC_ENTRY_SIZE] {
        let v = self.value.to_be_bytes();
        [self.run, v[0], v[1]]
    }

    pub fn from_bytes(buf: &[u8; AC_ENTRY_SIZE]) -> Self {
        Self {
            run: buf[0],
            value: i16::from_be_bytes([buf[1], buf[2]]),
        }
    }
}

impl TryFrom<RunLengthPair> for AcEntry {
    type Error = Error;

    fn try_from(pair: RunLengthPair) -> Result<Self> {
        let run = u8::try_from(pair.run).map_err(|_| Error::RangeViolation {
            field: "AC run-length",
            value: pair.run,
            width: "u8",
        })?;
        Ok(Self {
            run,
            value: narrow_i16("AC value", pair.value)?,
        })
    }
}

fn narrow_i16(field: &'static str, value: i64) -> Result<i16> {
    i16::try_from(value).map_err(|_| Error::RangeViolation {
        field,
        value,
        width: "i16",
    })
}

// ── Channel record ─────────────────────────────────────────────────────────

/// Decoded form of one channel's byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBitstream {
    pub tag: u8,
    pub dc: Option<i16>,
    pub ac: Vec<AcEntry>,
}

impl ChannelBitstream {
    /// Validate and narrow a channel's symbols.
    ///
    /// Fails with [`Error::RangeViolation`] instead of truncating.
    ///
    /// `rle` yields each block's pairs in block order.
    pub fn new<I>(component: Component, dc: Option<i64>, rle: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[RunLengthPair]>,
    {
        let dc = dc.map(|d| narrow_i16("DC delta", d)).transpose()?;
        let mut ac = Vec::new();
        for block in rle {
            for &pair in block.as_ref() {
                ac.push(AcEntry::try_from(pair)?);
            }
        }
        Ok(Self {
            tag: component.tag(),
            dc,
            ac,
        })
    }

    pub fn byte_len(&self) -> usize {
        TAG_SIZE + self.dc.map_or(0, |_| DC_SIZE) + self.ac.len() * AC_ENTRY_SIZE
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.byte_len());
        buf.push(self.tag);
        if let Some(dc) = self.dc {
            buf.extend_from_slice(&dc.to_be_bytes());
        }
        for entry in &self.ac {
            buf.extend_from_slice(&entry.to_bytes());
        }
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let (&tag, rest) = buf
            .split_first()
            .ok_or_else(|| Error::malformed("missing channel tag"))?;
        let (dc, body) = match rest.len() % AC_ENTRY_SIZE {
            0 => (None, rest),
            r if r == DC_SIZE => (Some(i16::from_be_bytes([rest[0], rest[1]])), &rest[DC_SIZE..]),
            _ => {
                return Err(Error::malformed(format!(
                    "{} bytes after the tag is neither 3N nor 2 + 3N",
                    rest.len()
                )))
            }
        };
        let ac = body
            .chunks_exact(AC_ENTRY_SIZE)
            .map(|chunk| AcEntry::from_bytes(&[chunk[0], chunk[1], chunk[2]]))
            .collect();
        Ok(Self { tag, dc, ac })
    }
}

/// Serialize one channel: tag, optional DC delta, then every block's AC pairs.
pub fn assemble<I>(component: Component, dc: Option<i64>, rle: I) -> Result<Vec<u8>>
where
    I: IntoIterator,
    I::Item: AsRef<[RunLengthPair]>,
{
    Ok(ChannelBitstream::new(component, dc, rle)?.to_bytes())
}
