pub mod bitstream;
pub mod bitwriter;
pub mod block;
pub mod compare;
pub mod config;
pub mod error;
pub mod prefix;
pub mod quant;
pub mod scan;
pub mod symbols;
pub mod transform;
pub mod verify;

pub use bitstream::{assemble, ChannelBitstream};
pub use bitwriter::BitPacker;
pub use block::{Block, Component, BLOCK_DIM, BLOCK_LEN};
pub use compare::{compare, Comparator, ComparisonResult, Outcome, Stage};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use prefix::{build_codes, CodeBook, Codeword, FrequencyTable};
pub use quant::{quantize, QuantTable};
pub use scan::{scan, ScanSequence};
pub use symbols::{ChannelStreams, EncodingKind, RunLengthPair};
pub use transform::{transform, Transform};
pub use verify::{DumpSource, Verifier, VerificationReport};
