//! Error types for the reference pipeline.

use thiserror::Error;

/// Result type alias for jcv_core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the core stages.
///
/// The comparator never returns these directly; it folds shape and parse
/// problems into its `Error` outcome so a batch keeps going.
#[derive(Error, Debug)]
pub enum Error {
    /// A value does not fit the fixed width it is serialized into.
    #[error("{field} value {value} does not fit in {width}")]
    RangeViolation {
        field: &'static str,
        value: i64,
        width: &'static str,
    },

    /// Two operands that must have the same number of elements do not.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Text that should hold numbers does not.
    #[error("parse error: {0}")]
    Parse(String),

    /// An operation that needs at least one element received none.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// A symbol was encoded with a codebook that has no entry for it.
    #[error("no codeword for symbol {0}")]
    MissingCodeword(i64),

    /// A byte sequence does not follow the channel record layout.
    #[error("malformed bitstream: {0}")]
    MalformedBitstream(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a malformed bitstream error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedBitstream(msg.into())
    }
}
