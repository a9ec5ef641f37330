use std::fmt;
use thiserror::Error;

/// Which offset slot a decoder was validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetKind {
    DynamicField,
    SliceElement,
    ArrayElement,
}

impl fmt::Display for OffsetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetKind::DynamicField => f.write_str("dynamic field"),
            OffsetKind::SliceElement => f.write_str("slice element"),
            OffsetKind::ArrayElement => f.write_str("array element"),
        }
    }
}

/// The kind of word whose padding was found dirty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Bool,
    Address,
    Uint(u16),
    Int(u16),
    FixedBytes(u16),
    /// Trailing zero padding after a `bytes`/`string` payload.
    Payload,
}

impl fmt::Display for WordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordKind::Bool => f.write_str("bool"),
            WordKind::Address => f.write_str("address"),
            WordKind::Uint(bits) => write!(f, "uint{bits}"),
            WordKind::Int(bits) => write!(f, "int{bits}"),
            WordKind::FixedBytes(len) => write!(f, "bytes{len}"),
            WordKind::Payload => f.write_str("payload"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("negative value supplied for unsigned type uint{bits}")]
    NegativeValueForUnsigned { bits: u16 },

    #[error("value does not fit in a {bits}-bit integer (signed: {signed})")]
    IntegerTooLarge { bits: u16, signed: bool },

    #[error("buffer too short: need {needed} bytes, have {available}")]
    BufferTooShort { needed: usize, available: usize },

    #[error("fixed array expects {expected} elements, got {actual}")]
    ArrayLengthMismatch { expected: usize, actual: usize },

    #[error("value {value} does not match type {ty}")]
    ValueMismatch { ty: String, value: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input: need {needed} bytes, have {available}")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("dirty padding in {kind} word")]
    DirtyPadding { kind: WordKind },

    #[error("invalid offset for {kind} {index}: expected {expected}, found {actual}")]
    InvalidOffset {
        kind: OffsetKind,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("length word does not fit in addressable memory")]
    LengthOverflow,

    #[error("index {index} out of bounds (len = {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("selector mismatch: expected {expected:02x?}, found {actual:02x?}")]
    SelectorMismatch { expected: [u8; 4], actual: [u8; 4] },

    #[error("log carries {actual} topics, event expects {expected}")]
    TopicCount { expected: usize, actual: usize },

    #[error("topic0 does not match the event signature")]
    TopicMismatch,
}
