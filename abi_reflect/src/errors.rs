use abi_runtime::{DecodeError, EncodeError};
use abi_types::TypeError;
use thiserror::Error;

/// Result alias used across the reflection crate.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Top-level errors produced by the reflection runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReflectError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Packed encoding requested for a type without a packed form.
    #[error(transparent)]
    NotPackable(#[from] TypeError),

    /// A JSON argument could not be converted to the declared type.
    #[error("cannot read {ty} from JSON: {reason}")]
    InvalidJson { ty: String, reason: String },

    #[error("no function matches '{0}'")]
    UnknownFunction(String),

    #[error("no declaration has selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("no event has topic 0x{}", hex::encode(.0))]
    UnknownEvent([u8; 32]),

    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("event '{event}' expects {expected} topics, got {actual}")]
    TopicCount {
        event: String,
        expected: usize,
        actual: usize,
    },

    #[error("call data shorter than a selector ({0} bytes)")]
    MissingSelector(usize),
}
