//! ABI codec runtime.
//!
//! Word-level primitives shared by generated codecs and by the reference
//! interpreter in `abi_reflect`: big-endian word writers, strict readers
//! that reject dirty padding and misplaced offsets, Keccak-256 selectors and
//! topics, and the stdlib catalogue of shared scalar/slice codecs that
//! generated code calls instead of re-emitting them.

pub mod errors;
pub mod hash;
pub mod log;
pub mod stdlib;
pub mod word;

pub use alloy_primitives::{Address, FixedBytes, B256, I256, U256};
pub use errors::{DecodeError, EncodeError, OffsetKind, WordKind};
pub use hash::{event_topic, keccak256, selector};
pub use log::{check_selector, check_topics, Log};
pub use word::{pad32, WORD};

/// Everything generated code needs in scope.
pub mod prelude {
    pub use crate::errors::{DecodeError, EncodeError, OffsetKind, WordKind};
    pub use crate::hash::keccak256;
    pub use crate::log::{check_selector, check_topics};
    pub use crate::stdlib;
    pub use crate::word::*;
    pub use alloy_primitives::{Address, FixedBytes, B256, I256, U256};
}
